//! Escopo de vida de uma view: cancelamento e polling
//!
//! - [`ViewScope`]: requisições presas ao escopo resolvem em
//!   [`KbError::Cancelled`] quando a view é encerrada (drop/cancel)
//! - [`spawn_polling`]: refresh periódico em intervalo fixo, sem backoff,
//!   encerrado pelo token de cancelamento

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::{KbError, Result};

/// Limites aceitos para o intervalo de polling
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Escopo de uma view; cancela tudo que estiver preso a ele no drop
#[derive(Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token filho para tarefas em segundo plano (polling)
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Executa `fut` até concluir ou até o escopo ser cancelado
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                tracing::debug!("Operação descartada: escopo da view encerrado");
                Err(KbError::Cancelled)
            }
            result = fut => result,
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Limita o intervalo aos bounds aceitos
pub fn clamp_interval(period: Duration) -> Duration {
    period.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
}

/// Executa `task` imediatamente e depois a cada `period` até o cancelamento
///
/// `period` é limitado a [`MIN_POLL_INTERVAL`]..=[`MAX_POLL_INTERVAL`].
/// Erros da tarefa são logados e o polling continua no próximo tick.
pub fn spawn_polling<F, Fut>(period: Duration, token: CancellationToken, mut task: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(clamp_interval(period));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!("Polling encerrado");
                    break;
                }
                _ = ticker.tick() => {
                    let run = task();
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        result = run => {
                            if let Err(e) = result {
                                tracing::warn!("Falha no refresh periódico: {}", e);
                            }
                        }
                    }
                }
            }
        }
    })
}

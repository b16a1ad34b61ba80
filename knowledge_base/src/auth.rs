//! Obtenção do token de acesso
//!
//! O token é uma capacidade injetada no cliente ([`TokenProvider`]) em vez de
//! estado global. O cliente consulta o provider a cada requisição, então uma
//! troca de token vale já para a próxima chamada.

use std::env;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Fonte do token Bearer
pub trait TokenProvider: Send + Sync {
    /// Token atual, ou `None` se não houver sessão
    fn get_token(&self) -> Option<String>;
}

/// Token fixo, substituível em tempo de execução (login/logout)
#[derive(Clone, Default)]
pub struct StaticTokenProvider {
    token: Arc<RwLock<Option<String>>>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        let provider = Self::default();
        provider.set_token(token);
        provider
    }

    /// Provider sem sessão
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token).filter(|t| !t.is_empty());
        }
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn get_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Nunca logar o token
        f.debug_struct("StaticTokenProvider")
            .field("has_token", &self.get_token().is_some())
            .finish()
    }
}

/// Lê o token de uma variável de ambiente a cada chamada
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var_name: String,
}

impl EnvTokenProvider {
    pub const DEFAULT_VAR: &'static str = "KB_API_TOKEN";

    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }

    pub fn var_name(&self) -> &str {
        &self.var_name
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

impl TokenProvider for EnvTokenProvider {
    fn get_token(&self) -> Option<String> {
        env::var(&self.var_name)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Valor do header `Authorization`
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_provider_set_and_clear() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.get_token().as_deref(), Some("abc"));

        provider.clear();
        assert_eq!(provider.get_token(), None);

        provider.set_token("");
        assert_eq!(provider.get_token(), None);
    }

    #[test]
    fn test_debug_hides_token() {
        let provider = StaticTokenProvider::new("segredo");
        assert!(!format!("{:?}", provider).contains("segredo"));
    }

    #[test]
    fn test_env_provider_reads_on_every_call() {
        let provider = EnvTokenProvider::new("KB_TEST_TOKEN_ENV_PROVIDER");
        env::remove_var("KB_TEST_TOKEN_ENV_PROVIDER");
        assert_eq!(provider.get_token(), None);

        env::set_var("KB_TEST_TOKEN_ENV_PROVIDER", " tok-1 ");
        assert_eq!(provider.get_token().as_deref(), Some("tok-1"));

        env::remove_var("KB_TEST_TOKEN_ENV_PROVIDER");
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(bearer("xyz"), "Bearer xyz");
    }
}

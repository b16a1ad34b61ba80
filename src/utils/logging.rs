use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Inicializa o subscriber de tracing
///
/// `RUST_LOG` tem prioridade; sem ele, `debug` com `--verbose` e `info` caso contrário.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs vão para stderr; stdout fica reservado para a saída do comando
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_fields_loaded(kb_set: i64, count: usize) {
    info!("📋 {} campos carregados do conjunto {}", count, kb_set);
}

pub fn log_entries_loaded(kb_set: i64, count: usize) {
    debug!("{} entries carregadas do conjunto {}", count, kb_set);
}

pub fn log_field_created(field_id: i64, name: &str) {
    info!("✅ Campo criado: {} - Nome: {}", field_id, name);
}

pub fn log_value_saved(entry_id: i64, field_name: &str) {
    info!("✏️ Valor salvo na entry {} - Campo: {}", entry_id, field_name);
}

pub fn log_api_error(operation: &str, status: Option<u16>, error: &str) {
    error!("Knowledge base API error: {} - Status: {:?} - Error: {}", operation, status, error);
}

pub fn log_validation_error(field: &str, message: &str) {
    warn!("Validation error: {} - {}", field, message);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}

use knowledge_base::submission::user_message;
use knowledge_base::KbError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    KnowledgeBase(KbError),
    ConfigError(String),
    JsonError(serde_json::Error),
    ValidationError(String),
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::KnowledgeBase(err) => write!(f, "{}", user_message(err)),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::JsonError(err) => write!(f, "JSON error: {}", err),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::KnowledgeBase(err) => Some(err),
            AppError::JsonError(err) => Some(err),
            _ => None,
        }
    }
}

impl AppError {
    /// Código de saída do processo para o erro
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::ConfigError(_) => 2,
            AppError::KnowledgeBase(err) if err.is_local() => 3,
            AppError::ValidationError(_) | AppError::NotFound(_) => 3,
            _ => 1,
        }
    }
}

impl From<KbError> for AppError {
    fn from(err: KbError) -> Self {
        match err {
            KbError::ConfigError(msg) => AppError::ConfigError(msg),
            other => AppError::KnowledgeBase(other),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::JsonError(err)
    }
}

pub type AppResult<T> = Result<T, AppError>;

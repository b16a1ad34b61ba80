//! Tipos de erro para o crate knowledge_base

use serde_json::Value;
use thiserror::Error;

/// Erros do cliente e das operações da base de conhecimento
#[derive(Debug, Error)]
pub enum KbError {
    /// Erro de requisição HTTP (transporte)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Erro da API (status code não-2xx), com o corpo já parseado
    #[error("Knowledge base API error (status {status}): {body}")]
    ApiError { status: u16, body: Value },

    /// Erro de parsing JSON
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Erro de configuração
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Campo obrigatório sem valor (nunca chega na rede)
    #[error("O campo \"{0}\" é obrigatório")]
    RequiredFieldEmpty(String),

    /// Nome de campo vazio no formulário de criação
    #[error("O nome do campo é obrigatório")]
    FieldNameEmpty,

    /// Campo de escolha criado sem opções
    #[error("Campos de escolha precisam de pelo menos uma opção")]
    ChoiceWithoutOptions,

    /// Conflito de nome reportado pelo backend
    #[error("Já existe um campo com este nome neste conjunto.")]
    DuplicateFieldName,

    /// Já existe um envio em andamento para este editor
    #[error("Já existe um envio em andamento")]
    SubmitInFlight,

    /// A view dona da operação foi encerrada
    #[error("Operação cancelada")]
    Cancelled,
}

impl KbError {
    /// Status HTTP quando o erro veio do backend
    pub fn status(&self) -> Option<u16> {
        match self {
            KbError::ApiError { status, .. } => Some(*status),
            KbError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Erros locais: nenhuma requisição foi feita
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            KbError::RequiredFieldEmpty(_)
                | KbError::FieldNameEmpty
                | KbError::ChoiceWithoutOptions
                | KbError::SubmitInFlight
        )
    }
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, KbError>;

//! Criação de definições de campo
//!
//! Formulário do operador para adicionar um campo a um conjunto:
//! 1. Nome obrigatório (após trim)
//! 2. `Choice` exige pelo menos uma opção
//! 3. `POST /fields/`
//! 4. Sucesso → reseta o formulário e avisa o pai para recarregar os campos
//!
//! Conflito de nome duplicado vira [`KbError::DuplicateFieldName`].

use serde_json::Value;

use crate::client::KnowledgeBaseClient;
use crate::error::{KbError, Result};
use crate::submission::{flatten_errors, SubmitGate};
use crate::types::{parse_options, FieldDefinition, FieldType, NewFieldRequest, SetId};

// Trechos que indicam violação de unicidade nas mensagens do backend
const UNIQUE_MARKERS: &[&str] = &["unique", "already exists", "já existe", "duplicate"];

/// Estado do formulário de criação de campo
#[derive(Debug, Clone)]
pub struct FieldForm {
    pub kb_set: SetId,
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: String,
    gate: SubmitGate,
}

impl FieldForm {
    pub fn new(kb_set: SetId) -> Self {
        Self {
            kb_set,
            name: String::new(),
            field_type: FieldType::Text,
            required: false,
            options: String::new(),
            gate: SubmitGate::new(),
        }
    }

    /// Volta aos valores iniciais (mantém o conjunto)
    pub fn reset(&mut self) {
        self.name.clear();
        self.field_type = FieldType::Text;
        self.required = false;
        self.options.clear();
    }

    /// Valida o formulário e monta o corpo da requisição
    pub fn to_request(&self) -> Result<NewFieldRequest> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(KbError::FieldNameEmpty);
        }

        let options = match self.field_type {
            FieldType::Choice => {
                let parsed = parse_options(&self.options);
                if parsed.is_empty() {
                    return Err(KbError::ChoiceWithoutOptions);
                }
                Some(parsed.join(", "))
            }
            _ => None,
        };

        Ok(NewFieldRequest {
            kb_set: self.kb_set,
            name: name.to_string(),
            field_type: self.field_type.clone(),
            required: self.required,
            options,
        })
    }

    pub fn is_submitting(&self) -> bool {
        self.gate.is_in_flight()
    }

    /// Envia o novo campo; em caso de sucesso reseta e chama `on_created`
    pub async fn submit<F>(
        &mut self,
        client: &KnowledgeBaseClient,
        on_created: F,
    ) -> Result<FieldDefinition>
    where
        F: FnOnce(&FieldDefinition),
    {
        let gate = self.gate.clone();
        let _guard = gate.try_begin().ok_or(KbError::SubmitInFlight)?;

        let request = self.to_request()?;
        let created = create_field(client, &request).await?;

        self.reset();
        on_created(&created);
        Ok(created)
    }
}

/// Cria o campo traduzindo conflitos de nome
pub async fn create_field(
    client: &KnowledgeBaseClient,
    request: &NewFieldRequest,
) -> Result<FieldDefinition> {
    match client.create_field(request).await {
        Ok(field) => {
            tracing::info!(
                "➕ Campo '{}' ({}) criado no conjunto {}",
                field.name,
                field.field_type,
                request.kb_set
            );
            Ok(field)
        }
        Err(e) if is_duplicate_name(&e) => {
            tracing::warn!(
                "⚠️ Campo '{}' já existe no conjunto {}",
                request.name,
                request.kb_set
            );
            Err(KbError::DuplicateFieldName)
        }
        Err(e) => Err(e),
    }
}

/// Detecta o conflito de nome duplicado reportado pelo backend
pub fn is_duplicate_name(error: &KbError) -> bool {
    match error {
        KbError::ApiError { status: 409, .. } => true,
        KbError::ApiError { status: 400, body } => mentions_uniqueness(body),
        _ => false,
    }
}

fn mentions_uniqueness(body: &Value) -> bool {
    flatten_errors(body, None).iter().any(|msg| {
        let msg = msg.to_lowercase();
        UNIQUE_MARKERS.iter().any(|marker| msg.contains(marker))
    })
}

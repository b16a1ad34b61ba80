use crate::config::Settings;
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use knowledge_base::types::{Entry, EntryId, FieldDefinition, FieldType, SetId};
use knowledge_base::{
    normalize, EditableValue, EntryEditor, EnvTokenProvider, FieldForm, FilePreview,
    InputControl, KnowledgeBaseClient, StaticTokenProvider, TokenProvider,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Orquestra campos e entries de um conjunto sobre o [`KnowledgeBaseClient`]
#[derive(Clone)]
pub struct KnowledgeBaseService {
    client: KnowledgeBaseClient,
}

impl KnowledgeBaseService {
    pub fn new(client: KnowledgeBaseClient) -> Self {
        Self { client }
    }

    /// Monta o cliente a partir das configurações
    ///
    /// Token fixo (`--token` / `KB_API_TOKEN`) vira [`StaticTokenProvider`];
    /// sem ele, a variável `api.token_env` é lida a cada requisição.
    pub fn from_settings(settings: &Settings) -> AppResult<Self> {
        let tokens: Arc<dyn TokenProvider> = match settings.api.token.as_deref() {
            Some(token) if !token.trim().is_empty() => {
                Arc::new(StaticTokenProvider::new(token.trim()))
            }
            _ => Arc::new(EnvTokenProvider::new(settings.api.token_env.clone())),
        };

        let client = KnowledgeBaseClient::with_timeouts(
            settings.api.base_url.clone(),
            tokens,
            settings.api.timeout_secs,
            settings.api.connect_timeout_secs,
        )?;

        log_info(&format!("Knowledge base API: {}", client.base_url()));
        Ok(Self { client })
    }

    pub fn client(&self) -> &KnowledgeBaseClient {
        &self.client
    }

    pub async fn fields(&self, kb_set: SetId) -> AppResult<Vec<FieldDefinition>> {
        match self.client.list_fields(kb_set).await {
            Ok(fields) => {
                log_fields_loaded(kb_set, fields.len());
                Ok(fields)
            }
            Err(e) => {
                log_api_error("list_fields", e.status(), &e.to_string());
                Err(e.into())
            }
        }
    }

    /// Localiza um campo pelo id numérico ou pelo nome (sem diferenciar maiúsculas)
    pub async fn find_field(&self, kb_set: SetId, reference: &str) -> AppResult<FieldDefinition> {
        let fields = self.fields(kb_set).await?;
        select_field(fields, reference)
            .ok_or_else(|| AppError::NotFound(format!("Campo '{}' no conjunto {}", reference, kb_set)))
    }

    pub async fn entries(&self, kb_set: SetId) -> AppResult<Vec<Entry>> {
        match self.client.list_entries(kb_set).await {
            Ok(entries) => {
                log_entries_loaded(kb_set, entries.len());
                Ok(entries)
            }
            Err(e) => {
                log_api_error("list_entries", e.status(), &e.to_string());
                Err(e.into())
            }
        }
    }

    /// Abre o editor de um campo, na entry indicada ou em uma nova
    pub async fn open_editor(
        &self,
        kb_set: SetId,
        field: FieldDefinition,
        entry_id: Option<EntryId>,
    ) -> AppResult<EntryEditor> {
        let Some(entry_id) = entry_id else {
            return Ok(EntryEditor::open(kb_set, field, None));
        };

        let entries = self.entries(kb_set).await?;
        let entry = entries
            .iter()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| AppError::NotFound(format!("Entry {} no conjunto {}", entry_id, kb_set)))?;

        Ok(EntryEditor::for_entry(entry, field))
    }

    /// Define o valor de um campo a partir de texto bruto
    pub async fn set_value(
        &self,
        kb_set: SetId,
        field_ref: &str,
        entry_id: Option<EntryId>,
        raw: &str,
    ) -> AppResult<Entry> {
        let field = self.find_field(kb_set, field_ref).await?;
        let mut editor = self.open_editor(kb_set, field, entry_id).await?;

        if !editor.set_raw(raw) {
            let name = editor.field().name.clone();
            let message = match editor.control().placeholder_text() {
                Some(placeholder) => placeholder,
                None => format!("Valor '{}' não aceito", raw),
            };
            log_validation_error(&name, &message);
            return Err(AppError::ValidationError(format!("{}: {}", name, message)));
        }

        self.submit(&mut editor).await
    }

    /// Limpa o valor de um campo (todos os slots nulos)
    pub async fn clear_value(
        &self,
        kb_set: SetId,
        field_ref: &str,
        entry_id: Option<EntryId>,
    ) -> AppResult<Entry> {
        let field = self.find_field(kb_set, field_ref).await?;
        let mut editor = self.open_editor(kb_set, field, entry_id).await?;
        let empty = EditableValue::empty_for(&editor.field().field_type);
        editor.set_value(empty);

        self.submit(&mut editor).await
    }

    async fn submit(&self, editor: &mut EntryEditor) -> AppResult<Entry> {
        let field_name = editor.field().name.clone();
        let entry = editor
            .submit(&self.client, |entry| log_value_saved(entry.id, &field_name))
            .await?;
        Ok(entry)
    }

    /// Cria um campo pelo mesmo fluxo do formulário
    pub async fn create_field(
        &self,
        kb_set: SetId,
        name: &str,
        field_type: FieldType,
        required: bool,
        options: Option<&str>,
    ) -> AppResult<FieldDefinition> {
        let mut form = FieldForm::new(kb_set);
        form.name = name.to_string();
        form.field_type = field_type;
        form.required = required;
        form.options = options.unwrap_or_default().to_string();

        let created = form
            .submit(&self.client, |field| log_field_created(field.id, &field.name))
            .await?;
        Ok(created)
    }
}

fn select_field(fields: Vec<FieldDefinition>, reference: &str) -> Option<FieldDefinition> {
    let reference = reference.trim();
    if let Ok(id) = reference.parse::<i64>() {
        if let Some(field) = fields.iter().find(|f| f.id == id) {
            return Some(field.clone());
        }
    }
    fields
        .into_iter()
        .find(|f| f.name.trim().eq_ignore_ascii_case(reference))
}

/// Tipo informado no `create-field`, restrito aos tipos conhecidos
pub fn parse_field_type(tag: &str) -> AppResult<FieldType> {
    let field_type = FieldType::from_tag(tag);
    if FieldType::KNOWN.contains(&field_type) {
        return Ok(field_type);
    }

    let accepted: Vec<String> = FieldType::KNOWN
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();
    Err(AppError::ValidationError(format!(
        "Tipo de campo desconhecido: {} (aceitos: {})",
        tag.trim(),
        accepted.join(", ")
    )))
}

/// Definição de campo com o rótulo do tipo
pub fn field_summary(field: &FieldDefinition) -> Value {
    json!({
        "id": field.id,
        "name": field.name,
        "type": field.field_type.as_str(),
        "type_label": field.field_type.label(),
        "required": field.required,
        "options": field.choice_options(),
    })
}

/// Controle de entrada com as propriedades derivadas (passo, obrigatoriedade, placeholder)
pub fn control_summary(control: &InputControl) -> Value {
    let step = match control {
        InputControl::NumberInput { step, .. } => Some(step.value()),
        _ => None,
    };

    json!({
        "control": control,
        "required": control.is_required(),
        "disabled": control.is_disabled(),
        "step": step,
        "placeholder": control.placeholder_text(),
    })
}

/// Resumo legível de uma entry: valor normalizado de cada campo do conjunto
pub fn entry_summary(entry: &Entry, fields: &[FieldDefinition]) -> Value {
    let mut values = Map::new();

    for field in fields {
        let value = normalize(entry.value_for(field.id), &field.field_type);
        let mut item = json!({
            "field_id": field.id,
            "type": field.field_type.as_str(),
            "value": display_value(&value),
        });

        if field.field_type == FieldType::Url && !value.is_blank() {
            item["preview"] = json!(FilePreview::for_url(&value.as_text()));
        }

        values.insert(field.name.clone(), item);
    }

    json!({
        "id": entry.id,
        "kb_set": entry.kb_set,
        "values": values,
        "updated_at": entry.updated_at,
    })
}

fn display_value(value: &EditableValue) -> Value {
    match value {
        EditableValue::Number(n) => n.map_or(Value::Null, |n| json!(n)),
        EditableValue::Boolean(b) => json!(b),
        other if other.is_blank() => Value::Null,
        other => json!(other.as_text()),
    }
}

//! Envio de valores de campo (criação/atualização de entries)
//!
//! Fluxo:
//! 1. Serializa o valor editável do campo
//! 2. Gate de obrigatoriedade: campo obrigatório com `value` nulo falha localmente
//! 3. Monta `{ kb_set, values: [payload] }` (SEMPRE um único valor)
//! 4. Com `entry_id` conhecido → `PUT /entries/{id}/`; sem → `POST /entries/`
//! 5. Sucesso → callback do chamador (ex.: recarregar a lista)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::client::KnowledgeBaseClient;
use crate::codec::{normalize, render, serialize, EditableValue};
use crate::control::InputControl;
use crate::error::{KbError, Result};
use crate::types::{
    Entry, EntryRequest, FieldDefinition, FieldRef, SetId, ValuePayload, ValueRecord,
};

/// Mensagem genérica para falhas de transporte
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Não foi possível conectar ao servidor. Verifique sua conexão e tente novamente.";

/// Impede envio duplicado enquanto outro está em andamento
#[derive(Debug, Clone, Default)]
pub struct SubmitGate {
    in_flight: Arc<AtomicBool>,
}

/// Guard RAII: libera o gate ao sair de escopo (sucesso, erro ou cancelamento)
#[derive(Debug)]
pub struct SubmitGuard {
    in_flight: Arc<AtomicBool>,
}

impl SubmitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marca o início de um envio; `None` se já houver um em andamento
    pub fn try_begin(&self) -> Option<SubmitGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitGuard {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Monta o corpo da requisição aplicando o gate de obrigatoriedade
pub fn build_entry_request(
    kb_set: SetId,
    field: &FieldDefinition,
    value: &EditableValue,
) -> Result<EntryRequest> {
    let payload = serialize(field.id, &field.field_type, value);

    if field.required && payload.is_empty() {
        tracing::warn!("Campo obrigatório vazio: '{}' (id {})", field.name, field.id);
        return Err(KbError::RequiredFieldEmpty(field.name.clone()));
    }

    Ok(EntryRequest {
        kb_set,
        values: vec![payload],
    })
}

/// Valida e envia o valor de um campo, criando ou atualizando a entry
pub async fn submit_value<F>(
    client: &KnowledgeBaseClient,
    kb_set: SetId,
    field: &FieldDefinition,
    value: &EditableValue,
    existing: Option<&ValueRecord>,
    on_saved: F,
) -> Result<Entry>
where
    F: FnOnce(&Entry),
{
    let request = build_entry_request(kb_set, field, value)?;

    let result = match existing.and_then(|r| r.entry_id) {
        Some(entry_id) => {
            tracing::debug!("Atualizando entry {} (campo '{}')", entry_id, field.name);
            client.update_entry(entry_id, &request).await
        }
        None => {
            tracing::debug!("Criando entry no conjunto {} (campo '{}')", kb_set, field.name);
            client.create_entry(&request).await
        }
    };

    match result {
        Ok(entry) => {
            tracing::info!("✅ Valor do campo '{}' salvo na entry {}", field.name, entry.id);
            on_saved(&entry);
            Ok(entry)
        }
        Err(e) => {
            tracing::error!("❌ Falha ao salvar campo '{}': {}", field.name, user_message(&e));
            Err(e)
        }
    }
}

/// Editor de um valor de campo (o "modal")
///
/// Dono do valor em edição; o envio é protegido por um [`SubmitGate`].
#[derive(Debug)]
pub struct EntryEditor {
    kb_set: SetId,
    field: FieldDefinition,
    existing: Option<ValueRecord>,
    value: EditableValue,
    gate: SubmitGate,
}

impl EntryEditor {
    /// Abre o editor, normalizando o registro existente (se houver)
    pub fn open(kb_set: SetId, field: FieldDefinition, existing: Option<ValueRecord>) -> Self {
        let value = normalize(existing.as_ref(), &field.field_type);
        Self {
            kb_set,
            field,
            existing,
            value,
            gate: SubmitGate::new(),
        }
    }

    /// Abre o editor para um campo de uma entry já existente
    pub fn for_entry(entry: &Entry, field: FieldDefinition) -> Self {
        let existing = entry.value_for(field.id).cloned().map(|mut record| {
            record.entry_id.get_or_insert(entry.id);
            record
        });
        Self::open(entry.kb_set, field, existing)
    }

    pub fn field(&self) -> &FieldDefinition {
        &self.field
    }

    pub fn existing(&self) -> Option<&ValueRecord> {
        self.existing.as_ref()
    }

    pub fn value(&self) -> &EditableValue {
        &self.value
    }

    pub fn set_value(&mut self, value: EditableValue) {
        self.value = value;
    }

    /// Controle de entrada para o valor atual
    pub fn control(&self) -> InputControl {
        render(
            &self.field.field_type,
            &self.value,
            self.field.required,
            self.field.options.as_deref(),
        )
    }

    /// Aplica entrada bruta via controle; `false` se o controle rejeitou
    pub fn set_raw(&mut self, raw: &str) -> bool {
        match self.control().accept(raw) {
            Some(value) => {
                self.value = value;
                true
            }
            None => false,
        }
    }

    /// Payload serializado do valor atual
    pub fn payload(&self) -> ValuePayload {
        serialize(self.field.id, &self.field.field_type, &self.value)
    }

    /// `true` enquanto um envio está em andamento (botão desabilitado)
    pub fn is_submitting(&self) -> bool {
        self.gate.is_in_flight()
    }

    /// Valida e envia; `on_saved` só é chamado em caso de sucesso
    ///
    /// Após o sucesso o editor passa a apontar para a entry salva, então um
    /// novo envio vira `PUT` em vez de criar outra entry.
    pub async fn submit<F>(&mut self, client: &KnowledgeBaseClient, on_saved: F) -> Result<Entry>
    where
        F: FnOnce(&Entry),
    {
        let gate = self.gate.clone();
        let _guard = gate.try_begin().ok_or(KbError::SubmitInFlight)?;

        let entry = submit_value(
            client,
            self.kb_set,
            &self.field,
            &self.value,
            self.existing.as_ref(),
            on_saved,
        )
        .await?;

        self.existing = Some(self.saved_record(&entry));
        Ok(entry)
    }

    // Registro do campo na entry devolvida; sem ele, o payload enviado
    fn saved_record(&self, entry: &Entry) -> ValueRecord {
        let mut record = entry.value_for(self.field.id).cloned().unwrap_or_else(|| ValueRecord {
            id: self.existing.as_ref().and_then(|r| r.id),
            field: FieldRef::Id(self.field.id),
            entry_id: None,
            slots: self.payload().slots,
        });
        record.entry_id = Some(entry.id);
        record
    }
}

/// Converte qualquer erro em uma mensagem única para o usuário
///
/// Prioridade para erros do backend: `detail` → erros de `values`
/// achatados com `; ` → outros erros por campo → "Erro do servidor (status)".
pub fn user_message(error: &KbError) -> String {
    match error {
        KbError::ApiError { status, body } => api_error_message(*status, body),
        KbError::HttpError(e) => match e.status() {
            Some(status) => server_error_message(status.as_u16()),
            None => CONNECTION_ERROR_MESSAGE.to_string(),
        },
        KbError::JsonError(_) => "Resposta inválida do servidor.".to_string(),
        other => other.to_string(),
    }
}

fn server_error_message(status: u16) -> String {
    format!("Erro do servidor ({})", status)
}

fn api_error_message(status: u16, body: &Value) -> String {
    let Value::Object(obj) = body else {
        return server_error_message(status);
    };

    if let Some(detail) = obj.get("detail").and_then(Value::as_str) {
        if !detail.trim().is_empty() {
            return detail.to_string();
        }
    }

    if let Some(values) = obj.get("values") {
        let messages = flatten_errors(values, None);
        if !messages.is_empty() {
            return messages.join("; ");
        }
    }

    let messages = flatten_errors(body, None);
    if !messages.is_empty() {
        return messages.join("; ");
    }

    server_error_message(status)
}

/// Achata erros de validação (objeto/array aninhados) em "campo: mensagem"
pub fn flatten_errors(value: &Value, key: Option<&str>) -> Vec<String> {
    match value {
        Value::String(msg) => vec![match key {
            Some(key) => format!("{}: {}", key, msg),
            None => msg.clone(),
        }],
        Value::Array(items) => items.iter().flat_map(|v| flatten_errors(v, key)).collect(),
        Value::Object(obj) => obj
            .iter()
            .flat_map(|(k, v)| flatten_errors(v, Some(k)))
            .collect(),
        Value::Null => Vec::new(),
        other => vec![match key {
            Some(key) => format!("{}: {}", key, other),
            None => other.to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldRef, FieldType, TypedSlot, ValueSlots};
    use serde_json::json;

    fn field(field_type: FieldType, required: bool) -> FieldDefinition {
        FieldDefinition {
            id: 10,
            kb_set: Some(2),
            name: "Plano".to_string(),
            field_type,
            required,
            options: Some("bronze, silver, gold".to_string()),
        }
    }

    #[test]
    fn test_required_gate_blocks_empty_value() {
        let result = build_entry_request(
            2,
            &field(FieldType::Text, true),
            &EditableValue::Text("   ".to_string()),
        );
        assert!(matches!(result, Err(KbError::RequiredFieldEmpty(ref n)) if n == "Plano"));

        let request = build_entry_request(
            2,
            &field(FieldType::Text, false),
            &EditableValue::Text("   ".to_string()),
        )
        .unwrap();
        assert_eq!(request.values.len(), 1);
        assert!(request.values[0].is_empty());
    }

    #[test]
    fn test_gate_rejects_second_submit() {
        let gate = SubmitGate::new();
        let guard = gate.try_begin();
        assert!(guard.is_some());
        assert!(gate.is_in_flight());
        assert!(gate.try_begin().is_none());

        drop(guard);
        assert!(!gate.is_in_flight());
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn test_editor_for_entry_fills_entry_id() {
        let entry = Entry {
            id: 77,
            kb_set: 2,
            values: vec![ValueRecord {
                id: Some(1),
                field: FieldRef::Id(10),
                entry_id: None,
                slots: ValueSlots::single(TypedSlot::Text("gold".to_string())),
            }],
            created_at: None,
            updated_at: None,
        };

        let mut editor = EntryEditor::for_entry(&entry, field(FieldType::Choice, false));
        assert_eq!(editor.existing().and_then(|r| r.entry_id), Some(77));
        assert_eq!(editor.value(), &EditableValue::Text("gold".to_string()));

        assert!(!editor.set_raw("platinum"));
        assert!(editor.set_raw("silver"));
        assert_eq!(editor.payload().slots.value_text.as_deref(), Some("silver"));
    }

    #[test]
    fn test_user_message_prefers_detail() {
        let err = KbError::ApiError {
            status: 403,
            body: json!({"detail": "Sem permissão.", "values": {"x": ["y"]}}),
        };
        assert_eq!(user_message(&err), "Sem permissão.");
    }

    #[test]
    fn test_user_message_flattens_values_errors() {
        let err = KbError::ApiError {
            status: 400,
            body: json!({
                "values": [
                    {"value_number": ["Informe um número válido."]},
                    {"field_id": ["Campo inexistente."]}
                ]
            }),
        };
        assert_eq!(
            user_message(&err),
            "value_number: Informe um número válido.; field_id: Campo inexistente."
        );
    }

    #[test]
    fn test_user_message_falls_back_to_status() {
        let err = KbError::ApiError {
            status: 502,
            body: Value::String("<html>Bad Gateway</html>".to_string()),
        };
        assert_eq!(user_message(&err), "Erro do servidor (502)");

        let err = KbError::ApiError {
            status: 500,
            body: json!({}),
        };
        assert_eq!(user_message(&err), "Erro do servidor (500)");
    }

    #[test]
    fn test_user_message_for_local_errors() {
        assert_eq!(
            user_message(&KbError::RequiredFieldEmpty("Site".to_string())),
            "O campo \"Site\" é obrigatório"
        );
    }
}

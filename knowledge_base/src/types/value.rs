//! Valores armazenados e corpos de envio
//!
//! ⚠️ CRÍTICO: o contrato de wire é "um-de-N slots anuláveis". O backend espera
//! sempre as oito chaves (`value` + sete slots tipados), com no máximo um slot
//! tipado preenchido. Use [`ValueSlots::empty`] / [`ValueSlots::single`] para
//! montar slots; nunca preencha os campos diretamente.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::field::FieldDefinition;
use super::field_type::FieldType;
use super::{EntryId, FieldId, RecordId, SetId};

/// Um slot tipado preenchido
#[derive(Debug, Clone, PartialEq)]
pub enum TypedSlot {
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(String),
    Url(String),
    Json(Value),
}

impl TypedSlot {
    /// Valor espelhado no campo genérico `value`
    pub fn mirror(&self) -> Value {
        match self {
            TypedSlot::Text(s) | TypedSlot::Date(s) | TypedSlot::Url(s) => {
                Value::String(s.clone())
            }
            TypedSlot::Number(n) => Value::from(*n),
            TypedSlot::Boolean(b) => Value::Bool(*b),
            TypedSlot::Json(v) => v.clone(),
        }
    }
}

/// Os slots tipados anuláveis + o espelho genérico `value`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueSlots {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub value_text: Option<String>,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub value_number: Option<f64>,
    #[serde(default)]
    pub value_boolean: Option<bool>,
    #[serde(default)]
    pub value_date: Option<String>,
    #[serde(default)]
    pub value_url: Option<String>,
    #[serde(default)]
    pub value_json: Option<Value>,
}

impl ValueSlots {
    /// Payload vazio canônico: TODOS os slots nulos, inclusive `value`
    pub fn empty() -> Self {
        Self::default()
    }

    /// Preenche exatamente um slot e espelha em `value`
    pub fn single(slot: TypedSlot) -> Self {
        let mut slots = Self {
            value: Some(slot.mirror()),
            ..Self::default()
        };
        match slot {
            TypedSlot::Text(s) => slots.value_text = Some(s),
            TypedSlot::Number(n) => slots.value_number = Some(n),
            TypedSlot::Boolean(b) => slots.value_boolean = Some(b),
            TypedSlot::Date(s) => slots.value_date = Some(s),
            TypedSlot::Url(s) => slots.value_url = Some(s),
            TypedSlot::Json(v) => slots.value_json = Some(v),
        }
        slots
    }

    /// Lê o slot legal para o tipo do campo (os outros são ignorados)
    pub fn slot_for(&self, field_type: &FieldType) -> Option<TypedSlot> {
        match field_type {
            FieldType::Text | FieldType::Choice | FieldType::Unknown(_) => {
                self.value_text.clone().map(TypedSlot::Text)
            }
            FieldType::Number => self.value_number.map(TypedSlot::Number),
            FieldType::Boolean => self.value_boolean.map(TypedSlot::Boolean),
            FieldType::Date => self.value_date.clone().map(TypedSlot::Date),
            FieldType::Url => self.value_url.clone().map(TypedSlot::Url),
            FieldType::Json => self
                .value_json
                .clone()
                .filter(|v| !v.is_null())
                .map(TypedSlot::Json),
        }
    }

    /// Quantidade de slots tipados não-nulos
    pub fn filled_count(&self) -> usize {
        [
            self.value_text.is_some(),
            self.value_number.is_some(),
            self.value_boolean.is_some(),
            self.value_date.is_some(),
            self.value_url.is_some(),
            self.value_json.as_ref().map_or(false, |v| !v.is_null()),
        ]
        .iter()
        .filter(|filled| **filled)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0 && self.value.as_ref().map_or(true, Value::is_null)
    }
}

/// Referência ao campo dono: id simples ou objeto aninhado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldRef {
    Id(FieldId),
    Definition(Box<FieldDefinition>),
}

impl FieldRef {
    pub fn id(&self) -> FieldId {
        match self {
            FieldRef::Id(id) => *id,
            FieldRef::Definition(def) => def.id,
        }
    }

    pub fn definition(&self) -> Option<&FieldDefinition> {
        match self {
            FieldRef::Id(_) => None,
            FieldRef::Definition(def) => Some(def),
        }
    }
}

/// Um valor armazenado de um campo dentro de uma entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRecord {
    #[serde(default)]
    pub id: Option<RecordId>,

    #[serde(alias = "field_id")]
    pub field: FieldRef,

    /// Entry pai (preenchida por [`Entry::link_values`] quando vem aninhado)
    #[serde(default, alias = "entry", skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<EntryId>,

    #[serde(flatten)]
    pub slots: ValueSlots,
}

impl ValueRecord {
    pub fn field_id(&self) -> FieldId {
        self.field.id()
    }
}

/// Agrupamento de valores dentro de um conjunto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub kb_set: SetId,
    #[serde(default)]
    pub values: Vec<ValueRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Registro de valor de um campo, se existir
    pub fn value_for(&self, field_id: FieldId) -> Option<&ValueRecord> {
        self.values.iter().find(|v| v.field_id() == field_id)
    }

    /// Garante o back-reference `entry_id` em todos os valores aninhados
    pub fn link_values(mut self) -> Self {
        for record in &mut self.values {
            if record.entry_id.is_none() {
                record.entry_id = Some(self.id);
            }
        }
        self
    }
}

/// Um valor serializado pronto para envio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePayload {
    pub field_id: FieldId,
    #[serde(flatten)]
    pub slots: ValueSlots,
}

impl ValuePayload {
    /// `true` quando nenhum slot está preenchido (gate de obrigatoriedade)
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Corpo de `POST /entries/` e `PUT /entries/{id}/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRequest {
    pub kb_set: SetId,
    pub values: Vec<ValuePayload>,
}

// Campos decimais podem chegar como string ("3.14")
fn deserialize_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_payload_has_every_key() {
        let payload = ValuePayload {
            field_id: 9,
            slots: ValueSlots::empty(),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "field_id": 9,
                "value": null,
                "value_text": null,
                "value_number": null,
                "value_boolean": null,
                "value_date": null,
                "value_url": null,
                "value_json": null
            })
        );
        assert!(payload.is_empty());
    }

    #[test]
    fn test_single_fills_one_slot_and_mirrors() {
        let slots = ValueSlots::single(TypedSlot::Number(2.5));
        assert_eq!(slots.filled_count(), 1);
        assert_eq!(slots.value, Some(json!(2.5)));
        assert_eq!(slots.value_number, Some(2.5));
        assert_eq!(slots.slot_for(&FieldType::Text), None);
    }

    #[test]
    fn test_record_with_nested_field_and_string_decimal() {
        let record: ValueRecord = serde_json::from_value(json!({
            "id": 11,
            "field": {"id": 4, "name": "Ticket médio", "field_type": "number"},
            "entry": 30,
            "value": "1500.50",
            "value_text": null,
            "value_number": "1500.50"
        }))
        .unwrap();

        assert_eq!(record.field_id(), 4);
        assert_eq!(record.entry_id, Some(30));
        assert_eq!(record.slots.value_number, Some(1500.5));
        assert_eq!(
            record.field.definition().map(|d| d.field_type.clone()),
            Some(FieldType::Number)
        );
    }

    #[test]
    fn test_entry_link_values() {
        let entry: Entry = serde_json::from_value(json!({
            "id": 5,
            "kb_set": 2,
            "values": [
                {"id": 1, "field": 10, "value": "oi", "value_text": "oi"},
                {"id": 2, "field": 11, "value": true, "value_boolean": true}
            ]
        }))
        .unwrap();

        let entry = entry.link_values();
        assert!(entry.values.iter().all(|v| v.entry_id == Some(5)));
        assert_eq!(
            entry.value_for(11).and_then(|v| v.slots.value_boolean),
            Some(true)
        );
        assert!(entry.value_for(99).is_none());
    }
}

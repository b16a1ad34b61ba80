//! Codec de valores das entries
//!
//! Tríade normalize → render → serialize entre o formato do backend
//! ([`ValueRecord`], slots anuláveis) e o valor editável em memória
//! ([`EditableValue`]).
//!
//! Regras:
//! - `normalize` lê SOMENTE o slot do tipo declarado
//! - `serialize` trima strings; vazio/nulo limpa TODOS os slots
//! - `Number` ilegível (NaN) vira nulo, nunca NaN no wire
//! - `Json` é editado como texto JSON compacto; o texto é reparseado no envio

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::control::{parse_bool, DateKind, InputControl, NumberStep, TextKind};
use crate::types::{parse_options, FieldId, FieldType, TypedSlot, ValuePayload, ValueRecord, ValueSlots};

/// Arquivo selecionado ou já armazenado
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    /// URL remota (arquivo já enviado); `None` para arquivo local ainda não enviado
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl FileHandle {
    /// Interpreta a entrada do seletor: URL http(s) ou caminho local
    pub fn from_input(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let is_remote = raw.starts_with("http://") || raw.starts_with("https://");
        let path = raw.split(['?', '#']).next().unwrap_or(raw);
        let name = path
            .trim_end_matches(['/', '\\'])
            .rsplit(['/', '\\'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(raw)
            .to_string();

        Some(Self {
            name,
            url: is_remote.then(|| raw.to_string()),
        })
    }

    /// Referência enviada ao backend (URL quando existir)
    pub fn reference(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.name)
    }
}

/// Valor em edição, antes da serialização
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EditableValue {
    /// Texto livre (text, choice, url, json, date e afins)
    Text(String),
    /// Numérico; `None` = vazio
    Number(Option<f64>),
    Boolean(bool),
    /// Arquivo (somente atributos customizados)
    File(Option<FileHandle>),
}

impl EditableValue {
    /// Valor vazio adequado ao tipo do campo
    pub fn empty_for(field_type: &FieldType) -> Self {
        match field_type {
            FieldType::Number => EditableValue::Number(None),
            FieldType::Boolean => EditableValue::Boolean(false),
            _ => EditableValue::Text(String::new()),
        }
    }

    /// `null`, `undefined` ou string só com espaços
    pub fn is_blank(&self) -> bool {
        match self {
            EditableValue::Text(s) => s.trim().is_empty(),
            EditableValue::Number(n) => n.is_none(),
            EditableValue::Boolean(_) => false,
            EditableValue::File(f) => f.as_ref().map_or(true, |f| f.reference().trim().is_empty()),
        }
    }

    /// Representação textual (para inputs de texto)
    pub fn as_text(&self) -> String {
        match self {
            EditableValue::Text(s) => s.clone(),
            EditableValue::Number(Some(n)) => n.to_string(),
            EditableValue::Number(None) => String::new(),
            EditableValue::Boolean(b) => b.to_string(),
            EditableValue::File(f) => f.as_ref().map(|f| f.reference().to_string()).unwrap_or_default(),
        }
    }

    /// Coerção numérica; NaN/infinito viram `None`
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            EditableValue::Number(n) => *n,
            EditableValue::Text(s) => s.trim().parse::<f64>().ok(),
            EditableValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            EditableValue::File(_) => None,
        };
        n.filter(|n| n.is_finite())
    }

    /// Coerção booleana; texto ilegível vira `None`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EditableValue::Boolean(b) => Some(*b),
            EditableValue::Text(s) => parse_bool(s),
            EditableValue::Number(n) => n.map(|n| n != 0.0),
            EditableValue::File(_) => None,
        }
    }
}

/// Extrai o valor editável de um registro armazenado
///
/// Sem registro (ou com o slot do tipo nulo) retorna o vazio do tipo:
/// `""` para texto, `None` para número, `false` para booleano.
pub fn normalize(record: Option<&ValueRecord>, field_type: &FieldType) -> EditableValue {
    let slot = record.and_then(|r| r.slots.slot_for(field_type));

    match (field_type, slot) {
        (FieldType::Number, Some(TypedSlot::Number(n))) => EditableValue::Number(Some(n)),
        (FieldType::Boolean, Some(TypedSlot::Boolean(b))) => EditableValue::Boolean(b),
        // Sempre JSON compacto: a string "42" vira o texto `"42"`, com aspas
        (FieldType::Json, Some(TypedSlot::Json(v))) => EditableValue::Text(v.to_string()),
        (_, Some(TypedSlot::Text(s)))
        | (_, Some(TypedSlot::Date(s)))
        | (_, Some(TypedSlot::Url(s))) => EditableValue::Text(s),
        _ => EditableValue::empty_for(field_type),
    }
}

/// Escolhe o controle de entrada para o tipo do campo
///
/// Tipos desconhecidos degradam para um placeholder desabilitado.
pub fn render(
    field_type: &FieldType,
    current: &EditableValue,
    required: bool,
    options: Option<&str>,
) -> InputControl {
    match field_type {
        FieldType::Text => InputControl::TextArea {
            value: current.as_text(),
            required,
        },
        FieldType::Url => InputControl::TextInput {
            kind: TextKind::Url,
            value: current.as_text(),
            required,
        },
        FieldType::Json => InputControl::TextInput {
            kind: TextKind::Json,
            value: current.as_text(),
            required,
        },
        FieldType::Number => InputControl::NumberInput {
            step: NumberStep::Decimal,
            value: current.as_number(),
            required,
        },
        FieldType::Boolean => InputControl::BooleanSelect {
            value: current.as_bool().unwrap_or(false),
            required,
        },
        FieldType::Date => InputControl::DatePicker {
            kind: DateKind::Date,
            value: current.as_text(),
            required,
        },
        FieldType::Choice => InputControl::select(
            parse_options(options.unwrap_or_default()),
            current.as_text().trim().to_string(),
            required,
        ),
        FieldType::Unknown(tag) => {
            tracing::debug!("Tipo de campo não suportado no render: '{}'", tag);
            InputControl::Unsupported {
                type_name: tag.clone(),
            }
        }
    }
}

/// Serializa o valor editável no formato polimórfico do backend
pub fn serialize(field_id: FieldId, field_type: &FieldType, value: &EditableValue) -> ValuePayload {
    let slots = match typed_slot(field_type, value) {
        Some(slot) => ValueSlots::single(slot),
        None => ValueSlots::empty(),
    };
    ValuePayload { field_id, slots }
}

// Um slot para o tipo, ou None para o payload vazio canônico
fn typed_slot(field_type: &FieldType, value: &EditableValue) -> Option<TypedSlot> {
    if value.is_blank() {
        return None;
    }

    let text = value.as_text().trim().to_string();

    match field_type {
        FieldType::Number => value.as_number().map(TypedSlot::Number),
        FieldType::Boolean => value.as_bool().map(TypedSlot::Boolean),
        FieldType::Date => Some(TypedSlot::Date(text)),
        FieldType::Url => Some(TypedSlot::Url(text)),
        FieldType::Json => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Null) => None,
            Ok(parsed) => Some(TypedSlot::Json(parsed)),
            Err(_) => Some(TypedSlot::Json(Value::String(text))),
        },
        FieldType::Text | FieldType::Choice | FieldType::Unknown(_) => Some(TypedSlot::Text(text)),
    }
}

//! Codec dos atributos customizados (negócios, presets)
//!
//! Variante independente do codec das entries: usa [`AttributeType`] e grava
//! os valores num mapa `chave → valor JSON` em vez dos slots tipados.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::codec::{EditableValue, FileHandle};
use crate::control::{DateKind, InputControl, NumberStep, TextKind};
use crate::types::{parse_options, AttributeDefinition, AttributeType};

/// Problema de validação de um atributo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeIssue {
    pub key: String,
    pub name: String,
    pub message: String,
}

/// Extrai o valor editável de um valor de atributo armazenado
pub fn normalize_attribute(stored: Option<&Value>, attribute_type: &AttributeType) -> EditableValue {
    let stored = stored.filter(|v| !v.is_null());

    match attribute_type {
        AttributeType::Integer | AttributeType::Float => EditableValue::Number(stored.and_then(|v| {
            match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
        })),
        AttributeType::Boolean => EditableValue::Boolean(match stored {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => crate::control::parse_bool(s).unwrap_or(false),
            _ => false,
        }),
        AttributeType::File => EditableValue::File(stored.and_then(file_from_value)),
        _ => EditableValue::Text(match stored {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }),
    }
}

fn file_from_value(value: &Value) -> Option<FileHandle> {
    match value {
        Value::String(s) => FileHandle::from_input(s),
        Value::Object(obj) => {
            let url = obj.get("url").and_then(Value::as_str).map(str::to_string);
            let name = obj
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| url.as_deref().and_then(FileHandle::from_input).map(|f| f.name))?;
            Some(FileHandle { name, url })
        }
        _ => None,
    }
}

/// Escolhe o controle para um atributo customizado
pub fn render_attribute(
    attribute_type: &AttributeType,
    current: &EditableValue,
    required: bool,
    options: Option<&str>,
) -> InputControl {
    let date_picker = |kind| InputControl::DatePicker {
        kind,
        value: current.as_text(),
        required,
    };

    match attribute_type {
        AttributeType::String => {
            let options = parse_options(options.unwrap_or_default());
            if options.is_empty() {
                InputControl::TextInput {
                    kind: TextKind::Plain,
                    value: current.as_text(),
                    required,
                }
            } else {
                InputControl::select(options, current.as_text(), required)
            }
        }
        AttributeType::Text => InputControl::TextArea {
            value: current.as_text(),
            required,
        },
        AttributeType::Integer => InputControl::NumberInput {
            step: NumberStep::Integer,
            value: current.as_number(),
            required,
        },
        AttributeType::Float => InputControl::NumberInput {
            step: NumberStep::Decimal,
            value: current.as_number(),
            required,
        },
        AttributeType::Boolean => InputControl::BooleanSelect {
            value: current.as_bool().unwrap_or(false),
            required,
        },
        AttributeType::Date => date_picker(DateKind::Date),
        AttributeType::DateTime => date_picker(DateKind::DateTime),
        AttributeType::Time => date_picker(DateKind::Time),
        AttributeType::File => InputControl::FilePicker {
            current: match current {
                EditableValue::File(f) => f.clone(),
                _ => None,
            },
            required,
        },
        AttributeType::Unknown(tag) => InputControl::Unsupported {
            type_name: tag.clone(),
        },
    }
}

/// Serializa um atributo; vazio ou ilegível vira `null`
pub fn serialize_attribute(attribute_type: &AttributeType, value: &EditableValue) -> Value {
    if value.is_blank() {
        return Value::Null;
    }

    let text = value.as_text().trim().to_string();

    match attribute_type {
        AttributeType::String | AttributeType::Text | AttributeType::Unknown(_) => {
            Value::String(text)
        }
        AttributeType::Integer => match text.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => value
                .as_number()
                .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
                .map(|n| Value::from(n as i64))
                .unwrap_or(Value::Null),
        },
        AttributeType::Float => value.as_number().map(Value::from).unwrap_or(Value::Null),
        AttributeType::Boolean => value.as_bool().map(Value::Bool).unwrap_or(Value::Null),
        AttributeType::Date => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        AttributeType::DateTime => parse_datetime(&text).map(Value::String).unwrap_or(Value::Null),
        AttributeType::Time => ["%H:%M:%S", "%H:%M"]
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(&text, fmt).ok())
            .map(|t| Value::String(t.format("%H:%M:%S").to_string()))
            .unwrap_or(Value::Null),
        AttributeType::File => match value {
            EditableValue::File(Some(f)) => Value::String(f.reference().to_string()),
            _ => Value::String(text),
        },
    }
}

fn parse_datetime(text: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.to_rfc3339());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// Serializa todos os atributos e valida obrigatoriedade
///
/// Atributos sem valor no mapa contam como vazios. Retorna o mapa pronto para
/// envio ou a lista de problemas (um por atributo obrigatório vazio).
pub fn serialize_attributes(
    definitions: &[AttributeDefinition],
    values: &HashMap<String, EditableValue>,
) -> Result<Map<String, Value>, Vec<AttributeIssue>> {
    let mut out = Map::new();
    let mut issues = Vec::new();

    for def in definitions {
        let key = def.key();
        let serialized = values
            .get(key)
            .map(|v| serialize_attribute(&def.attribute_type, v))
            .unwrap_or(Value::Null);

        if def.required && serialized.is_null() {
            tracing::warn!("Atributo obrigatório vazio: '{}'", key);
            issues.push(AttributeIssue {
                key: key.to_string(),
                name: def.name.clone(),
                message: format!("O campo \"{}\" é obrigatório", def.name),
            });
        }

        out.insert(key.to_string(), serialized);
    }

    if issues.is_empty() {
        Ok(out)
    } else {
        Err(issues)
    }
}

/// Apenas valida obrigatoriedade, sem montar o mapa
pub fn validate_attributes(
    definitions: &[AttributeDefinition],
    values: &HashMap<String, EditableValue>,
) -> Result<(), Vec<AttributeIssue>> {
    serialize_attributes(definitions, values).map(|_| ())
}

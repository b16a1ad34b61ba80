//! Esquema dos campos configuráveis
//!
//! As definições são criadas e alteradas apenas pelo backend; a UI só lê,
//! exceto pelo fluxo de criação ([`NewFieldRequest`]).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::field_type::{AttributeType, FieldType};
use super::{FieldId, SetId};

/// Definição de um campo da base de conhecimento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: FieldId,

    /// Conjunto dono do campo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_set: Option<SetId>,

    /// Rótulo exibido (não vazio)
    pub name: String,

    /// Tipo declarado (`field_type` ou `type` no wire)
    #[serde(rename = "field_type", alias = "type")]
    pub field_type: FieldType,

    /// Obrigatoriedade, verificada só no envio
    #[serde(default)]
    pub required: bool,

    /// Opções de `Choice`, separadas por vírgula ou ponto-e-vírgula
    #[serde(
        default,
        deserialize_with = "deserialize_options",
        skip_serializing_if = "Option::is_none"
    )]
    pub options: Option<String>,
}

impl FieldDefinition {
    /// Opções permitidas (vazio para tipos que não são `Choice`)
    pub fn choice_options(&self) -> Vec<String> {
        match self.field_type {
            FieldType::Choice => parse_options(self.options.as_deref().unwrap_or_default()),
            _ => Vec::new(),
        }
    }
}

/// Definição de um atributo customizado (negócios, presets)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FieldId>,

    /// Chave usada no mapa de valores (cai para `name` se ausente)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    pub name: String,

    #[serde(rename = "attribute_type", alias = "type")]
    pub attribute_type: AttributeType,

    #[serde(default)]
    pub required: bool,

    #[serde(
        default,
        deserialize_with = "deserialize_options",
        skip_serializing_if = "Option::is_none"
    )]
    pub options: Option<String>,
}

impl AttributeDefinition {
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }
}

/// Corpo do `POST /fields/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFieldRequest {
    pub kb_set: SetId,
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

/// Quebra uma lista de opções delimitada por `,` ou `;`
///
/// Itens são trimados e vazios descartados; a ordem é preservada.
pub fn parse_options(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// Aceita string delimitada, array de strings ou null
fn deserialize_options<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_options_mixed_delimiters() {
        assert_eq!(
            parse_options("bronze, silver;gold ,, "),
            vec!["bronze", "silver", "gold"]
        );
        assert!(parse_options("  ").is_empty());
    }

    #[test]
    fn test_field_definition_accepts_type_alias() {
        let field: FieldDefinition = serde_json::from_value(json!({
            "id": 7,
            "name": "Plano",
            "type": "choice",
            "required": true,
            "options": "bronze, silver, gold"
        }))
        .unwrap();

        assert_eq!(field.field_type, FieldType::Choice);
        assert_eq!(field.choice_options(), vec!["bronze", "silver", "gold"]);
        assert_eq!(field.kb_set, None);
    }

    #[test]
    fn test_options_as_array() {
        let field: FieldDefinition = serde_json::from_value(json!({
            "id": 1,
            "kb_set": 3,
            "name": "Canal",
            "field_type": "choice",
            "options": ["whatsapp", "email"]
        }))
        .unwrap();

        assert_eq!(field.options.as_deref(), Some("whatsapp, email"));
        assert!(!field.required);
    }

    #[test]
    fn test_choice_options_only_for_choice() {
        let field = FieldDefinition {
            id: 1,
            kb_set: Some(1),
            name: "Obs".to_string(),
            field_type: FieldType::Text,
            required: false,
            options: Some("a,b".to_string()),
        };
        assert!(field.choice_options().is_empty());
    }

    #[test]
    fn test_new_field_request_omits_empty_options() {
        let body = serde_json::to_value(NewFieldRequest {
            kb_set: 2,
            name: "Site".to_string(),
            field_type: FieldType::Url,
            required: false,
            options: None,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({"kb_set": 2, "name": "Site", "field_type": "url", "required": false})
        );
    }

    #[test]
    fn test_attribute_key_falls_back_to_name() {
        let attr: AttributeDefinition = serde_json::from_value(json!({
            "name": "valor_estimado",
            "type": "float"
        }))
        .unwrap();
        assert_eq!(attr.key(), "valor_estimado");
        assert_eq!(attr.attribute_type, AttributeType::Float);
    }
}

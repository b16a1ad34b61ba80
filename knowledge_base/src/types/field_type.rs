//! Enumerações de tipo de campo
//!
//! Existem DUAS enumerações fechadas e independentes:
//!
//! - [`FieldType`]: campos das entries da base de conhecimento
//!   (`text`, `number`, `boolean`, `date`, `url`, `json`, `choice`)
//! - [`AttributeType`]: atributos customizados de negócios/presets
//!   (`string`, `text`, `integer`, `float`, `boolean`, `date`, `datetime`, `time`, `file`)
//!
//! Tags desconhecidas viram `Unknown(tag)` em vez de falhar a desserialização:
//! tipos novos do backend degradam para um placeholder desabilitado.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Tipo declarado de um campo da base de conhecimento
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Number,
    Boolean,
    Date,
    Url,
    Json,
    Choice,
    /// Tag não reconhecida (preservada para exibição)
    Unknown(String),
}

impl FieldType {
    /// Todos os tipos conhecidos, na ordem exibida no formulário de criação
    pub const KNOWN: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Date,
        FieldType::Url,
        FieldType::Json,
        FieldType::Choice,
    ];

    /// Converte a tag do wire (case-insensitive)
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "text" => FieldType::Text,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            "url" => FieldType::Url,
            "json" => FieldType::Json,
            "choice" => FieldType::Choice,
            _ => FieldType::Unknown(tag.to_string()),
        }
    }

    /// Tag usada no wire
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Url => "url",
            FieldType::Json => "json",
            FieldType::Choice => "choice",
            FieldType::Unknown(tag) => tag,
        }
    }

    /// Rótulo legível
    pub fn label(&self) -> &str {
        match self {
            FieldType::Text => "Texto",
            FieldType::Number => "Número",
            FieldType::Boolean => "Sim/Não",
            FieldType::Date => "Data",
            FieldType::Url => "URL",
            FieldType::Json => "JSON",
            FieldType::Choice => "Escolha",
            FieldType::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(FieldType::from_tag(&tag))
    }
}

/// Tipo declarado de um atributo customizado
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeType {
    String,
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Time,
    File,
    /// Tag não reconhecida (preservada para exibição)
    Unknown(String),
}

impl AttributeType {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "string" => AttributeType::String,
            "text" => AttributeType::Text,
            "integer" => AttributeType::Integer,
            "float" => AttributeType::Float,
            "boolean" => AttributeType::Boolean,
            "date" => AttributeType::Date,
            "datetime" => AttributeType::DateTime,
            "time" => AttributeType::Time,
            "file" => AttributeType::File,
            _ => AttributeType::Unknown(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AttributeType::String => "string",
            AttributeType::Text => "text",
            AttributeType::Integer => "integer",
            AttributeType::Float => "float",
            AttributeType::Boolean => "boolean",
            AttributeType::Date => "date",
            AttributeType::DateTime => "datetime",
            AttributeType::Time => "time",
            AttributeType::File => "file",
            AttributeType::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for AttributeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AttributeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(AttributeType::from_tag(&tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_tags() {
        for t in FieldType::KNOWN.iter() {
            assert_eq!(&FieldType::from_tag(t.as_str()), t);
        }
        assert_eq!(FieldType::from_tag("CHOICE"), FieldType::Choice);
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let t: FieldType = serde_json::from_str("\"geo_point\"").unwrap();
        assert_eq!(t, FieldType::Unknown("geo_point".to_string()));
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"geo_point\"");
        assert!(!FieldType::KNOWN.contains(&t));
    }

    #[test]
    fn test_enumerations_stay_distinct() {
        // "text" existe nas duas, mas "string" e "float" só nos atributos
        assert_eq!(AttributeType::from_tag("text"), AttributeType::Text);
        assert_eq!(
            FieldType::from_tag("string"),
            FieldType::Unknown("string".to_string())
        );
        assert_eq!(AttributeType::from_tag("datetime"), AttributeType::DateTime);
        assert_eq!(
            AttributeType::from_tag("choice"),
            AttributeType::Unknown("choice".to_string())
        );
    }
}

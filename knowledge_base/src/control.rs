//! Controles de entrada renderizados
//!
//! `render` não desenha nada: devolve um [`InputControl`] descrevendo o
//! controle adequado ao tipo do campo (tipo de input, passo numérico, opções).
//! A conversão de entrada bruta do usuário em [`EditableValue`] (o "onChange")
//! fica em [`InputControl::accept`].

use serde::{Deserialize, Serialize};

use crate::codec::{EditableValue, FileHandle};

/// Sentinela "não selecionado" dos dropdowns
pub const BLANK_OPTION_LABEL: &str = "Selecione...";

/// Variante de input de texto de linha única
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    Plain,
    Url,
    Json,
}

/// Passo do input numérico
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberStep {
    /// step = 1
    Integer,
    /// step = 0.01
    Decimal,
}

impl NumberStep {
    pub fn value(&self) -> f64 {
        match self {
            NumberStep::Integer => 1.0,
            NumberStep::Decimal => 0.01,
        }
    }
}

/// Sub-tipo do seletor de data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateKind {
    Date,
    DateTime,
    Time,
}

/// Uma opção de dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    /// Opção em branco, sempre a primeira da lista
    pub fn blank() -> Self {
        Self {
            value: String::new(),
            label: BLANK_OPTION_LABEL.to_string(),
        }
    }

    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.value.is_empty()
    }
}

/// Controle de entrada escolhido para um campo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum InputControl {
    TextArea {
        value: String,
        required: bool,
    },
    TextInput {
        kind: TextKind,
        value: String,
        required: bool,
    },
    NumberInput {
        step: NumberStep,
        value: Option<f64>,
        required: bool,
    },
    BooleanSelect {
        value: bool,
        required: bool,
    },
    DatePicker {
        kind: DateKind,
        value: String,
        required: bool,
    },
    Select {
        /// Primeira opção é sempre a sentinela em branco
        options: Vec<SelectOption>,
        value: String,
        required: bool,
    },
    FilePicker {
        current: Option<FileHandle>,
        required: bool,
    },
    /// Placeholder desabilitado para tipos não suportados
    Unsupported { type_name: String },
}

impl InputControl {
    /// Dropdown com a sentinela em branco na frente
    pub fn select(options: Vec<String>, value: String, required: bool) -> Self {
        let options = std::iter::once(SelectOption::blank())
            .chain(options.into_iter().map(SelectOption::new))
            .collect();
        InputControl::Select {
            options,
            value,
            required,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, InputControl::Unsupported { .. })
    }

    pub fn is_required(&self) -> bool {
        match self {
            InputControl::TextArea { required, .. }
            | InputControl::TextInput { required, .. }
            | InputControl::NumberInput { required, .. }
            | InputControl::BooleanSelect { required, .. }
            | InputControl::DatePicker { required, .. }
            | InputControl::Select { required, .. }
            | InputControl::FilePicker { required, .. } => *required,
            InputControl::Unsupported { .. } => false,
        }
    }

    /// Texto exibido pelo placeholder desabilitado
    pub fn placeholder_text(&self) -> Option<String> {
        match self {
            InputControl::Unsupported { type_name } => {
                Some(format!("Tipo de campo não suportado: {}", type_name))
            }
            _ => None,
        }
    }

    /// Valores não-sentinela de um dropdown
    pub fn option_values(&self) -> Vec<&str> {
        match self {
            InputControl::Select { options, .. } => options
                .iter()
                .filter(|o| !o.is_blank())
                .map(|o| o.value.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Converte entrada bruta do usuário no valor editável do controle
    ///
    /// Retorna `None` quando o controle rejeita a entrada (placeholder
    /// desabilitado, opção inexistente, booleano ilegível).
    pub fn accept(&self, raw: &str) -> Option<EditableValue> {
        match self {
            InputControl::TextArea { .. }
            | InputControl::TextInput { .. }
            | InputControl::DatePicker { .. } => Some(EditableValue::Text(raw.to_string())),
            InputControl::NumberInput { .. } => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Some(EditableValue::Number(None));
                }
                // Texto ilegível é mantido; o serializer coage para nulo
                Some(match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => EditableValue::Number(Some(n)),
                    _ => EditableValue::Text(raw.to_string()),
                })
            }
            InputControl::BooleanSelect { .. } => parse_bool(raw).map(EditableValue::Boolean),
            InputControl::Select { options, .. } => {
                let choice = raw.trim();
                options
                    .iter()
                    .find(|o| o.value == choice)
                    .map(|o| EditableValue::Text(o.value.clone()))
            }
            InputControl::FilePicker { .. } => {
                Some(EditableValue::File(FileHandle::from_input(raw)))
            }
            InputControl::Unsupported { .. } => None,
        }
    }
}

/// Interpretação de texto booleano (aceita pt-BR)
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "sim" | "s" | "yes" => Some(true),
        "false" | "0" | "não" | "nao" | "n" | "no" => Some(false),
        _ => None,
    }
}

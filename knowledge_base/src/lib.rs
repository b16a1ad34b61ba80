//! Campos tipados da base de conhecimento do CRM
//!
//! Este crate fornece uma interface tipo-segura para os campos configuráveis
//! da base de conhecimento e para a API REST que os persiste:
//!
//! - Esquema de campos (duas enumerações de tipo independentes)
//! - Codec de valores: normalize → render → serialize
//! - Envio de valores (create/update de entries) com gate de obrigatoriedade
//! - Criação de campos com tradução de conflito de nome
//! - Classificação de preview de arquivos
//! - Escopo de cancelamento e polling periódico
//!
//! # Endpoints
//!
//! - **Fields**: `GET /fields/?kb_set={id}`, `POST /fields/`, `DELETE /fields/{id}/`
//! - **Entries**: `GET /entries/?kb_set={id}`, `POST /entries/`, `PUT /entries/{id}/`,
//!   `DELETE /entries/{id}/`
//!
//! # Exemplo Básico
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use knowledge_base::{EnvTokenProvider, EntryEditor, KnowledgeBaseClient};
//!
//! #[tokio::main]
//! async fn main() -> knowledge_base::Result<()> {
//!     let client = KnowledgeBaseClient::new(
//!         "http://localhost:8000/api/knowledge-base",
//!         Arc::new(EnvTokenProvider::default()),
//!     )?;
//!
//!     let fields = client.list_fields(1).await?;
//!     let mut editor = EntryEditor::open(1, fields[0].clone(), None);
//!     editor.set_raw("gold");
//!     editor.submit(&client, |entry| println!("salvo: {}", entry.id)).await?;
//!     Ok(())
//! }
//! ```

// Módulos públicos
pub mod attributes;
pub mod auth;
pub mod client;
pub mod codec;
pub mod control;
pub mod error;
pub mod fields;
pub mod preview;
pub mod scope;
pub mod submission;
pub mod types;

// Re-exports principais
pub use auth::{EnvTokenProvider, StaticTokenProvider, TokenProvider};
pub use client::KnowledgeBaseClient;
pub use codec::{normalize, render, serialize, EditableValue, FileHandle};
pub use control::InputControl;
pub use error::{KbError, Result};
pub use fields::FieldForm;
pub use preview::{classify_extension, FilePreview, PreviewKind};
pub use scope::{spawn_polling, ViewScope};
pub use submission::{submit_value, user_message, EntryEditor, SubmitGate};

// Re-exports de types para conveniência
pub use types::{
    AttributeDefinition, AttributeType, Entry, EntryRequest, FieldDefinition, FieldType,
    NewFieldRequest, ValuePayload, ValueRecord, ValueSlots,
};

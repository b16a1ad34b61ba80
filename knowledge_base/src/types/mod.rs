//! Tipos da API da base de conhecimento
//!
//! Este módulo contém as estruturas type-safe trocadas com o backend:
//!
//! - **FieldType / AttributeType**: as duas enumerações de tipo (independentes!)
//! - **FieldDefinition / AttributeDefinition**: esquema dos campos configuráveis
//! - **ValueSlots**: os slots tipados anuláveis do contrato de wire
//! - **ValueRecord / Entry**: valores armazenados e o agrupamento pai
//! - **ValuePayload / EntryRequest / NewFieldRequest**: corpos de requisição
//!
//! ## ⚠️ Notas Importantes
//!
//! - **Slots**: no máximo UM slot tipado não-nulo por registro, escolhido pelo tipo do campo
//! - **Valor vazio**: limpa TODOS os slots, não só o relevante
//! - **FieldType ≠ AttributeType**: nomes parecidos, regras de render/validação diferentes

pub mod field;
pub mod field_type;
pub mod value;

/// Identificador de um conjunto da base de conhecimento (`kb_set`)
pub type SetId = i64;
/// Identificador de uma definição de campo
pub type FieldId = i64;
/// Identificador de uma entry
pub type EntryId = i64;
/// Identificador de um registro de valor
pub type RecordId = i64;

// Re-exports principais para facilitar uso
pub use field::{parse_options, AttributeDefinition, FieldDefinition, NewFieldRequest};
pub use field_type::{AttributeType, FieldType};
pub use value::{Entry, EntryRequest, FieldRef, TypedSlot, ValuePayload, ValueRecord, ValueSlots};

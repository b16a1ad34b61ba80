// Biblioteca da CLI da base de conhecimento do CRM
// Expõe módulos para uso em testes e no binário

pub mod config;
pub mod services;
pub mod utils;

pub use knowledge_base;

pub mod anexo;
pub mod auth;
pub mod catalogo;
pub mod historico;
pub mod requerimento;
pub mod timestamp;

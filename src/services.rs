// src/services.rs

pub mod auth;
pub mod dashboard;
pub mod historico;
pub mod requerimento_form;
pub mod revisao;
pub mod token;

#[cfg(test)]
pub(crate) mod fake;

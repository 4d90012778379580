// src/models/catalogo.rs

use serde::{Deserialize, Serialize};

// Listas de referência vindas do backend

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finalidade {
    pub id: i64,
    pub descricao: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curso {
    pub id: i64,
    pub nome: String,
}

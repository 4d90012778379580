// src/models/auth.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Interpreta a claim `role`. Qualquer valor diferente de ADMIN é tratado como USER.
    pub fn from_claim(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("ADMIN") {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

// Perfil mínimo guardado junto do token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

// Conteúdo persistido do arquivo de sessão (mesmas chaves do armazenamento do navegador)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub auth_token: String,
    pub user: User,
}

// Dados para login
#[derive(Debug, Serialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Usuário é obrigatório"))]
    pub login: String,
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub role: Option<String>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 1, message = "Usuário é obrigatório"))]
    pub login: String,
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub password: String,
    #[validate(
        length(min = 1, message = "E-mail é obrigatório"),
        email(message = "E-mail inválido")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "CPF é obrigatório"))]
    pub cpf: String,
    #[validate(required(message = "Selecione um curso"))]
    pub curso_id: Option<i64>,
}

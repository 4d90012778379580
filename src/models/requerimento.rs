// src/models/requerimento.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::{anexo::UploadFile, timestamp};

// --- Situação ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Situacao {
    Pendente,
    Deferido,
    Indeferido,
    // Valor ausente ou desconhecido: mostrado em cinza, nunca vira erro
    #[default]
    Desconhecido,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Yellow,
    Green,
    Red,
    Gray,
}

impl Situacao {
    pub fn from_api(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDENTE" => Situacao::Pendente,
            "DEFERIDO" => Situacao::Deferido,
            "INDEFERIDO" => Situacao::Indeferido,
            _ => Situacao::Desconhecido,
        }
    }

    pub fn as_api(&self) -> Option<&'static str> {
        match self {
            Situacao::Pendente => Some("PENDENTE"),
            Situacao::Deferido => Some("DEFERIDO"),
            Situacao::Indeferido => Some("INDEFERIDO"),
            Situacao::Desconhecido => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Situacao::Pendente => "Pendente",
            Situacao::Deferido => "Deferido",
            Situacao::Indeferido => "Indeferido",
            Situacao::Desconhecido => "Desconhecido",
        }
    }

    pub fn color(&self) -> StatusColor {
        match self {
            Situacao::Pendente => StatusColor::Yellow,
            Situacao::Deferido => StatusColor::Green,
            Situacao::Indeferido => StatusColor::Red,
            Situacao::Desconhecido => StatusColor::Gray,
        }
    }
}

impl<'de> Deserialize<'de> for Situacao {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Qualquer coisa que não seja texto vira `Desconhecido`
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .map(Situacao::from_api)
            .unwrap_or_default())
    }
}

impl Serialize for Situacao {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_api() {
            Some(value) => serializer.serialize_str(value),
            None => serializer.serialize_none(),
        }
    }
}

/// Código aceito pelo endpoint de mudança de situação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SituacaoCode {
    Deferir,
    Indeferir,
}

impl SituacaoCode {
    pub fn as_code(&self) -> &'static str {
        match self {
            SituacaoCode::Deferir => "D",
            SituacaoCode::Indeferir => "I",
        }
    }

    pub fn target(&self) -> Situacao {
        match self {
            SituacaoCode::Deferir => Situacao::Deferido,
            SituacaoCode::Indeferir => Situacao::Indeferido,
        }
    }
}

// --- Requerimento ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requerimento {
    pub id: i64,
    #[serde(default)]
    pub nome_usuario: Option<String>,
    #[serde(default, alias = "curso")]
    pub nome_curso: Option<String>,
    // Descrição da finalidade, como o backend devolve
    #[serde(default)]
    pub finalidade: Option<String>,
    #[serde(default, alias = "justificativa")]
    pub descricao: Option<String>,
    #[serde(default)]
    pub situacao: Situacao,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub data_criacao: Option<NaiveDateTime>,
    #[serde(default, alias = "dataAlteracao", deserialize_with = "timestamp::lenient")]
    pub data_modificacao: Option<NaiveDateTime>,
    #[serde(default, alias = "qtdAnexos")]
    pub quantidade_anexos: Option<u32>,
}

impl Requerimento {
    /// Busca textual simples usada pelo filtro do painel.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [&self.nome_usuario, &self.nome_curso, &self.finalidade]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

// --- Envio (multipart) ---

// Corpo do POST `requerimentos`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovoRequerimento {
    pub finalidade_id: i64,
    pub justificativa: String,
    pub files: Vec<UploadFile>,
}

// Corpo do PUT `requerimentos/{id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtualizacaoRequerimento {
    pub finalidade_id: i64,
    pub justificativa: String,
    // Ids dos anexos existentes que sobrevivem à edição
    pub manter_anexos: Vec<i64>,
    pub files: Vec<UploadFile>,
}

impl AtualizacaoRequerimento {
    /// Valor do campo `manterAnexos`; ausente quando nenhum anexo é mantido.
    pub fn manter_anexos_field(&self) -> Option<String> {
        if self.manter_anexos.is_empty() {
            return None;
        }
        Some(
            self.manter_anexos
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

// --- Paginação ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
            total_elements: 0,
            number: None,
            size: None,
        }
    }
}

impl<T> Page<T> {
    /// Embrulha uma lista sem paginação como página única.
    pub fn single(content: Vec<T>) -> Self {
        let total_elements = content.len() as u64;
        Self {
            total_pages: if content.is_empty() { 0 } else { 1 },
            total_elements,
            number: Some(0),
            size: Some(content.len() as u32),
            content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
    pub year: Option<i32>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 0, size: 10, year: None }
    }
}

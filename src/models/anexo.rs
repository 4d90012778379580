// src/models/anexo.rs

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::common::error::AppError;

// Limites de anexos por requerimento
pub const MAX_ANEXOS: usize = 10;
pub const MAX_TAMANHO_ANEXO: u64 = 100 * 1024 * 1024;
// Na edição o teto por arquivo é menor
pub const MAX_TAMANHO_ANEXO_EDICAO: u64 = 10 * 1024 * 1024;

// Arquivo já enviado, ligado a um requerimento ou a um registro do histórico
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anexo {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub extensao: Option<String>,
    #[serde(default)]
    pub tamanho: u64,
    #[serde(default)]
    pub requerimento_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
    Document,
    Spreadsheet,
    Other,
}

impl FileKind {
    pub fn from_extension(extension: &str) -> Self {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => FileKind::Pdf,
            "jpg" | "jpeg" | "png" => FileKind::Image,
            "doc" | "docx" => FileKind::Document,
            "xls" | "xlsx" => FileKind::Spreadsheet,
            _ => FileKind::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Pdf => "PDF",
            FileKind::Image => "imagem",
            FileKind::Document => "documento",
            FileKind::Spreadsheet => "planilha",
            FileKind::Other => "arquivo",
        }
    }
}

impl Anexo {
    pub fn kind(&self) -> FileKind {
        let extension = self
            .extensao
            .as_deref()
            .or_else(|| Path::new(&self.nome).extension().and_then(|e| e.to_str()))
            .unwrap_or_default();
        FileKind::from_extension(extension)
    }

    /// Tamanho em KB com duas casas, como na tela de revisão.
    pub fn tamanho_kb(&self) -> String {
        format!("{:.2} KB", self.tamanho as f64 / 1024.0)
    }
}

// Arquivo local aguardando envio em um formulário multipart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("arquivo")
            .to_string();

        Ok(Self { name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

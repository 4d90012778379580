// src/common/error.rs

use thiserror::Error;

// Erros do cliente. Todos viram uma mensagem legível para o usuário,
// nenhum deles derruba o processo: a ação pode ser repetida.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Falha de comunicação com o servidor: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Erro {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Sessão expirada ou inválida")]
    Unauthorized { body: String },

    #[error("Resposta inesperada do servidor: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("Token de autenticação não encontrado")]
    MissingToken,

    #[error("Token inválido")]
    MalformedToken,

    #[error("Não foi possível extrair o ID do usuário do token")]
    MissingUserId,

    #[error("URL base da API inválida: {0}")]
    InvalidBaseUrl(String),

    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("É preciso declarar que as informações prestadas são verdadeiras")]
    DeclarationRequired,

    #[error("Limite de {max} arquivos por requerimento atingido")]
    TooManyFiles { max: usize },

    #[error("O arquivo '{name}' excede o tamanho máximo de {max_bytes} bytes")]
    FileTooLarge { name: String, max_bytes: u64 },

    #[error("Finalidade não encontrada: {0}")]
    UnknownFinalidade(String),

    #[error("Curso não encontrado: {0}")]
    UnknownCurso(i64),

    #[error("Anexo não encontrado: {0}")]
    UnknownAnexo(i64),

    #[error("Registro de histórico não encontrado: {0}")]
    UnknownLog(i64),

    #[error("Erro ao acessar o arquivo de sessão: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Arquivo de sessão corrompido: {0}")]
    SessionFile(serde_json::Error),
}

impl AppError {
    /// Mensagem mostrada ao usuário, no lugar do estado de erro das telas.
    pub fn user_message(&self) -> String {
        match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
                fields.sort_by(|a, b| a.0.cmp(&b.0));

                let details: Vec<String> = fields
                    .into_iter()
                    .flat_map(|(field, field_errors)| {
                        field_errors.iter().map(move |e| match &e.message {
                            Some(message) => format!("{}: {}", field, message),
                            None => format!("{}: {}", field, e.code),
                        })
                    })
                    .collect();

                format!("Um ou mais campos são inválidos. {}", details.join("; "))
            }
            AppError::Unauthorized { .. } => {
                "Sessão expirada ou inválida. Faça login novamente.".to_string()
            }
            AppError::Http { status, body } if body.trim().is_empty() => {
                format!("Erro {}", status)
            }
            e => e.to_string(),
        }
    }

    /// Verdadeiro para erros detectados localmente, antes de qualquer chamada à API.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            AppError::ValidationError(_)
                | AppError::DeclarationRequired
                | AppError::TooManyFiles { .. }
                | AppError::FileTooLarge { .. }
                | AppError::UnknownFinalidade(_)
                | AppError::UnknownCurso(_)
                | AppError::UnknownAnexo(_)
        )
    }
}

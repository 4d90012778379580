// src/storage/token_store.rs

use std::{
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::Mutex,
};

use crate::{common::error::AppError, models::auth::StoredSession};

/// Persistência do token e do perfil do usuário entre execuções.
///
/// O token é relido a cada chamada à API; nada fica em cache fora daqui.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredSession>, AppError>;
    fn save(&self, session: &StoredSession) -> Result<(), AppError>;
    fn clear(&self) -> Result<(), AppError>;

    fn token(&self) -> Option<String> {
        match self.load() {
            Ok(session) => session.map(|s| s.auth_token),
            Err(e) => {
                tracing::warn!("Falha ao ler a sessão salva: {}", e);
                None
            }
        }
    }
}

// Arquivo JSON com as chaves `authToken` e `user`
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, AppError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(AppError::SessionFile)
    }

    fn save(&self, session: &StoredSession) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let body = serde_json::to_string_pretty(session).map_err(AppError::SessionFile)?;
        fs::write(&self.path, body)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// Usado nos testes e em sessões que não devem sobreviver ao processo
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self { session: Mutex::new(Some(session)) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, AppError> {
        Ok(self.session.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), AppError> {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

// src/services/auth.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    api::RequerimentoGateway,
    common::error::AppError,
    models::auth::{LoginPayload, RegisterPayload, Role, StoredSession, User},
    services::token::{TokenClaims, decode_claims, looks_like_jwt, role_from_token},
    storage::TokenStore,
};

/// Sessão do usuário: token + perfil mínimo, guardados no `TokenStore`.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    /// Abre a sessão restaurando o que estiver persistido.
    pub fn open(store: Arc<dyn TokenStore>) -> Self {
        match store.load() {
            Ok(Some(saved)) => tracing::info!(
                "🔐 Sessão restaurada para '{}' ({})",
                saved.user.name,
                saved.user.role.as_str()
            ),
            Ok(None) => tracing::debug!("Nenhuma sessão salva."),
            Err(e) => tracing::warn!("Não foi possível restaurar a sessão: {}", e),
        }
        Self { store }
    }

    /// Encerramento do processo. O estado já está no disco, nada a descarregar.
    pub fn close(&self) {
        tracing::debug!("Sessão fechada (autenticado: {})", self.is_authenticated());
    }

    pub async fn login(
        &self,
        gateway: &dyn RequerimentoGateway,
        payload: LoginPayload,
    ) -> Result<User, AppError> {
        payload.validate()?;

        let response = gateway.login(&payload).await?;

        // Claim do token primeiro, depois o campo da resposta, por fim USER
        let role = role_from_token(&response.token)
            .or_else(|| response.role.as_deref().map(Role::from_claim))
            .unwrap_or_default();

        let user = User {
            name: payload.login.trim().to_string(),
            role,
        };

        self.store.save(&StoredSession {
            auth_token: response.token,
            user: user.clone(),
        })?;

        tracing::info!("✅ Login de '{}' como {}", user.name, user.role.as_str());
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), AppError> {
        self.store.clear()?;
        tracing::info!("👋 Sessão encerrada.");
        Ok(())
    }

    pub async fn register(
        &self,
        gateway: &dyn RequerimentoGateway,
        payload: RegisterPayload,
    ) -> Result<(), AppError> {
        payload.validate()?;

        // O curso tem que existir no catálogo público
        if let Some(curso_id) = payload.curso_id {
            let cursos = gateway.list_cursos().await?;
            if !cursos.iter().any(|c| c.id == curso_id) {
                return Err(AppError::UnknownCurso(curso_id));
            }
        }

        gateway.register(&payload).await?;
        tracing::info!("📝 Usuário '{}' registrado.", payload.login);
        Ok(())
    }

    fn saved(&self) -> Option<StoredSession> {
        match self.store.load() {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("Falha ao ler a sessão: {}", e);
                None
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.store.token()
    }

    /// Autenticado quando há um token com formato de JWT.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some_and(|t| looks_like_jwt(&t))
    }

    pub fn current_user(&self) -> Option<User> {
        if !self.is_authenticated() {
            return None;
        }
        self.saved().map(|s| s.user)
    }

    pub fn role(&self) -> Role {
        self.current_user().map(|u| u.role).unwrap_or_default()
    }

    pub fn claims(&self) -> Result<TokenClaims, AppError> {
        let token = self.token().ok_or(AppError::MissingToken)?;
        decode_claims(&token)
    }

    pub fn current_user_id(&self) -> Result<String, AppError> {
        self.claims()?.user_id.ok_or(AppError::MissingUserId)
    }
}

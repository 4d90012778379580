// src/services/token.rs

use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde::{Deserialize, Deserializer};

use crate::{common::error::AppError, models::auth::Role};

// base64url, com ou sem padding
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims lidas do payload do JWT.
///
/// A assinatura NÃO é verificada: servem apenas para exibição e para escolher
/// rotas. Quem autoriza de verdade é o backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "id_claim")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub exp: Option<u64>,
}

impl TokenClaims {
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().map(Role::from_claim)
    }
}

// O backend manda o id como número ou como texto
fn id_claim<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Decodifica o payload (segmento do meio) do token.
pub fn decode_claims(token: &str) -> Result<TokenClaims, AppError> {
    let mut segments = token.trim().split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(AppError::MalformedToken),
    };

    let bytes = PAYLOAD_ENGINE.decode(payload).map_err(|e| {
        tracing::debug!("Payload do token não é base64 válido: {}", e);
        AppError::MalformedToken
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!("Payload do token não é JSON válido: {}", e);
        AppError::MalformedToken
    })
}

/// Papel do usuário segundo o token. Token malformado ou sem a claim resulta em `None`.
pub fn role_from_token(token: &str) -> Option<Role> {
    decode_claims(token).ok().and_then(|claims| claims.role())
}

/// Token com cara de JWT: três segmentos não vazios e cabeçalho legível.
pub fn looks_like_jwt(token: &str) -> bool {
    let segments: Vec<&str> = token.trim().split('.').collect();
    segments.len() == 3
        && segments.iter().all(|s| !s.is_empty())
        && jsonwebtoken::decode_header(token.trim()).is_ok()
}

// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use reqwest::Url;

use crate::{
    api::{ApiClient, ApiConfig},
    services::auth::Session,
    storage::FileTokenStore,
};

const DEFAULT_API_URL: &str = "http://localhost:8080/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: Url,
    pub session_file: PathBuf,
    pub timeout: Duration,
}

impl AppConfig {
    /// Lê a configuração do ambiente (e do `.env`, se existir).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_url = env::var("PORTAL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(api_url.trim())
            .with_context(|| format!("PORTAL_API_URL inválida: {}", api_url))?;

        let session_file = match env::var("PORTAL_SESSION_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_session_file(),
        };

        let timeout = match env::var("PORTAL_HTTP_TIMEOUT_SECS") {
            Ok(secs) => secs
                .trim()
                .parse::<u64>()
                .with_context(|| format!("PORTAL_HTTP_TIMEOUT_SECS deve ser um número: {}", secs))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url,
            session_file,
            timeout: Duration::from_secs(timeout),
        })
    }
}

fn default_session_file() -> PathBuf {
    let home = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".portal-requerimentos").join("session.json")
}

// O estado compartilhado pelos comandos
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub session: Session,
    pub gateway: Arc<ApiClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store = Arc::new(FileTokenStore::new(&config.session_file));

        // --- Monta o gráfico de dependências ---
        // O cliente e a sessão compartilham o mesmo armazenamento de token
        let session = Session::open(store.clone());
        let api_config = ApiConfig::new(config.api_url.clone(), store).with_timeout(config.timeout);
        let gateway = ApiClient::new(api_config).context("Falha ao criar o cliente HTTP")?;

        tracing::debug!(
            "API em {} (sessão em {})",
            config.api_url,
            config.session_file.display()
        );

        Ok(Self {
            config,
            session,
            gateway: Arc::new(gateway),
        })
    }
}

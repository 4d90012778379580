// src/api/client.rs

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    RequestBuilder, Response, StatusCode, Url,
    header::CONTENT_TYPE,
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;

use crate::{
    api::{endpoints::Endpoints, gateway::RequerimentoGateway},
    common::error::AppError,
    models::{
        anexo::{Anexo, UploadFile},
        auth::{LoginPayload, LoginResponse, RegisterPayload},
        catalogo::{Curso, Finalidade},
        historico::{LogsResponse, RequerimentoLog},
        requerimento::{
            AtualizacaoRequerimento, NovoRequerimento, Page, PageQuery, Requerimento,
            SituacaoCode,
        },
    },
    storage::TokenStore,
};

/// Fonte do token bearer. Lido a cada requisição.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;

    /// Chamado quando o backend responde 401.
    fn invalidate(&self);
}

impl<S: TokenStore> TokenProvider for S {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }

    fn invalidate(&self) {
        if let Err(e) = self.clear() {
            tracing::warn!("Falha ao limpar a sessão após 401: {}", e);
        }
    }
}

// Configuração única do cliente
#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub token_provider: Arc<dyn TokenProvider>,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: Url, token_provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            base_url,
            token_provider,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Authenticated,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    token_provider: Arc<dyn TokenProvider>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let endpoints = Endpoints::new(config.base_url)?;

        Ok(Self {
            http,
            endpoints,
            token_provider: config.token_provider,
        })
    }

    fn with_bearer(&self, builder: RequestBuilder) -> Result<RequestBuilder, AppError> {
        let token = self
            .token_provider
            .bearer_token()
            .ok_or(AppError::MissingToken)?;
        Ok(builder.bearer_auth(token))
    }

    // Requisição JSON: sempre com Content-Type, e com Authorization quando protegida
    fn json_request(
        &self,
        method: reqwest::Method,
        url: Url,
        access: Access,
    ) -> Result<RequestBuilder, AppError> {
        let builder = self.http.request(method, url).header(CONTENT_TYPE, "application/json");
        match access {
            Access::Public => Ok(builder),
            Access::Authenticated => self.with_bearer(builder),
        }
    }

    // Multipart: sem Content-Type explícito, o boundary fica por conta do reqwest
    fn multipart_request(
        &self,
        method: reqwest::Method,
        url: Url,
        form: Form,
    ) -> Result<RequestBuilder, AppError> {
        self.with_bearer(self.http.request(method, url).multipart(form))
    }

    async fn send(&self, builder: RequestBuilder, access: Access) -> Result<Response, AppError> {
        let request = builder.build()?;
        tracing::debug!("➡️  {} {}", request.method(), request.url());
        let (method, url) = (request.method().clone(), request.url().clone());

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!("Falha de transporte em {} {}: {}", method, url, e);
            AppError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Corpo da resposta de erro ilegível em {} {}: {}", method, url, e);
                String::new()
            }
        };
        tracing::warn!("{} {} respondeu {}: {}", method, url, status, body);

        if status == StatusCode::UNAUTHORIZED && access == Access::Authenticated {
            // Política única: qualquer 401 em chamada autenticada encerra a sessão
            self.token_provider.invalidate();
            return Err(AppError::Unauthorized { body });
        }

        Err(AppError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    // Corpo vazio em 200 vira coleção vazia
    async fn read_json_or_default<T: DeserializeOwned + Default>(
        response: Response,
    ) -> Result<T, AppError> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn read_optional<T: DeserializeOwned>(response: Response) -> Result<Option<T>, AppError> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url, access: Access) -> Result<Vec<T>, AppError> {
        let builder = self.json_request(reqwest::Method::GET, url, access)?;
        let response = self.send(builder, access).await?;
        Self::read_json_or_default(response).await
    }
}

fn multipart_form(fields: Vec<(&'static str, String)>, files: &[UploadFile]) -> Form {
    let form = fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));

    files.iter().fold(form, |form, file| {
        form.part(
            "files",
            Part::bytes(file.bytes.clone()).file_name(file.name.clone()),
        )
    })
}

#[async_trait]
impl RequerimentoGateway for ApiClient {
    async fn login(&self, payload: &LoginPayload) -> Result<LoginResponse, AppError> {
        let builder = self
            .http
            .post(self.endpoints.login())
            .json(payload);
        let response = self.send(builder, Access::Public).await?;
        Self::read_json(response).await
    }

    async fn register(&self, payload: &RegisterPayload) -> Result<(), AppError> {
        let builder = self
            .http
            .post(self.endpoints.register())
            .json(payload);
        self.send(builder, Access::Public).await?;
        Ok(())
    }

    async fn list_finalidades(&self) -> Result<Vec<Finalidade>, AppError> {
        self.get_list(self.endpoints.finalidades(), Access::Authenticated).await
    }

    async fn list_cursos(&self) -> Result<Vec<Curso>, AppError> {
        self.get_list(self.endpoints.cursos(), Access::Public).await
    }

    async fn list_requerimentos(&self) -> Result<Vec<Requerimento>, AppError> {
        self.get_list(self.endpoints.requerimentos(), Access::Authenticated).await
    }

    async fn list_requerimentos_by_user(
        &self,
        user_id: &str,
        query: PageQuery,
    ) -> Result<Page<Requerimento>, AppError> {
        let url = self.endpoints.requerimentos_by_user(user_id, query);
        let builder = self.json_request(reqwest::Method::GET, url, Access::Authenticated)?;
        let response = self.send(builder, Access::Authenticated).await?;
        Self::read_json_or_default(response).await
    }

    async fn get_requerimento(&self, id: i64) -> Result<Requerimento, AppError> {
        let url = self.endpoints.requerimento(id);
        let builder = self.json_request(reqwest::Method::GET, url, Access::Authenticated)?;
        let response = self.send(builder, Access::Authenticated).await?;
        Self::read_json(response).await
    }

    async fn create_requerimento(
        &self,
        novo: &NovoRequerimento,
    ) -> Result<Option<Requerimento>, AppError> {
        let form = multipart_form(
            vec![
                ("finalidade", novo.finalidade_id.to_string()),
                ("justificativa", novo.justificativa.clone()),
            ],
            &novo.files,
        );
        let builder =
            self.multipart_request(reqwest::Method::POST, self.endpoints.requerimentos(), form)?;
        let response = self.send(builder, Access::Authenticated).await?;
        Self::read_optional(response).await
    }

    async fn update_requerimento(
        &self,
        id: i64,
        dados: &AtualizacaoRequerimento,
    ) -> Result<Option<Requerimento>, AppError> {
        let mut fields = vec![
            ("finalidade", dados.finalidade_id.to_string()),
            ("justificativa", dados.justificativa.clone()),
        ];
        if let Some(manter) = dados.manter_anexos_field() {
            fields.push(("manterAnexos", manter));
        }

        let form = multipart_form(fields, &dados.files);
        let builder =
            self.multipart_request(reqwest::Method::PUT, self.endpoints.requerimento(id), form)?;
        let response = self.send(builder, Access::Authenticated).await?;
        Self::read_optional(response).await
    }

    async fn update_situacao(
        &self,
        id: i64,
        code: SituacaoCode,
    ) -> Result<Option<Requerimento>, AppError> {
        let url = self.endpoints.situacao(id, code);
        let builder = self.json_request(reqwest::Method::PUT, url, Access::Authenticated)?;
        let response = self.send(builder, Access::Authenticated).await?;
        Self::read_optional(response).await
    }

    async fn list_anexos(&self, requerimento_id: i64) -> Result<Vec<Anexo>, AppError> {
        self.get_list(self.endpoints.anexos(requerimento_id), Access::Authenticated).await
    }

    async fn list_logs(&self, requerimento_id: i64) -> Result<Vec<RequerimentoLog>, AppError> {
        let url = self.endpoints.logs(requerimento_id);
        let builder = self.json_request(reqwest::Method::GET, url, Access::Authenticated)?;
        let response = self.send(builder, Access::Authenticated).await?;
        let logs: LogsResponse = Self::read_json_or_default(response).await?;
        Ok(logs.requerimento_logs)
    }

    async fn list_log_anexos(&self, log_id: i64) -> Result<Vec<Anexo>, AppError> {
        self.get_list(self.endpoints.log_anexos(log_id), Access::Authenticated).await
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>, AppError> {
        let builder = self.with_bearer(self.http.get(url.clone()))?;
        let response = self.send(builder, Access::Authenticated).await?;
        Ok(response.bytes().await?.to_vec())
    }

    fn anexo_download_url(&self, anexo_id: i64) -> Url {
        self.endpoints.anexo_download(anexo_id)
    }

    fn log_anexo_download_url(&self, log_id: i64, anexo_id: i64) -> Url {
        self.endpoints.log_anexo_download(log_id, anexo_id)
    }
}

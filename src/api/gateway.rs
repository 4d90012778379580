// src/api/gateway.rs

use async_trait::async_trait;
use reqwest::Url;

use crate::{
    common::error::AppError,
    models::{
        anexo::Anexo,
        auth::{LoginPayload, LoginResponse, RegisterPayload},
        catalogo::{Curso, Finalidade},
        historico::RequerimentoLog,
        requerimento::{
            AtualizacaoRequerimento, NovoRequerimento, Page, PageQuery, Requerimento,
            SituacaoCode,
        },
    },
};

/// Todas as chamadas ao backend de requerimentos.
///
/// As telas dependem só deste trait; `ApiClient` é a implementação HTTP.
#[async_trait]
pub trait RequerimentoGateway: Send + Sync {
    async fn login(&self, payload: &LoginPayload) -> Result<LoginResponse, AppError>;
    async fn register(&self, payload: &RegisterPayload) -> Result<(), AppError>;

    async fn list_finalidades(&self) -> Result<Vec<Finalidade>, AppError>;
    async fn list_cursos(&self) -> Result<Vec<Curso>, AppError>;

    async fn list_requerimentos(&self) -> Result<Vec<Requerimento>, AppError>;
    async fn list_requerimentos_by_user(
        &self,
        user_id: &str,
        query: PageQuery,
    ) -> Result<Page<Requerimento>, AppError>;
    async fn get_requerimento(&self, id: i64) -> Result<Requerimento, AppError>;
    async fn create_requerimento(
        &self,
        novo: &NovoRequerimento,
    ) -> Result<Option<Requerimento>, AppError>;
    async fn update_requerimento(
        &self,
        id: i64,
        dados: &AtualizacaoRequerimento,
    ) -> Result<Option<Requerimento>, AppError>;
    async fn update_situacao(
        &self,
        id: i64,
        code: SituacaoCode,
    ) -> Result<Option<Requerimento>, AppError>;

    async fn list_anexos(&self, requerimento_id: i64) -> Result<Vec<Anexo>, AppError>;
    async fn list_logs(&self, requerimento_id: i64) -> Result<Vec<RequerimentoLog>, AppError>;
    async fn list_log_anexos(&self, log_id: i64) -> Result<Vec<Anexo>, AppError>;

    async fn download(&self, url: &Url) -> Result<Vec<u8>, AppError>;
    fn anexo_download_url(&self, anexo_id: i64) -> Url;
    fn log_anexo_download_url(&self, log_id: i64, anexo_id: i64) -> Url;
}

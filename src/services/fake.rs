// src/services/fake.rs

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use reqwest::Url;

use crate::{
    api::{RequerimentoGateway, endpoints::Endpoints},
    common::error::AppError,
    models::{
        anexo::Anexo,
        auth::{LoginPayload, LoginResponse, RegisterPayload},
        catalogo::{Curso, Finalidade},
        historico::RequerimentoLog,
        requerimento::{
            AtualizacaoRequerimento, NovoRequerimento, Page, PageQuery, Requerimento, Situacao,
            SituacaoCode,
        },
    },
};

/// Gateway em memória que registra cada chamada.
pub(crate) struct FakeGateway {
    pub login_token: Option<String>,
    pub login_role: Option<String>,
    pub finalidades: Vec<Finalidade>,
    pub cursos: Vec<Curso>,
    pub requerimentos: Vec<Requerimento>,
    pub page: Page<Requerimento>,
    pub anexos: Vec<Anexo>,
    pub logs: Vec<RequerimentoLog>,
    pub log_anexos: HashMap<i64, Vec<Anexo>>,
    pub status_response_empty: bool,

    pub fail_next: Mutex<Option<AppError>>,
    pub calls: Mutex<Vec<String>>,
    pub created: Mutex<Vec<NovoRequerimento>>,
    pub updated: Mutex<Vec<(i64, AtualizacaoRequerimento)>>,
    pub page_queries: Mutex<Vec<(String, PageQuery)>>,
    pub registered: Mutex<Vec<RegisterPayload>>,
    pub endpoints: Endpoints,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            login_token: None,
            login_role: None,
            finalidades: vec![
                finalidade(1, "Solicitação de Matrícula"),
                finalidade(3, "Justificativa de Faltas"),
                finalidade(4, "Trancamento de Matrícula"),
            ],
            cursos: vec![Curso { id: 2, nome: "Técnico em Informática".into() }],
            requerimentos: Vec::new(),
            page: Page::default(),
            anexos: Vec::new(),
            logs: Vec::new(),
            log_anexos: HashMap::new(),
            status_response_empty: false,
            fail_next: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
            page_queries: Mutex::new(Vec::new()),
            registered: Mutex::new(Vec::new()),
            endpoints: Endpoints::parse("http://api.teste/").unwrap(),
        }
    }
}

pub(crate) fn finalidade(id: i64, descricao: &str) -> Finalidade {
    Finalidade { id, descricao: descricao.into() }
}

pub(crate) fn anexo(id: i64, nome: &str) -> Anexo {
    Anexo {
        id,
        nome: nome.into(),
        extensao: None,
        tamanho: 1024,
        requerimento_id: None,
    }
}

pub(crate) fn requerimento(id: i64, nome: &str, situacao: Situacao) -> Requerimento {
    Requerimento {
        id,
        nome_usuario: Some(nome.into()),
        nome_curso: Some("Técnico em Informática".into()),
        finalidade: Some("Trancamento de Matrícula".into()),
        descricao: Some("Solicito trancamento".into()),
        situacao,
        data_criacao: None,
        data_modificacao: None,
        quantidade_anexos: None,
    }
}

impl FakeGateway {
    pub fn fail_next(&self, error: AppError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == name).count()
    }

    fn record(&self, name: impl Into<String>) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(name.into());
        match self.fail_next.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn find(&self, id: i64) -> Result<Requerimento, AppError> {
        self.requerimentos
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(AppError::Http { status: 404, body: "Requerimento não encontrado".into() })
    }
}

#[async_trait]
impl RequerimentoGateway for FakeGateway {
    async fn login(&self, _payload: &LoginPayload) -> Result<LoginResponse, AppError> {
        self.record("login")?;
        match &self.login_token {
            Some(token) => Ok(LoginResponse { token: token.clone(), role: self.login_role.clone() }),
            None => Err(AppError::Http { status: 401, body: "Credenciais inválidas".into() }),
        }
    }

    async fn register(&self, payload: &RegisterPayload) -> Result<(), AppError> {
        self.record("register")?;
        self.registered.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn list_finalidades(&self) -> Result<Vec<Finalidade>, AppError> {
        self.record("list_finalidades")?;
        Ok(self.finalidades.clone())
    }

    async fn list_cursos(&self) -> Result<Vec<Curso>, AppError> {
        self.record("list_cursos")?;
        Ok(self.cursos.clone())
    }

    async fn list_requerimentos(&self) -> Result<Vec<Requerimento>, AppError> {
        self.record("list_requerimentos")?;
        Ok(self.requerimentos.clone())
    }

    async fn list_requerimentos_by_user(
        &self,
        user_id: &str,
        query: PageQuery,
    ) -> Result<Page<Requerimento>, AppError> {
        self.record("list_requerimentos_by_user")?;
        self.page_queries.lock().unwrap().push((user_id.to_string(), query));
        Ok(self.page.clone())
    }

    async fn get_requerimento(&self, id: i64) -> Result<Requerimento, AppError> {
        self.record("get_requerimento")?;
        self.find(id)
    }

    async fn create_requerimento(
        &self,
        novo: &NovoRequerimento,
    ) -> Result<Option<Requerimento>, AppError> {
        self.record("create_requerimento")?;
        self.created.lock().unwrap().push(novo.clone());
        Ok(None)
    }

    async fn update_requerimento(
        &self,
        id: i64,
        dados: &AtualizacaoRequerimento,
    ) -> Result<Option<Requerimento>, AppError> {
        self.record("update_requerimento")?;
        self.updated.lock().unwrap().push((id, dados.clone()));
        Ok(None)
    }

    async fn update_situacao(
        &self,
        id: i64,
        code: SituacaoCode,
    ) -> Result<Option<Requerimento>, AppError> {
        self.record(format!("update_situacao:{}", code.as_code()))?;
        if self.status_response_empty {
            return Ok(None);
        }
        let mut requerimento = self.find(id)?;
        requerimento.situacao = code.target();
        Ok(Some(requerimento))
    }

    async fn list_anexos(&self, _requerimento_id: i64) -> Result<Vec<Anexo>, AppError> {
        self.record("list_anexos")?;
        Ok(self.anexos.clone())
    }

    async fn list_logs(&self, _requerimento_id: i64) -> Result<Vec<RequerimentoLog>, AppError> {
        self.record("list_logs")?;
        Ok(self.logs.clone())
    }

    async fn list_log_anexos(&self, log_id: i64) -> Result<Vec<Anexo>, AppError> {
        self.record(format!("list_log_anexos:{}", log_id))?;
        Ok(self.log_anexos.get(&log_id).cloned().unwrap_or_default())
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>, AppError> {
        self.record(format!("download:{}", url.path()))?;
        Ok(b"conteudo".to_vec())
    }

    fn anexo_download_url(&self, anexo_id: i64) -> Url {
        self.endpoints.anexo_download(anexo_id)
    }

    fn log_anexo_download_url(&self, log_id: i64, anexo_id: i64) -> Url {
        self.endpoints.log_anexo_download(log_id, anexo_id)
    }
}

// src/services/dashboard.rs

use crate::{
    api::RequerimentoGateway,
    common::error::AppError,
    middleware::auth::{Route, edit_route},
    models::{
        auth::Role,
        requerimento::{Page, PageQuery, Requerimento, Situacao},
    },
    services::auth::Session,
};

/// De onde vem a lista do painel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardScope {
    // Lista plana, sem paginação no servidor
    Todos,
    // Paginado e restrito ao usuário do token
    Usuario(String),
}

/// Estado do painel de requerimentos.
///
/// Os filtros de texto e situação valem só para a página carregada;
/// tamanho de página e ano vão para a consulta ao servidor.
#[derive(Debug, Clone)]
pub struct Dashboard {
    scope: DashboardScope,
    role: Role,
    query: PageQuery,
    search: String,
    status_filter: Option<Situacao>,
    page: Page<Requerimento>,
    error: Option<String>,
}

impl Dashboard {
    pub fn new(scope: DashboardScope, role: Role) -> Self {
        Self {
            scope,
            role,
            query: PageQuery::default(),
            search: String::new(),
            status_filter: None,
            page: Page::default(),
            error: None,
        }
    }

    /// Escolhe o escopo pelo papel da sessão: ADMIN vê tudo.
    pub fn for_session(session: &Session) -> Result<Self, AppError> {
        let role = session.role();
        let scope = match role {
            Role::Admin => DashboardScope::Todos,
            Role::User => DashboardScope::Usuario(session.current_user_id()?),
        };
        Ok(Self::new(scope, role))
    }

    /// Consulta inicial, antes do primeiro `load`.
    pub fn with_query(mut self, query: PageQuery) -> Self {
        self.query = PageQuery { size: query.size.max(1), ..query };
        self
    }

    pub fn query(&self) -> PageQuery {
        self.query
    }

    pub fn page(&self) -> &Page<Requerimento> {
        &self.page
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load(&mut self, gateway: &dyn RequerimentoGateway) -> Result<(), AppError> {
        let result = match &self.scope {
            DashboardScope::Todos => gateway.list_requerimentos().await.map(Page::single),
            DashboardScope::Usuario(user_id) => {
                gateway.list_requerimentos_by_user(user_id, self.query).await
            }
        };

        match result {
            Ok(page) => {
                tracing::debug!(
                    "Painel: página {} com {} de {} requerimentos",
                    self.query.page,
                    page.content.len(),
                    page.total_elements
                );
                self.page = page;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                // A página anterior continua na tela
                tracing::error!("Erro ao buscar requerimentos: {}", e);
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub async fn set_page_size(
        &mut self,
        gateway: &dyn RequerimentoGateway,
        size: u32,
    ) -> Result<(), AppError> {
        self.query.size = size.max(1);
        self.query.page = 0;
        self.load(gateway).await
    }

    pub async fn set_year(
        &mut self,
        gateway: &dyn RequerimentoGateway,
        year: Option<i32>,
    ) -> Result<(), AppError> {
        self.query.year = year;
        self.query.page = 0;
        self.load(gateway).await
    }

    /// Vai para a página pedida, limitada ao total conhecido.
    pub async fn go_to_page(
        &mut self,
        gateway: &dyn RequerimentoGateway,
        page: u32,
    ) -> Result<(), AppError> {
        let last = self.page.total_pages.saturating_sub(1);
        self.query.page = page.min(last);
        self.load(gateway).await
    }

    pub async fn next_page(&mut self, gateway: &dyn RequerimentoGateway) -> Result<(), AppError> {
        if !self.has_next_page() {
            return Ok(());
        }
        self.go_to_page(gateway, self.query.page + 1).await
    }

    pub async fn previous_page(&mut self, gateway: &dyn RequerimentoGateway) -> Result<(), AppError> {
        if self.query.page == 0 {
            return Ok(());
        }
        self.go_to_page(gateway, self.query.page - 1).await
    }

    pub fn has_next_page(&self) -> bool {
        self.query.page + 1 < self.page.total_pages
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    pub fn set_status_filter(&mut self, situacao: Option<Situacao>) {
        self.status_filter = situacao;
    }

    /// Requerimentos da página atual que passam pelos filtros locais.
    pub fn visible(&self) -> Vec<&Requerimento> {
        self.page
            .content
            .iter()
            .filter(|r| r.matches_text(&self.search))
            .filter(|r| self.status_filter.is_none_or(|s| r.situacao == s))
            .collect()
    }

    pub fn edit_route(&self, requerimento_id: i64) -> Route {
        edit_route(self.role, requerimento_id)
    }
}

// src/services/revisao.rs

use reqwest::Url;

use crate::{
    api::RequerimentoGateway,
    common::error::AppError,
    middleware::auth::Route,
    models::{
        anexo::Anexo,
        requerimento::{Requerimento, Situacao, SituacaoCode},
    },
};

/// Tela do avaliador: conteúdo somente leitura, decisão de deferir ou indeferir.
#[derive(Debug, Clone)]
pub struct RevisaoRequerimento {
    requerimento: Requerimento,
    anexos: Vec<Anexo>,
    error: Option<String>,
}

impl RevisaoRequerimento {
    pub async fn load(gateway: &dyn RequerimentoGateway, id: i64) -> Result<Self, AppError> {
        let requerimento = gateway.get_requerimento(id).await?;
        let anexos = gateway.list_anexos(id).await?;
        Ok(Self {
            requerimento,
            anexos,
            error: None,
        })
    }

    pub fn requerimento(&self) -> &Requerimento {
        &self.requerimento
    }

    pub fn situacao(&self) -> Situacao {
        self.requerimento.situacao
    }

    pub fn anexos(&self) -> &[Anexo] {
        &self.anexos
    }

    pub fn download_urls(&self, gateway: &dyn RequerimentoGateway) -> Vec<(&Anexo, Url)> {
        self.anexos
            .iter()
            .map(|a| (a, gateway.anexo_download_url(a.id)))
            .collect()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn approve(&mut self, gateway: &dyn RequerimentoGateway) -> Result<Route, AppError> {
        self.decide(gateway, SituacaoCode::Deferir).await
    }

    pub async fn reject(&mut self, gateway: &dyn RequerimentoGateway) -> Result<Route, AppError> {
        self.decide(gateway, SituacaoCode::Indeferir).await
    }

    async fn decide(
        &mut self,
        gateway: &dyn RequerimentoGateway,
        code: SituacaoCode,
    ) -> Result<Route, AppError> {
        let result = gateway.update_situacao(self.requerimento.id, code).await;

        match result {
            Ok(resposta) => {
                // Vale o estado devolvido; sem corpo (ou sem situação), o alvo do código
                match resposta {
                    Some(atualizado) if atualizado.situacao != Situacao::Desconhecido => {
                        self.requerimento = atualizado;
                    }
                    _ => self.requerimento.situacao = code.target(),
                }
                self.error = None;
                tracing::info!(
                    "⚖️  Requerimento {} agora {}",
                    self.requerimento.id,
                    self.requerimento.situacao.label()
                );
                Ok(Route::Dashboard)
            }
            Err(e) => {
                let acao = match code {
                    SituacaoCode::Deferir => "aprovar",
                    SituacaoCode::Indeferir => "reprovar",
                };
                tracing::error!("Erro ao {} o requerimento {}: {}", acao, self.requerimento.id, e);
                self.error = Some(format!("Erro ao {} requerimento: {}", acao, e.user_message()));
                Err(e)
            }
        }
    }
}

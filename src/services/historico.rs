// src/services/historico.rs

use reqwest::Url;

use crate::{
    api::RequerimentoGateway,
    common::error::AppError,
    models::{anexo::Anexo, historico::RequerimentoLog, requerimento::Requerimento},
};

/// Uma entrada do histórico com seus anexos, carregados sob demanda.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub log: RequerimentoLog,
    expanded: bool,
    anexos: Option<Vec<Anexo>>,
}

impl LogEntry {
    fn new(log: RequerimentoLog) -> Self {
        Self { log, expanded: false, anexos: None }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Anexos já buscados; `None` enquanto a entrada nunca foi expandida com sucesso.
    pub fn anexos(&self) -> Option<&[Anexo]> {
        self.anexos.as_deref()
    }
}

/// Detalhe de um requerimento com o histórico de alterações.
#[derive(Debug, Clone)]
pub struct DetalheRequerimento {
    requerimento: Requerimento,
    anexos: Vec<Anexo>,
    logs: Option<Vec<LogEntry>>,
}

impl DetalheRequerimento {
    pub async fn load(gateway: &dyn RequerimentoGateway, id: i64) -> Result<Self, AppError> {
        let requerimento = gateway.get_requerimento(id).await?;
        let anexos = gateway.list_anexos(id).await?;
        Ok(Self { requerimento, anexos, logs: None })
    }

    pub fn requerimento(&self) -> &Requerimento {
        &self.requerimento
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

    /// O histórico é opcional: só é buscado quando pedido.
    pub async fn load_logs(&mut self, gateway: &dyn RequerimentoGateway) -> Result<(), AppError> {
        let logs = gateway.list_logs(self.requerimento.id).await?;
        tracing::debug!("{} registros de histórico para {}", logs.len(), self.requerimento.id);
        self.logs = Some(logs.into_iter().map(LogEntry::new).collect());
        Ok(())
    }

    pub fn logs(&self) -> &[LogEntry] {
        self.logs.as_deref().unwrap_or_default()
    }

    fn entry_mut(&mut self, log_id: i64) -> Result<&mut LogEntry, AppError> {
        self.logs
            .iter_mut()
            .flatten()
            .find(|e| e.log.id == log_id)
            .ok_or(AppError::UnknownLog(log_id))
    }

    /// Expande a entrada. Os anexos são buscados uma única vez.
    pub async fn expand(
        &mut self,
        gateway: &dyn RequerimentoGateway,
        log_id: i64,
    ) -> Result<&[Anexo], AppError> {
        let entry = self.entry_mut(log_id)?;

        if entry.anexos.is_none() {
            // Em caso de falha a entrada fica fechada e sem cache
            let anexos = gateway.list_log_anexos(log_id).await.inspect_err(|e| {
                tracing::warn!("Falha ao buscar anexos do registro {}: {}", log_id, e);
            })?;
            entry.anexos = Some(anexos);
        }

        entry.expanded = true;
        Ok(entry.anexos.as_deref().unwrap_or_default())
    }

    pub fn collapse(&mut self, log_id: i64) -> Result<(), AppError> {
        self.entry_mut(log_id)?.expanded = false;
        Ok(())
    }

    /// Alterna a entrada; devolve se ficou expandida.
    pub async fn toggle(
        &mut self,
        gateway: &dyn RequerimentoGateway,
        log_id: i64,
    ) -> Result<bool, AppError> {
        if self.entry_mut(log_id)?.expanded {
            self.collapse(log_id)?;
            return Ok(false);
        }
        self.expand(gateway, log_id).await?;
        Ok(true)
    }

    pub fn log_anexo_download_url(
        &self,
        gateway: &dyn RequerimentoGateway,
        log_id: i64,
        anexo_id: i64,
    ) -> Url {
        gateway.log_anexo_download_url(log_id, anexo_id)
    }
}

// src/services/requerimento_form.rs

use validator::Validate;

use crate::{
    api::RequerimentoGateway,
    common::error::AppError,
    middleware::auth::Route,
    models::{
        anexo::{Anexo, MAX_ANEXOS, MAX_TAMANHO_ANEXO, MAX_TAMANHO_ANEXO_EDICAO, UploadFile},
        catalogo::Finalidade,
        requerimento::{AtualizacaoRequerimento, NovoRequerimento, Requerimento},
    },
};

// Campos obrigatórios comuns aos dois formulários
#[derive(Debug, Validate)]
struct CamposRequerimento {
    #[validate(required(message = "Selecione uma finalidade"))]
    finalidade: Option<i64>,
    #[validate(length(min = 1, message = "Informe a justificativa"))]
    justificativa: String,
}

fn validar(
    finalidade: Option<i64>,
    justificativa: &str,
    declaracao: bool,
) -> Result<(i64, String), AppError> {
    let campos = CamposRequerimento {
        finalidade,
        justificativa: justificativa.trim().to_string(),
    };
    campos.validate()?;

    if !declaracao {
        return Err(AppError::DeclarationRequired);
    }

    match campos.finalidade {
        Some(id) => Ok((id, campos.justificativa)),
        None => Err(AppError::UnknownFinalidade(String::new())),
    }
}

// Limites de anexos: quantidade total e tamanho de cada arquivo
fn aceitar_arquivo(total_atual: usize, file: &UploadFile, max_bytes: u64) -> Result<(), AppError> {
    if total_atual >= MAX_ANEXOS {
        return Err(AppError::TooManyFiles { max: MAX_ANEXOS });
    }
    if file.size() > max_bytes {
        return Err(AppError::FileTooLarge {
            name: file.name.clone(),
            max_bytes,
        });
    }
    Ok(())
}

fn procurar_finalidade(finalidades: &[Finalidade], chave: &str) -> Result<i64, AppError> {
    let chave = chave.trim();
    finalidades
        .iter()
        .find(|f| chave.parse::<i64>().is_ok_and(|id| id == f.id) || f.descricao.eq_ignore_ascii_case(chave))
        .map(|f| f.id)
        .ok_or_else(|| AppError::UnknownFinalidade(chave.to_string()))
}

/// Formulário de abertura de requerimento.
#[derive(Debug, Clone, Default)]
pub struct NovoRequerimentoForm {
    finalidades: Vec<Finalidade>,
    finalidade_id: Option<i64>,
    justificativa: String,
    declaracao: bool,
    files: Vec<UploadFile>,
    error: Option<String>,
}

impl NovoRequerimentoForm {
    /// Abre o formulário já com as finalidades carregadas.
    pub async fn load(gateway: &dyn RequerimentoGateway) -> Result<Self, AppError> {
        let finalidades = gateway.list_finalidades().await?;
        tracing::debug!("{} finalidades disponíveis", finalidades.len());
        Ok(Self { finalidades, ..Default::default() })
    }

    pub fn finalidades(&self) -> &[Finalidade] {
        &self.finalidades
    }

    pub fn finalidade_id(&self) -> Option<i64> {
        self.finalidade_id
    }

    /// Aceita o id ou a descrição da finalidade.
    pub fn select_finalidade(&mut self, chave: &str) -> Result<(), AppError> {
        self.finalidade_id = Some(procurar_finalidade(&self.finalidades, chave)?);
        Ok(())
    }

    pub fn set_justificativa(&mut self, texto: impl Into<String>) {
        self.justificativa = texto.into();
    }

    pub fn set_declaracao(&mut self, aceita: bool) {
        self.declaracao = aceita;
    }

    pub fn add_file(&mut self, file: UploadFile) -> Result<(), AppError> {
        aceitar_arquivo(self.files.len(), &file, MAX_TAMANHO_ANEXO)?;
        self.files.push(file);
        Ok(())
    }

    pub fn remove_file(&mut self, index: usize) -> Option<UploadFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        validar(self.finalidade_id, &self.justificativa, self.declaracao).is_ok()
    }

    /// Envia o requerimento. Em caso de erro o formulário fica como estava.
    pub async fn submit(&mut self, gateway: &dyn RequerimentoGateway) -> Result<Route, AppError> {
        let result = self.enviar(gateway).await;
        if let Err(e) = &result {
            self.error = Some(e.user_message());
        }
        result
    }

    async fn enviar(&mut self, gateway: &dyn RequerimentoGateway) -> Result<Route, AppError> {
        let (finalidade_id, justificativa) =
            validar(self.finalidade_id, &self.justificativa, self.declaracao)?;

        let novo = NovoRequerimento {
            finalidade_id,
            justificativa,
            files: self.files.clone(),
        };

        let criado = gateway.create_requerimento(&novo).await?;
        match criado {
            Some(r) => tracing::info!("✅ Requerimento {} criado.", r.id),
            None => tracing::info!("✅ Requerimento criado."),
        }

        self.error = None;
        Ok(Route::Dashboard)
    }
}

/// Formulário de edição pelo próprio requerente.
#[derive(Debug, Clone)]
pub struct EdicaoRequerimentoForm {
    requerimento: Requerimento,
    finalidades: Vec<Finalidade>,
    finalidade_id: Option<i64>,
    justificativa: String,
    declaracao: bool,
    anexos: Vec<Anexo>,
    novos: Vec<UploadFile>,
    error: Option<String>,
}

impl EdicaoRequerimentoForm {
    pub async fn load(gateway: &dyn RequerimentoGateway, id: i64) -> Result<Self, AppError> {
        let requerimento = gateway.get_requerimento(id).await?;
        let finalidades = gateway.list_finalidades().await?;
        let anexos = gateway.list_anexos(id).await?;

        // A API devolve a descrição da finalidade, não o id
        let finalidade_id = requerimento.finalidade.as_deref().and_then(|descricao| {
            finalidades
                .iter()
                .find(|f| f.descricao == descricao)
                .map(|f| f.id)
        });

        Ok(Self {
            justificativa: requerimento.descricao.clone().unwrap_or_default(),
            requerimento,
            finalidades,
            finalidade_id,
            declaracao: true,
            anexos,
            novos: Vec::new(),
            error: None,
        })
    }

    pub fn requerimento(&self) -> &Requerimento {
        &self.requerimento
    }

    pub fn finalidades(&self) -> &[Finalidade] {
        &self.finalidades
    }

    pub fn finalidade_id(&self) -> Option<i64> {
        self.finalidade_id
    }

    pub fn justificativa(&self) -> &str {
        &self.justificativa
    }

    pub fn select_finalidade(&mut self, chave: &str) -> Result<(), AppError> {
        self.finalidade_id = Some(procurar_finalidade(&self.finalidades, chave)?);
        Ok(())
    }

    pub fn set_justificativa(&mut self, texto: impl Into<String>) {
        self.justificativa = texto.into();
    }

    pub fn set_declaracao(&mut self, aceita: bool) {
        self.declaracao = aceita;
    }

    pub fn anexos(&self) -> &[Anexo] {
        &self.anexos
    }

    /// Remove um anexo existente só no estado local.
    pub fn remove_existing(&mut self, index: usize) -> Option<Anexo> {
        (index < self.anexos.len()).then(|| self.anexos.remove(index))
    }

    pub fn remove_existing_by_id(&mut self, anexo_id: i64) -> Result<Anexo, AppError> {
        let index = self
            .anexos
            .iter()
            .position(|a| a.id == anexo_id)
            .ok_or(AppError::UnknownAnexo(anexo_id))?;
        Ok(self.anexos.remove(index))
    }

    pub fn add_file(&mut self, file: UploadFile) -> Result<(), AppError> {
        aceitar_arquivo(self.anexos.len() + self.novos.len(), &file, MAX_TAMANHO_ANEXO_EDICAO)?;
        self.novos.push(file);
        Ok(())
    }

    pub fn remove_file(&mut self, index: usize) -> Option<UploadFile> {
        (index < self.novos.len()).then(|| self.novos.remove(index))
    }

    pub fn files(&self) -> &[UploadFile] {
        &self.novos
    }

    pub fn retained_ids(&self) -> Vec<i64> {
        self.anexos.iter().map(|a| a.id).collect()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn submit(&mut self, gateway: &dyn RequerimentoGateway) -> Result<Route, AppError> {
        let result = self.enviar(gateway).await;
        if let Err(e) = &result {
            self.error = Some(e.user_message());
        }
        result
    }

    async fn enviar(&mut self, gateway: &dyn RequerimentoGateway) -> Result<Route, AppError> {
        let (finalidade_id, justificativa) =
            validar(self.finalidade_id, &self.justificativa, self.declaracao)?;

        let dados = AtualizacaoRequerimento {
            finalidade_id,
            justificativa,
            manter_anexos: self.retained_ids(),
            files: self.novos.clone(),
        };

        if let Some(atualizado) = gateway.update_requerimento(self.requerimento.id, &dados).await? {
            self.requerimento = atualizado;
        }
        tracing::info!(
            "✏️  Requerimento {} atualizado ({} anexos mantidos, {} novos).",
            self.requerimento.id,
            dados.manter_anexos.len(),
            dados.files.len()
        );

        self.error = None;
        Ok(Route::Dashboard)
    }
}

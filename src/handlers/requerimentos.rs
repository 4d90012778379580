// src/handlers/requerimentos.rs

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::{
    api::RequerimentoGateway,
    common::error::AppError,
    config::AppState,
    models::{
        anexo::{Anexo, UploadFile},
        requerimento::{PageQuery, Requerimento, Situacao, StatusColor},
        timestamp,
    },
    services::{
        dashboard::Dashboard,
        historico::DetalheRequerimento,
        requerimento_form::{EdicaoRequerimentoForm, NovoRequerimentoForm},
        revisao::RevisaoRequerimento,
    },
};

#[derive(Debug, Args)]
pub struct ListarArgs {
    /// Página (começa em 0)
    #[arg(long, default_value_t = 0)]
    pub pagina: u32,
    #[arg(long, default_value_t = 10)]
    pub tamanho: u32,
    #[arg(long)]
    pub ano: Option<i32>,
    /// Filtro de texto sobre a página carregada
    #[arg(long)]
    pub busca: Option<String>,
    #[arg(long, value_enum, ignore_case = true)]
    pub situacao: Option<FiltroSituacao>,
}

// Só as situações que existem no backend; valor fora da lista é recusado pelo clap
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FiltroSituacao {
    Pendente,
    Deferido,
    Indeferido,
}

impl From<FiltroSituacao> for Situacao {
    fn from(filtro: FiltroSituacao) -> Self {
        match filtro {
            FiltroSituacao::Pendente => Situacao::Pendente,
            FiltroSituacao::Deferido => Situacao::Deferido,
            FiltroSituacao::Indeferido => Situacao::Indeferido,
        }
    }
}

impl Default for ListarArgs {
    fn default() -> Self {
        Self {
            pagina: 0,
            tamanho: 10,
            ano: None,
            busca: None,
            situacao: None,
        }
    }
}

#[derive(Debug, Args)]
pub struct NovoArgs {
    /// Id ou descrição da finalidade
    #[arg(long)]
    pub finalidade: String,
    #[arg(long)]
    pub justificativa: String,
    /// Arquivo a anexar (pode repetir)
    #[arg(long = "arquivo")]
    pub arquivos: Vec<PathBuf>,
    /// Declaro que as informações prestadas são verdadeiras
    #[arg(long)]
    pub declaro: bool,
}

#[derive(Debug, Args)]
pub struct EditarArgs {
    pub id: i64,
    #[arg(long)]
    pub finalidade: Option<String>,
    #[arg(long)]
    pub justificativa: Option<String>,
    /// Id de anexo existente a remover (pode repetir)
    #[arg(long = "remover-anexo")]
    pub remover: Vec<i64>,
    #[arg(long = "arquivo")]
    pub arquivos: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct VerArgs {
    pub id: i64,
    /// Mostra o histórico de alterações
    #[arg(long)]
    pub historico: bool,
    /// Expande um registro do histórico com seus anexos (pode repetir)
    #[arg(long = "expandir")]
    pub expandir: Vec<i64>,
}

#[derive(Debug, Args)]
pub struct BaixarArgs {
    pub anexo: i64,
    /// Baixa o anexo de um registro do histórico
    #[arg(long)]
    pub log: Option<i64>,
    /// Arquivo de destino
    #[arg(short, long)]
    pub saida: PathBuf,
}

fn pintar(situacao: Situacao) -> String {
    let cor = match situacao.color() {
        StatusColor::Yellow => "33",
        StatusColor::Green => "32",
        StatusColor::Red => "31",
        StatusColor::Gray => "90",
    };
    format!("\x1b[{}m{}\x1b[0m", cor, situacao.label())
}

fn texto(valor: &Option<String>) -> &str {
    valor.as_deref().unwrap_or("-")
}

fn imprimir_anexo(anexo: &Anexo, url: &reqwest::Url) {
    println!(
        "    [{}] {} ({}, {})  {}",
        anexo.id,
        anexo.nome,
        anexo.kind().label(),
        anexo.tamanho_kb(),
        url
    );
}

fn imprimir_cabecalho(requerimento: &Requerimento) {
    println!("Requerimento #{}  {}", requerimento.id, pintar(requerimento.situacao));
    println!("  Requerente:    {}", texto(&requerimento.nome_usuario));
    println!("  Curso:         {}", texto(&requerimento.nome_curso));
    println!("  Finalidade:    {}", texto(&requerimento.finalidade));
    println!("  Justificativa: {}", texto(&requerimento.descricao));
    println!("  Criado em:     {}", timestamp::format(&requerimento.data_criacao));
    println!("  Alterado em:   {}", timestamp::format(&requerimento.data_modificacao));
}

async fn ler_arquivos(caminhos: &[PathBuf]) -> Result<Vec<UploadFile>, AppError> {
    let mut arquivos = Vec::with_capacity(caminhos.len());
    for caminho in caminhos {
        arquivos.push(UploadFile::from_path(caminho).await?);
    }
    Ok(arquivos)
}

pub async fn listar(state: &AppState, args: ListarArgs) -> Result<(), AppError> {
    let gateway = state.gateway.as_ref();
    let mut dashboard = Dashboard::for_session(&state.session)?.with_query(PageQuery {
        page: args.pagina,
        size: args.tamanho,
        year: args.ano,
    });

    dashboard.load(gateway).await?;
    dashboard.set_search(args.busca.unwrap_or_default());
    dashboard.set_status_filter(args.situacao.map(Situacao::from));

    let visiveis = dashboard.visible();
    if visiveis.is_empty() {
        println!("Nenhum requerimento encontrado.");
    }
    for r in &visiveis {
        println!(
            "#{:<5} {:<12} {:<25} {:<30} {:<16} {}",
            r.id,
            pintar(r.situacao),
            texto(&r.nome_usuario),
            texto(&r.finalidade),
            timestamp::format(&r.data_criacao),
            dashboard.edit_route(r.id)
        );
    }

    let page = dashboard.page();
    println!(
        "Página {} de {} ({} requerimentos no total)",
        dashboard.query().page + 1,
        page.total_pages.max(1),
        page.total_elements
    );
    Ok(())
}

pub async fn finalidades(state: &AppState) -> Result<(), AppError> {
    let form = NovoRequerimentoForm::load(state.gateway.as_ref()).await?;
    for finalidade in form.finalidades() {
        println!("{:>4}  {}", finalidade.id, finalidade.descricao);
    }
    Ok(())
}

pub async fn novo(state: &AppState, args: NovoArgs) -> Result<(), AppError> {
    let gateway = state.gateway.as_ref();
    let mut form = NovoRequerimentoForm::load(gateway).await?;

    form.select_finalidade(&args.finalidade)?;
    form.set_justificativa(args.justificativa);
    form.set_declaracao(args.declaro);
    for arquivo in ler_arquivos(&args.arquivos).await? {
        form.add_file(arquivo)?;
    }

    let destino = form.submit(gateway).await?;
    println!("Requerimento enviado com {} anexo(s). Próxima tela: {}", form.files().len(), destino);
    Ok(())
}

pub async fn editar(state: &AppState, args: EditarArgs) -> Result<(), AppError> {
    let gateway = state.gateway.as_ref();
    let mut form = EdicaoRequerimentoForm::load(gateway, args.id).await?;

    if let Some(finalidade) = &args.finalidade {
        form.select_finalidade(finalidade)?;
    }
    if let Some(justificativa) = args.justificativa {
        form.set_justificativa(justificativa);
    }
    for anexo_id in &args.remover {
        let removido = form.remove_existing_by_id(*anexo_id)?;
        tracing::debug!("Anexo {} ({}) removido da edição", removido.id, removido.nome);
    }
    for arquivo in ler_arquivos(&args.arquivos).await? {
        form.add_file(arquivo)?;
    }

    let destino = form.submit(gateway).await?;
    println!(
        "Requerimento #{} atualizado: {} anexo(s) mantido(s), {} novo(s). Próxima tela: {}",
        args.id,
        form.retained_ids().len(),
        form.files().len(),
        destino
    );
    Ok(())
}

pub async fn deferir(state: &AppState, id: i64) -> Result<(), AppError> {
    let gateway = state.gateway.as_ref();
    let mut revisao = RevisaoRequerimento::load(gateway, id).await?;
    let destino = revisao.approve(gateway).await?;
    println!("Requerimento #{} {}. Próxima tela: {}", id, pintar(revisao.situacao()), destino);
    Ok(())
}

pub async fn indeferir(state: &AppState, id: i64) -> Result<(), AppError> {
    let gateway = state.gateway.as_ref();
    let mut revisao = RevisaoRequerimento::load(gateway, id).await?;
    let destino = revisao.reject(gateway).await?;
    println!("Requerimento #{} {}. Próxima tela: {}", id, pintar(revisao.situacao()), destino);
    Ok(())
}

pub async fn ver(state: &AppState, args: VerArgs) -> Result<(), AppError> {
    let gateway = state.gateway.as_ref();
    let mut detalhe = DetalheRequerimento::load(gateway, args.id).await?;

    imprimir_cabecalho(detalhe.requerimento());
    println!("  Anexos:");
    if detalhe.anexos().is_empty() {
        println!("    (nenhum)");
    }
    for (anexo, url) in detalhe.download_urls(gateway) {
        imprimir_anexo(anexo, &url);
    }

    if !args.historico && args.expandir.is_empty() {
        return Ok(());
    }

    detalhe.load_logs(gateway).await?;
    for log_id in &args.expandir {
        detalhe.expand(gateway, *log_id).await?;
    }

    println!("  Histórico:");
    if detalhe.logs().is_empty() {
        println!("    (sem alterações registradas)");
    }
    for entry in detalhe.logs() {
        let log = &entry.log;
        println!(
            "  - [{}] {} por {} em {}  {}",
            log.id,
            log.operacao.label(),
            texto(&log.nome_operador),
            timestamp::format(&log.data_operacao),
            pintar(log.situacao)
        );
        println!("      Finalidade: {}", texto(&log.finalidade));
        println!("      Descrição:  {}", texto(&log.descricao));
        if let Some(observacao) = &log.observacao {
            println!("      Observação: {}", observacao);
        }
        if let Some(anexos) = entry.anexos().filter(|_| entry.is_expanded()) {
            if anexos.is_empty() {
                println!("      (sem anexos)");
            }
            for anexo in anexos {
                let url = detalhe.log_anexo_download_url(gateway, log.id, anexo.id);
                imprimir_anexo(anexo, &url);
            }
        }
    }
    Ok(())
}

pub async fn baixar(state: &AppState, args: BaixarArgs) -> Result<(), AppError> {
    let gateway = state.gateway.as_ref();
    let url = match args.log {
        Some(log_id) => gateway.log_anexo_download_url(log_id, args.anexo),
        None => gateway.anexo_download_url(args.anexo),
    };

    let bytes = gateway.download(&url).await?;
    tokio::fs::write(&args.saida, &bytes).await?;
    println!("{} bytes salvos em {}", bytes.len(), args.saida.display());
    Ok(())
}

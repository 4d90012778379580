//src/main.rs

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use portal::{
    common::error::AppError,
    config::{AppConfig, AppState},
    handlers::{
        self,
        auth::{LoginArgs, RegistroArgs},
        requerimentos::{BaixarArgs, EditarArgs, ListarArgs, NovoArgs, VerArgs},
    },
    middleware::{Route, RouteDecision, guard},
};

#[derive(Debug, Parser)]
#[command(name = "portal", version, about = "Portal de requerimentos acadêmicos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Entra no portal e guarda a sessão
    Login(LoginArgs),
    /// Encerra a sessão
    Logout,
    /// Cria uma conta de requerente
    Registrar(RegistroArgs),
    /// Lista os cursos disponíveis no cadastro
    Cursos,
    /// Mostra o usuário conectado
    Sessao,
    /// Painel de requerimentos
    Listar(ListarArgs),
    /// Lista as finalidades aceitas
    Finalidades,
    /// Abre um novo requerimento
    Novo(NovoArgs),
    /// Edita um requerimento (requerente)
    Editar(EditarArgs),
    /// Defere um requerimento (avaliador)
    Deferir { id: i64 },
    /// Indefere um requerimento (avaliador)
    Indeferir { id: i64 },
    /// Detalhes e histórico de um requerimento
    Ver(VerArgs),
    /// Baixa um anexo
    Baixar(BaixarArgs),
}

impl Command {
    // Tela equivalente de cada comando; `None` para os que não passam pelo guarda
    fn route(&self) -> Option<Route> {
        match self {
            Command::Login(_) => Some(Route::Login),
            Command::Registrar(_) => Some(Route::Register),
            Command::Listar(_) => Some(Route::Dashboard),
            Command::Finalidades | Command::Novo(_) => Some(Route::NovoRequerimento),
            Command::Editar(args) => Some(Route::EditarRequerimento(args.id)),
            Command::Deferir { id } | Command::Indeferir { id } => {
                Some(Route::RevisarRequerimento(*id))
            }
            Command::Ver(args) => Some(Route::Requerimento(args.id)),
            Command::Baixar(_) => Some(Route::Dashboard),
            Command::Logout | Command::Sessao | Command::Cursos => None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Logs vão para o stderr; o stdout fica com a saída dos comandos
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("portal=info")),
        )
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = match e.downcast_ref::<AppError>() {
                // Erro de preenchimento não é falha do sistema
                Some(app_error) if app_error.is_client_side() => {
                    tracing::debug!("Entrada recusada: {}", app_error);
                    app_error.user_message()
                }
                Some(app_error) => {
                    tracing::error!("🔥 {:#}", e);
                    app_error.user_message()
                }
                None => {
                    tracing::error!("🔥 {:#}", e);
                    format!("{:#}", e)
                }
            };
            eprintln!("❌ {}", message);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let state = AppState::new(config)?;

    let mut command = cli.command;
    if let Some(route) = command.route() {
        match guard(route, &state.session) {
            RouteDecision::Render(_) => {}
            RouteDecision::Redirect(Route::Dashboard) => {
                println!("Você já está conectado. Indo para o painel.");
                command = Command::Listar(ListarArgs::default());
            }
            RouteDecision::Redirect(target) => {
                anyhow::bail!(
                    "É preciso entrar no portal para acessar {} (tela {}). Use `portal login`.",
                    route,
                    target
                );
            }
        }
    }

    let result = dispatch(&state, command).await;
    state.session.close();
    Ok(result?)
}

async fn dispatch(state: &AppState, command: Command) -> Result<(), AppError> {
    match command {
        Command::Login(args) => handlers::auth::login(state, args).await,
        Command::Logout => handlers::auth::logout(state),
        Command::Registrar(args) => handlers::auth::register(state, args).await,
        Command::Cursos => handlers::auth::cursos(state).await,
        Command::Sessao => handlers::auth::sessao(state),
        Command::Listar(args) => handlers::requerimentos::listar(state, args).await,
        Command::Finalidades => handlers::requerimentos::finalidades(state).await,
        Command::Novo(args) => handlers::requerimentos::novo(state, args).await,
        Command::Editar(args) => handlers::requerimentos::editar(state, args).await,
        Command::Deferir { id } => handlers::requerimentos::deferir(state, id).await,
        Command::Indeferir { id } => handlers::requerimentos::indeferir(state, id).await,
        Command::Ver(args) => handlers::requerimentos::ver(state, args).await,
        Command::Baixar(args) => handlers::requerimentos::baixar(state, args).await,
    }
}

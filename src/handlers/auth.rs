// src/handlers/auth.rs

use clap::Args;

use crate::{
    api::RequerimentoGateway,
    common::error::AppError,
    config::AppState,
    models::auth::{LoginPayload, RegisterPayload},
};

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Usuário (login)
    pub login: String,
    /// Senha; também lida de PORTAL_SENHA
    #[arg(long, env = "PORTAL_SENHA", hide_env_values = true)]
    pub senha: String,
}

#[derive(Debug, Args)]
pub struct RegistroArgs {
    pub login: String,
    #[arg(long, env = "PORTAL_SENHA", hide_env_values = true)]
    pub senha: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub cpf: String,
    /// Id do curso (veja `portal cursos`)
    #[arg(long)]
    pub curso: Option<i64>,
}

pub async fn login(state: &AppState, args: LoginArgs) -> Result<(), AppError> {
    let payload = LoginPayload {
        login: args.login,
        password: args.senha,
    };
    let user = state.session.login(state.gateway.as_ref(), payload).await?;
    println!("Bem-vindo, {} ({}).", user.name, user.role.as_str());
    Ok(())
}

pub fn logout(state: &AppState) -> Result<(), AppError> {
    state.session.logout()?;
    println!("Sessão encerrada.");
    Ok(())
}

pub async fn register(state: &AppState, args: RegistroArgs) -> Result<(), AppError> {
    let payload = RegisterPayload {
        login: args.login,
        password: args.senha,
        email: args.email,
        cpf: args.cpf,
        curso_id: args.curso,
    };
    state.session.register(state.gateway.as_ref(), payload).await?;
    println!("Cadastro realizado. Faça login para continuar.");
    Ok(())
}

pub async fn cursos(state: &AppState) -> Result<(), AppError> {
    let cursos = state.gateway.list_cursos().await?;
    if cursos.is_empty() {
        println!("Nenhum curso cadastrado.");
    }
    for curso in cursos {
        println!("{:>4}  {}", curso.id, curso.nome);
    }
    Ok(())
}

pub fn sessao(state: &AppState) -> Result<(), AppError> {
    match state.session.current_user() {
        Some(user) => {
            println!("Conectado como {} ({})", user.name, user.role.as_str());
            if let Ok(claims) = state.session.claims() {
                if let Some(id) = claims.user_id {
                    println!("Id do usuário: {}", id);
                }
            }
        }
        None => println!("Nenhuma sessão ativa."),
    }
    Ok(())
}

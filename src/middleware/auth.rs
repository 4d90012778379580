// src/middleware/auth.rs

use std::fmt;

use crate::{models::auth::Role, services::auth::Session};

/// Telas do portal, identificadas pelo mesmo caminho da versão web.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    NovoRequerimento,
    Requerimento(i64),
    EditarRequerimento(i64),
    RevisarRequerimento(i64),
    NotFound,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::NovoRequerimento => "/new-requirement".to_string(),
            Route::Requerimento(id) => format!("/requirement/{}", id),
            Route::EditarRequerimento(id) => format!("/requirement/{}/edit", id),
            Route::RevisarRequerimento(id) => format!("/requirement/{}/review", id),
            Route::NotFound => "/404".to_string(),
        }
    }

    pub fn parse(path: &str) -> Route {
        let segments: Vec<&str> = path
            .trim()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] | ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["new-requirement"] => Route::NovoRequerimento,
            ["requirement", id, rest @ ..] => match (id.parse::<i64>(), rest) {
                (Ok(id), []) => Route::Requerimento(id),
                (Ok(id), ["edit"]) => Route::EditarRequerimento(id),
                (Ok(id), ["review"]) => Route::RevisarRequerimento(id),
                _ => Route::NotFound,
            },
            _ => Route::NotFound,
        }
    }

    /// Telas acessíveis sem sessão.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Register | Route::NotFound)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Route),
    Redirect(Route),
}

/// Regra das rotas:
/// - rota protegida sem sessão vai para o login;
/// - login/registro com sessão ativa vai para o painel.
pub fn guard_for(route: Route, authenticated: bool) -> RouteDecision {
    match (route.is_public(), authenticated) {
        (false, false) => RouteDecision::Redirect(Route::Login),
        (true, true) if matches!(route, Route::Login | Route::Register) => {
            RouteDecision::Redirect(Route::Dashboard)
        }
        _ => RouteDecision::Render(route),
    }
}

pub fn guard(route: Route, session: &Session) -> RouteDecision {
    let decision = guard_for(route, session.is_authenticated());
    if let RouteDecision::Redirect(target) = decision {
        tracing::debug!("🚧 {} redirecionado para {}", route, target);
    }
    decision
}

/// Destino do link de edição no painel, que depende do papel.
pub fn edit_route(role: Role, requerimento_id: i64) -> Route {
    match role {
        Role::Admin => Route::RevisarRequerimento(requerimento_id),
        Role::User => Route::EditarRequerimento(requerimento_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        for route in [
            Route::Login,
            Route::Register,
            Route::Dashboard,
            Route::NovoRequerimento,
            Route::Requerimento(12),
            Route::EditarRequerimento(12),
            Route::RevisarRequerimento(12),
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
        assert_eq!(Route::parse("/requirement/abc"), Route::NotFound);
        assert_eq!(Route::parse("/requirement/3/delete"), Route::NotFound);
        assert_eq!(Route::parse("/login"), Route::Login);
    }

    #[test]
    fn protected_routes_require_session() {
        for route in [
            Route::Dashboard,
            Route::NovoRequerimento,
            Route::Requerimento(1),
            Route::EditarRequerimento(1),
            Route::RevisarRequerimento(1),
        ] {
            assert_eq!(guard_for(route, false), RouteDecision::Redirect(Route::Login));
            assert_eq!(guard_for(route, true), RouteDecision::Render(route));
        }
    }

    #[test]
    fn public_routes_skip_when_logged_in() {
        assert_eq!(guard_for(Route::Login, false), RouteDecision::Render(Route::Login));
        assert_eq!(guard_for(Route::Login, true), RouteDecision::Redirect(Route::Dashboard));
        assert_eq!(guard_for(Route::Register, true), RouteDecision::Redirect(Route::Dashboard));
        assert_eq!(guard_for(Route::NotFound, true), RouteDecision::Render(Route::NotFound));
    }

    #[test]
    fn edit_link_depends_on_role() {
        assert_eq!(edit_route(Role::Admin, 5).path(), "/requirement/5/review");
        assert_eq!(edit_route(Role::User, 5).path(), "/requirement/5/edit");
    }
}

// src/api/endpoints.rs

use reqwest::Url;

use crate::{
    common::error::AppError,
    models::requerimento::{PageQuery, SituacaoCode},
};

/// Monta as URLs da API a partir da URL base.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base: Url) -> Result<Self, AppError> {
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(AppError::InvalidBaseUrl(base.to_string()));
        }
        Ok(Self { base })
    }

    pub fn parse(base: &str) -> Result<Self, AppError> {
        let url = Url::parse(base.trim()).map_err(|_| AppError::InvalidBaseUrl(base.to_string()))?;
        Self::new(url)
    }

    // Acrescenta segmentos ao caminho da base, sem depender da barra final
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn login(&self) -> Url {
        self.url(&["auth", "login"])
    }

    pub fn register(&self) -> Url {
        self.url(&["auth", "register"])
    }

    pub fn finalidades(&self) -> Url {
        self.url(&["finalidade"])
    }

    pub fn cursos(&self) -> Url {
        self.url(&["cursos"])
    }

    pub fn requerimentos(&self) -> Url {
        self.url(&["requerimentos"])
    }

    pub fn requerimentos_by_user(&self, user_id: &str, query: PageQuery) -> Url {
        let mut url = self.url(&["requerimentos", "usuario", user_id]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("size", &query.size.to_string());
            if let Some(year) = query.year {
                pairs.append_pair("year", &year.to_string());
            }
        }
        url
    }

    pub fn requerimento(&self, id: i64) -> Url {
        self.url(&["requerimentos", &id.to_string()])
    }

    pub fn situacao(&self, id: i64, code: SituacaoCode) -> Url {
        let mut url = self.url(&["requerimentos", &id.to_string(), "situacao"]);
        url.query_pairs_mut().append_pair("situacao", code.as_code());
        url
    }

    pub fn anexos(&self, requerimento_id: i64) -> Url {
        self.url(&["anexos", "requerimento", &requerimento_id.to_string()])
    }

    pub fn anexo_download(&self, anexo_id: i64) -> Url {
        self.url(&["anexos", &anexo_id.to_string(), "download"])
    }

    pub fn logs(&self, requerimento_id: i64) -> Url {
        self.url(&["requerimentos", "logs", &requerimento_id.to_string()])
    }

    pub fn log_anexos(&self, log_id: i64) -> Url {
        self.url(&["anexos", "log", "requerimento-log", &log_id.to_string()])
    }

    pub fn log_anexo_download(&self, log_id: i64, anexo_id: i64) -> Url {
        self.url(&[
            "anexos",
            "log",
            "requerimento-log",
            &log_id.to_string(),
            "anexo",
            &anexo_id.to_string(),
            "download",
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::parse("http://localhost:8080/").unwrap()
    }

    #[test]
    fn paginated_url_carries_page_size_and_year() {
        let url = endpoints().requerimentos_by_user(
            "42",
            PageQuery { page: 0, size: 10, year: Some(2024) },
        );
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/requerimentos/usuario/42?page=0&size=10&year=2024"
        );
        assert!(url.as_str().contains("page=0&size=10&year=2024"));
    }

    #[test]
    fn year_is_omitted_when_absent() {
        let url = endpoints().requerimentos_by_user("42", PageQuery::default());
        assert_eq!(url.query(), Some("page=0&size=10"));
        assert!(!url.as_str().contains("year"));
    }

    #[test]
    fn base_with_path_keeps_prefix_with_or_without_slash() {
        for base in ["https://exemplo.edu.br/api", "https://exemplo.edu.br/api/"] {
            let endpoints = Endpoints::parse(base).unwrap();
            assert_eq!(endpoints.login().as_str(), "https://exemplo.edu.br/api/auth/login");
        }
    }

    #[test]
    fn download_urls_are_deterministic() {
        let endpoints = endpoints();
        assert_eq!(
            endpoints.anexo_download(9).as_str(),
            "http://localhost:8080/anexos/9/download"
        );
        assert_eq!(
            endpoints.log_anexo_download(4, 9).as_str(),
            "http://localhost:8080/anexos/log/requerimento-log/4/anexo/9/download"
        );
    }

    #[test]
    fn status_update_url_uses_single_letter_code() {
        let endpoints = endpoints();
        assert_eq!(
            endpoints.situacao(5, SituacaoCode::Deferir).as_str(),
            "http://localhost:8080/requerimentos/5/situacao?situacao=D"
        );
        assert_eq!(
            endpoints.situacao(5, SituacaoCode::Indeferir).query(),
            Some("situacao=I")
        );
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(matches!(
            Endpoints::parse("mailto:secretaria@ifsc.edu.br"),
            Err(AppError::InvalidBaseUrl(_))
        ));
        assert!(Endpoints::parse("não é url").is_err());
    }
}

// src/models/historico.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{requerimento::Situacao, timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operacao {
    Insert,
    Update,
    Delete,
    Desconhecida,
}

impl Operacao {
    pub fn label(&self) -> &'static str {
        match self {
            Operacao::Insert => "Criação",
            Operacao::Update => "Alteração",
            Operacao::Delete => "Exclusão",
            Operacao::Desconhecida => "Operação desconhecida",
        }
    }
}

impl<'de> Deserialize<'de> for Operacao {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw.as_ref().and_then(serde_json::Value::as_str).map(str::trim) {
            Some(op) if op.eq_ignore_ascii_case("INSERT") => Operacao::Insert,
            Some(op) if op.eq_ignore_ascii_case("UPDATE") => Operacao::Update,
            Some(op) if op.eq_ignore_ascii_case("DELETE") => Operacao::Delete,
            _ => Operacao::Desconhecida,
        })
    }
}

fn operacao_desconhecida() -> Operacao {
    Operacao::Desconhecida
}

// Um registro do histórico: retrato do requerimento no momento da operação
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequerimentoLog {
    #[serde(alias = "idLog", alias = "logId")]
    pub id: i64,
    #[serde(default = "operacao_desconhecida")]
    pub operacao: Operacao,
    #[serde(default, alias = "operador", alias = "usuarioOperacao")]
    pub nome_operador: Option<String>,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub data_operacao: Option<NaiveDateTime>,
    #[serde(default)]
    pub situacao: Situacao,
    #[serde(default)]
    pub finalidade: Option<String>,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub observacao: Option<String>,
}

// Envelope devolvido por `requerimentos/logs/{id}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    #[serde(default)]
    pub requerimento_logs: Vec<RequerimentoLog>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_history_envelope() {
        let body = r#"{"requerimentoLogs": [
            {"id": 1, "operacao": "INSERT", "nomeOperador": "ana", "situacao": "PENDENTE",
             "dataOperacao": "2024-02-01T08:00:00"},
            {"idLog": 2, "operacao": "update", "nomeOperador": "secretaria", "situacao": "DEFERIDO",
             "observacao": "Documentação conferida"},
            {"id": 3, "operacao": "MERGE"}
        ]}"#;
        let logs: LogsResponse = serde_json::from_str(body).unwrap();
        let logs = logs.requerimento_logs;

        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].operacao, Operacao::Insert);
        assert!(logs[0].data_operacao.is_some());
        assert_eq!(logs[1].id, 2);
        assert_eq!(logs[1].operacao, Operacao::Update);
        assert_eq!(logs[1].situacao, Situacao::Deferido);
        assert_eq!(logs[2].operacao, Operacao::Desconhecida);
        assert_eq!(logs[2].situacao, Situacao::Desconhecido);
    }

    #[test]
    fn malformed_entry_fields_fall_back_to_unknown() {
        let body = r#"{"requerimentoLogs": [
            {"id": 1, "operacao": 3, "situacao": ["DEFERIDO"]},
            {"id": 2, "operacao": "DELETE", "situacao": "INDEFERIDO"}
        ]}"#;
        let logs = serde_json::from_str::<LogsResponse>(body).unwrap().requerimento_logs;

        assert_eq!(logs[0].operacao, Operacao::Desconhecida);
        assert_eq!(logs[0].situacao, Situacao::Desconhecido);
        assert_eq!(logs[1].operacao, Operacao::Delete);
        assert_eq!(logs[1].situacao, Situacao::Indeferido);
    }
}

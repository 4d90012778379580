// tests/gateway_http.rs

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Multipart, Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post, put},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use reqwest::Url;
use serde_json::{Value, json};

use portal::{
    api::{ApiClient, ApiConfig, RequerimentoGateway, TokenProvider},
    common::error::AppError,
    models::{
        anexo::UploadFile,
        auth::{LoginPayload, Role, StoredSession, User},
        requerimento::{AtualizacaoRequerimento, NovoRequerimento, PageQuery, Situacao, SituacaoCode},
    },
    services::auth::Session,
    storage::{FileTokenStore, MemoryTokenStore, TokenStore},
};

// --- Backend falso ---

#[derive(Debug, Clone, Default)]
struct Captured {
    path: String,
    query: Option<String>,
    authorization: Option<String>,
    content_type: Option<String>,
    fields: Vec<(String, String)>,
    files: Vec<String>,
}

type Log = Arc<Mutex<Vec<Captured>>>;

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn capture(log: &Log, path: String, query: Option<String>, headers: &HeaderMap) -> usize {
    let mut log = log.lock().unwrap();
    log.push(Captured {
        path,
        query,
        authorization: header_value(headers, header::AUTHORIZATION),
        content_type: header_value(headers, header::CONTENT_TYPE),
        ..Default::default()
    });
    log.len() - 1
}

async fn read_multipart(log: &Log, index: usize, mut multipart: Multipart) {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap();

        let mut log = log.lock().unwrap();
        let entry = &mut log[index];
        match file_name {
            Some(file_name) if name == "files" => entry.files.push(file_name),
            _ => entry.fields.push((name, String::from_utf8_lossy(&data).into_owned())),
        }
    }
}

fn requerimento_json(id: i64, situacao: &str) -> Value {
    json!({
        "id": id,
        "nomeUsuario": "Ana Souza",
        "nomeCurso": "Técnico em Informática",
        "finalidade": "Trancamento de Matrícula",
        "descricao": "Solicito trancamento",
        "situacao": situacao,
        "dataCriacao": "2024-03-01T10:15:30"
    })
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] == "errada" {
        return (StatusCode::UNAUTHORIZED, "Credenciais inválidas").into_response();
    }
    let token = mint(json!({ "sub": body["login"], "role": "ADMIN", "user_id": 42 }));
    Json(json!({ "token": token })).into_response()
}

async fn by_user(
    State(log): State<Log>,
    Path(user_id): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Json<Value> {
    capture(&log, format!("/requerimentos/usuario/{}", user_id), query, &headers);
    Json(json!({
        "content": [requerimento_json(7, "PENDENTE")],
        "totalPages": 3,
        "totalElements": 21
    }))
}

async fn create(State(log): State<Log>, headers: HeaderMap, multipart: Multipart) -> StatusCode {
    let index = capture(&log, "/requerimentos".into(), None, &headers);
    read_multipart(&log, index, multipart).await;
    StatusCode::OK
}

async fn update(
    State(log): State<Log>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Json<Value> {
    let index = capture(&log, format!("/requerimentos/{}", id), None, &headers);
    read_multipart(&log, index, multipart).await;
    Json(requerimento_json(id, "PENDENTE"))
}

async fn get_one(Path(id): Path<i64>) -> impl IntoResponse {
    if id == 99 {
        return (StatusCode::NOT_FOUND, "Requerimento não encontrado").into_response();
    }
    Json(requerimento_json(id, "PENDENTE")).into_response()
}

async fn situacao(
    State(log): State<Log>,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> StatusCode {
    capture(&log, format!("/requerimentos/{}/situacao", id), query, &headers);
    StatusCode::OK
}

async fn finalidades(State(log): State<Log>, headers: HeaderMap) -> StatusCode {
    // 200 sem corpo
    capture(&log, "/finalidade".into(), None, &headers);
    StatusCode::OK
}

async fn logs(Path(id): Path<i64>) -> Json<Value> {
    Json(json!({
        "requerimentoLogs": [{
            "id": 100,
            "operacao": "update",
            "nomeOperador": "secretaria",
            "dataOperacao": "2024-03-02 09:00:00",
            "situacao": "DEFERIDO",
            "finalidade": "Trancamento de Matrícula",
            "descricao": format!("Log do requerimento {}", id)
        }]
    }))
}

async fn download(Path(id): Path<i64>) -> Bytes {
    Bytes::from(format!("anexo-{}", id))
}

async fn spawn_backend() -> (String, Log) {
    let log: Log = Arc::default();
    let router = Router::new()
        .route("/auth/login", post(login))
        .route("/cursos", get(|| async { Json(json!([{ "id": 2, "nome": "Informática" }])) }))
        .route("/finalidade", get(finalidades))
        .route("/requerimentos", get(|| async { StatusCode::UNAUTHORIZED }).post(create))
        .route("/requerimentos/usuario/{user_id}", get(by_user))
        .route("/requerimentos/logs/{id}", get(logs))
        .route("/requerimentos/{id}", get(get_one).put(update))
        .route("/requerimentos/{id}/situacao", put(situacao))
        .route("/anexos/{id}/download", get(download))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}/", addr), log)
}

// --- Cliente ---

fn mint(claims: Value) -> String {
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"segredo-de-teste")).unwrap()
}

fn logged_store() -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_session(StoredSession {
        auth_token: "abc.def.ghi".into(),
        user: User { name: "ana".into(), role: Role::User },
    }))
}

fn client(base: &str, provider: Arc<dyn TokenProvider>) -> ApiClient {
    ApiClient::new(ApiConfig::new(Url::parse(base).unwrap(), provider)).unwrap()
}

#[tokio::test]
async fn paginated_list_sends_query_and_headers() {
    let (base, log) = spawn_backend().await;
    let api = client(&base, logged_store());

    let page = api
        .list_requerimentos_by_user("42", PageQuery { page: 0, size: 10, year: Some(2024) })
        .await
        .unwrap();

    assert_eq!(page.total_pages, 3);
    assert_eq!(page.content[0].situacao, Situacao::Pendente);

    let captured = log.lock().unwrap()[0].clone();
    assert_eq!(captured.path, "/requerimentos/usuario/42");
    assert_eq!(captured.query.as_deref(), Some("page=0&size=10&year=2024"));
    assert_eq!(captured.authorization.as_deref(), Some("Bearer abc.def.ghi"));
    assert_eq!(captured.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn create_sends_repeated_files_parts() {
    let (base, log) = spawn_backend().await;
    let api = client(&base, logged_store());

    let novo = NovoRequerimento {
        finalidade_id: 3,
        justificativa: "Solicito trancamento".into(),
        files: vec![
            UploadFile::new("atestado.pdf", b"%PDF-1.4".to_vec()),
            UploadFile::new("foto.png", vec![137, 80, 78, 71]),
        ],
    };
    let criado = api.create_requerimento(&novo).await.unwrap();
    assert!(criado.is_none());

    let captured = log.lock().unwrap()[0].clone();
    assert!(captured.content_type.unwrap().starts_with("multipart/form-data; boundary="));
    assert_eq!(captured.authorization.as_deref(), Some("Bearer abc.def.ghi"));
    assert_eq!(
        captured.fields,
        vec![
            ("finalidade".to_string(), "3".to_string()),
            ("justificativa".to_string(), "Solicito trancamento".to_string()),
        ]
    );
    assert_eq!(captured.files, vec!["atestado.pdf", "foto.png"]);
}

#[tokio::test]
async fn update_sends_retained_attachment_ids() {
    let (base, log) = spawn_backend().await;
    let api = client(&base, logged_store());

    let dados = AtualizacaoRequerimento {
        finalidade_id: 4,
        justificativa: "Nova justificativa".into(),
        manter_anexos: vec![3, 13],
        files: vec![UploadFile::new("novo.pdf", vec![1])],
    };
    let atualizado = api.update_requerimento(8, &dados).await.unwrap().unwrap();
    assert_eq!(atualizado.id, 8);

    let captured = log.lock().unwrap()[0].clone();
    assert_eq!(captured.path, "/requerimentos/8");
    assert!(captured.fields.contains(&("manterAnexos".to_string(), "3,13".to_string())));
    assert_eq!(captured.files, vec!["novo.pdf"]);
}

#[tokio::test]
async fn update_without_retained_attachments_omits_field() {
    let (base, log) = spawn_backend().await;
    let api = client(&base, logged_store());

    let dados = AtualizacaoRequerimento {
        finalidade_id: 4,
        justificativa: "Sem anexos".into(),
        manter_anexos: Vec::new(),
        files: Vec::new(),
    };
    api.update_requerimento(8, &dados).await.unwrap();

    let captured = log.lock().unwrap()[0].clone();
    assert!(captured.fields.iter().all(|(name, _)| name != "manterAnexos"));
    assert!(captured.files.is_empty());
}

#[tokio::test]
async fn unauthorized_clears_the_session() {
    let (base, _) = spawn_backend().await;
    let store = logged_store();
    let api = client(&base, store.clone());

    let err = api.list_requerimentos().await.unwrap_err();

    assert!(matches!(err, AppError::Unauthorized { .. }));
    assert!(store.load().unwrap().is_none());
    assert_eq!(err.user_message(), "Sessão expirada ou inválida. Faça login novamente.");
}

#[tokio::test]
async fn empty_body_means_empty_list() {
    let (base, log) = spawn_backend().await;
    let api = client(&base, logged_store());

    let finalidades = api.list_finalidades().await.unwrap();

    assert!(finalidades.is_empty());
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn non_success_keeps_status_and_body() {
    let (base, _) = spawn_backend().await;
    let store = logged_store();
    let api = client(&base, store.clone());

    match api.get_requerimento(99).await {
        Err(AppError::Http { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "Requerimento não encontrado");
        }
        other => panic!("esperava erro HTTP, veio {:?}", other),
    }
    assert!(store.load().unwrap().is_some());
}

#[tokio::test]
async fn missing_token_fails_before_any_request() {
    let (base, log) = spawn_backend().await;
    let api = client(&base, Arc::new(MemoryTokenStore::new()));

    assert!(matches!(api.list_finalidades().await, Err(AppError::MissingToken)));
    assert!(log.lock().unwrap().is_empty());

    // Cursos é público
    let cursos = api.list_cursos().await.unwrap();
    assert_eq!(cursos[0].nome, "Informática");
}

#[tokio::test]
async fn status_update_sends_single_letter_code() {
    let (base, log) = spawn_backend().await;
    let api = client(&base, logged_store());

    let resposta = api.update_situacao(5, SituacaoCode::Deferir).await.unwrap();
    assert!(resposta.is_none());

    let captured = log.lock().unwrap()[0].clone();
    assert_eq!(captured.path, "/requerimentos/5/situacao");
    assert_eq!(captured.query.as_deref(), Some("situacao=D"));
}

#[tokio::test]
async fn history_and_downloads() {
    let (base, _) = spawn_backend().await;
    let api = client(&base, logged_store());

    let logs = api.list_logs(5).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].id, 100);
    assert_eq!(logs[0].situacao, Situacao::Deferido);
    assert!(logs[0].data_operacao.is_some());

    let url = api.anexo_download_url(9);
    assert_eq!(url.path(), "/anexos/9/download");
    assert_eq!(api.download(&url).await.unwrap(), b"anexo-9");
}

#[tokio::test]
async fn login_writes_session_file() {
    let (base, _) = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessao").join("session.json");
    let store = Arc::new(FileTokenStore::new(&path));
    let api = client(&base, store.clone());
    let session = Session::open(store);

    let user = session
        .login(&api, LoginPayload { login: "ana".into(), password: "123".into() })
        .await
        .unwrap();

    assert_eq!(user.role, Role::Admin);
    assert!(session.is_authenticated());
    assert_eq!(session.current_user_id().unwrap(), "42");

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(saved["authToken"].as_str().unwrap().split('.').count() == 3);
    assert_eq!(saved["user"], json!({ "name": "ana", "role": "ADMIN" }));
}

#[tokio::test]
async fn wrong_password_is_a_plain_http_error() {
    let (base, _) = spawn_backend().await;
    let store = logged_store();
    let api = client(&base, store.clone());
    let session = Session::open(store.clone());

    let err = session
        .login(&api, LoginPayload { login: "ana".into(), password: "errada".into() })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Http { status: 401, .. }));
    // Sessão anterior continua lá: login é uma chamada pública
    assert!(store.load().unwrap().is_some());
}

#[tokio::test]
async fn unreadable_error_body_still_reports_status() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Servidor que promete 100 bytes de corpo e fecha a conexão antes
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 2048];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\nConnection: close\r\n\r\nfalh",
            )
            .await
            .unwrap();
    });

    let api = client(&format!("http://{}/", addr), Arc::new(MemoryTokenStore::new()));
    let err = api.list_cursos().await.unwrap_err();

    assert!(matches!(&err, AppError::Http { status: 500, body } if body.is_empty()));
}

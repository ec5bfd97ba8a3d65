use actix_web::{http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};
use std::{
    collections::HashMap,
    fmt::Debug,
    net::TcpListener,
    sync::{Arc, LazyLock, Mutex},
    time::{Duration, Instant},
};
use stockroom_client_core::{Client, MemoryStore};
use stockroom_shared::{
    const_config::path::PATH_LOGIN,
    req_args::LoginReqArgs,
    telemetry::{self, get_subscriber, init_subscriber},
};
use uuid::Uuid;

const WAIT_TIMEOUT: Duration = Duration::from_secs(2);

// Ensure that the `tracing` stack is only initialised once
pub static TRACING: LazyLock<String> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let log_file_name = format!("client_tests{}", Uuid::new_v4());
        let (file, path) = telemetry::create_trace_file(&log_file_name).unwrap();
        let subscriber = get_subscriber(subscriber_name, default_filter_level, file);
        init_subscriber(subscriber).unwrap();
        format!("Traces for tests being written to: {path:?}")
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber).unwrap();
        "Traces set to std::io::sink".to_string()
    }
});

/// What the fake API answers on one path
#[derive(Debug, Clone)]
pub struct CannedResponse {
    status: u16,
    body: CannedBody,
}

#[derive(Debug, Clone)]
enum CannedBody {
    Json(serde_json::Value),
    Text(String),
}

impl CannedResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: CannedBody::Json(body),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: CannedBody::Text(body.to_string()),
        }
    }
}

/// A request as the fake API saw it
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct ServerState {
    responses: HashMap<String, CannedResponse>,
    received: Mutex<Vec<ReceivedRequest>>,
}

pub struct TestApp {
    pub address: String,
    pub kv: MemoryStore,
    pub core_client: Client,
    state: web::Data<ServerState>,
}

impl Debug for TestApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestApp")
            .field("address", &self.address)
            .finish()
    }
}

impl TestApp {
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().unwrap().clone()
    }

    pub async fn login(&self) -> anyhow::Result<stockroom_client_core::LoginOutcome> {
        self.core_client
            .login(login_args(), no_cb)
            .await
            .expect("failed to receive on rx")
    }
}

/// Empty function for use when a call back isn't needed
pub fn no_cb() {}

pub fn login_args() -> LoginReqArgs {
    LoginReqArgs::new("ana", "secret-password".to_string().into())
}

/// The login response of a working server
pub fn login_ok_body(role: &str) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "token": "abc123",
            "usuario": {
                "id": 7,
                "usuario": "ana",
                "nombre": "Ana",
                "email_phone": "ana@example.com",
                "estado": true,
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-02T00:00:00Z",
                "permisos": role
            }
        }
    })
}

pub async fn spawn_app_with_login(login: CannedResponse) -> TestApp {
    spawn_app([(PATH_LOGIN.path, login)]).await
}

pub async fn spawn_app<I>(responses: I) -> TestApp
where
    I: IntoIterator<Item = (&'static str, CannedResponse)>,
{
    LazyLock::force(&TRACING);
    let state = web::Data::new(ServerState {
        responses: responses
            .into_iter()
            .map(|(path, response)| (path.to_string(), response))
            .collect(),
        received: Default::default(),
    });
    let address = start_server_in_background(state.clone());
    let kv = MemoryStore::new();
    let core_client = Client::new(address.clone(), Arc::new(kv.clone()));
    TestApp {
        address,
        kv,
        core_client,
        state,
    }
}

/// An address where nothing is listening
pub fn unused_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port_to_test_address(port)
}

pub fn port_to_test_address(application_port: u16) -> String {
    format!("http://127.0.0.1:{application_port}")
}

fn start_server_in_background(state: web::Data<ServerState>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .default_service(web::to(canned_handler))
    })
    .workers(1)
    .listen(listener)
    .expect("failed to listen")
    .run();
    // Not awaited, the server runs until the test ends
    let _ = tokio::spawn(server);
    port_to_test_address(port)
}

async fn canned_handler(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<ServerState>,
) -> HttpResponse {
    let path = req.path().to_string();
    state.received.lock().unwrap().push(ReceivedRequest {
        method: req.method().to_string(),
        path: path.clone(),
        query: req.query_string().to_string(),
        authorization: req
            .headers()
            .get("authorization")
            .and_then(|x| x.to_str().ok())
            .map(ToString::to_string),
        body: String::from_utf8_lossy(&body).to_string(),
    });
    let Some(canned) = state.responses.get(&path) else {
        return HttpResponse::NotFound().finish();
    };
    let mut builder = HttpResponse::build(StatusCode::from_u16(canned.status).unwrap());
    match &canned.body {
        CannedBody::Json(value) => builder.json(value),
        CannedBody::Text(text) => builder.content_type("text/plain").body(text.clone()),
    }
}

/// Polls `condition` until it is true or the timeout expires
pub async fn wait_until<F, Fut>(mut condition: F) -> anyhow::Result<()>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = Instant::now();
    while start.elapsed() < WAIT_TIMEOUT {
        if condition().await {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    anyhow::bail!("Timed out after {WAIT_TIMEOUT:?}")
}

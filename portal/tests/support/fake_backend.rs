//! In-process stand-in for the grading backend.
//!
//! Actix spawns its workers with `spawn_local`, so the server runs on a
//! current-thread Tokio runtime driven through a `LocalSet`. Every client
//! call must go through [`FakeBackend::block_on`] so the server keeps being
//! polled while the request is in flight.

use std::future::Future;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use reqwest::Url;
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

/// Token issued to `teacher1`.
pub(crate) const TEACHER_TOKEN: &str = "teacher-token";

/// Authorization headers observed by the fake, newest last.
#[derive(Clone, Default)]
pub(crate) struct SeenHeaders(Arc<Mutex<Vec<Option<String>>>>);

impl SeenHeaders {
    fn record(&self, request: &HttpRequest) {
        let header = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        self.0.lock().expect("headers lock").push(header);
    }

    /// Most recent `Authorization` header, if the last request had one.
    pub(crate) fn last(&self) -> Option<String> {
        self.0.lock().expect("headers lock").last().cloned().flatten()
    }
}

/// How the health endpoint answers.
#[derive(Clone, Copy)]
pub(crate) enum HealthMode {
    /// `200` with a JSON status body.
    Up,
    /// `503 Service Unavailable`.
    Down,
}

pub(crate) struct FakeBackend {
    runtime: Runtime,
    local: LocalSet,
    base_url: Url,
    server: ServerHandle,
    seen: SeenHeaders,
}

impl FakeBackend {
    pub(crate) fn start(health: HealthMode) -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        let local = LocalSet::new();
        let seen = SeenHeaders::default();
        let server_seen = seen.clone();
        let (base_url, server) = local.block_on(&runtime, async move {
            spawn_server(server_seen, health).expect("fake backend")
        });
        Self {
            runtime,
            local,
            base_url,
            server,
            seen,
        }
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn seen(&self) -> &SeenHeaders {
        &self.seen
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.local.block_on(&self.runtime, future)
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        let server = self.server.clone();
        self.local.block_on(&self.runtime, async move {
            server.stop(true).await;
        });
    }
}

/// Base address on a port nothing listens on.
pub(crate) fn unreachable_base_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    Url::parse(&format!("http://{addr}")).expect("unreachable url")
}

fn spawn_server(seen: SeenHeaders, health: HealthMode) -> Result<(Url, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let seen = web::Data::new(seen);
    let health = web::Data::new(health);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(seen.clone())
            .app_data(health.clone())
            .route("/api/auth/signin", web::post().to(sign_in))
            .route("/api/teacher/courses", web::get().to(teacher_courses))
            .route("/api/admin/users", web::post().to(create_user))
            .route("/api/system/health", web::get().to(system_health))
            .route("/api/plain", web::get().to(plain_text))
            .route("/api/broken", web::get().to(broken_json))
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    let url = Url::parse(&format!("http://{addr}")).map_err(|err| err.to_string())?;
    Ok((url, handle))
}

async fn sign_in(
    request: HttpRequest,
    seen: web::Data<SeenHeaders>,
    body: web::Json<Value>,
) -> HttpResponse {
    seen.record(&request);
    let identifier = body.get("usernameOrEmail").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    match (identifier, password) {
        (Some("teacher1" | "teacher1@example.edu"), Some("validpass")) => {
            HttpResponse::Ok().json(json!({
                "token": TEACHER_TOKEN,
                "type": "Bearer",
                "id": 21,
                "username": "teacher1",
                "email": "teacher1@example.edu",
                "fullName": "Nguyen Van A",
                "role": "TEACHER",
            }))
        }
        (Some("blank-token"), _) => HttpResponse::Ok().json(json!({
            "token": "",
            "id": 1,
            "username": "blank-token",
            "email": "blank@example.edu",
            "role": "STUDENT",
        })),
        _ => HttpResponse::Unauthorized().finish(),
    }
}

fn bearer_matches(request: &HttpRequest) -> bool {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TEACHER_TOKEN}"))
}

async fn teacher_courses(request: HttpRequest, seen: web::Data<SeenHeaders>) -> HttpResponse {
    seen.record(&request);
    if !bearer_matches(&request) {
        return HttpResponse::Unauthorized().finish();
    }
    HttpResponse::Ok().json(json!([{ "id": 1, "code": "CS101", "name": "Programming I" }]))
}

async fn create_user(
    request: HttpRequest,
    seen: web::Data<SeenHeaders>,
    body: web::Json<Value>,
) -> HttpResponse {
    seen.record(&request);
    if !bearer_matches(&request) {
        return HttpResponse::Forbidden().json(json!({ "message": "Admins only" }));
    }
    if body.get("email").and_then(Value::as_str) == Some("taken@example.edu") {
        return HttpResponse::BadRequest().json(json!({ "error": "Email already in use" }));
    }
    HttpResponse::Ok().json(json!({ "message": "User created successfully" }))
}

async fn system_health(health: web::Data<HealthMode>) -> HttpResponse {
    match health.get_ref() {
        HealthMode::Up => HttpResponse::Ok().json(json!({ "status": "UP" })),
        HealthMode::Down => HttpResponse::ServiceUnavailable().finish(),
    }
}

async fn plain_text() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("OK")
}

async fn broken_json() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body("{not json")
}

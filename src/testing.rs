//! Local stand-in for the LLM provider, used by tests that exercise the real
//! outbound HTTP path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use actix_web::{http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::Value;

pub struct FakeProvider {
    hits: AtomicUsize,
    bodies: Mutex<Vec<Value>>,
    queries: Mutex<Vec<String>>,
    status: StatusCode,
    reply: Value,
}

impl FakeProvider {
    /// Starts a provider on an ephemeral port that answers every request
    /// with `status` and `reply`. Returns the base URL and the shared state.
    pub async fn spawn(status: StatusCode, reply: Value) -> (String, web::Data<FakeProvider>) {
        let state = web::Data::new(FakeProvider {
            hits: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            status,
            reply,
        });

        let data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(record))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .expect("bind fake provider");

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        (format!("http://{}/endpoint", addr), state)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

async fn record(
    state: web::Data<FakeProvider>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.queries.lock().unwrap().push(req.query_string().to_string());
    state
        .bodies
        .lock()
        .unwrap()
        .push(serde_json::from_slice(&body).unwrap_or(Value::Null));
    HttpResponse::build(state.status).json(&state.reply)
}

/// A port nothing listens on, for transport-failure tests.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("http://{}/endpoint", addr)
}

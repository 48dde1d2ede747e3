//! Test doubles shared by the unit tests
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::Endpoints;
use crate::controller::RefreshSignal;
use crate::gateway::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::notifier::{NoticeLevel, Notifier};
use crate::session::Session;

const TEST_SECRET: &[u8] = b"portal-test-secret";

pub fn token_from_claims(claims: Value) -> String {
    encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET))
        .expect("test token encodes")
}

pub fn token_with_exp(user_id: &str, exp: i64) -> String {
    token_from_claims(json!({ "userId": user_id, "exp": exp, "iat": 0 }))
}

/// Token for `user_id` that expires far in the future
pub fn token_for(user_id: &str) -> String {
    token_with_exp(user_id, 4_102_444_800)
}

pub fn session_for(user_id: &str) -> Arc<Session> {
    let session = Session::in_memory();
    session.set_token(token_for(user_id)).expect("memory store accepts token");
    Arc::new(session)
}

pub fn endpoints() -> Endpoints {
    Endpoints::new("http://localhost:3200", "mobile").expect("valid test base URL")
}

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync;

/// Transport that records every request and answers from a closure
pub struct RecordingTransport {
    responder: Box<Responder>,
    delay: Option<Duration>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    fn build(responder: Box<Responder>, delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            responder,
            delay,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn with(respond: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static) -> Arc<Self> {
        Self::build(Box::new(move |request: &HttpRequest| Ok(respond(request))), None)
    }

    pub fn respond(response: HttpResponse) -> Arc<Self> {
        Self::build(Box::new(move |_: &HttpRequest| Ok(response.clone())), None)
    }

    pub fn delayed(response: HttpResponse, delay: Duration) -> Arc<Self> {
        Self::build(Box::new(move |_: &HttpRequest| Ok(response.clone())), Some(delay))
    }

    pub fn ok(body: Value) -> Arc<Self> {
        Self::respond(HttpResponse::json(200, body))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        let message = message.to_string();
        Self::build(Box::new(move |_: &HttpRequest| Err(TransportError(message.clone()))), None)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(&request)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_level(&self, level: NoticeLevel) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.with_level(NoticeLevel::Error)
    }

    pub fn successes(&self) -> Vec<String> {
        self.with_level(NoticeLevel::Success)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.lock().unwrap().push((level, message.to_string()));
    }
}

#[derive(Default)]
pub struct CountingRefresh {
    count: AtomicUsize,
}

impl CountingRefresh {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RefreshSignal for CountingRefresh {
    async fn signal_refresh(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

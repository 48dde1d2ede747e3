#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Deserialize;
use serde_json::{json, Value};

use gbs_portal::config::AppConfig;
use gbs_portal::gateway::ReqwestTransport;
use gbs_portal::notifier::{NoticeLevel, Notifier};
use gbs_portal::session::MemoryTokenStore;
use gbs_portal::Portal;

pub const MOBILE: &str = "9876543210";
pub const OTP: &str = "1234";
pub const USER_ID: &str = "u-1";

pub fn token_for(user_id: &str) -> String {
    encode(
        &Header::default(),
        &json!({ "userId": user_id, "exp": 4_102_444_800i64 }),
        &EncodingKey::from_secret(b"fake-backend"),
    )
    .expect("token encodes")
}

#[derive(Default)]
pub struct Notices(Mutex<Vec<(NoticeLevel, String)>>);

impl Notices {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn errors(&self) -> Vec<String> {
        self.with_level(NoticeLevel::Error)
    }

    pub fn successes(&self) -> Vec<String> {
        self.with_level(NoticeLevel::Success)
    }

    fn with_level(&self, level: NoticeLevel) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Notifier for Notices {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.0.lock().unwrap().push((level, message.to_string()));
    }
}

#[derive(Default)]
pub struct BackendState {
    pub referrals: Vec<Value>,
    pub members: Vec<Value>,
    pub logouts: usize,
    pub authorizations: Vec<Option<String>>,
    /// Acknowledge creates with a message only, no record
    pub quiet_creates: bool,
    pub refreshes: usize,
    next_id: usize,
}

type Shared = Arc<Mutex<BackendState>>;

/// In-process stand-in for the portal backend, listening on a free port
pub struct FakeBackend {
    pub base_url: String,
    pub state: Shared,
}

impl FakeBackend {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let state: Shared = Arc::new(Mutex::new(BackendState::default()));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind fake backend")?;
        let app = router(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { base_url, state })
    }

    /// Portal pointed at this backend, optionally already signed in
    pub fn portal(&self, signed_in: bool) -> Portal {
        let mut config = AppConfig::development();
        config.api.base_url = self.base_url.clone();
        config.pagination.page_size = 5;

        let store = Arc::new(MemoryTokenStore::default());
        let portal = Portal::new(config, store, Arc::new(ReqwestTransport::new())).expect("valid base URL");
        if signed_in {
            portal.session().set_token(token_for(USER_ID)).expect("memory store");
        }
        portal
    }

    pub fn seed_given(&self, count: usize) {
        let mut state = self.state.lock().unwrap();
        for n in 0..count {
            let id = format!("seed-{}", n + 1);
            state.referrals.push(json!({
                "_id": id,
                "giver_id": USER_ID,
                "receiver_id": { "_id": "r-9", "name": "Ravi" },
                "mobile_number": MOBILE,
                "rating": 3
            }));
        }
    }

    pub fn seed_received(&self, from: &str) {
        self.state.lock().unwrap().referrals.push(json!({
            "_id": format!("recv-{}", from),
            "giver_id": { "_id": from, "name": "Giver" },
            "receiver_id": USER_ID,
            "rating": 5
        }));
    }

    pub fn seed_referral(&self, referral: Value) {
        self.state.lock().unwrap().referrals.push(referral);
    }

    pub fn seed_members(&self, count: usize) {
        let mut state = self.state.lock().unwrap();
        for n in 0..count {
            state.members.push(json!({ "_id": format!("m-{}", n), "name": format!("Member {}", n) }));
        }
    }

    pub fn referral_count(&self) -> usize {
        self.state.lock().unwrap().referrals.len()
    }
}

#[derive(Deserialize)]
struct Paging {
    page: Option<usize>,
    limit: Option<usize>,
}

impl Paging {
    fn resolve(&self) -> (usize, usize) {
        (self.page.unwrap_or(1).max(1), self.limit.unwrap_or(10).max(1))
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/mobile/auth/login", post(login))
        .route("/mobile/auth/resend-mobile-otp", post(login))
        .route("/mobile/auth/verify-mobile", post(verify))
        .route("/mobile/auth/logout", post(logout))
        .route("/mobile/auth/refresh-token", post(refresh_token))
        .route("/mobile/get-given-referral/:uid", get(given))
        .route("/mobile/get-received-referral/:uid", get(received))
        .route("/mobile/create-referral", post(create))
        .route("/mobile/delete-referral/:id", delete(remove))
        .route("/mobile/get-inside-users", get(inside_users))
        .route("/mobile/get-outside-users", get(outside_users))
        .with_state(state)
}

fn rejected(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "success": false, "message": message })))
}

fn authorize(state: &Shared, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    let valid = header.as_deref() == Some(format!("Bearer {}", token_for(USER_ID)).as_str());
    state.lock().unwrap().authorizations.push(header);
    if valid {
        Ok(())
    } else {
        Err(rejected(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

fn involves(referral: &Value, field: &str, user_id: &str) -> bool {
    let link = &referral[field];
    link.as_str() == Some(user_id) || link["_id"].as_str() == Some(user_id)
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["mobile_number"].as_str() == Some(MOBILE) {
        (StatusCode::OK, Json(json!({ "success": true, "message": "OTP sent" })))
    } else {
        rejected(StatusCode::NOT_FOUND, "User not found")
    }
}

async fn verify(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["mobile_number"].as_str() == Some(MOBILE) && body["otp"].as_str() == Some(OTP) {
        (
            StatusCode::OK,
            Json(json!({ "success": true, "data": { "token": token_for(USER_ID) } })),
        )
    } else {
        rejected(StatusCode::BAD_REQUEST, "Invalid OTP")
    }
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    state.lock().unwrap().logouts += 1;
    (StatusCode::OK, Json(json!({ "success": true })))
}

/// Reissues the same token; only the call count changes
async fn refresh_token(State(state): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    state.lock().unwrap().refreshes += 1;
    (
        StatusCode::OK,
        Json(json!({ "success": true, "token": token_for(USER_ID) })),
    )
}

/// mongoose-paginate style envelope nested under `data`
async fn given(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(uid): Path<String>,
    Query(paging): Query<Paging>,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let (page, limit) = paging.resolve();
    let mine: Vec<Value> = state
        .lock()
        .unwrap()
        .referrals
        .iter()
        .filter(|r| involves(r, "giver_id", &uid))
        .cloned()
        .collect();

    let total = mine.len();
    let total_pages = total.div_ceil(limit).max(1);
    let docs: Vec<Value> = mine.into_iter().skip((page - 1) * limit).take(limit).collect();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "docs": docs,
                "totalDocs": total,
                "limit": limit,
                "totalPages": total_pages,
                "page": page,
                "hasPrevPage": page > 1,
                "hasNextPage": page < total_pages
            }
        })),
    )
}

/// Bare `data` array with no counters
async fn received(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(uid): Path<String>,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let mine: Vec<Value> = state
        .lock()
        .unwrap()
        .referrals
        .iter()
        .filter(|r| involves(r, "receiver_id", &uid))
        .cloned()
        .collect();
    (StatusCode::OK, Json(json!({ "success": true, "data": mine })))
}

async fn create(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let mut state = state.lock().unwrap();
    state.next_id += 1;
    body["_id"] = json!(format!("new-{}", state.next_id));
    state.referrals.push(body.clone());
    if state.quiet_creates {
        return (
            StatusCode::CREATED,
            Json(json!({ "success": true, "message": "Referral created successfully" })),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Referral created", "data": body })),
    )
}

async fn remove(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let mut state = state.lock().unwrap();
    let before = state.referrals.len();
    state.referrals.retain(|r| r["_id"].as_str() != Some(id.as_str()));
    if state.referrals.len() == before {
        return rejected(StatusCode::NOT_FOUND, "Referral not found");
    }
    (StatusCode::OK, Json(json!({ "success": true })))
}

async fn inside_users(State(state): State<Shared>, Query(paging): Query<Paging>) -> Json<Value> {
    let (page, limit) = paging.resolve();
    let members: Vec<Value> = state
        .lock()
        .unwrap()
        .members
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .cloned()
        .collect();
    Json(json!({ "success": true, "data": members }))
}

async fn outside_users(State(state): State<Shared>, Query(paging): Query<Paging>) -> Json<Value> {
    let (page, limit) = paging.resolve();
    let all = state.lock().unwrap().members.clone();
    let total = all.len();
    let docs: Vec<Value> = all.into_iter().skip((page - 1) * limit).take(limit).collect();
    Json(json!({
        "success": true,
        "docs": docs,
        "totalDocs": total,
        "totalPages": total.div_ceil(limit).max(1),
        "page": page
    }))
}

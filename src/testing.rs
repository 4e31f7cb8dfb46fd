//! In-process stand-in for the rental backend
//!
//! Tests exercise the real client stack (reqwest over a live listener)
//! against this small axum app, which mimics the backend's envelope
//! dialects: `{"error"}` bodies for application failures, `{"msg"}` for
//! token failures, `{"message"}`/`{"success"}` acknowledgements.
//!
//! State is deliberately crude - a handful of mutex-wrapped vectors - and
//! tests poke it directly to seed fixtures or flip failure modes.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::api::ApiClient;
use crate::config::ApiConfig;

type Reply = (StatusCode, Json<Value>);

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: self.base_url(),
            timeout_seconds: 5,
        })
        .expect("failed to build test client")
    }
}

struct Account {
    password: String,
    user: Value,
}

#[derive(Default)]
pub struct MockState {
    accounts: Mutex<HashMap<String, Account>>,
    valid_token: Mutex<Option<String>>,
    session_email: Mutex<Option<String>>,
    token_counter: AtomicU64,
    /// Artificial latency on /current_user, for stale-response races
    hydrate_delay_ms: AtomicU64,
    /// When set, every authenticated call answers "token expired"
    expire_tokens: AtomicBool,
    logout_calls: AtomicU64,
    pub cars: Mutex<Vec<Value>>,
    pub bookings: Mutex<Vec<Value>>,
    pub reviews: Mutex<Vec<Value>>,
    pub car_reviews: Mutex<HashMap<i64, Vec<Value>>>,
    next_id: AtomicU64,
}

impl MockState {
    pub fn add_account(&self, email: &str, password: &str, user: Value) {
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user,
            },
        );
    }

    pub fn set_hydrate_delay(&self, delay: Duration) {
        self.hydrate_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn expire_all_tokens(&self) {
        self.expire_tokens.store(true, Ordering::SeqCst);
    }

    pub fn current_token(&self) -> Option<String> {
        self.valid_token.lock().unwrap().clone()
    }

    pub fn logout_calls(&self) -> u64 {
        self.logout_calls.load(Ordering::SeqCst)
    }

    fn issue_token(&self, email: &str) -> String {
        let token = format!("t{}", self.token_counter.fetch_add(1, Ordering::SeqCst) + 1);
        *self.valid_token.lock().unwrap() = Some(token.clone());
        *self.session_email.lock().unwrap() = Some(email.to_string());
        token
    }

    fn allocate_id(&self) -> i64 {
        (self.next_id.fetch_add(1, Ordering::SeqCst) + 100) as i64
    }

    /// Validate the bearer token and return the session's user payload.
    fn authorize(&self, headers: &HeaderMap) -> Result<Value, Reply> {
        let token = bearer(headers).ok_or_else(|| {
            reply(
                StatusCode::UNAUTHORIZED,
                json!({"msg": "Missing Authorization Header"}),
            )
        })?;

        let expired = self.expire_tokens.load(Ordering::SeqCst)
            || self.valid_token.lock().unwrap().as_deref() != Some(token.as_str());
        if expired {
            return Err(reply(
                StatusCode::UNAUTHORIZED,
                json!({"msg": "Token has expired"}),
            ));
        }

        let email = self
            .session_email
            .lock()
            .unwrap()
            .clone()
            .expect("valid token without a session");
        match self.accounts.lock().unwrap().get(&email) {
            Some(account) => Ok(account.user.clone()),
            None => Err(reply(
                StatusCode::NOT_FOUND,
                json!({"error": "User not found"}),
            )),
        }
    }
}

/// Build a user payload the way the backend serializes one.
pub fn user_json(id: i64, username: &str, email: &str, is_admin: bool) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": email,
        "role": if is_admin { "admin" } else { "user" },
        "is_admin": is_admin,
    })
}

pub async fn spawn() -> MockBackend {
    spawn_with_state(Arc::new(MockState::default())).await
}

pub async fn spawn_with_state(state: Arc<MockState>) -> MockBackend {
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock backend");
    let addr = listener.local_addr().expect("mock backend has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend died");
    });

    MockBackend { addr, state }
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/current_user", get(current_user))
        .route("/logout", delete(logout))
        .route("/users", post(register).get(list_users))
        .route("/users/{id}", put(update_user).delete(delete_user))
        .route("/cars", get(list_cars).post(create_car))
        .route("/cars/{id}", get(get_car).patch(update_car).delete(delete_car))
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}", patch(update_booking).delete(delete_booking))
        .route("/bookings/user/{id}", get(bookings_by_user))
        .route("/bookings/car/{id}", get(bookings_by_car))
        .route("/reviews", get(list_reviews).post(create_review))
        .route("/reviews/car/{id}", get(reviews_by_car))
        .route("/reviews/{id}", delete(delete_review))
        .with_state(state)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

fn field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

// --------------------------------------------------------------------------
// auth
// --------------------------------------------------------------------------

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Reply {
    let email = field(&body, "email").unwrap_or_default().to_string();
    let password = field(&body, "password").unwrap_or_default();

    let matches = state
        .accounts
        .lock()
        .unwrap()
        .get(&email)
        .map(|account| account.password == password)
        .unwrap_or(false);

    if matches {
        let token = state.issue_token(&email);
        reply(StatusCode::OK, json!({"access_token": token}))
    } else {
        reply(
            StatusCode::UNAUTHORIZED,
            json!({"error": "Invalid email or password"}),
        )
    }
}

async fn current_user(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Reply {
    // Authorize first, then sleep: a delayed response can then arrive
    // after the client has already logged out, which is exactly the race
    // the session manager has to survive
    let result = state.authorize(&headers);

    let delay = state.hydrate_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    match result {
        Ok(user) => reply(StatusCode::OK, user),
        Err(err) => err,
    }
}

async fn logout(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Reply {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    match state.authorize(&headers) {
        Ok(_) => {
            *state.valid_token.lock().unwrap() = None;
            *state.session_email.lock().unwrap() = None;
            reply(StatusCode::OK, json!({"success": "Successfully logged out"}))
        }
        Err(err) => err,
    }
}

// --------------------------------------------------------------------------
// users
// --------------------------------------------------------------------------

async fn register(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Reply {
    let username = field(&body, "username").unwrap_or_default().to_string();
    let email = field(&body, "email").unwrap_or_default().to_string();
    let password = field(&body, "password").unwrap_or_default().to_string();

    if username.is_empty() || email.is_empty() || password.is_empty() {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"error": "Missing required fields"}),
        );
    }
    if state.accounts.lock().unwrap().contains_key(&email) {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"error": "Email already exists"}),
        );
    }

    let id = state.allocate_id();
    state.add_account(&email, &password, user_json(id, &username, &email, false));
    reply(
        StatusCode::CREATED,
        json!({"message": "User created successfully", "user_id": id}),
    )
}

async fn list_users(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Reply {
    match state.authorize(&headers) {
        Ok(_) => {
            let users: Vec<Value> = state
                .accounts
                .lock()
                .unwrap()
                .values()
                .map(|account| account.user.clone())
                .collect();
            reply(StatusCode::OK, Value::Array(users))
        }
        Err(err) => err,
    }
}

async fn update_user(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(err) = state.authorize(&headers) {
        return err;
    }

    let email = field(&body, "email").unwrap_or_default().to_string();
    let password = field(&body, "password").unwrap_or_default().to_string();
    if email.is_empty() || password.is_empty() {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"error": "Email and password are required"}),
        );
    }

    let mut accounts = state.accounts.lock().unwrap();
    let old_email = accounts
        .iter()
        .find(|(_, account)| account.user["id"].as_i64() == Some(id))
        .map(|(email, _)| email.clone());

    match old_email {
        Some(old_email) => {
            let mut account = accounts.remove(&old_email).unwrap();
            account.user["email"] = Value::String(email.clone());
            account.password = password;
            drop(accounts);

            let mut session_email = state.session_email.lock().unwrap();
            if session_email.as_deref() == Some(old_email.as_str()) {
                *session_email = Some(email.clone());
            }
            drop(session_email);

            state.accounts.lock().unwrap().insert(email, account);
            reply(StatusCode::OK, json!({"message": "User updated successfully"}))
        }
        None => reply(StatusCode::NOT_FOUND, json!({"error": "User not found"})),
    }
}

async fn delete_user(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Reply {
    if let Err(err) = state.authorize(&headers) {
        return err;
    }

    let mut accounts = state.accounts.lock().unwrap();
    let email = accounts
        .iter()
        .find(|(_, account)| account.user["id"].as_i64() == Some(id))
        .map(|(email, _)| email.clone());

    match email {
        Some(email) => {
            accounts.remove(&email);
            // The backend invalidates nothing here, but the account behind
            // the live token is gone
            reply(StatusCode::OK, json!({"message": "User deleted successfully"}))
        }
        None => reply(StatusCode::NOT_FOUND, json!({"error": "User not found"})),
    }
}

// --------------------------------------------------------------------------
// cars
// --------------------------------------------------------------------------

async fn list_cars(State(state): State<Arc<MockState>>) -> Reply {
    reply(
        StatusCode::OK,
        Value::Array(state.cars.lock().unwrap().clone()),
    )
}

async fn get_car(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Reply {
    let cars = state.cars.lock().unwrap();
    match cars.iter().find(|car| car["id"].as_i64() == Some(id)) {
        Some(car) => reply(StatusCode::OK, car.clone()),
        None => reply(StatusCode::NOT_FOUND, json!({"error": "Car not found"})),
    }
}

async fn create_car(State(state): State<Arc<MockState>>, Json(mut body): Json<Value>) -> Reply {
    let id = state.allocate_id();
    body["id"] = json!(id);
    state.cars.lock().unwrap().push(body);
    reply(
        StatusCode::CREATED,
        json!({"message": "Car created successfully", "car_id": id}),
    )
}

async fn update_car(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut cars = state.cars.lock().unwrap();
    match cars.iter_mut().find(|car| car["id"].as_i64() == Some(id)) {
        Some(car) => {
            for key in ["brand", "model", "image1", "image2", "price_per_day", "status"] {
                if let Some(value) = body.get(key) {
                    car[key] = value.clone();
                }
            }
            reply(StatusCode::OK, json!({"message": "Car updated successfully"}))
        }
        None => reply(StatusCode::NOT_FOUND, json!({"error": "Car not found"})),
    }
}

async fn delete_car(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Reply {
    state
        .cars
        .lock()
        .unwrap()
        .retain(|car| car["id"].as_i64() != Some(id));
    reply(StatusCode::OK, json!({"message": "Car deleted successfully"}))
}

// --------------------------------------------------------------------------
// bookings
// --------------------------------------------------------------------------

async fn list_bookings(State(state): State<Arc<MockState>>) -> Reply {
    reply(
        StatusCode::OK,
        Value::Array(state.bookings.lock().unwrap().clone()),
    )
}

async fn create_booking(State(state): State<Arc<MockState>>, Json(mut body): Json<Value>) -> Reply {
    let id = state.allocate_id();
    body["id"] = json!(id);
    if body.get("status").is_none() {
        body["status"] = json!("pending");
    }
    body["created_at"] = json!("2026-08-01T09:30:00");
    state.bookings.lock().unwrap().push(body);
    reply(
        StatusCode::CREATED,
        json!({"message": "Booking created successfully", "booking_id": id}),
    )
}

async fn update_booking(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let status = field(&body, "status").unwrap_or_default().to_string();
    if !["pending", "confirmed", "cancelled"].contains(&status.as_str()) {
        return reply(StatusCode::BAD_REQUEST, json!({"error": "Invalid status"}));
    }

    let mut bookings = state.bookings.lock().unwrap();
    match bookings
        .iter_mut()
        .find(|booking| booking["id"].as_i64() == Some(id))
    {
        Some(booking) => {
            booking["status"] = json!(status);
            reply(
                StatusCode::OK,
                json!({"message": "Booking updated successfully"}),
            )
        }
        None => reply(StatusCode::NOT_FOUND, json!({"error": "Booking not found"})),
    }
}

async fn bookings_by_user(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Reply {
    let matching: Vec<Value> = state
        .bookings
        .lock()
        .unwrap()
        .iter()
        .filter(|booking| booking["user_id"].as_i64() == Some(id))
        .map(|booking| {
            // The backend omits the filter key from the payload
            let mut booking = booking.clone();
            booking.as_object_mut().unwrap().remove("user_id");
            booking
        })
        .collect();

    if matching.is_empty() {
        reply(
            StatusCode::NOT_FOUND,
            json!({"message": "No bookings found for this user"}),
        )
    } else {
        reply(StatusCode::OK, Value::Array(matching))
    }
}

async fn bookings_by_car(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Reply {
    let matching: Vec<Value> = state
        .bookings
        .lock()
        .unwrap()
        .iter()
        .filter(|booking| booking["car_id"].as_i64() == Some(id))
        .map(|booking| {
            let mut booking = booking.clone();
            booking.as_object_mut().unwrap().remove("car_id");
            booking
        })
        .collect();

    if matching.is_empty() {
        reply(
            StatusCode::NOT_FOUND,
            json!({"message": "No bookings found for this car"}),
        )
    } else {
        reply(StatusCode::OK, Value::Array(matching))
    }
}

async fn delete_booking(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Reply {
    state
        .bookings
        .lock()
        .unwrap()
        .retain(|booking| booking["id"].as_i64() != Some(id));
    reply(
        StatusCode::OK,
        json!({"message": "Booking deleted successfully"}),
    )
}

// --------------------------------------------------------------------------
// reviews
// --------------------------------------------------------------------------

async fn list_reviews(State(state): State<Arc<MockState>>) -> Reply {
    reply(
        StatusCode::OK,
        Value::Array(state.reviews.lock().unwrap().clone()),
    )
}

async fn create_review(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let user = match state.authorize(&headers) {
        Ok(user) => user,
        Err(err) => return err,
    };

    let id = state.allocate_id();
    state.reviews.lock().unwrap().push(json!({
        "id": id,
        "user_id": user["id"],
        "car_id": body["car_id"],
        "rating": body["rating"],
        "comment": body["comment"],
        "timestamp": "2026-08-01T10:00:00",
    }));
    reply(
        StatusCode::CREATED,
        json!({"message": "Review created successfully", "review_id": id}),
    )
}

async fn reviews_by_car(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Reply {
    let reviews = state
        .car_reviews
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .unwrap_or_default();
    reply(StatusCode::OK, Value::Array(reviews))
}

async fn delete_review(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Reply {
    let user = match state.authorize(&headers) {
        Ok(user) => user,
        Err(err) => return err,
    };
    if user["is_admin"].as_bool() != Some(true) {
        return reply(
            StatusCode::FORBIDDEN,
            json!({"error": "Only admins can delete reviews"}),
        );
    }

    state
        .reviews
        .lock()
        .unwrap()
        .retain(|review| review["id"].as_i64() != Some(id));
    reply(
        StatusCode::OK,
        json!({"message": "Review deleted successfully"}),
    )
}

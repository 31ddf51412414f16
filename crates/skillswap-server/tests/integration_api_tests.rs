//! Integration tests for REST API endpoints
//!
//! Each test builds the full router over an in-memory store and drives it
//! with `oneshot` requests.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use skillswap_server::api::create_router;
use skillswap_service::{RecordingMailer, ServiceConfig, SkillSwapBuilder};
use std::sync::Arc;
use tower::ServiceExt;

const PASSWORD: &str = "correct-horse";

struct TestServer {
    router: Router,
    mailer: Arc<RecordingMailer>,
}

impl TestServer {
    async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    async fn with_config(config: ServiceConfig) -> Self {
        let mailer = Arc::new(RecordingMailer::new());
        let app = SkillSwapBuilder::new()
            .with_config(config)
            .with_mailer(mailer.clone())
            .build()
            .await
            .unwrap();
        app.accounts()
            .ensure_admin("admin@example.com", PASSWORD)
            .await
            .unwrap();
        Self {
            router: create_router(app),
            mailer,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    async fn register(&self, email: &str, profile: &str) -> Value {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({
                    "email": email,
                    "password": PASSWORD,
                    "displayName": email,
                    "profile": profile,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body
    }

    fn mailed_token(&self, email: &str) -> String {
        let mail = self.mailer.last_to(email).expect("verification mail");
        let start = mail.body.find("token=").unwrap() + "token=".len();
        mail.body[start..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect()
    }

    async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .post("/auth/login", None, json!({"email": email, "password": PASSWORD}))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Register, verify and log in
    async fn user(&self, email: &str, profile: &str) -> String {
        self.register(email, profile).await;
        let token = self.mailed_token(email);
        let (status, _) = self
            .get(&format!("/verification/verify?token={}", token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        self.login(email).await
    }

    async fn skill(&self) -> i64 {
        let admin = self.login("admin@example.com").await;
        let (status, area) = self
            .post("/knowledge-areas", Some(&admin), json!({"name": "Programming"}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, skill) = self
            .post(
                "/skills",
                Some(&admin),
                json!({"knowledgeAreaId": area["id"], "name": "Rust"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        skill["id"].as_i64().unwrap()
    }

    async fn open_session(&self, instructor: &str, skill_id: i64, capacity: u32, cost: i64) -> i64 {
        let starts_at = Utc::now() + Duration::days(1);
        let (status, session) = self
            .post(
                "/api/sessions",
                Some(instructor),
                json!({
                    "skillId": skill_id,
                    "title": "Ownership in practice",
                    "capacity": capacity,
                    "startsAt": starts_at,
                    "endsAt": starts_at + Duration::hours(2),
                    "exchangeType": "PAID",
                    "creditsCost": cost,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create session failed: {}", session);
        assert_eq!(session["status"], "DRAFT");

        let id = session["id"].as_i64().unwrap();
        let (status, _) = self
            .post(&format!("/api/sessions/{}/open", id), Some(instructor), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        id
    }
}

fn test_config() -> ServiceConfig {
    ServiceConfig::new()
        .with_jwt_secret("integration-secret")
        .with_bcrypt_cost(4)
        .with_starting_credits(10)
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::new().await;
    let (status, body) = server.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = TestServer::new().await;
    let (status, body) = server.get("/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_last_seat_booking() {
    let server = TestServer::new().await;
    let skill_id = server.skill().await;
    let ivy = server.user("ivy@example.com", "INSTRUCTOR").await;
    let leo = server.user("leo@example.com", "LEARNER").await;
    let mia = server.user("mia@example.com", "LEARNER").await;
    let session_id = server.open_session(&ivy, skill_id, 1, 3).await;

    let (status, booking) = server
        .post("/api/bookings", Some(&leo), json!({"sessionId": session_id}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "CONFIRMED");
    assert_eq!(booking["creditsCharged"], 3);

    let (status, body) = server
        .post("/api/bookings", Some(&mia), json!({"sessionId": session_id}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["description"], "no available capacity");
    assert_eq!(body["code"], "INVALID_STATE");

    let (status, session) = server
        .get(&format!("/api/sessions/{}", session_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["status"], "FULL");
    assert_eq!(session["availableCapacity"], 0);

    let (_, account) = server.get("/auth/status", Some(&leo)).await;
    assert_eq!(account["credits"], 7);
}

#[tokio::test]
async fn test_cancel_booking_refunds() {
    let server = TestServer::new().await;
    let skill_id = server.skill().await;
    let ivy = server.user("ivy@example.com", "INSTRUCTOR").await;
    let leo = server.user("leo@example.com", "LEARNER").await;
    let session_id = server.open_session(&ivy, skill_id, 2, 4).await;

    let (_, booking) = server
        .post("/api/bookings", Some(&leo), json!({"sessionId": session_id}))
        .await;
    let uri = format!("/api/bookings/{}", booking["id"]);

    let (status, cancelled) = server.send(Method::DELETE, &uri, Some(&leo), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "CANCELLED");

    let (status, body) = server.send(Method::DELETE, &uri, Some(&leo), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_STATE");

    let (_, account) = server.get("/auth/status", Some(&leo)).await;
    assert_eq!(account["credits"], 10);
}

#[tokio::test]
async fn test_insufficient_credits_response() {
    let server = TestServer::new().await;
    let skill_id = server.skill().await;
    let ivy = server.user("ivy@example.com", "INSTRUCTOR").await;
    let leo = server.user("leo@example.com", "LEARNER").await;
    let session_id = server.open_session(&ivy, skill_id, 2, 50).await;

    let (status, body) = server
        .post("/api/bookings", Some(&leo), json!({"sessionId": session_id}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_CREDITS");
}

#[tokio::test]
async fn test_expired_verification_token_is_gone() {
    let server = TestServer::with_config(test_config().with_verification_ttl_hours(-1)).await;
    server.register("nora@example.com", "LEARNER").await;
    let token = server.mailed_token("nora@example.com");

    let (status, body) = server
        .get(&format!("/verification/verify?token={}", token), None)
        .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], "EXPIRED_TOKEN");
}

#[tokio::test]
async fn test_verification_outcomes() {
    let server = TestServer::new().await;
    server.register("nora@example.com", "LEARNER").await;
    let first = server.mailed_token("nora@example.com");

    let (status, body) = server
        .post("/verification/resend", None, json!({"email": "nora@example.com"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "TOKEN_SENT");

    let (status, body) = server
        .get(&format!("/verification/verify?token={}", first), None)
        .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["status"], "TOKEN_USED");

    let fresh = server.mailed_token("nora@example.com");
    let uri = format!("/verification/verify?token={}", fresh);
    let (status, body) = server.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = server.get(&uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "ALREADY_VERIFIED");

    let (status, body) = server.get("/verification/verify?token=bogus", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_authentication_failures() {
    let server = TestServer::new().await;
    server.register("nora@example.com", "LEARNER").await;

    // unverified
    let (status, _) = server
        .post(
            "/auth/login",
            None,
            json!({"email": "nora@example.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server
        .post(
            "/auth/login",
            None,
            json!({"email": "nora@example.com", "password": "wrong-password"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server.get("/auth/status", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server.get("/auth/status", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_only_endpoints() {
    let server = TestServer::new().await;
    let leo = server.user("leo@example.com", "LEARNER").await;

    let (status, body) = server
        .post("/knowledge-areas", Some(&leo), json!({"name": "Music"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);

    let (status, _) = server
        .post(
            "/api/credit-packages",
            Some(&leo),
            json!({"name": "Starter", "credits": 10, "priceCents": 500}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let server = TestServer::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = server.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dev_mail_endpoint_hidden_by_default() {
    let server = TestServer::new().await;
    let leo = server.user("leo@example.com", "LEARNER").await;

    let (status, _) = server
        .post("/api/dev/mail/test", Some(&leo), json!({"to": "leo@example.com"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let server = TestServer::with_config(test_config().enable_dev_endpoints(true)).await;
    let leo = server.user("leo@example.com", "LEARNER").await;
    let (status, _) = server
        .post("/api/dev/mail/test", Some(&leo), json!({"to": "leo@example.com"}))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_community_credentials_require_membership() {
    let server = TestServer::new().await;
    let admin = server.login("admin@example.com").await;
    let leo = server.user("leo@example.com", "LEARNER").await;

    let (status, community) = server
        .post("/api/communities", Some(&admin), json!({"name": "Rustaceans"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = community["id"].as_i64().unwrap();

    let uri = format!("/communities/{}/credentials", id);
    let (status, _) = server.get(&uri, Some(&leo)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server
        .post(&format!("/api/communities/{}/join", id), Some(&leo), json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, credentials) = server.get(&uri, Some(&leo)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(credentials, json!([]));

    let (status, mine) = server.get("/api/communities/my-communities", Some(&leo)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine[0]["name"], "Rustaceans");
}

#[tokio::test]
async fn test_learner_quiz_has_no_answer_key() {
    let server = TestServer::new().await;
    let skill_id = server.skill().await;
    let ivy = server.user("ivy@example.com", "INSTRUCTOR").await;
    let leo = server.user("leo@example.com", "LEARNER").await;
    let session_id = server.open_session(&ivy, skill_id, 2, 1).await;

    let (status, _) = server
        .post(
            &format!("/api/sessions/{}/quizzes", session_id),
            Some(&ivy),
            json!({
                "title": "Lifetimes",
                "questions": [{
                    "prompt": "Which outlives the other?",
                    "options": ["'a", "'b", "'static"],
                    "correctOption": 2,
                }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = server
        .post("/api/bookings", Some(&leo), json!({"sessionId": session_id}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/sessions/{}/quizzes", session_id);
    let (status, for_learner) = server.get(&uri, Some(&leo)).await;
    assert_eq!(status, StatusCode::OK);
    let question = &for_learner[0]["questions"][0];
    assert_eq!(question["options"][2], "'static");
    assert!(question.get("correctOption").is_none());

    let (_, for_instructor) = server.get(&uri, Some(&ivy)).await;
    assert_eq!(for_instructor[0]["questions"][0]["correctOption"], 2);
}

#[tokio::test]
async fn test_oversized_capacity_is_bad_request() {
    let server = TestServer::new().await;
    let skill_id = server.skill().await;
    let ivy = server.user("ivy@example.com", "INSTRUCTOR").await;
    let starts_at = Utc::now() + Duration::days(1);

    let (status, body) = server
        .post(
            "/api/sessions",
            Some(&ivy),
            json!({
                "skillId": skill_id,
                "title": "Everyone at once",
                "capacity": u32::MAX,
                "startsAt": starts_at,
                "endsAt": starts_at + Duration::hours(1),
                "exchangeType": "SWAP",
                "creditsCost": 0,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["description"].as_str().unwrap().contains("capacity"));
}

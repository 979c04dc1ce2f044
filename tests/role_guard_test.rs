use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use chrono::Utc;
use marketplace_backend::middleware::auth::{encode_token, require_auth, session_guard};
use marketplace_backend::models::user::{Role, User};
use tower::ServiceExt;
use uuid::Uuid;

fn init_test_config() {
    std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    std::env::set_var("DATABASE_URL", "postgres://localhost/unused");
    std::env::set_var("JWT_SECRET", "test_secret_key");
    std::env::set_var("JWT_TTL_HOURS", "24");
    std::env::set_var("MAIL_API_URL", "http://localhost/send");
    std::env::set_var("MAIL_API_KEY", "mk-test");
    std::env::set_var("MAIL_FROM", "noreply@example.com");
    std::env::set_var("ADMIN_EMAIL", "admin@example.com");
    std::env::set_var("AUTH_RPS", "100");
    let _ = marketplace_backend::config::init_config();
}

fn token_for(role: Role) -> String {
    let user = User {
        id: Uuid::new_v4(),
        name: "Guard Test".into(),
        email: "guard@example.com".into(),
        password_hash: String::new(),
        role,
        is_verified: false,
        is_business_verified: false,
        verification_code: None,
        verification_code_expires: None,
        skills: None,
        cv_url: None,
        company_name: None,
        company_website: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    encode_token(&user).expect("token")
}

fn test_app() -> Router {
    Router::new()
        .route("/", get(|| async { "home" }))
        .route("/admin/overview", get(|| async { "admin dashboard" }))
        .route("/student/home", get(|| async { "student dashboard" }))
        .route("/api/applications/mine", get(|| async { "applications" }))
        .layer(axum::middleware::from_fn(session_guard))
        .layer(axum::middleware::from_fn(require_auth))
}

fn get_request(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn public_root_is_open() {
    init_test_config();
    let resp = test_app().oneshot(get_request("/", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn student_on_admin_path_is_redirected_home() {
    init_test_config();
    let token = token_for(Role::Student);
    let resp = test_app()
        .oneshot(get_request("/admin/overview", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn anonymous_on_admin_path_is_redirected_home() {
    init_test_config();
    let resp = test_app()
        .oneshot(get_request("/admin/overview", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn admin_reaches_admin_path() {
    init_test_config();
    let token = token_for(Role::Admin);
    let resp = test_app()
        .oneshot(get_request("/admin/overview", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn expert_shares_student_dashboard() {
    init_test_config();
    let token = token_for(Role::Expert);
    let resp = test_app()
        .oneshot(get_request("/student/home", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let token = token_for(Role::Business);
    let resp = test_app()
        .oneshot(get_request("/student/home", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn api_without_session_is_unauthorized_json() {
    init_test_config();
    let resp = test_app()
        .oneshot(get_request("/api/applications/mine", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn api_with_session_passes_guard() {
    init_test_config();
    let token = token_for(Role::Student);
    let resp = test_app()
        .oneshot(get_request("/api/applications/mine", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    init_test_config();
    let resp = test_app()
        .oneshot(get_request("/api/applications/mine", Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

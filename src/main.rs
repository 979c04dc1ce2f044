use axum::{
    routing::{get, patch, post},
    Router,
};
use marketplace_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::auth::{require_auth, session_guard},
    middleware::rate_limit,
    routes, AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    // Outbox worker: delivery is decoupled from the request path and retried
    // independently.
    {
        let state = app_state.clone();
        tokio::spawn(async move {
            loop {
                match state.notification_service.run_once().await {
                    Ok(true) => {}
                    Ok(false) => {
                        tokio::time::sleep(Duration::from_millis(1000)).await;
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "Outbox worker error");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            }
        });
    }

    let auth_api = Router::new()
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/verify-otp", post(routes::auth::verify_otp))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.auth_rps),
            rate_limit::rps_middleware,
        ));

    let admin_api = Router::new()
        .route(
            "/api/admin/verify-ambassador",
            post(routes::admin::verify_ambassador),
        )
        .route(
            "/api/admin/verify-business",
            post(routes::admin::verify_business),
        )
        .route("/api/admin/users", get(routes::admin::list_users));

    let marketplace_api = Router::new()
        .route(
            "/api/jobs",
            get(routes::jobs::list_jobs).post(routes::jobs::create_job),
        )
        .route("/api/jobs/mine", get(routes::jobs::list_my_jobs))
        .route(
            "/api/jobs/:id",
            get(routes::jobs::get_job)
                .patch(routes::jobs::update_job)
                .delete(routes::jobs::delete_job),
        )
        .route(
            "/api/jobs/:id/applications",
            get(routes::jobs::list_job_applications),
        )
        .route(
            "/api/opleidingen",
            get(routes::opleidingen::list_opleidingen).post(routes::opleidingen::create_opleiding),
        )
        .route(
            "/api/opleidingen/mine",
            get(routes::opleidingen::list_my_opleidingen),
        )
        .route(
            "/api/opleidingen/:id",
            get(routes::opleidingen::get_opleiding)
                .patch(routes::opleidingen::update_opleiding)
                .delete(routes::opleidingen::delete_opleiding),
        )
        .route(
            "/api/opleidingen/:id/applications",
            get(routes::opleidingen::list_opleiding_applications),
        );

    let application_api = Router::new()
        .route(
            "/api/applications",
            post(routes::applications::submit_application),
        )
        .route(
            "/api/applications/mine",
            get(routes::applications::list_my_applications),
        )
        .route(
            "/api/applications/:id",
            patch(routes::applications::update_application_status),
        );

    let user_api = Router::new()
        .route(
            "/api/users/me",
            get(routes::users::get_me).patch(routes::users::update_me),
        )
        .route(
            "/api/users/me/apply-ambassador",
            post(routes::users::apply_ambassador),
        );

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .merge(auth_api)
        .merge(admin_api)
        .merge(marketplace_api)
        .merge(application_api)
        .merge(user_api)
        .with_state(app_state)
        .layer(axum::middleware::from_fn(session_guard))
        .layer(axum::middleware::from_fn(require_auth))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

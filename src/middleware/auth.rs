use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{request::Parts, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Redirect, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Role,
    pub is_verified: bool,
    pub is_business_verified: bool,
}

/// Per-request authentication context, built once by `require_auth` and
/// threaded into handlers through an extractor. Verification flags mirror the
/// token claims; the posting-creation gates re-check the database row because
/// claims can be stale.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub role: Role,
    pub is_verified: bool,
    pub is_business_verified: bool,
}

impl RequestContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| Error::Unauthorized("authentication required".to_string()))
    }
}

pub fn encode_token(user: &User) -> Result<String> {
    let config = crate::config::get_config();
    let exp = (Utc::now() + Duration::hours(config.jwt_ttl_hours)).timestamp() as usize;
    let claims = Claims {
        sub: user.id.to_string(),
        exp,
        role: user.role,
        is_verified: user.is_verified,
        is_business_verified: user.is_business_verified,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("failed to sign token: {}", e)))
}

/// Decodes a bearer token when present and inserts a `RequestContext`
/// extension. Requests without an Authorization header pass through
/// anonymously; the guard and the extractors decide what that is allowed to
/// reach. A token that is present but invalid is rejected outright.
pub async fn require_auth(mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return next.run(req).await;
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return unauthorized("bad_authorization");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return unauthorized("unsupported_scheme");
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => data,
        Err(_) => return unauthorized("invalid_token"),
    };

    let Ok(user_id) = Uuid::parse_str(&data.claims.sub) else {
        return unauthorized("invalid_token");
    };

    req.extensions_mut().insert(RequestContext {
        user_id,
        role: data.claims.role,
        is_verified: data.claims.is_verified,
        is_business_verified: data.claims.is_business_verified,
    });
    next.run(req).await
}

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    NoSession,
    WrongRole,
}

/// Path prefixes reachable without a session.
const PUBLIC_PREFIXES: &[&str] = &["/jobs", "/opleidingen", "/auth", "/api/auth", "/health"];

/// The single (path prefix, allowed roles) table. ADMIN is implicitly allowed
/// under every prefix; STUDENT and EXPERT share both of their dashboards.
const ROLE_PREFIXES: &[(&str, &[Role])] = &[
    ("/api/admin", &[Role::Admin]),
    ("/admin", &[Role::Admin]),
    ("/ambassador", &[Role::Ambassador]),
    ("/business", &[Role::Business]),
    ("/student", &[Role::Student, Role::Expert]),
    ("/expert", &[Role::Student, Role::Expert]),
];

fn has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// Centralized access predicate, evaluated fresh for every request.
/// Fail-closed: anything not explicitly public requires a session, and a
/// role-prefixed path requires a matching role.
pub fn evaluate(path: &str, method: &Method, role: Option<Role>) -> Access {
    if path == "/" || PUBLIC_PREFIXES.iter().any(|p| has_prefix(path, p)) {
        return Access::Granted;
    }

    // Public posting listings: reads only. Creator-scoped sub-resources under
    // the same prefix still demand a context in their handlers.
    if *method == Method::GET
        && (has_prefix(path, "/api/jobs") || has_prefix(path, "/api/opleidingen"))
    {
        return Access::Granted;
    }

    for (prefix, allowed) in ROLE_PREFIXES {
        if has_prefix(path, prefix) {
            return match role {
                None => Access::NoSession,
                Some(Role::Admin) => Access::Granted,
                Some(r) if allowed.contains(&r) => Access::Granted,
                Some(_) => Access::WrongRole,
            };
        }
    }

    if role.is_some() {
        Access::Granted
    } else {
        Access::NoSession
    }
}

/// Router-wide guard. Denied page paths are redirected to `/`; denied API
/// paths get a structured 401/403 body.
pub async fn session_guard(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let role = req.extensions().get::<RequestContext>().map(|ctx| ctx.role);

    match evaluate(&path, req.method(), role) {
        Access::Granted => next.run(req).await,
        denied => {
            if path.starts_with("/api/") {
                let (status, code) = match denied {
                    Access::NoSession => (StatusCode::UNAUTHORIZED, "authentication required"),
                    _ => (StatusCode::FORBIDDEN, "forbidden"),
                };
                (status, Json(json!({ "error": code }))).into_response()
            } else {
                Redirect::to("/").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths_allow_anonymous() {
        assert_eq!(evaluate("/", &Method::GET, None), Access::Granted);
        assert_eq!(evaluate("/jobs", &Method::GET, None), Access::Granted);
        assert_eq!(evaluate("/opleidingen/123", &Method::GET, None), Access::Granted);
        assert_eq!(
            evaluate("/api/auth/signup", &Method::POST, None),
            Access::Granted
        );
        assert_eq!(evaluate("/api/jobs", &Method::GET, None), Access::Granted);
    }

    #[test]
    fn protected_paths_require_session() {
        assert_eq!(
            evaluate("/api/applications", &Method::POST, None),
            Access::NoSession
        );
        assert_eq!(evaluate("/dashboard", &Method::GET, None), Access::NoSession);
        assert_eq!(
            evaluate("/api/jobs", &Method::POST, None),
            Access::NoSession
        );
    }

    #[test]
    fn role_prefixes_check_the_table() {
        assert_eq!(
            evaluate("/admin/users", &Method::GET, Some(Role::Student)),
            Access::WrongRole
        );
        assert_eq!(
            evaluate("/api/admin/verify-business", &Method::POST, Some(Role::Business)),
            Access::WrongRole
        );
        assert_eq!(
            evaluate("/ambassador/posts", &Method::GET, Some(Role::Ambassador)),
            Access::Granted
        );
        assert_eq!(
            evaluate("/business/profile", &Method::GET, Some(Role::Ambassador)),
            Access::WrongRole
        );
    }

    #[test]
    fn admin_is_allowed_everywhere() {
        for path in ["/admin", "/ambassador/x", "/business/x", "/student/x", "/expert/x"] {
            assert_eq!(evaluate(path, &Method::GET, Some(Role::Admin)), Access::Granted);
        }
    }

    #[test]
    fn student_and_expert_share_dashboards() {
        assert_eq!(
            evaluate("/student/home", &Method::GET, Some(Role::Expert)),
            Access::Granted
        );
        assert_eq!(
            evaluate("/expert/home", &Method::GET, Some(Role::Student)),
            Access::Granted
        );
        assert_eq!(
            evaluate("/student/home", &Method::GET, Some(Role::Business)),
            Access::WrongRole
        );
    }

    #[test]
    fn prefix_matching_is_segment_aware() {
        assert_eq!(
            evaluate("/jobsboard", &Method::GET, None),
            Access::NoSession
        );
        assert_eq!(
            evaluate("/administrator", &Method::GET, Some(Role::Student)),
            Access::Granted
        );
    }
}

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{validate_jwt, Claims};
use crate::config::AppConfig;
use crate::error::ApiError;

/// What the admin gate checks bearer tokens against
#[derive(Clone, Debug)]
pub struct AuthSettings {
    /// `None` means presence-only: any well-formed bearer header is accepted
    pub jwt_secret: Option<String>,
    pub admin_role: String,
}

impl AuthSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.security.jwt_secret.clone(),
            admin_role: config.security.admin_role.clone(),
        }
    }

    pub fn presence_only() -> Self {
        Self {
            jwt_secret: None,
            admin_role: "admin".to_string(),
        }
    }

    pub fn verifying(secret: impl Into<String>, admin_role: impl Into<String>) -> Self {
        Self {
            jwt_secret: Some(secret.into()),
            admin_role: admin_role.into(),
        }
    }
}

/// Caller identity attached to requests that passed the admin gate
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub subject: Option<String>,
    pub role: Option<String>,
    /// Whether the token signature was checked
    pub verified: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            subject: Some(claims.sub),
            role: Some(claims.role),
            verified: true,
        }
    }
}

/// Admin gate for mutating routes. Rejects before the handler runs.
pub async fn require_admin(
    State(settings): State<AuthSettings>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(|reason| {
        tracing::debug!("Rejected {} {}: {}", request.method(), request.uri().path(), reason);
        ApiError::unauthorized("Unauthorized")
    })?;

    let auth_user = match &settings.jwt_secret {
        Some(secret) => {
            let claims = validate_jwt(token, secret).map_err(|e| {
                tracing::debug!("Rejected bearer token: {}", e);
                ApiError::unauthorized("Unauthorized")
            })?;
            if claims.role != settings.admin_role {
                tracing::warn!("Subject '{}' with role '{}' is not an admin", claims.sub, claims.role);
                return Err(ApiError::forbidden("Admin role required"));
            }
            AuthUser::from(claims)
        }
        None => AuthUser {
            subject: None,
            role: None,
            verified: false,
        },
    };

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::Html,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{info, warn};

use super::error::ApiError;

const ADMIN_USER: &str = "admin";
const ADMIN_PAGE: &str = "<html><h1>admin portal</h1></html>";

/// Single-credential basic-auth gate in front of the admin page
#[derive(Clone)]
pub struct AdminPortal {
    password: Arc<str>,
}

impl AdminPortal {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: Arc::from(password.into()),
        }
    }

    /// True when `headers` carry basic credentials for the admin user
    pub fn authorized(&self, headers: &HeaderMap) -> bool {
        match basic_credentials(headers) {
            Some((user, pass)) => {
                // no short-circuit between the user and password checks
                let user_ok = constant_time_eq(user.as_bytes(), ADMIN_USER.as_bytes());
                let pass_ok = constant_time_eq(pass.as_bytes(), self.password.as_bytes());
                user_ok & pass_ok
            }
            None => false,
        }
    }
}

/// Byte comparison whose running time depends only on the input lengths
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Decode `Authorization: Basic <base64(user:pass)>`
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

pub async fn handle_admin(
    State(portal): State<AdminPortal>,
    headers: HeaderMap,
) -> Result<Html<&'static str>, ApiError> {
    if !portal.authorized(&headers) {
        warn!("rejected admin portal request");
        return Err(ApiError::Unauthorized);
    }

    info!("admin portal accessed");
    Ok(Html(ADMIN_PAGE))
}

//! HTTP Basic-auth verification against an argon2 PHC hash.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Rejection for a request without valid credentials.
#[derive(Debug)]
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
  fn into_response(self) -> Response {
    let mut res = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    res.headers_mut().insert(
      header::WWW_AUTHENTICATE,
      HeaderValue::from_static("Basic realm=\"juday\""),
    );
    res
  }
}

/// Verify credentials directly from headers.
pub fn verify_auth(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<(), Unauthorized> {
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;

  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Unauthorized)?;

  let encoded = header_val.strip_prefix("Basic ").ok_or(Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Unauthorized)?;

  if username != config.username {
    return Err(Unauthorized);
  }

  let parsed_hash =
    PasswordHash::new(&config.password_hash).map_err(|_| Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Unauthorized)?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::http::{HeaderMap, header};
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;

  use super::*;

  fn config(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig {
      username:      "user@example.com".to_string(),
      password_hash: hash,
    }
  }

  fn headers_with(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, value.parse().unwrap());
    headers
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  #[test]
  fn correct_credentials() {
    let cfg = config("secret");
    let headers = headers_with(&basic("user@example.com", "secret"));
    assert!(verify_auth(&headers, &cfg).is_ok());
  }

  #[test]
  fn wrong_password() {
    let cfg = config("secret");
    let headers = headers_with(&basic("user@example.com", "wrong"));
    assert!(verify_auth(&headers, &cfg).is_err());
  }

  #[test]
  fn wrong_username() {
    let cfg = config("secret");
    let headers = headers_with(&basic("someone@else.com", "secret"));
    assert!(verify_auth(&headers, &cfg).is_err());
  }

  #[test]
  fn missing_header() {
    let cfg = config("secret");
    assert!(verify_auth(&HeaderMap::new(), &cfg).is_err());
  }

  #[test]
  fn invalid_base64() {
    let cfg = config("secret");
    let headers = headers_with("Basic !!!not-base64!!!");
    assert!(verify_auth(&headers, &cfg).is_err());
  }
}

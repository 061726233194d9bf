//! Principal — the authenticated identity that owns sheets.
//!
//! Principals are created by the external auth collaborator; this core only
//! carries their identity metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated identity. Lifetime = session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub id:         Uuid,
  pub email:      String,
  pub created_at: DateTime<Utc>,
}

use chrono::{DateTime, TimeZone, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

const RANDOM_SEGMENT_LEN: usize = 16;

/// Single-use CSRF binding between an authorization redirect and the owner
/// who started it. The value has the shape `{owner_id}_{unix_seconds}_{random}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationState {
    pub value: String,
    pub owner_id: String,
    pub issued_at: DateTime<Utc>,
}

impl AuthorizationState {
    pub fn mint(owner_id: &str, now: DateTime<Utc>) -> Self {
        let random: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RANDOM_SEGMENT_LEN)
            .map(char::from)
            .collect();

        Self {
            value: format!("{}_{}_{}", owner_id, now.timestamp(), random),
            owner_id: owner_id.to_string(),
            issued_at: now,
        }
    }

    /// Recovers owner and issue time from a state value. Owner ids may
    /// themselves contain underscores, so the value is split from the right.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.rsplitn(3, '_');
        let random = parts.next()?;
        let timestamp = parts.next()?;
        let owner_id = parts.next()?;

        if owner_id.is_empty()
            || random.is_empty()
            || !random.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return None;
        }

        let seconds: i64 = timestamp.parse().ok()?;
        let issued_at = Utc.timestamp_opt(seconds, 0).single()?;

        Some(Self {
            value: value.to_string(),
            owner_id: owner_id.to_string(),
            issued_at,
        })
    }
}

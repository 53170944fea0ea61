use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkedInProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub picture: Option<String>,
}

/// Delegated LinkedIn access for one account owner.
///
/// The record outlives a disconnect: token and profile fields are cleared
/// but the document itself is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInCredential {
    #[serde(rename = "_id")]
    pub owner_id: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Only meaningful while `access_token` is present.
    pub token_expiry: Option<bson::DateTime>,
    pub provider_user_id: Option<String>,
    pub provider_email: Option<String>,
    pub profile: Option<LinkedInProfile>,
    pub is_connected: bool,
    pub last_connected_at: Option<bson::DateTime>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl LinkedInCredential {
    pub fn new(owner_id: String) -> Self {
        Self {
            owner_id,
            access_token: None,
            refresh_token: None,
            token_expiry: None,
            provider_user_id: None,
            provider_email: None,
            profile: None,
            is_connected: false,
            last_connected_at: None,
            updated_at: Utc::now(),
        }
    }

    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.token_expiry.map(|d| d.to_chrono())
    }

    pub fn last_connected_at(&self) -> Option<DateTime<Utc>> {
        self.last_connected_at.map(|d| d.to_chrono())
    }

    /// Access token present and either no recorded expiry or not yet reached.
    pub fn has_valid_access_token(&self, now: DateTime<Utc>) -> bool {
        match (&self.access_token, self.token_expiry()) {
            (None, _) => false,
            (Some(token), _) if token.is_empty() => false,
            (Some(_), None) => true,
            (Some(_), Some(expiry)) => now < expiry,
        }
    }

    /// Current tokens, when an access token is stored.
    pub fn bundle(&self) -> Option<TokenBundle> {
        self.access_token.as_ref().map(|access| TokenBundle {
            access_token: access.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_at: self.token_expiry(),
        })
    }

    /// Replaces the token fields. A bundle without a refresh token keeps the
    /// one already stored, since LinkedIn omits it from most refresh responses.
    pub fn apply_bundle(&mut self, bundle: &TokenBundle) {
        self.access_token = Some(bundle.access_token.clone());
        if bundle.refresh_token.is_some() {
            self.refresh_token = bundle.refresh_token.clone();
        }
        self.token_expiry = bundle.expires_at.map(bson::DateTime::from_chrono);
        self.updated_at = Utc::now();
    }

    pub fn apply_profile(&mut self, profile: &ConnectedProfile) {
        self.provider_user_id = Some(profile.provider_user_id.clone());
        self.provider_email = profile.email.clone();
        self.profile = Some(LinkedInProfile {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            full_name: profile.full_name.clone(),
            picture: profile.picture.clone(),
        });
    }

    pub fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.token_expiry = None;
        self.provider_user_id = None;
        self.provider_email = None;
        self.profile = None;
        self.is_connected = false;
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenBundle {
    pub fn from_expires_in(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: expires_in.and_then(|secs| {
                chrono::Duration::try_seconds(secs.max(0))
                    .and_then(|lifetime| now.checked_add_signed(lifetime))
            }),
        }
    }
}

/// Identity returned by LinkedIn's userinfo endpoint after a connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedProfile {
    pub provider_user_id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub is_connected: bool,
    pub token_valid: bool,
    pub last_connected_at: Option<DateTime<Utc>>,
    pub provider_email: Option<String>,
    pub profile: Option<LinkedInProfile>,
}

impl ConnectionStatus {
    pub fn disconnected() -> Self {
        Self {
            is_connected: false,
            token_valid: false,
            last_connected_at: None,
            provider_email: None,
            profile: None,
        }
    }
}

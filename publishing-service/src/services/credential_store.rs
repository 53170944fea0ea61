use crate::models::LinkedInCredential;
use crate::services::database::MongoDb;
use crate::services::error::ServiceError;
use async_trait::async_trait;
use mongodb::{bson::doc, options::ReplaceOptions};
use std::collections::HashMap;
use std::sync::Mutex;

/// Durable per-owner credential record.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find(&self, owner_id: &str) -> Result<Option<LinkedInCredential>, ServiceError>;

    /// Inserts or replaces the owner's record.
    async fn save(&self, credential: &LinkedInCredential) -> Result<(), ServiceError>;

    async fn health_check(&self) -> Result<(), ServiceError>;
}

#[async_trait]
impl CredentialStore for MongoDb {
    async fn find(&self, owner_id: &str) -> Result<Option<LinkedInCredential>, ServiceError> {
        self.linkedin_credentials()
            .find_one(doc! { "_id": owner_id }, None)
            .await
            .map_err(|e| {
                tracing::error!(owner_id = %owner_id, "Failed to load LinkedIn credential: {}", e);
                ServiceError::from(e)
            })
    }

    async fn save(&self, credential: &LinkedInCredential) -> Result<(), ServiceError> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.linkedin_credentials()
            .replace_one(doc! { "_id": credential.owner_id.as_str() }, credential, options)
            .await
            .map_err(|e| {
                tracing::error!(
                    owner_id = %credential.owner_id,
                    "Failed to save LinkedIn credential: {}",
                    e
                );
                ServiceError::from(e)
            })?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        MongoDb::health_check(self)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    records: Mutex<HashMap<String, LinkedInCredential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of an owner's record, for assertions.
    pub fn get(&self, owner_id: &str) -> Option<LinkedInCredential> {
        self.records.lock().ok()?.get(owner_id).cloned()
    }

    pub fn insert(&self, credential: LinkedInCredential) {
        if let Ok(mut records) = self.records.lock() {
            records.insert(credential.owner_id.clone(), credential);
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find(&self, owner_id: &str) -> Result<Option<LinkedInCredential>, ServiceError> {
        let records = self
            .records
            .lock()
            .map_err(|e| ServiceError::Database(format!("Credential store mutex poisoned: {}", e)))?;
        Ok(records.get(owner_id).cloned())
    }

    async fn save(&self, credential: &LinkedInCredential) -> Result<(), ServiceError> {
        self.records
            .lock()
            .map_err(|e| ServiceError::Database(format!("Credential store mutex poisoned: {}", e)))?
            .insert(credential.owner_id.clone(), credential.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

use crate::models::LinkedInCredential;
use mongodb::{
    bson::doc, options::IndexOptions, Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::Error::new(e))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for publishing-service");

        // Credentials are keyed by owner in _id; the provider id lookup is secondary.
        let provider_user_index = IndexModel::builder()
            .keys(doc! { "provider_user_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("provider_user_lookup".to_string())
                    .sparse(true)
                    .build(),
            )
            .build();

        self.linkedin_credentials()
            .create_index(provider_user_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create provider_user_id index on linkedin_credentials: {}",
                    e
                );
                AppError::DatabaseError(anyhow::Error::new(e))
            })?;
        tracing::info!("Created index on linkedin_credentials.provider_user_id");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::Error::new(e))
            })?;
        Ok(())
    }

    pub fn linkedin_credentials(&self) -> Collection<LinkedInCredential> {
        self.db.collection("linkedin_credentials")
    }
}

pub mod authorization;
pub mod automation;
pub mod credential_store;
pub mod database;
pub mod error;
pub mod linkedin;
pub mod metrics;
pub mod orchestrator;
pub mod publishers;
pub mod redis;
pub mod state_store;
pub mod token_manager;

pub use authorization::AuthorizationFlow;
pub use automation::AutomationFallbackPublisher;
pub use credential_store::CredentialStore;
pub use database::MongoDb;
pub use error::ServiceError;
pub use linkedin::LinkedInClient;
pub use orchestrator::PublishOrchestrator;
pub use redis::RedisService;
pub use state_store::AuthorizationStateStore;
pub use token_manager::TokenLifecycleManager;

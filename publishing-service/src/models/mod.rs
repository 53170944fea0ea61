pub mod authorization_state;
pub mod credential;
pub mod publish;

pub use authorization_state::AuthorizationState;
pub use credential::{
    ConnectedProfile, ConnectionStatus, LinkedInCredential, LinkedInProfile, TokenBundle,
};
pub use publish::{
    AutomationPost, InteractiveCredentials, MatchedStrategy, OverallStatus, PublishFailure,
    PublishFailureKind, PublishReport, PublishRequest, PublishResult, PublishStrategy, Remedy,
    LINKEDIN_PLATFORM,
};

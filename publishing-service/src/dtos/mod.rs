pub mod oauth;
pub mod publish;

pub use oauth::{AuthorizationUrlResponse, DisconnectResponse};
pub use publish::{
    AutomationPublishRequest, AutomationVerifyRequest, PostingGuidelinesResponse, PublishRequestDto,
    VerificationHelpResponse,
};

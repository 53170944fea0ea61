pub mod health;
pub mod oauth;
pub mod publish;

pub use health::{health_check, metrics_endpoint};
pub use oauth::{authorization_callback, connection_status, disconnect, start_authorization};
pub use publish::{
    posting_guidelines, publish, publish_automation, verification_help, verify_automation_login,
};

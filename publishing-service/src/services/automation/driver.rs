use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Opaque reference to an element inside one browser session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Browser session could not be started: {0}")]
    SessionStart(String),

    #[error("Browser command '{command}' failed: {message}")]
    Command { command: String, message: String },

    #[error("Browser transport error: {0}")]
    Transport(String),
}

impl DriverError {
    pub fn command(command: &str, message: impl Into<String>) -> Self {
        DriverError::Command {
            command: command.to_string(),
            message: message.into(),
        }
    }
}

/// A live browser the automation flow drives.
///
/// Scripts passed to [`BrowserSession::execute`] receive the element as
/// `arguments[0]` followed by `args`.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    async fn page_source(&self) -> Result<String, DriverError>;

    /// Every element matching a CSS selector, possibly none.
    async fn find_all(&self, css: &str) -> Result<Vec<ElementHandle>, DriverError>;

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, DriverError>;

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, DriverError>;

    async fn text(&self, element: &ElementHandle) -> Result<String, DriverError>;

    async fn clear(&self, element: &ElementHandle) -> Result<(), DriverError>;

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError>;

    async fn execute(
        &self,
        script: &str,
        element: &ElementHandle,
        args: Vec<Value>,
    ) -> Result<Value, DriverError>;

    /// Ends the session. Called exactly once per acquired session.
    async fn close(&self) -> Result<(), DriverError>;
}

/// Acquires browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, DriverError>;
}

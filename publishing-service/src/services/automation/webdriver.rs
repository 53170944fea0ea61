//! W3C WebDriver backend for chromedriver or a Selenium grid.

use super::driver::{BrowserLauncher, BrowserSession, DriverError, ElementHandle};
use crate::config::AutomationConfig;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{json, Value};

/// Key under which WebDriver serializes element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const WINDOW_WIDTH: u32 = 1366;
const WINDOW_HEIGHT: u32 = 768;

const CHROME_ARGS: [&str; 9] = [
    "--disable-blink-features=AutomationControlled",
    "--disable-web-security",
    "--allow-running-insecure-content",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-infobars",
    "--disable-notifications",
    "--user-agent=Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

#[derive(Debug, Deserialize)]
struct WebDriverResponse {
    value: Value,
}

#[derive(Debug, Deserialize)]
struct WebDriverErrorValue {
    error: String,
    message: Option<String>,
}

#[derive(Clone)]
pub struct WebDriverLauncher {
    client: Client,
    endpoint: String,
    headless: bool,
}

impl WebDriverLauncher {
    pub fn new(config: &AutomationConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.webdriver_url.trim_end_matches('/').to_string(),
            headless: config.headless,
        }
    }

    fn capabilities(&self) -> Value {
        let mut args: Vec<&str> = CHROME_ARGS.to_vec();
        if self.headless {
            args.push("--headless=new");
        }

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": args,
                        "prefs": {
                            "profile.default_content_setting_values.notifications": 2,
                            "profile.default_content_settings.popups": 0,
                            "profile.managed_default_content_settings.images": 2
                        }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, DriverError> {
        let url = format!("{}/session", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&self.capabilities())
            .send()
            .await
            .map_err(|e| DriverError::SessionStart(e.to_string()))?;

        let value = decode(response, "new session")
            .await
            .map_err(|e| DriverError::SessionStart(e.to_string()))?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::SessionStart("response carried no sessionId".into()))?
            .to_string();

        tracing::info!(session_id = %session_id, "WebDriver session started");

        let session = WebDriverSession {
            client: self.client.clone(),
            base: format!("{}/session/{}", self.endpoint, session_id),
            session_id,
        };

        // A failed resize leaves a usable browser.
        if let Err(e) = session
            .command(
                Method::POST,
                "/window/rect",
                Some(json!({ "width": WINDOW_WIDTH, "height": WINDOW_HEIGHT })),
            )
            .await
        {
            tracing::debug!(error = %e, "Could not resize browser window");
        }

        Ok(Box::new(session))
    }
}

pub struct WebDriverSession {
    client: Client,
    base: String,
    session_id: String,
}

impl WebDriverSession {
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, DriverError> {
        let url = format!("{}{}", self.base, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DriverError::Transport(e.to_string()))?;
        decode(response, path).await
    }

    fn element_path(element: &ElementHandle, suffix: &str) -> String {
        format!("/element/{}/{}", element.0, suffix)
    }

    async fn bool_command(&self, element: &ElementHandle, suffix: &str) -> Result<bool, DriverError> {
        let value = self
            .command(Method::GET, &Self::element_path(element, suffix), None)
            .await?;
        value
            .as_bool()
            .ok_or_else(|| DriverError::command(suffix, "expected a boolean"))
    }
}

async fn decode(response: reqwest::Response, command: &str) -> Result<Value, DriverError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DriverError::Transport(e.to_string()))?;

    let parsed: WebDriverResponse = serde_json::from_str(&body)
        .map_err(|e| DriverError::command(command, format!("invalid response ({}): {}", status, e)))?;

    if status.is_success() {
        return Ok(parsed.value);
    }

    let message = serde_json::from_value::<WebDriverErrorValue>(parsed.value)
        .map(|e| match e.message {
            Some(message) => format!("{}: {}", e.error, message),
            None => e.error,
        })
        .unwrap_or_else(|_| status.to_string());
    Err(DriverError::command(command, message))
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await
            .map(|_| ())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let value = self.command(Method::GET, "/url", None).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DriverError::command("/url", "expected a string"))
    }

    async fn page_source(&self) -> Result<String, DriverError> {
        let value = self.command(Method::GET, "/source", None).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DriverError::command("/source", "expected a string"))
    }

    async fn find_all(&self, css: &str) -> Result<Vec<ElementHandle>, DriverError> {
        let value = self
            .command(
                Method::POST,
                "/elements",
                Some(json!({ "using": "css selector", "value": css })),
            )
            .await?;

        Ok(value
            .as_array()
            .map(|elements| {
                elements
                    .iter()
                    .filter_map(|e| e.get(ELEMENT_KEY).and_then(Value::as_str))
                    .map(|id| ElementHandle(id.to_string()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        self.bool_command(element, "displayed").await
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        self.bool_command(element, "enabled").await
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        let value = self
            .command(Method::GET, &Self::element_path(element, "text"), None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.command(Method::POST, &Self::element_path(element, "clear"), Some(json!({})))
            .await
            .map(|_| ())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.command(
            Method::POST,
            &Self::element_path(element, "value"),
            Some(json!({ "text": text })),
        )
        .await
        .map(|_| ())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.command(Method::POST, &Self::element_path(element, "click"), Some(json!({})))
            .await
            .map(|_| ())
    }

    async fn execute(
        &self,
        script: &str,
        element: &ElementHandle,
        args: Vec<Value>,
    ) -> Result<Value, DriverError> {
        let mut reference = serde_json::Map::new();
        reference.insert(ELEMENT_KEY.to_string(), Value::String(element.0.clone()));

        let mut all_args = Vec::with_capacity(args.len() + 1);
        all_args.push(Value::Object(reference));
        all_args.extend(args);

        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": all_args })),
        )
        .await
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.command(Method::DELETE, "", None).await?;
        tracing::info!(session_id = %self.session_id, "WebDriver session closed");
        Ok(())
    }
}

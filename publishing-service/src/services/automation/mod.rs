//! Browser-driven LinkedIn posting for callers that only hold an interactive
//! login.
//!
//! A run walks a fixed sequence of stages:
//!
//! ```text
//! LoggingIn -> ChallengeCheck -> [Verifying] -> Ready -> ComposerOpen
//!           -> ContentEntered -> Submitted -> SuccessCheck
//! ```
//!
//! Every stage that depends on page structure tries an ordered chain of
//! named locators or techniques and records which one matched. The browser
//! session is released on every exit path, panics included.

pub mod driver;
pub mod locator;
pub mod webdriver;

use crate::config::AutomationConfig;
use crate::models::{
    AutomationPost, InteractiveCredentials, MatchedStrategy, PublishFailureKind, PublishResult,
    PublishStrategy, LINKEDIN_PLATFORM,
};
use crate::services::credential_store::CredentialStore;
use crate::services::metrics;
use crate::services::publishers::{compose_post_text, truncate_content, HIRING_HEADLINE};
use driver::{BrowserLauncher, BrowserSession, DriverError, ElementHandle};
use futures::FutureExt;
use locator::{LocatorMatch, NamedLocator, Requirement};
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use webdriver::WebDriverLauncher;

const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView(true);";
const CLEAR_CONTENT: &str = "arguments[0].innerHTML = '';";
const SET_INNER_HTML: &str = "arguments[0].innerHTML = arguments[1];";
const SET_TEXT_CONTENT: &str = "arguments[0].textContent = arguments[1];";
const SET_INNER_TEXT: &str = "arguments[0].innerText = arguments[1];";
const READ_CONTENT: &str =
    "return arguments[0].textContent || arguments[0].innerText || arguments[0].innerHTML;";
const DISPATCH_INPUT_EVENTS: &str = r#"
const element = arguments[0];
element.dispatchEvent(new Event('input', { bubbles: true }));
element.dispatchEvent(new Event('change', { bubbles: true }));
element.dispatchEvent(new KeyboardEvent('keyup', { bubbles: true }));
element.dispatchEvent(new KeyboardEvent('keydown', { bubbles: true }));
element.dispatchEvent(new Event('blur', { bubbles: true }));
element.dispatchEvent(new Event('focus', { bubbles: true }));
"#;
const SCRIPTED_CLICK: &str = "arguments[0].click();";
const SYNTHETIC_CLICK: &str =
    "arguments[0].dispatchEvent(new MouseEvent('click', { bubbles: true }));";

const SUBMIT_WORDS: [&str; 3] = ["post", "share", "publish"];
const COMPOSER_CLOSED_MARKER: &str = "share-creation-state";
const VERIFICATION_SUGGESTED: &str =
    "Post submitted. Please check your LinkedIn feed to verify it was published.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutomationError {
    #[error("LinkedIn account not connected and no username supplied")]
    NotConnected,

    #[error("LinkedIn login failed: {0}")]
    LoginFailed(String),

    #[error("LinkedIn verification was not completed after {attempts} checks ({waited_secs}s)")]
    VerificationTimeout { attempts: u32, waited_secs: u64 },

    #[error("Could not open the LinkedIn post composer")]
    ComposerNotFound,

    #[error("Could not find the LinkedIn post text area")]
    TextAreaNotFound,

    #[error("Could not enter the post content")]
    ContentEntryFailed,

    #[error("Could not find or click the LinkedIn post button")]
    SubmitControlNotFound,

    #[error("Browser automation failed: {0}")]
    Driver(#[from] DriverError),

    #[error("Browser automation aborted unexpectedly: {0}")]
    Aborted(String),
}

impl AutomationError {
    pub fn kind(&self) -> PublishFailureKind {
        match self {
            AutomationError::NotConnected => PublishFailureKind::NotConnected,
            AutomationError::Aborted(_) => PublishFailureKind::Internal,
            _ => PublishFailureKind::AutomationFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationStage {
    LoggingIn,
    ChallengeCheck,
    Verifying,
    Ready,
    ComposerOpen,
    ContentEntered,
    Submitted,
    SuccessCheck,
}

impl AutomationStage {
    pub fn as_str(self) -> &'static str {
        match self {
            AutomationStage::LoggingIn => "logging_in",
            AutomationStage::ChallengeCheck => "challenge_check",
            AutomationStage::Verifying => "verifying",
            AutomationStage::Ready => "ready",
            AutomationStage::ComposerOpen => "composer_open",
            AutomationStage::ContentEntered => "content_entered",
            AutomationStage::Submitted => "submitted",
            AutomationStage::SuccessCheck => "success_check",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentStrategy {
    TypeKeys,
    InnerHtml,
    TextContent,
    InnerText,
}

impl ContentStrategy {
    const ALL: [ContentStrategy; 4] = [
        ContentStrategy::TypeKeys,
        ContentStrategy::InnerHtml,
        ContentStrategy::TextContent,
        ContentStrategy::InnerText,
    ];

    fn name(self) -> &'static str {
        match self {
            ContentStrategy::TypeKeys => "type_keys",
            ContentStrategy::InnerHtml => "inner_html",
            ContentStrategy::TextContent => "text_content",
            ContentStrategy::InnerText => "inner_text",
        }
    }
}

/// How a finished run judged the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Completion {
    message: String,
    verification_suggested: bool,
}

/// Only `challenge` marks verification. A rejected sign-in lands on
/// `/checkpoint/lg/login-submit`, which is a login page.
fn is_challenge_url(url: &str) -> bool {
    url.to_lowercase().contains("challenge")
}

fn is_login_url(url: &str) -> bool {
    url.to_lowercase().contains("login")
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

enum Job {
    Publish { text: String, snippets: Vec<String> },
    VerifyLogin,
}

/// One pass through the state machine over a borrowed session.
struct Run<'a> {
    session: &'a dyn BrowserSession,
    config: &'a AutomationConfig,
    web_base: &'a str,
    stage: AutomationStage,
    trace: Vec<MatchedStrategy>,
}

impl<'a> Run<'a> {
    fn new(session: &'a dyn BrowserSession, config: &'a AutomationConfig, web_base: &'a str) -> Self {
        Self {
            session,
            config,
            web_base,
            stage: AutomationStage::LoggingIn,
            trace: Vec::new(),
        }
    }

    fn enter(&mut self, stage: AutomationStage) {
        tracing::debug!(from = self.stage.as_str(), to = stage.as_str(), "Automation stage transition");
        self.stage = stage;
    }

    fn record(&mut self, strategy: &str) {
        tracing::info!(stage = self.stage.as_str(), strategy = %strategy, "Automation strategy matched");
        self.trace.push(MatchedStrategy {
            stage: self.stage.as_str().to_string(),
            strategy: strategy.to_string(),
        });
    }

    async fn execute(
        &mut self,
        username: &str,
        password: &str,
        job: &Job,
    ) -> Result<Completion, AutomationError> {
        match job {
            Job::Publish { text, snippets } => self.publish(username, password, text, snippets).await,
            Job::VerifyLogin => {
                self.sign_in(username, password).await?;
                Ok(Completion {
                    message: "LinkedIn login verified".to_string(),
                    verification_suggested: false,
                })
            }
        }
    }

    async fn publish(
        &mut self,
        username: &str,
        password: &str,
        text: &str,
        snippets: &[String],
    ) -> Result<Completion, AutomationError> {
        self.sign_in(username, password).await?;

        self.enter(AutomationStage::Ready);
        self.open_composer().await?;

        self.enter(AutomationStage::ComposerOpen);
        let surface = self.locate_text_surface().await?;

        self.enter(AutomationStage::ContentEntered);
        self.enter_content(&surface, text).await?;

        self.enter(AutomationStage::Submitted);
        self.submit().await?;

        self.enter(AutomationStage::SuccessCheck);
        Ok(self.check_success(snippets).await)
    }

    /// LoggingIn, ChallengeCheck and, when challenged, Verifying.
    async fn sign_in(&mut self, username: &str, password: &str) -> Result<(), AutomationError> {
        self.enter(AutomationStage::LoggingIn);
        self.log_in(username, password).await?;

        self.enter(AutomationStage::ChallengeCheck);
        let url = self.session.current_url().await?;
        if is_login_url(&url) && !is_challenge_url(&url) {
            return Err(AutomationError::LoginFailed(
                "still on the login page, check the username and password".to_string(),
            ));
        }
        if is_challenge_url(&url) || locator::CHALLENGE_INPUTS.any_present(self.session).await {
            tracing::warn!("LinkedIn verification challenge detected");
            self.enter(AutomationStage::Verifying);
            return self.await_verification().await;
        }
        Ok(())
    }

    async fn log_in(&mut self, username: &str, password: &str) -> Result<(), AutomationError> {
        self.session
            .navigate(&format!("{}/login", self.web_base))
            .await?;
        pause(self.config.settle_delay()).await;

        let username_field = self
            .wait_for(locator::LOGIN_USERNAME)
            .await
            .ok_or_else(|| AutomationError::LoginFailed("login form did not load".to_string()))?;
        self.session.clear(&username_field).await?;
        self.session.send_keys(&username_field, username).await?;

        let password_field = self
            .first(locator::LOGIN_PASSWORD)
            .await
            .ok_or_else(|| AutomationError::LoginFailed("password field not found".to_string()))?;
        self.session.clear(&password_field).await?;
        self.session.send_keys(&password_field, password).await?;

        let submit = self
            .first(locator::LOGIN_SUBMIT)
            .await
            .ok_or_else(|| AutomationError::LoginFailed("sign-in button not found".to_string()))?;
        self.session.click(&submit).await?;

        pause(self.config.post_submit_delay()).await;
        Ok(())
    }

    async fn first(&self, locator: NamedLocator) -> Option<ElementHandle> {
        self.session
            .find_all(locator.css)
            .await
            .ok()
            .and_then(|elements| elements.into_iter().next())
    }

    async fn wait_for(&self, locator: NamedLocator) -> Option<ElementHandle> {
        for _ in 0..self.config.element_wait_attempts.max(1) {
            if let Some(element) = self.first(locator).await {
                return Some(element);
            }
            pause(self.config.settle_delay()).await;
        }
        None
    }

    /// Tries a skip control once, then polls until the challenge is gone or
    /// the attempts run out.
    async fn await_verification(&mut self) -> Result<(), AutomationError> {
        if let Some(skip) = locator::SKIP_CONTROLS
            .first_match(self.session, Requirement::Displayed)
            .await
        {
            if self.session.click(&skip.element).await.is_ok() {
                self.record(skip.strategy);
                pause(self.config.settle_delay()).await;
            }
        }

        let max_attempts = self.config.max_verification_attempts;
        for attempt in 1..=max_attempts {
            let url = self.session.current_url().await?;
            let challenged = is_challenge_url(&url)
                || locator::CHALLENGE_INPUTS.any_present(self.session).await;

            if !challenged {
                if is_login_url(&url) {
                    return Err(AutomationError::LoginFailed(
                        "returned to the login page after verification".to_string(),
                    ));
                }
                tracing::info!(attempt, "LinkedIn verification completed");
                return Ok(());
            }

            tracing::info!(attempt, max_attempts, "Waiting for manual LinkedIn verification");
            pause(self.config.poll_interval()).await;
        }

        Err(AutomationError::VerificationTimeout {
            attempts: max_attempts,
            waited_secs: self.config.max_verification_wait().as_secs(),
        })
    }

    async fn open_composer(&mut self) -> Result<(), AutomationError> {
        let overlay = format!("{}/in/me/overlay/create-post/", self.web_base);
        match self.session.navigate(&overlay).await {
            Ok(()) => {
                pause(self.config.settle_delay()).await;
                let url = self.session.current_url().await?;
                if url.contains("create-post") || url.contains("overlay") {
                    self.record("direct_overlay_url");
                    return Ok(());
                }
                tracing::debug!(url = %url, "Composer overlay URL did not stick");
            }
            Err(e) => {
                tracing::debug!(error = %e, "Composer overlay URL failed");
            }
        }

        self.session
            .navigate(&format!("{}/in/me/", self.web_base))
            .await?;
        pause(self.config.settle_delay()).await;

        let entry = locator::COMPOSER_ENTRY_POINTS
            .first_match(self.session, Requirement::Displayed)
            .await
            .ok_or(AutomationError::ComposerNotFound)?;

        if self.click_with_fallbacks(&entry.element).await.is_none() {
            return Err(AutomationError::ComposerNotFound);
        }
        self.record(entry.strategy);
        pause(self.config.settle_delay()).await;
        Ok(())
    }

    async fn locate_text_surface(&mut self) -> Result<ElementHandle, AutomationError> {
        for _ in 0..self.config.element_wait_attempts.max(1) {
            if let Some(found) = locator::TEXT_SURFACES
                .first_match(self.session, Requirement::Interactable)
                .await
            {
                return Ok(self.accept(found));
            }
            pause(self.config.settle_delay()).await;
        }

        tracing::warn!("Named text area locators exhausted, scanning for editable elements");
        match locator::GENERIC_EDITABLE
            .first_match(self.session, Requirement::Present)
            .await
        {
            Some(found) => Ok(self.accept(found)),
            None => Err(AutomationError::TextAreaNotFound),
        }
    }

    fn accept(&mut self, found: LocatorMatch) -> ElementHandle {
        self.record(found.strategy);
        found.element
    }

    async fn enter_content(
        &mut self,
        surface: &ElementHandle,
        text: &str,
    ) -> Result<(), AutomationError> {
        // Focus and clear are best effort; the strategies below verify.
        let _ = self.session.execute(SCROLL_INTO_VIEW, surface, vec![]).await;
        let _ = self.session.click(surface).await;
        let _ = self.session.execute(CLEAR_CONTENT, surface, vec![]).await;

        for strategy in ContentStrategy::ALL {
            let applied = match strategy {
                ContentStrategy::TypeKeys => self.session.send_keys(surface, text).await,
                ContentStrategy::InnerHtml => self.assign(SET_INNER_HTML, surface, text).await,
                ContentStrategy::TextContent => self.assign(SET_TEXT_CONTENT, surface, text).await,
                ContentStrategy::InnerText => self.assign(SET_INNER_TEXT, surface, text).await,
            };
            if let Err(e) = applied {
                tracing::debug!(strategy = strategy.name(), error = %e, "Content strategy failed");
                continue;
            }

            let _ = self
                .session
                .execute(DISPATCH_INPUT_EVENTS, surface, vec![])
                .await;
            pause(self.config.settle_delay()).await;

            if self.has_content(surface).await {
                self.record(strategy.name());
                return Ok(());
            }
            tracing::debug!(strategy = strategy.name(), "Content strategy left the editor empty");
        }

        Err(AutomationError::ContentEntryFailed)
    }

    async fn assign(&self, script: &str, surface: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.session
            .execute(script, surface, vec![json!(text)])
            .await
            .map(|_| ())
    }

    async fn has_content(&self, surface: &ElementHandle) -> bool {
        match self.session.execute(READ_CONTENT, surface, vec![]).await {
            Ok(Value::String(content)) => !content.trim().is_empty(),
            _ => false,
        }
    }

    async fn submit(&mut self) -> Result<(), AutomationError> {
        pause(self.config.settle_delay()).await;

        let mut candidates = Vec::new();
        for candidate in locator::SUBMIT_CONTROLS
            .all_matches(self.session, Requirement::Interactable)
            .await
        {
            let label = self
                .session
                .text(&candidate.element)
                .await
                .unwrap_or_default()
                .to_lowercase();
            if SUBMIT_WORDS.iter().any(|word| label.contains(word)) {
                candidates.push(candidate);
            }
        }

        for fallback in locator::PRIMARY_BUTTONS
            .all_matches(self.session, Requirement::Interactable)
            .await
        {
            if !candidates.iter().any(|c| c.element == fallback.element) {
                candidates.push(fallback);
            }
        }

        for candidate in candidates {
            if let Some(technique) = self.click_with_fallbacks(&candidate.element).await {
                self.record(candidate.strategy);
                self.record(technique);
                return Ok(());
            }
            tracing::debug!(strategy = candidate.strategy, "Submit candidate could not be clicked");
        }

        Err(AutomationError::SubmitControlNotFound)
    }

    /// Direct click, then a scripted click, then a synthetic mouse event.
    async fn click_with_fallbacks(&self, element: &ElementHandle) -> Option<&'static str> {
        let _ = self.session.execute(SCROLL_INTO_VIEW, element, vec![]).await;

        if self.session.click(element).await.is_ok() {
            return Some("direct_click");
        }
        if self.session.execute(SCRIPTED_CLICK, element, vec![]).await.is_ok() {
            return Some("scripted_click");
        }
        if self.session.execute(SYNTHETIC_CLICK, element, vec![]).await.is_ok() {
            return Some("synthetic_event");
        }
        None
    }

    /// Success markers, then page state, then content presence. Nothing
    /// here is fatal: an inconclusive check still reports success.
    async fn check_success(&mut self, snippets: &[String]) -> Completion {
        pause(self.config.post_submit_delay()).await;

        if let Some(marker) = locator::SUCCESS_MARKERS
            .first_match(self.session, Requirement::Present)
            .await
        {
            self.record(marker.strategy);
            let detail = self.session.text(&marker.element).await.unwrap_or_default();
            return Completion {
                message: format!("Posted to LinkedIn successfully. {}", detail.trim())
                    .trim_end()
                    .to_string(),
                verification_suggested: false,
            };
        }

        let url = self.session.current_url().await.unwrap_or_default();
        let source = self.session.page_source().await.unwrap_or_default();

        if url.contains("/feed/") && !source.contains(COMPOSER_CLOSED_MARKER) {
            self.record("feed_composer_closed");
            return Completion {
                message: "Posted to LinkedIn successfully (composer closed)".to_string(),
                verification_suggested: false,
            };
        }

        if snippets
            .iter()
            .any(|snippet| !snippet.is_empty() && source.contains(snippet.as_str()))
        {
            self.record("content_visible");
            return Completion {
                message: "Posted to LinkedIn successfully (content found on page)".to_string(),
                verification_suggested: false,
            };
        }

        tracing::warn!("Could not confirm the LinkedIn post, suggesting manual verification");
        Completion {
            message: VERIFICATION_SUGGESTED.to_string(),
            verification_suggested: true,
        }
    }
}

/// Text the success check looks for on the page after posting.
fn content_snippets(post: &AutomationPost) -> Vec<String> {
    let mut snippets = Vec::new();
    if let Some(title) = post.title.as_deref().filter(|t| !t.trim().is_empty()) {
        snippets.push(title.to_string());
        snippets.push(HIRING_HEADLINE.to_string());
    }
    let lead: String = post
        .content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default()
        .trim()
        .chars()
        .take(60)
        .collect();
    if !lead.is_empty() {
        snippets.push(lead);
    }
    snippets
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Posts through a real browser session with caller-supplied credentials.
/// Never invoked implicitly by the orchestrator.
pub struct AutomationFallbackPublisher {
    launcher: Arc<dyn BrowserLauncher>,
    credentials: Arc<dyn CredentialStore>,
    config: AutomationConfig,
    web_base_url: String,
}

impl AutomationFallbackPublisher {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        credentials: Arc<dyn CredentialStore>,
        config: AutomationConfig,
        web_base_url: String,
    ) -> Self {
        Self {
            launcher,
            credentials,
            config,
            web_base_url: web_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Runs the full state machine. Every failure, panics included, comes
    /// back as a failed result rather than an error.
    pub async fn publish(
        &self,
        owner_id: &str,
        login: InteractiveCredentials,
        post: AutomationPost,
    ) -> PublishResult {
        metrics::record_publish_attempt(LINKEDIN_PLATFORM, PublishStrategy::Automation.as_str());

        let composed = compose_post_text(&post.content, post.title.as_deref());
        let (text, truncated) = truncate_content(&composed);
        let snippets = content_snippets(&post);

        let job = Job::Publish { text, snippets };
        let result = self.run_job(owner_id, login, job).await;

        let result = result.with_truncated(truncated);
        metrics::record_publish_outcome(
            LINKEDIN_PLATFORM,
            PublishStrategy::Automation.as_str(),
            result.success,
        );
        result
    }

    /// Logs in (and waits out any challenge) without posting.
    pub async fn verify_login(&self, owner_id: &str, login: InteractiveCredentials) -> PublishResult {
        self.run_job(owner_id, login, Job::VerifyLogin).await
    }

    /// The session runs on its own task, so dropping the caller (a client
    /// hanging up mid-run) cannot skip the close.
    async fn run_job(&self, owner_id: &str, login: InteractiveCredentials, job: Job) -> PublishResult {
        let username = match self.resolve_username(owner_id, &login).await {
            Ok(username) => username,
            Err(e) => return failure(e, Vec::new()),
        };

        let session_run = with_session(
            self.launcher.clone(),
            self.config.clone(),
            self.web_base_url.clone(),
            owner_id.to_string(),
            username,
            login.password,
            job,
        );

        match tokio::spawn(session_run).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(owner_id = %owner_id, error = %e, "LinkedIn automation task failed");
                failure(AutomationError::Aborted(e.to_string()), Vec::new())
            }
        }
    }

    async fn resolve_username(
        &self,
        owner_id: &str,
        login: &InteractiveCredentials,
    ) -> Result<String, AutomationError> {
        if let Some(username) = login.username.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(username.trim().to_string());
        }

        let stored = self
            .credentials
            .find(owner_id)
            .await
            .map_err(|e| AutomationError::Aborted(e.to_string()))?;

        stored
            .and_then(|c| c.provider_email)
            .filter(|email| !email.is_empty())
            .ok_or(AutomationError::NotConnected)
    }
}

async fn with_session(
    launcher: Arc<dyn BrowserLauncher>,
    config: AutomationConfig,
    web_base_url: String,
    owner_id: String,
    username: String,
    password: Secret<String>,
    job: Job,
) -> PublishResult {
    let session = match launcher.launch().await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(owner_id = %owner_id, error = %e, "Could not start browser session");
            return failure(AutomationError::Driver(e), Vec::new());
        }
    };

    let mut run = Run::new(session.as_ref(), &config, &web_base_url);
    let outcome = AssertUnwindSafe(run.execute(&username, password.expose_secret(), &job))
        .catch_unwind()
        .await;
    let stage = run.stage;
    let trace = std::mem::take(&mut run.trace);

    if let Err(e) = session.close().await {
        tracing::warn!(owner_id = %owner_id, error = %e, "Failed to close browser session");
    }

    match outcome {
        Ok(Ok(completion)) => {
            tracing::info!(
                owner_id = %owner_id,
                verification_suggested = completion.verification_suggested,
                "LinkedIn automation run completed"
            );
            let mut result = PublishResult::succeeded(
                LINKEDIN_PLATFORM,
                PublishStrategy::Automation,
                completion.message,
            );
            result.verification_suggested = completion.verification_suggested;
            result.matched_strategies = trace;
            result
        }
        Ok(Err(e)) => {
            tracing::warn!(
                owner_id = %owner_id,
                stage = stage.as_str(),
                error = %e,
                "LinkedIn automation run failed"
            );
            failure(e, trace)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(
                owner_id = %owner_id,
                stage = stage.as_str(),
                panic = %message,
                "LinkedIn automation run panicked"
            );
            failure(AutomationError::Aborted(message), trace)
        }
    }
}

fn failure(error: AutomationError, trace: Vec<MatchedStrategy>) -> PublishResult {
    let mut result = PublishResult::failed(
        LINKEDIN_PLATFORM,
        PublishStrategy::Automation,
        error.kind(),
        error.to_string(),
    );
    result.matched_strategies = trace;
    result
}

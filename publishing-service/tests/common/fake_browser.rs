//! Scripted in-memory browser.
//!
//! The page is a flat list of elements keyed by the exact CSS selector the
//! automation flow asks for. Clicks can navigate, and a queue of URLs can be
//! fed to successive `current_url` calls to simulate a challenge resolving.

use async_trait::async_trait;
use publishing_service::services::automation::driver::{
    BrowserLauncher, BrowserSession, DriverError, ElementHandle,
};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::WEB_BASE_URL;

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub displayed: bool,
    pub enabled: bool,
    pub text: String,
    pub accepts_keys: bool,
    pub accepts_scripts: bool,
    pub click_fails: bool,
    pub on_click: Option<String>,
}

impl FakeElement {
    pub fn visible() -> Self {
        Self {
            displayed: true,
            enabled: true,
            text: String::new(),
            accepts_keys: true,
            accepts_scripts: true,
            click_fails: false,
            on_click: None,
        }
    }

    pub fn hidden() -> Self {
        Self {
            displayed: false,
            ..Self::visible()
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn navigates_to(mut self, url: &str) -> Self {
        self.on_click = Some(url.to_string());
        self
    }

    pub fn ignoring_keys(mut self) -> Self {
        self.accepts_keys = false;
        self
    }

    pub fn rejecting_scripts(mut self) -> Self {
        self.accepts_scripts = false;
        self
    }

    pub fn click_failing(mut self) -> Self {
        self.click_fails = true;
        self
    }
}

#[derive(Default)]
struct Page {
    url: String,
    source: String,
    elements: Vec<(String, String)>,
    behaviors: HashMap<String, FakeElement>,
    content: HashMap<String, String>,
    typed: HashMap<String, String>,
    url_queue: VecDeque<String>,
    panic_on: Option<String>,
    launch_fails: bool,
    navigations: Vec<String>,
    clicks: Vec<String>,
    launches: usize,
    closes: usize,
}

#[derive(Clone, Default)]
pub struct FakeBrowser {
    page: Arc<Mutex<Page>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(self, css: &str, id: &str, behavior: FakeElement) -> Self {
        {
            let mut page = self.page.lock().unwrap();
            page.elements.push((css.to_string(), id.to_string()));
            page.behaviors.insert(id.to_string(), behavior);
        }
        self
    }

    pub fn then_urls(self, urls: &[&str]) -> Self {
        self.page
            .lock()
            .unwrap()
            .url_queue
            .extend(urls.iter().map(|u| u.to_string()));
        self
    }

    pub fn source(self, html: &str) -> Self {
        self.page.lock().unwrap().source = html.to_string();
        self
    }

    pub fn panic_on(self, css: &str) -> Self {
        self.page.lock().unwrap().panic_on = Some(css.to_string());
        self
    }

    pub fn failing_launch(self) -> Self {
        self.page.lock().unwrap().launch_fails = true;
        self
    }

    pub fn launches(&self) -> usize {
        self.page.lock().unwrap().launches
    }

    pub fn closes(&self) -> usize {
        self.page.lock().unwrap().closes
    }

    pub fn navigations(&self) -> Vec<String> {
        self.page.lock().unwrap().navigations.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.page.lock().unwrap().clicks.clone()
    }

    pub fn content_of(&self, id: &str) -> Option<String> {
        self.page.lock().unwrap().content.get(id).cloned()
    }

    pub fn typed_into(&self, id: &str) -> Option<String> {
        self.page.lock().unwrap().typed.get(id).cloned()
    }

    fn behavior(&self, element: &ElementHandle) -> Result<FakeElement, DriverError> {
        self.page
            .lock()
            .unwrap()
            .behaviors
            .get(&element.0)
            .cloned()
            .ok_or_else(|| DriverError::command("element", "stale element reference"))
    }

    fn activate(&self, element: &ElementHandle) {
        let mut page = self.page.lock().unwrap();
        page.clicks.push(element.0.clone());
        if let Some(url) = page.behaviors.get(&element.0).and_then(|b| b.on_click.clone()) {
            page.url = url;
        }
    }
}

/// Login form whose sign-in button lands on the feed.
pub fn login_browser() -> FakeBrowser {
    FakeBrowser::new()
        .element("#username", "username", FakeElement::visible())
        .element("#password", "password", FakeElement::visible())
        .element(
            "button[type=\"submit\"]",
            "sign-in",
            FakeElement::visible()
                .with_text("Sign in")
                .navigates_to(&feed_url()),
        )
}

/// Login plus a composer editor and a share button that returns to the feed.
pub fn posting_browser() -> FakeBrowser {
    login_browser()
        .element(EDITOR_CSS, "editor", FakeElement::visible())
        .element(
            SHARE_BUTTON_CSS,
            "post-button",
            FakeElement::visible().with_text("Post").navigates_to(&feed_url()),
        )
}

pub const EDITOR_CSS: &str = ".ql-editor[contenteditable=\"true\"]";
pub const SHARE_BUTTON_CSS: &str = "button[data-control-name=\"share.post\"]";

pub fn feed_url() -> String {
    format!("{}/feed/", WEB_BASE_URL)
}

pub fn challenge_url() -> String {
    format!("{}/checkpoint/challenge/AgE123", WEB_BASE_URL)
}

#[async_trait]
impl BrowserLauncher for FakeBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, DriverError> {
        let mut page = self.page.lock().unwrap();
        if page.launch_fails {
            return Err(DriverError::SessionStart("chromedriver unreachable".into()));
        }
        page.launches += 1;
        drop(page);
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut page = self.page.lock().unwrap();
        page.navigations.push(url.to_string());
        page.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let mut page = self.page.lock().unwrap();
        if let Some(next) = page.url_queue.pop_front() {
            page.url = next;
        }
        Ok(page.url.clone())
    }

    async fn page_source(&self) -> Result<String, DriverError> {
        Ok(self.page.lock().unwrap().source.clone())
    }

    async fn find_all(&self, css: &str) -> Result<Vec<ElementHandle>, DriverError> {
        let (should_panic, found) = {
            let page = self.page.lock().unwrap();
            let found: Vec<ElementHandle> = page
                .elements
                .iter()
                .filter(|(selector, _)| selector == css)
                .map(|(_, id)| ElementHandle(id.clone()))
                .collect();
            (page.panic_on.as_deref() == Some(css), found)
        };
        if should_panic {
            panic!("fake browser crashed while looking up {}", css);
        }
        Ok(found)
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        Ok(self.behavior(element)?.displayed)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        Ok(self.behavior(element)?.enabled)
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        Ok(self.behavior(element)?.text)
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.behavior(element)?;
        self.page.lock().unwrap().content.remove(&element.0);
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        let behavior = self.behavior(element)?;
        let mut page = self.page.lock().unwrap();
        page.typed
            .entry(element.0.clone())
            .or_default()
            .push_str(text);
        if behavior.accepts_keys {
            page.content
                .entry(element.0.clone())
                .or_default()
                .push_str(text);
        }
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        if self.behavior(element)?.click_fails {
            return Err(DriverError::command("click", "element click intercepted"));
        }
        self.activate(element);
        Ok(())
    }

    async fn execute(
        &self,
        script: &str,
        element: &ElementHandle,
        args: Vec<Value>,
    ) -> Result<Value, DriverError> {
        let behavior = self.behavior(element)?;

        if script.contains("= arguments[1]") {
            if !behavior.accepts_scripts {
                return Err(DriverError::command("execute", "javascript error"));
            }
            let text = args
                .first()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            self.page
                .lock()
                .unwrap()
                .content
                .insert(element.0.clone(), text);
            return Ok(Value::Null);
        }

        if script.contains("innerHTML = ''") {
            self.page.lock().unwrap().content.remove(&element.0);
            return Ok(Value::Null);
        }

        if script.trim_start().starts_with("return") {
            let content = self
                .page
                .lock()
                .unwrap()
                .content
                .get(&element.0)
                .cloned()
                .unwrap_or_default();
            return Ok(Value::String(content));
        }

        if script.contains(".click()") || script.contains("MouseEvent") {
            self.activate(element);
        }

        Ok(Value::Null)
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.page.lock().unwrap().closes += 1;
        Ok(())
    }
}

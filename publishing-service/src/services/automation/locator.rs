use super::driver::{BrowserSession, ElementHandle};

/// A CSS selector with a stable name recorded when it matches.
#[derive(Debug, Clone, Copy)]
pub struct NamedLocator {
    pub name: &'static str,
    pub css: &'static str,
}

const fn loc(name: &'static str, css: &'static str) -> NamedLocator {
    NamedLocator { name, css }
}

/// Ordered selectors tried until one yields a usable element.
#[derive(Debug, Clone, Copy)]
pub struct LocatorChain {
    pub stage: &'static str,
    pub locators: &'static [NamedLocator],
}

/// What a locator must satisfy to count as a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Present,
    Displayed,
    Interactable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorMatch {
    pub strategy: &'static str,
    pub element: ElementHandle,
}

impl LocatorChain {
    /// First element, in chain order, that meets `requirement`. Errors from
    /// individual lookups count as not found so one broken selector never
    /// ends the chain.
    pub async fn first_match(
        &self,
        session: &dyn BrowserSession,
        requirement: Requirement,
    ) -> Option<LocatorMatch> {
        for locator in self.locators {
            match session.find_all(locator.css).await {
                Ok(elements) => {
                    for element in elements {
                        if meets(session, &element, requirement).await {
                            tracing::debug!(
                                stage = self.stage,
                                strategy = locator.name,
                                "Locator matched"
                            );
                            return Some(LocatorMatch {
                                strategy: locator.name,
                                element,
                            });
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        stage = self.stage,
                        strategy = locator.name,
                        error = %e,
                        "Locator lookup failed"
                    );
                }
            }
        }
        None
    }

    /// Every element meeting `requirement`, in chain order, each tagged with
    /// the locator that found it. Elements matched by several locators are
    /// listed once.
    pub async fn all_matches(
        &self,
        session: &dyn BrowserSession,
        requirement: Requirement,
    ) -> Vec<LocatorMatch> {
        let mut matches: Vec<LocatorMatch> = Vec::new();
        for locator in self.locators {
            let Ok(elements) = session.find_all(locator.css).await else {
                continue;
            };
            for element in elements {
                if matches.iter().any(|m| m.element == element) {
                    continue;
                }
                if meets(session, &element, requirement).await {
                    matches.push(LocatorMatch {
                        strategy: locator.name,
                        element,
                    });
                }
            }
        }
        matches
    }

    /// Whether any locator finds at least one element.
    pub async fn any_present(&self, session: &dyn BrowserSession) -> bool {
        self.first_match(session, Requirement::Present).await.is_some()
    }
}

async fn meets(session: &dyn BrowserSession, element: &ElementHandle, requirement: Requirement) -> bool {
    match requirement {
        Requirement::Present => true,
        Requirement::Displayed => session.is_displayed(element).await.unwrap_or(false),
        Requirement::Interactable => {
            session.is_displayed(element).await.unwrap_or(false)
                && session.is_enabled(element).await.unwrap_or(false)
        }
    }
}

pub const LOGIN_USERNAME: NamedLocator = loc("username_id", "#username");
pub const LOGIN_PASSWORD: NamedLocator = loc("password_id", "#password");
pub const LOGIN_SUBMIT: NamedLocator = loc("submit_button", "button[type=\"submit\"]");

pub const CHALLENGE_INPUTS: LocatorChain = LocatorChain {
    stage: "challenge_check",
    locators: &[
        loc("pin_input", "input[name=\"pin\"]"),
        loc("challenge_id_input", "input[name=\"challengeId\"]"),
        loc("verification_input", "input[name=\"verification\"]"),
        loc("code_placeholder_input", "input[type=\"text\"][placeholder*=\"code\"]"),
        loc("verify_placeholder_input", "input[type=\"text\"][placeholder*=\"verify\"]"),
        loc("challenge_form_input", ".challenge-form input[type=\"text\"]"),
    ],
};

pub const SKIP_CONTROLS: LocatorChain = LocatorChain {
    stage: "verifying",
    locators: &[
        loc("skip_button", "button[data-control-name=\"skip\"]"),
        loc("continue_button", "button[data-control-name=\"continue\"]"),
        loc("skip_link", "a[data-control-name=\"skip\"]"),
        loc("skip_link_class", ".skip-link"),
    ],
};

pub const COMPOSER_ENTRY_POINTS: LocatorChain = LocatorChain {
    stage: "ready",
    locators: &[
        loc("nav_create_post", "#navigation-create-post-Create-a-post"),
        loc("create_post_aria", "button[aria-label*=\"Create a post\"]"),
        loc("create_post_aria_lower", "button[aria-label*=\"create a post\"]"),
        loc("start_post_aria", "button[aria-label*=\"Start a post\"]"),
        loc("share_box_trigger", ".share-box-feed-entry__trigger"),
        loc("feed_composer_control", "[data-control-name=\"share_via_feed_composer\"]"),
    ],
};

pub const TEXT_SURFACES: LocatorChain = LocatorChain {
    stage: "composer_open",
    locators: &[
        loc("ql_editor_editable", ".ql-editor[contenteditable=\"true\"]"),
        loc("editable_div", "div[contenteditable=\"true\"]"),
        loc("talk_about_placeholder", "[data-placeholder*=\"What do you want to talk about\"]"),
        loc("conversation_placeholder", "[data-placeholder*=\"Start a conversation\"]"),
        loc("share_placeholder", "[data-placeholder*=\"Share an article, photo, video or idea\"]"),
        loc("mentions_editor", ".mentions-texteditor__content"),
        loc("textbox_role", "div[role=\"textbox\"]"),
        loc("share_creation_editor", ".share-creation-state__text-editor"),
        loc("share_box_test_id", "[data-test-id=\"share-box-text-editor\"]"),
        loc("editor_content", ".editor-content[contenteditable=\"true\"]"),
        loc("ql_editor", ".ql-editor"),
        loc("ql_container_editor", ".ql-container .ql-editor"),
        loc("share_box_editor", ".share-box__text-editor"),
    ],
};

pub const GENERIC_EDITABLE: LocatorChain = LocatorChain {
    stage: "composer_open",
    locators: &[loc("generic_contenteditable", "[contenteditable=\"true\"]")],
};

pub const SUBMIT_CONTROLS: LocatorChain = LocatorChain {
    stage: "submitted",
    locators: &[
        loc("share_post_control", "button[data-control-name=\"share.post\"]"),
        loc("post_aria", "button[aria-label*=\"Post\"]"),
        loc("post_aria_lower", "button[aria-label*=\"post\"]"),
        loc("share_post_test_id", "button[data-test-id=\"share-post-button\"]"),
        loc("post_button_test_id", "button[data-test-id=\"post-button\"]"),
        loc("share_actions_primary", ".share-actions__primary-action"),
        loc("primary_submit", ".artdeco-button--primary[type=\"submit\"]"),
        loc("submit_type", "button[type=\"submit\"]"),
        loc("artdeco_primary", ".artdeco-button--primary"),
        loc("share_actions_button", ".share-actions button"),
        loc("share_creation_button", ".share-creation-state button"),
        loc("post_control", "button[data-control-name*=\"post\"]"),
        loc("share_control", "button[data-control-name*=\"share\"]"),
    ],
};

pub const PRIMARY_BUTTONS: LocatorChain = LocatorChain {
    stage: "submitted",
    locators: &[loc("any_primary_button", ".artdeco-button--primary, button[type=\"submit\"]")],
};

pub const SUCCESS_MARKERS: LocatorChain = LocatorChain {
    stage: "success_check",
    locators: &[
        loc("toast_message", ".artdeco-toast-message"),
        loc("feed_update_description", ".feed-shared-update-v2__description"),
        loc("post_success_test_id", "[data-test-id=\"post-success\"]"),
        loc("feed_update", ".feed-shared-update-v2"),
        loc("share_update_card", ".share-update-card"),
    ],
};

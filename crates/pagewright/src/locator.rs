//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a query, not a snapshot: it names a selection strategy
//! (label text, ARIA role plus accessible name, CSS selector, ...) and is
//! resolved by the driver every time it is used.
//!
//! # Design Philosophy
//!
//! - **Lazy**: constructing a locator never touches the browser
//! - **Comparable**: locators are plain values, so page objects can return
//!   fresh ones from no-argument methods and drivers can key on them
//! - **Diagnosable**: `Display` renders the Playwright-style call that built
//!   the locator, which is what failure messages print

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute used to tag a resolved element so it can be addressed by CSS
pub const MARKER_ATTRIBUTE: &str = "data-pagewright-id";

/// ARIA roles understood by role locators
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaRole {
    /// `<button>`, submit/button inputs, `[role=button]`
    Button,
    /// `<a href>`, `[role=link]`
    Link,
    /// `<h1>`..`<h6>`, `[role=heading]`
    Heading,
    /// Text inputs and textareas
    Textbox,
    /// Checkbox inputs
    Checkbox,
    /// `[role=alert]`
    Alert,
    /// Any other explicit `role` attribute value
    Custom(String),
}

impl AriaRole {
    /// Role name as written in a `role` attribute
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Button => "button",
            Self::Link => "link",
            Self::Heading => "heading",
            Self::Textbox => "textbox",
            Self::Checkbox => "checkbox",
            Self::Alert => "alert",
            Self::Custom(role) => role,
        }
    }

    /// CSS selector list matching elements that carry this role implicitly or explicitly
    #[must_use]
    pub fn implicit_selector(&self) -> String {
        match self {
            Self::Button => {
                "button, input[type=submit], input[type=button], input[type=reset], [role=button]"
                    .to_string()
            }
            Self::Link => "a[href], [role=link]".to_string(),
            Self::Heading => "h1, h2, h3, h4, h5, h6, [role=heading]".to_string(),
            Self::Textbox => {
                "input:not([type]), input[type=text], input[type=email], input[type=search], \
                 input[type=tel], input[type=url], textarea, [role=textbox]"
                    .to_string()
            }
            Self::Checkbox => "input[type=checkbox], [role=checkbox]".to_string(),
            Self::Alert => "[role=alert]".to_string(),
            Self::Custom(role) => format!("[role={}]", js_string(role)),
        }
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selection strategy for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Selector {
    /// Form control associated with a `<label>` (or `aria-label`) with this text
    Label {
        /// Label text
        text: String,
    },
    /// Element with an ARIA role and, optionally, an accessible name
    Role {
        /// Role
        role: AriaRole,
        /// Accessible name (aria-label, text content or value)
        name: Option<String>,
    },
    /// CSS selector (e.g. `#error`)
    Css {
        /// Selector source
        css: String,
    },
    /// Innermost element whose text content contains this text
    Text {
        /// Text to find
        text: String,
    },
    /// Test ID selector (data-testid attribute)
    TestId {
        /// Test id
        id: String,
    },
}

impl Selector {
    /// Convert to a JavaScript expression evaluating to the first matching element or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Label { text } => {
                let text = js_string(text);
                format!(
                    "(() => {{ const want = {text}.toLowerCase(); \
                     const labels = Array.from(document.querySelectorAll('label')); \
                     const label = labels.find(l => l.textContent.trim().toLowerCase() === want) \
                       || labels.find(l => l.textContent.toLowerCase().includes(want)); \
                     if (label) {{ return label.control || label.querySelector('input, textarea, select'); }} \
                     return Array.from(document.querySelectorAll('[aria-label]')) \
                       .find(el => el.getAttribute('aria-label').toLowerCase().includes(want)) || null; }})()"
                )
            }
            Self::Role { role, name } => {
                let css = js_string(&role.implicit_selector());
                match name {
                    Some(name) => {
                        let name = js_string(name);
                        format!(
                            "(() => {{ const want = {name}.toLowerCase(); \
                             const accessibleName = el => (el.getAttribute('aria-label') \
                               || el.textContent || el.value || '').trim().toLowerCase(); \
                             const all = Array.from(document.querySelectorAll({css})); \
                             return all.find(el => accessibleName(el) === want) \
                               || all.find(el => accessibleName(el).includes(want)) || null; }})()"
                        )
                    }
                    None => format!("document.querySelector({css})"),
                }
            }
            Self::Css { css } => format!("document.querySelector({})", js_string(css)),
            Self::Text { text } => {
                let text = js_string(text);
                format!(
                    "Array.from(document.querySelectorAll('body *')).reverse() \
                     .find(el => el.textContent.includes({text})) || null"
                )
            }
            Self::TestId { id } => format!(
                "document.querySelector({})",
                js_string(&format!("[data-testid=\"{id}\"]"))
            ),
        }
    }

    /// JavaScript expression evaluating to `true` when the element exists and is rendered
    #[must_use]
    pub fn to_visibility_query(&self) -> String {
        format!(
            "(() => {{ const el = {}; if (!el) return false; \
             const style = window.getComputedStyle(el); \
             if (style.visibility === 'hidden' || style.display === 'none') return false; \
             const rect = el.getBoundingClientRect(); \
             return rect.width > 0 && rect.height > 0; }})()",
            self.to_query()
        )
    }

    /// JavaScript expression evaluating to the element's text content or `null`
    #[must_use]
    pub fn to_text_query(&self) -> String {
        format!(
            "(() => {{ const el = {}; return el ? el.textContent : null; }})()",
            self.to_query()
        )
    }

    /// JavaScript expression that tags the element with `marker` and reports whether it exists
    #[must_use]
    pub fn to_mark_query(&self, marker: &str) -> String {
        format!(
            "(() => {{ const el = {}; if (!el) return false; \
             el.setAttribute({}, {}); return true; }})()",
            self.to_query(),
            js_string(MARKER_ATTRIBUTE),
            js_string(marker)
        )
    }

    /// JavaScript expression that replaces the value of a form control with `text`
    #[must_use]
    pub fn to_fill_query(&self, text: &str) -> String {
        format!(
            "(() => {{ const el = {}; if (!el) return false; el.focus(); \
             el.value = {}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()",
            self.to_query(),
            js_string(text)
        )
    }
}

/// A lazily-resolved reference to zero or more on-screen elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    selector: Selector,
}

impl Locator {
    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self { selector }
    }

    /// Form control labelled `text` (Playwright's `getByLabel`)
    #[must_use]
    pub fn by_label(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::Label { text: text.into() })
    }

    /// Element with `role` and accessible name `name` (Playwright's `getByRole`)
    #[must_use]
    pub fn by_role(role: AriaRole, name: impl Into<String>) -> Self {
        Self::from_selector(Selector::Role {
            role,
            name: Some(name.into()),
        })
    }

    /// First element with `role`, regardless of name
    #[must_use]
    pub const fn by_any_role(role: AriaRole) -> Self {
        Self::from_selector(Selector::Role { role, name: None })
    }

    /// CSS selector locator (Playwright's `page.locator`)
    #[must_use]
    pub fn css(css: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css { css: css.into() })
    }

    /// Element containing `text`
    #[must_use]
    pub fn by_text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::Text { text: text.into() })
    }

    /// Element with `data-testid` equal to `id`
    #[must_use]
    pub fn by_test_id(id: impl Into<String>) -> Self {
        Self::from_selector(Selector::TestId { id: id.into() })
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selector {
            Selector::Label { text } => write!(f, "get_by_label({text:?})"),
            Selector::Role {
                role,
                name: Some(name),
            } => write!(f, "get_by_role({role}, name={name:?})"),
            Selector::Role { role, name: None } => write!(f, "get_by_role({role})"),
            Selector::Css { css } => write!(f, "locator({css:?})"),
            Selector::Text { text } => write!(f, "get_by_text({text:?})"),
            Selector::TestId { id } => write!(f, "get_by_test_id({id:?})"),
        }
    }
}

/// Quote `value` as a JavaScript string literal.
///
/// JSON string syntax is a subset of JavaScript string syntax.
#[must_use]
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_query() {
            let query = Locator::css("#error").selector().to_query();
            assert_eq!(query, "document.querySelector(\"#error\")");
        }

        #[test]
        fn test_label_query_mentions_label_and_control() {
            let query = Locator::by_label("Email").selector().to_query();
            assert!(query.contains("\"Email\""));
            assert!(query.contains("label.control"));
            assert!(query.contains("aria-label"));
        }

        #[test]
        fn test_role_query_with_name() {
            let query = Locator::by_role(AriaRole::Button, "Create")
                .selector()
                .to_query();
            assert!(query.contains("input[type=submit]"));
            assert!(query.contains("\"Create\""));
        }

        #[test]
        fn test_role_query_without_name() {
            let query = Locator::by_any_role(AriaRole::Heading)
                .selector()
                .to_query();
            assert!(query.starts_with("document.querySelector("));
            assert!(query.contains("h1"));
        }

        #[test]
        fn test_test_id_query() {
            let query = Locator::by_test_id("score").selector().to_query();
            assert!(query.contains("data-testid"));
            assert!(query.contains("score"));
        }

        #[test]
        fn test_visibility_query_wraps_element_query() {
            let selector = Locator::css("#error").selector().clone();
            let query = selector.to_visibility_query();
            assert!(query.contains(&selector.to_query()));
            assert!(query.contains("getBoundingClientRect"));
        }

        #[test]
        fn test_mark_query_sets_marker_attribute() {
            let query = Locator::css("button").selector().to_mark_query("abc123");
            assert!(query.contains(MARKER_ATTRIBUTE));
            assert!(query.contains("\"abc123\""));
        }

        #[test]
        fn test_fill_query_escapes_text() {
            let query = Locator::by_label("Password")
                .selector()
                .to_fill_query("pa\"ss\nword");
            assert!(query.contains(r#""pa\"ss\nword""#));
            assert!(query.contains("'input'"));
        }

        #[test]
        fn test_custom_role_selector() {
            let role = AriaRole::Custom("tab".to_string());
            assert_eq!(role.implicit_selector(), "[role=\"tab\"]");
            assert_eq!(role.as_str(), "tab");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_display_label() {
            assert_eq!(
                Locator::by_label("Email").to_string(),
                "get_by_label(\"Email\")"
            );
        }

        #[test]
        fn test_display_role() {
            assert_eq!(
                Locator::by_role(AriaRole::Button, "Sign In").to_string(),
                "get_by_role(button, name=\"Sign In\")"
            );
        }

        #[test]
        fn test_display_css() {
            assert_eq!(Locator::css("#error").to_string(), "locator(\"#error\")");
        }

        #[test]
        fn test_locators_are_values() {
            assert_eq!(Locator::by_label("Email"), Locator::by_label("Email"));
            assert_ne!(Locator::by_label("Email"), Locator::by_label("Password"));
        }

        #[test]
        fn test_serialize_tags_strategy() {
            let json = serde_json::to_value(Locator::by_role(AriaRole::Button, "Create")).unwrap();
            assert_eq!(json["selector"]["strategy"], "role");
            assert_eq!(json["selector"]["role"], "button");
            assert_eq!(json["selector"]["name"], "Create");
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn js_string_round_trips_through_json(value in ".*") {
                let quoted = js_string(&value);
                let parsed: String = serde_json::from_str(&quoted).unwrap();
                prop_assert_eq!(parsed, value);
            }

            #[test]
            fn label_query_never_leaks_unquoted_text(text in "[a-zA-Z0-9 '\"\\\\]{0,24}") {
                let query = Locator::by_label(text.clone()).selector().to_query();
                let quoted = js_string(&text);
                prop_assert!(query.contains(&quoted));
            }
        }
    }
}

pub mod snapshot;
pub mod webdriver;

use crate::error::BrowserError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an element is located in the rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum ElementLocator {
    /// CSS selector
    Css(String),
    /// Single class name (matched like `.name`)
    Class(String),
    /// XPath expression
    XPath(String),
}

impl ElementLocator {
    pub fn css(selector: &str) -> Self {
        ElementLocator::Css(selector.to_string())
    }

    pub fn class(name: &str) -> Self {
        ElementLocator::Class(name.to_string())
    }

    /// Returns the locator as a CSS selector, if it can be expressed as one
    pub fn as_css(&self) -> Option<String> {
        match self {
            ElementLocator::Css(selector) => Some(selector.clone()),
            ElementLocator::Class(name) => Some(format!(".{}", name)),
            ElementLocator::XPath(_) => None,
        }
    }
}

impl fmt::Display for ElementLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementLocator::Css(selector) => write!(f, "css `{}`", selector),
            ElementLocator::Class(name) => write!(f, "class `{}`", name),
            ElementLocator::XPath(expr) => write!(f, "xpath `{}`", expr),
        }
    }
}

/// Outcome of looking something up in a dynamic page.
///
/// Absence and timeouts are expected on dynamic markup; the caller decides
/// whether either is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    /// A bounded wait elapsed before the target rendered
    TimedOut,
    /// The target is not part of the rendered markup
    Absent,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Converts to an `Option`, collapsing both failure cases
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::TimedOut | Lookup::Absent => None,
        }
    }
}

/// The page operations the scraper needs from a rendered browser session.
///
/// Implemented by the live WebDriver session and by the offline snapshot
/// backend.
#[allow(async_fn_in_trait)]
pub trait Browser {
    /// Handle to an element of the current page
    type Element: Clone;

    /// Load a URL into the session
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Find every element of the current page matching the locator
    async fn find_all(
        &mut self,
        locator: &ElementLocator,
    ) -> Result<Vec<Self::Element>, BrowserError>;

    /// Find the first descendant of `parent` matching the locator.
    ///
    /// Returns `Ok(None)` when there is no such descendant; `Err` means the
    /// parent itself could not be queried.
    async fn find_within(
        &mut self,
        parent: &Self::Element,
        locator: &ElementLocator,
    ) -> Result<Option<Self::Element>, BrowserError>;

    /// Visible text of an element
    async fn text(&mut self, element: &Self::Element) -> Result<String, BrowserError>;

    /// Simulate a click on an element
    async fn click(&mut self, element: &Self::Element) -> Result<(), BrowserError>;

    /// Find the first element of the current page matching the locator
    async fn find(
        &mut self,
        locator: &ElementLocator,
    ) -> Result<Option<Self::Element>, BrowserError> {
        Ok(self.find_all(locator).await?.into_iter().next())
    }
}

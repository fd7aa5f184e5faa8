//! Offline browser backed by saved result pages.
//!
//! Each page is a saved HTML document. Clicking a card shows that card's saved
//! detail panel, clicking the next-page control renders the following page.
//! Lookups at page level see the shown detail panel first, then the page.

use crate::browser::{Browser, ElementLocator};
use crate::config::SelectorConfig;
use crate::error::{BrowserError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One saved results page
#[derive(Debug, Clone, Default)]
pub struct SnapshotPage {
    pub html: String,
    /// Detail panel markup by zero-based card position
    pub details: BTreeMap<usize, String>,
}

impl SnapshotPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            details: BTreeMap::new(),
        }
    }

    /// Attach the detail panel shown when the card at `card` is clicked
    pub fn with_detail(mut self, card: usize, html: impl Into<String>) -> Self {
        self.details.insert(card, html.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Page,
    Panel(usize),
}

/// Handle to an element of a snapshot page or detail panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotElement {
    page: usize,
    scope: Scope,
    /// Position in document order
    index: usize,
}

pub struct SnapshotBrowser {
    pages: Vec<SnapshotPage>,
    card: ElementLocator,
    next_page: ElementLocator,
    current: Option<usize>,
    panel: Option<usize>,
    pages_loaded: usize,
}

impl SnapshotBrowser {
    /// Create a browser over in-memory pages; `selectors` identifies which
    /// clicks open a card and which advance the page
    pub fn new(pages: Vec<SnapshotPage>, selectors: &SelectorConfig) -> Self {
        Self {
            pages,
            card: selectors.card.clone(),
            next_page: selectors.next_page.clone(),
            current: None,
            panel: None,
            pages_loaded: 0,
        }
    }

    /// Load `page-N.html` and `page-N.detail-M.html` files from a directory.
    ///
    /// Pages are ordered by N; M is the 1-based card position.
    pub fn from_dir<P: AsRef<Path>>(dir: P, selectors: &SelectorConfig) -> Result<Self> {
        let page_re = Regex::new(r"^page-(\d+)\.html$").expect("valid page pattern");
        let detail_re =
            Regex::new(r"^page-(\d+)\.detail-(\d+)\.html$").expect("valid detail pattern");

        let mut pages: BTreeMap<u32, SnapshotPage> = BTreeMap::new();
        let mut details: Vec<(u32, usize, String)> = Vec::new();

        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if let Some(caps) = page_re.captures(name) {
                let Ok(number) = caps[1].parse::<u32>() else {
                    ::log::warn!("Ignoring page with out-of-range number: {}", name);
                    continue;
                };
                pages.insert(number, SnapshotPage::new(fs::read_to_string(&path)?));
            } else if let Some(caps) = detail_re.captures(name) {
                let (Ok(number), Ok(card)) = (caps[1].parse::<u32>(), caps[2].parse::<usize>())
                else {
                    ::log::warn!("Ignoring detail panel with out-of-range index: {}", name);
                    continue;
                };
                if card == 0 {
                    ::log::warn!("Ignoring detail panel with card index 0: {}", name);
                    continue;
                }
                details.push((number, card - 1, fs::read_to_string(&path)?));
            } else {
                ::log::trace!("Ignoring non-snapshot file: {}", name);
            }
        }

        for (number, card, html) in details {
            match pages.get_mut(&number) {
                Some(page) => {
                    page.details.insert(card, html);
                }
                None => ::log::warn!("Detail panel for missing page {}", number),
            }
        }

        ::log::info!(
            "Loaded {} snapshot pages from {}",
            pages.len(),
            dir.as_ref().display()
        );
        Ok(Self::new(pages.into_values().collect(), selectors))
    }

    /// Number of page renders so far (initial load plus each advance)
    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    fn current_page(&self) -> Result<usize, BrowserError> {
        self.current
            .ok_or_else(|| BrowserError::Navigation("no page loaded".to_string()))
    }

    fn scope_html(&self, page: usize, scope: Scope) -> Option<&str> {
        let page = self.pages.get(page)?;
        match scope {
            Scope::Page => Some(page.html.as_str()),
            Scope::Panel(card) => page.details.get(&card).map(String::as_str),
        }
    }

    /// Markup of the scope an element belongs to, if it is still rendered
    fn live_html(&self, element: &SnapshotElement) -> Result<&str, BrowserError> {
        let fresh = self.current == Some(element.page)
            && match element.scope {
                Scope::Page => true,
                Scope::Panel(card) => self.panel == Some(card),
            };
        if !fresh {
            return Err(BrowserError::Detached(format!(
                "element {} of page {}",
                element.index,
                element.page + 1
            )));
        }
        self.scope_html(element.page, element.scope)
            .ok_or_else(|| BrowserError::Detached("detail panel".to_string()))
    }

    /// Zero-based position of `element` among the matches of `locator`
    fn position_among(
        &self,
        element: &SnapshotElement,
        locator: &ElementLocator,
    ) -> Result<Option<usize>, BrowserError> {
        let html = self.live_html(element)?;
        let selector = selector_for(locator)?;
        Ok(matching_indices(html, &selector)
            .iter()
            .position(|&index| index == element.index))
    }
}

fn selector_for(locator: &ElementLocator) -> Result<Selector, BrowserError> {
    let css = locator
        .as_css()
        .ok_or_else(|| BrowserError::Unsupported(locator.to_string()))?;
    Selector::parse(&css).map_err(|e| BrowserError::Unsupported(format!("{}: {:?}", css, e)))
}

fn all_elements() -> Selector {
    Selector::parse("*").expect("universal selector")
}

/// Document-order positions of the elements matching `selector`
fn matching_indices(html: &str, selector: &Selector) -> Vec<usize> {
    let doc = Html::parse_document(html);
    let ids: Vec<_> = doc.select(selector).map(|e| e.id()).collect();
    doc.select(&all_elements())
        .enumerate()
        .filter(|(_, e)| ids.contains(&e.id()))
        .map(|(index, _)| index)
        .collect()
}

fn element_at(doc: &Html, index: usize) -> Option<ElementRef<'_>> {
    doc.select(&all_elements()).nth(index)
}

/// Visible text with whitespace collapsed
fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Browser for SnapshotBrowser {
    type Element = SnapshotElement;

    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        if self.pages.is_empty() {
            return Err(BrowserError::Navigation(format!(
                "no snapshot pages to serve for {}",
                url
            )));
        }
        ::log::debug!("Snapshot serving page 1 for {}", url);
        self.current = Some(0);
        self.panel = None;
        self.pages_loaded += 1;
        Ok(())
    }

    async fn find_all(
        &mut self,
        locator: &ElementLocator,
    ) -> Result<Vec<SnapshotElement>, BrowserError> {
        let page = self.current_page()?;
        let selector = selector_for(locator)?;

        let mut scopes = Vec::with_capacity(2);
        if let Some(card) = self.panel {
            scopes.push(Scope::Panel(card));
        }
        scopes.push(Scope::Page);

        let mut found = Vec::new();
        for scope in scopes {
            if let Some(html) = self.scope_html(page, scope) {
                found.extend(
                    matching_indices(html, &selector)
                        .into_iter()
                        .map(|index| SnapshotElement { page, scope, index }),
                );
            }
        }
        Ok(found)
    }

    async fn find_within(
        &mut self,
        parent: &SnapshotElement,
        locator: &ElementLocator,
    ) -> Result<Option<SnapshotElement>, BrowserError> {
        let selector = selector_for(locator)?;
        let doc = Html::parse_document(self.live_html(parent)?);
        let parent_ref = element_at(&doc, parent.index)
            .ok_or_else(|| BrowserError::Detached(format!("element {}", parent.index)))?;

        let Some(id) = parent_ref.select(&selector).next().map(|e| e.id()) else {
            return Ok(None);
        };
        Ok(doc
            .select(&all_elements())
            .position(|e| e.id() == id)
            .map(|index| SnapshotElement {
                page: parent.page,
                scope: parent.scope,
                index,
            }))
    }

    async fn text(&mut self, element: &SnapshotElement) -> Result<String, BrowserError> {
        let doc = Html::parse_document(self.live_html(element)?);
        element_at(&doc, element.index)
            .map(collapsed_text)
            .ok_or_else(|| BrowserError::Detached(format!("element {}", element.index)))
    }

    async fn click(&mut self, element: &SnapshotElement) -> Result<(), BrowserError> {
        self.live_html(element)?;
        if element.scope != Scope::Page {
            return Ok(());
        }

        if self.position_among(element, &self.next_page)?.is_some() {
            let page = self.current_page()?;
            if page + 1 < self.pages.len() {
                self.current = Some(page + 1);
            }
            // A next control on the last page re-renders it
            self.panel = None;
            self.pages_loaded += 1;
            ::log::debug!(
                "Snapshot advanced to page {}",
                self.current.unwrap_or_default() + 1
            );
        } else if let Some(card) = self.position_among(element, &self.card)? {
            let page = self.current_page()?;
            self.panel = self.pages[page].details.contains_key(&card).then_some(card);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(cards: &[&str], next: bool) -> String {
        let items: String = cards
            .iter()
            .map(|title| {
                format!(
                    r#"<li class="jobs-search-results__list-item"><a class="job-card-list__title">{}</a></li>"#,
                    title
                )
            })
            .collect();
        let next = if next {
            r#"<button class="artdeco-pagination__button--next">Next</button>"#
        } else {
            ""
        };
        format!("<html><body><ul>{}</ul>{}</body></html>", items, next)
    }

    fn browser(pages: Vec<SnapshotPage>) -> SnapshotBrowser {
        SnapshotBrowser::new(pages, &SelectorConfig::default())
    }

    #[tokio::test]
    async fn test_requires_goto() {
        let mut b = browser(vec![SnapshotPage::new(page(&["A"], false))]);
        let cards = ElementLocator::class("jobs-search-results__list-item");
        assert!(matches!(
            b.find_all(&cards).await,
            Err(BrowserError::Navigation(_))
        ));
    }

    #[tokio::test]
    async fn test_goto_without_pages_fails() {
        let mut b = browser(Vec::new());
        assert!(matches!(
            b.goto("https://example.com").await,
            Err(BrowserError::Navigation(_))
        ));
    }

    #[tokio::test]
    async fn test_find_cards_and_child_text() {
        let mut b = browser(vec![SnapshotPage::new(page(&["Rust Dev", "Go Dev"], false))]);
        b.goto("https://example.com").await.unwrap();

        let cards = b
            .find_all(&ElementLocator::class("jobs-search-results__list-item"))
            .await
            .unwrap();
        assert_eq!(cards.len(), 2);

        let title = b
            .find_within(&cards[1], &ElementLocator::class("job-card-list__title"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(b.text(&title).await.unwrap(), "Go Dev");

        let missing = b
            .find_within(&cards[0], &ElementLocator::class("nope"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_click_next_advances_and_detaches_old_elements() {
        let mut b = browser(vec![
            SnapshotPage::new(page(&["A"], true)),
            SnapshotPage::new(page(&["B"], false)),
        ]);
        b.goto("https://example.com").await.unwrap();
        let card_locator = ElementLocator::class("jobs-search-results__list-item");
        let old_cards = b.find_all(&card_locator).await.unwrap();

        let next = b
            .find(&ElementLocator::class("artdeco-pagination__button--next"))
            .await
            .unwrap()
            .unwrap();
        b.click(&next).await.unwrap();
        assert_eq!(b.pages_loaded(), 2);

        let cards = b.find_all(&card_locator).await.unwrap();
        assert_eq!(b.text(&cards[0]).await.unwrap(), "B");
        assert!(matches!(
            b.text(&old_cards[0]).await,
            Err(BrowserError::Detached(_))
        ));
    }

    #[tokio::test]
    async fn test_click_card_shows_its_panel() {
        let detail = r#"<div class="jobs-description__content">Build things</div>"#;
        let mut b = browser(vec![
            SnapshotPage::new(page(&["A", "B"], false)).with_detail(1, detail),
        ]);
        b.goto("https://example.com").await.unwrap();
        let cards = b
            .find_all(&ElementLocator::class("jobs-search-results__list-item"))
            .await
            .unwrap();
        let description = ElementLocator::class("jobs-description__content");

        b.click(&cards[0]).await.unwrap();
        assert!(b.find(&description).await.unwrap().is_none());

        b.click(&cards[1]).await.unwrap();
        let panel = b.find(&description).await.unwrap().unwrap();
        assert_eq!(b.text(&panel).await.unwrap(), "Build things");
    }

    #[tokio::test]
    async fn test_xpath_is_unsupported() {
        let mut b = browser(vec![SnapshotPage::new(page(&["A"], false))]);
        b.goto("https://example.com").await.unwrap();
        assert!(matches!(
            b.find_all(&ElementLocator::XPath("//li".to_string())).await,
            Err(BrowserError::Unsupported(_))
        ));
    }

    #[test]
    fn test_from_dir_orders_pages_and_attaches_details() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page-2.html"), page(&["Second"], false)).unwrap();
        fs::write(dir.path().join("page-1.html"), page(&["First"], true)).unwrap();
        fs::write(dir.path().join("page-1.detail-1.html"), "<p>detail</p>").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let b = SnapshotBrowser::from_dir(dir.path(), &SelectorConfig::default()).unwrap();
        assert_eq!(b.pages.len(), 2);
        assert!(b.pages[0].html.contains("First"));
        assert_eq!(b.pages[0].details.get(&0).map(String::as_str), Some("<p>detail</p>"));
        assert!(b.pages[1].details.is_empty());
    }

    #[test]
    fn test_from_dir_skips_out_of_range_numbers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page-1.html"), page(&["First"], false)).unwrap();
        fs::write(dir.path().join("page-99999999999.html"), page(&["Huge"], false)).unwrap();
        fs::write(
            dir.path().join("page-1.detail-99999999999999999999999.html"),
            "<p>huge</p>",
        )
        .unwrap();

        let b = SnapshotBrowser::from_dir(dir.path(), &SelectorConfig::default()).unwrap();
        assert_eq!(b.pages.len(), 1);
        assert!(b.pages[0].html.contains("First"));
        assert!(b.pages[0].details.is_empty());
    }
}

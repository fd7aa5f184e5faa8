use crate::browser::{Browser, ElementLocator, Lookup};
use crate::config::SelectorConfig;
use crate::error::BrowserError;
use crate::results::ListingRecord;

/// Summary fields read from one card; `None` where the sub-element is missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFields {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub date_posted: Option<String>,
}

impl CardFields {
    /// Finish the record once the description is known
    pub fn into_record(self, description: String) -> ListingRecord {
        ListingRecord::new(
            self.title,
            self.company,
            self.location,
            self.date_posted,
            description,
        )
    }
}

/// Locates listing cards and reads their summary fields
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    card: ElementLocator,
    title: ElementLocator,
    company: ElementLocator,
    location: ElementLocator,
    date_posted: ElementLocator,
}

impl ListingExtractor {
    pub fn new(selectors: &SelectorConfig) -> Self {
        Self {
            card: selectors.card.clone(),
            title: selectors.title.clone(),
            company: selectors.company.clone(),
            location: selectors.location.clone(),
            date_posted: selectors.date_posted.clone(),
        }
    }

    pub fn card_locator(&self) -> &ElementLocator {
        &self.card
    }

    /// All cards currently rendered, in page order
    pub async fn extract_cards<B: Browser>(&self, browser: &mut B) -> Vec<B::Element> {
        match browser.find_all(&self.card).await {
            Ok(cards) => cards,
            Err(e) => {
                ::log::warn!("Failed to list cards with {}: {}", self.card, e);
                Vec::new()
            }
        }
    }

    /// Read every summary field of a card.
    ///
    /// A missing field leaves that field `None`. Returns [`Lookup::Absent`]
    /// only when the card container itself can no longer be queried.
    pub async fn extract_fields<B: Browser>(
        &self,
        browser: &mut B,
        card: &B::Element,
    ) -> Lookup<CardFields> {
        let fields = self.read_fields(browser, card).await;

        match fields {
            Ok(fields) => Lookup::Found(fields),
            Err(e) => {
                ::log::warn!("Card container lost structure, skipping: {}", e);
                Lookup::Absent
            }
        }
    }

    async fn read_fields<B: Browser>(
        &self,
        browser: &mut B,
        card: &B::Element,
    ) -> Result<CardFields, BrowserError> {
        Ok(CardFields {
            title: self.field(browser, card, &self.title).await?.found(),
            company: self.field(browser, card, &self.company).await?.found(),
            location: self.field(browser, card, &self.location).await?.found(),
            date_posted: self.field(browser, card, &self.date_posted).await?.found(),
        })
    }

    /// Text of one sub-element of `card`.
    ///
    /// `Err` is reserved for failures of the card itself. Any other failure
    /// only loses this field.
    async fn field<B: Browser>(
        &self,
        browser: &mut B,
        card: &B::Element,
        locator: &ElementLocator,
    ) -> Result<Lookup<String>, BrowserError> {
        let element = match browser.find_within(card, locator).await {
            Ok(Some(element)) => element,
            Ok(None) => {
                ::log::debug!("Card has no {}", locator);
                return Ok(Lookup::Absent);
            }
            Err(e @ (BrowserError::Detached(_) | BrowserError::Released)) => return Err(e),
            Err(e) => {
                ::log::warn!("Lookup of {} failed, leaving it empty: {}", locator, e);
                return Ok(Lookup::Absent);
            }
        };

        match browser.text(&element).await {
            Ok(text) => Ok(Lookup::Found(text.trim().to_string())),
            Err(e) => {
                ::log::debug!("Could not read text of {}: {}", locator, e);
                Ok(Lookup::Absent)
            }
        }
    }
}

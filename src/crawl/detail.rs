use crate::browser::{Browser, ElementLocator, Lookup};
use crate::crawl::wait::WaitStrategy;
use std::time::Duration;

/// Opens a card's detail view and reads the long-form description
#[derive(Debug, Clone)]
pub struct DetailExpander {
    description: ElementLocator,
    timeout: Duration,
}

impl DetailExpander {
    pub fn new(description: ElementLocator, timeout: Duration) -> Self {
        Self {
            description,
            timeout,
        }
    }

    /// Description of `card`, or an empty string if it cannot be revealed
    pub async fn expand_description<B: Browser>(
        &self,
        browser: &mut B,
        card: &B::Element,
        wait: &WaitStrategy,
    ) -> String {
        match self.lookup_description(browser, card, wait).await {
            Lookup::Found(text) => text,
            Lookup::TimedOut => {
                ::log::debug!("Detail panel did not render within {:?}", self.timeout);
                String::new()
            }
            Lookup::Absent => String::new(),
        }
    }

    /// Click the card and wait for the detail content region
    pub async fn lookup_description<B: Browser>(
        &self,
        browser: &mut B,
        card: &B::Element,
        wait: &WaitStrategy,
    ) -> Lookup<String> {
        if let Err(e) = browser.click(card).await {
            ::log::debug!("Could not open detail view: {}", e);
            return Lookup::Absent;
        }

        let regions = match wait
            .wait_for(browser, &self.description, self.timeout)
            .await
        {
            Lookup::Found(regions) => regions,
            Lookup::TimedOut => return Lookup::TimedOut,
            Lookup::Absent => return Lookup::Absent,
        };

        let Some(region) = regions.first() else {
            return Lookup::Absent;
        };
        match browser.text(region).await {
            Ok(text) => Lookup::Found(text.trim().to_string()),
            Err(e) => {
                ::log::debug!("Could not read detail content: {}", e);
                Lookup::Absent
            }
        }
    }
}

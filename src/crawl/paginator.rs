use crate::browser::{Browser, ElementLocator, Lookup};
use crate::config::ScrapeConfig;
use crate::crawl::detail::DetailExpander;
use crate::crawl::extract::ListingExtractor;
use crate::crawl::wait::WaitStrategy;
use crate::results::{ListingRecord, ResultSequence};
use std::time::Duration;

/// States of one crawl over the result pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginatorState {
    /// A results page has been requested and is rendering
    PageLoaded,
    /// Cards of the current page are being processed
    Extracting,
    /// Looking for and triggering the next-page control
    Advancing,
    /// No further pages will be fetched
    Exhausted,
}

/// Why the crawl reached [`PaginatorState::Exhausted`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No cards rendered within the wait timeout
    NoCards,
    /// The next-page control was missing or could not be triggered
    NoNextControl,
    /// The configured page bound was reached
    PageBound,
}

/// Result of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Records in encounter order
    pub records: ResultSequence,
    /// Pages whose cards were processed
    pub pages_visited: usize,
    /// Cards located but skipped for lost structure
    pub skipped_cards: usize,
    pub stop: StopReason,
}

/// Cards rendered on the page currently being processed
struct PageState<E> {
    number: usize,
    cards: Vec<E>,
}

/// Drives extraction across result pages
#[derive(Debug, Clone)]
pub struct Paginator {
    extractor: ListingExtractor,
    expander: DetailExpander,
    wait: WaitStrategy,
    next_page: ElementLocator,
    card_timeout: Duration,
    settle_delay: Duration,
    max_pages: usize,
}

impl Paginator {
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            extractor: ListingExtractor::new(&config.selectors),
            expander: DetailExpander::new(
                config.selectors.description.clone(),
                config.detail_timeout(),
            ),
            wait: WaitStrategy::new(config.poll_interval()),
            next_page: config.selectors.next_page.clone(),
            card_timeout: config.wait_timeout(),
            settle_delay: config.settle_delay(),
            max_pages: config.max_pages.max(1),
        }
    }

    /// Crawl from the page the browser currently shows until exhausted or
    /// the page bound is reached
    pub async fn crawl<B: Browser>(&self, browser: &mut B) -> CrawlOutcome {
        let mut state = PaginatorState::PageLoaded;
        let mut records = Vec::new();
        let mut pages_visited = 0;
        let mut skipped_cards = 0;
        let mut stop = StopReason::NoCards;

        while state != PaginatorState::Exhausted {
            let next = match state {
                PaginatorState::PageLoaded => {
                    let cards = self
                        .wait
                        .wait_for(browser, self.extractor.card_locator(), self.card_timeout)
                        .await;
                    if cards.is_found() {
                        PaginatorState::Extracting
                    } else {
                        ::log::info!(
                            "No cards on page {} within {:?}",
                            pages_visited + 1,
                            self.card_timeout
                        );
                        stop = StopReason::NoCards;
                        PaginatorState::Exhausted
                    }
                }
                PaginatorState::Extracting => {
                    pages_visited += 1;
                    let page = PageState {
                        number: pages_visited,
                        cards: self.extractor.extract_cards(browser).await,
                    };
                    skipped_cards += self.process_page(browser, page, &mut records).await;

                    if pages_visited >= self.max_pages {
                        ::log::info!("Reached page bound of {}", self.max_pages);
                        stop = StopReason::PageBound;
                        PaginatorState::Exhausted
                    } else {
                        PaginatorState::Advancing
                    }
                }
                PaginatorState::Advancing => {
                    if self.advance(browser).await {
                        PaginatorState::PageLoaded
                    } else {
                        stop = StopReason::NoNextControl;
                        PaginatorState::Exhausted
                    }
                }
                PaginatorState::Exhausted => PaginatorState::Exhausted,
            };
            ::log::debug!("Paginator {:?} -> {:?}", state, next);
            state = next;
        }

        ::log::info!(
            "Crawl exhausted ({:?}): {} records from {} pages, {} cards skipped",
            stop,
            records.len(),
            pages_visited,
            skipped_cards
        );

        CrawlOutcome {
            records,
            pages_visited,
            skipped_cards,
            stop,
        }
    }

    /// Process every card of a page in order; returns the number skipped
    async fn process_page<B: Browser>(
        &self,
        browser: &mut B,
        page: PageState<B::Element>,
        records: &mut Vec<ListingRecord>,
    ) -> usize {
        ::log::info!("Page {}: {} cards", page.number, page.cards.len());
        let mut skipped = 0;

        for (index, card) in page.cards.iter().enumerate() {
            match self.process_card(browser, card).await {
                Some(record) => records.push(record),
                None => {
                    ::log::warn!("Skipped card {} on page {}", index + 1, page.number);
                    skipped += 1;
                }
            }
        }
        skipped
    }

    async fn process_card<B: Browser>(
        &self,
        browser: &mut B,
        card: &B::Element,
    ) -> Option<ListingRecord> {
        let fields = match self.extractor.extract_fields(browser, card).await {
            Lookup::Found(fields) => fields,
            Lookup::TimedOut | Lookup::Absent => return None,
        };
        let description = self
            .expander
            .expand_description(browser, card, &self.wait)
            .await;
        Some(fields.into_record(description))
    }

    /// Trigger the next-page control and let the page settle.
    ///
    /// Returns `false` when there is no next page to go to.
    async fn advance<B: Browser>(&self, browser: &mut B) -> bool {
        let next = match browser.find(&self.next_page).await {
            Ok(Some(next)) => next,
            Ok(None) => {
                ::log::info!("No next-page control, pagination finished");
                return false;
            }
            Err(e) => {
                ::log::warn!("Failed to look up next-page control: {}", e);
                return false;
            }
        };

        if let Err(e) = browser.click(&next).await {
            ::log::warn!("Failed to trigger next page: {}", e);
            return false;
        }

        tokio::time::sleep(self.settle_delay).await;
        true
    }
}

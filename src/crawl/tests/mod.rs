
use crate::browser::snapshot::{SnapshotBrowser, SnapshotPage};
use crate::config::{ScrapeConfig, SelectorConfig};

/// Summary fields of one fixture card; `None` omits the sub-element
#[derive(Debug, Clone)]
pub(super) struct CardSpec {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub date_posted: Option<String>,
}

impl CardSpec {
    pub fn full(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            company: Some(format!("{} Inc", title)),
            location: Some("Berlin, Germany".to_string()),
            date_posted: Some("3 days ago".to_string()),
        }
    }
}

fn card_html(card: &CardSpec) -> String {
    let mut html = String::from(r#"<li class="jobs-search-results__list-item"><div>"#);
    if let Some(title) = &card.title {
        html += &format!(r#"<a class="job-card-list__title" href="/jobs/1">{}</a>"#, title);
    }
    if let Some(company) = &card.company {
        html += &format!(
            r#"<span class="job-card-container__company-name">{}</span>"#,
            company
        );
    }
    html += "<ul>";
    if let Some(location) = &card.location {
        html += &format!(
            r#"<li class="job-card-container__metadata-item">{}</li>"#,
            location
        );
    }
    if let Some(date) = &card.date_posted {
        html += &format!(
            r#"<li class="job-card-container__metadata-item--date"><time>{}</time></li>"#,
            date
        );
    }
    html += "</ul></div></li>";
    html
}

/// A results page with the given cards and, optionally, a next-page control
pub(super) fn results_page(cards: &[CardSpec], next: bool) -> String {
    let items: String = cards.iter().map(card_html).collect();
    let next = if next {
        r#"<button class="artdeco-pagination__button--next" aria-label="View next page">Next</button>"#
    } else {
        ""
    };
    format!(
        r#"<html><body><main><ul class="jobs-search-results__list">{}</ul><div class="artdeco-pagination">{}</div></main></body></html>"#,
        items, next
    )
}

/// Detail panel markup with the given description
pub(super) fn detail_panel(description: &str) -> String {
    format!(
        r#"<section><div class="jobs-description__content"><p>{}</p></div></section>"#,
        description
    )
}

/// `count` pages of full cards named `P<page>C<card>`, each linked to the next
pub(super) fn linked_pages(count: usize, cards_per_page: usize) -> Vec<SnapshotPage> {
    (1..=count)
        .map(|page| {
            let cards: Vec<_> = (1..=cards_per_page)
                .map(|card| CardSpec::full(&format!("P{}C{}", page, card)))
                .collect();
            SnapshotPage::new(results_page(&cards, page < count))
        })
        .collect()
}

pub(super) fn snapshot(pages: Vec<SnapshotPage>) -> SnapshotBrowser {
    SnapshotBrowser::new(pages, &SelectorConfig::default())
}

pub(super) fn test_config(max_pages: usize) -> ScrapeConfig {
    ScrapeConfig {
        target_url: "https://jobs.example.com/search".to_string(),
        max_pages,
        ..ScrapeConfig::default()
    }
}

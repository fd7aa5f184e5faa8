use serde::{Deserialize, Serialize};

/// One job listing as scraped from a results page.
///
/// Every field is best-effort: a sub-element missing from the card leaves the
/// corresponding field empty. `date_posted` is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(rename = "Job Title")]
    pub title: String,

    #[serde(rename = "Company Name")]
    pub company: String,

    #[serde(rename = "Location")]
    pub location: String,

    #[serde(rename = "Date Posted")]
    pub date_posted: String,

    #[serde(rename = "Job Description")]
    pub description: String,
}

/// Records in the order their cards were encountered across pages
pub type ResultSequence = Vec<ListingRecord>;

impl ListingRecord {
    /// Build a record from optional field values
    pub fn new(
        title: Option<String>,
        company: Option<String>,
        location: Option<String>,
        date_posted: Option<String>,
        description: String,
    ) -> Self {
        Self {
            title: title.unwrap_or_default(),
            company: company.unwrap_or_default(),
            location: location.unwrap_or_default(),
            date_posted: date_posted.unwrap_or_default(),
            description,
        }
    }
}

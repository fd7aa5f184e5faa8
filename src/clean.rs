use crate::error::{Result, ScrapeError};
use crate::results::ListingRecord;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const BASE_COLUMNS: [&str; 5] = [
    "Job Title",
    "Company Name",
    "Location",
    "Date Posted",
    "Job Description",
];
const AGE_COLUMN: &str = "Job Posting Age";
const TYPE_COLUMN: &str = "Job Type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    Remote,
    InOffice,
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobType::Remote => write!(f, "Remote"),
            JobType::InOffice => write!(f, "In-Office"),
        }
    }
}

impl FromStr for JobType {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Remote" => Ok(JobType::Remote),
            "In-Office" => Ok(JobType::InOffice),
            other => Err(ScrapeError::Config(format!("unknown job type: {}", other))),
        }
    }
}

/// A deduplicated, normalized listing with derived columns
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedJob {
    /// The listing, with its description normalized
    pub record: ListingRecord,
    /// One flag per keyword of the owning table
    pub flags: Vec<bool>,
    /// Days since posting, when the date text could be read
    pub age_days: Option<u32>,
    pub job_type: JobType,
}

/// Cleaned listings plus the keywords their flags refer to
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    pub keywords: Vec<String>,
    pub rows: Vec<CleanedJob>,
}

/// Turns raw scrape records into a [`CleanedTable`]
pub struct Cleaner {
    keywords: Vec<String>,
    non_alnum: Regex,
    quantity: Regex,
}

impl Cleaner {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            non_alnum: Regex::new(r"[^a-z0-9 ]").expect("valid character class"),
            quantity: Regex::new(r"(\d+)\+?\s*([a-z]*)").expect("valid quantity pattern"),
        }
    }

    /// Deduplicate and derive the keyword, age and job-type columns
    pub fn clean(&self, records: Vec<ListingRecord>) -> CleanedTable {
        let total = records.len();
        let records = dedupe(records);
        ::log::info!(
            "Cleaning {} records ({} duplicates dropped)",
            records.len(),
            total - records.len()
        );

        let rows = records
            .into_iter()
            .map(|mut record| {
                record.description = self.normalize_description(&record.description);
                let flags = self
                    .keywords
                    .iter()
                    .map(|keyword| record.description.contains(keyword.as_str()))
                    .collect();
                let age_days = self.parse_age(&record.date_posted);
                let job_type = if record.description.contains("remote") {
                    JobType::Remote
                } else {
                    JobType::InOffice
                };
                CleanedJob {
                    record,
                    flags,
                    age_days,
                    job_type,
                }
            })
            .collect();

        CleanedTable {
            keywords: self.keywords.clone(),
            rows,
        }
    }

    /// Lowercase, keep only `[a-z0-9 ]`, collapse whitespace runs to a space
    pub fn normalize_description(&self, description: &str) -> String {
        let spaced = description
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        self.non_alnum.replace_all(&spaced, "").into_owned()
    }

    /// Days since posting from free-form text such as "3 days ago"
    pub fn parse_age(&self, date_posted: &str) -> Option<u32> {
        let text = date_posted.trim().to_lowercase();
        if text.contains("just now") || text.contains("today") {
            return Some(0);
        }
        if text.contains("yesterday") {
            return Some(1);
        }

        let caps = self.quantity.captures(&text)?;
        let amount: u32 = caps[1].parse().ok()?;
        let unit = &caps[2];

        let days = if unit.starts_with("min") || unit.starts_with("h") || unit.starts_with("sec")
        {
            0
        } else if unit.starts_with('w') {
            amount.saturating_mul(7)
        } else if unit.starts_with("mo") {
            amount.saturating_mul(30)
        } else if unit.starts_with('y') {
            amount.saturating_mul(365)
        } else {
            amount
        };
        Some(days)
    }
}

/// Drop exact duplicates, keeping the first occurrence in order
pub fn dedupe(records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.clone()))
        .collect()
}

impl CleanedTable {
    fn headers(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.keywords.iter().cloned())
            .chain([AGE_COLUMN.to_string(), TYPE_COLUMN.to_string()])
            .collect()
    }

    /// Write the table as CSV with a header row
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        writer.write_record(self.headers())?;

        for row in &self.rows {
            let record = &row.record;
            let mut fields = vec![
                record.title.clone(),
                record.company.clone(),
                record.location.clone(),
                record.date_posted.clone(),
                record.description.clone(),
            ];
            fields.extend(row.flags.iter().map(|&flag| u8::from(flag).to_string()));
            fields.push(row.age_days.map(|d| d.to_string()).unwrap_or_default());
            fields.push(row.job_type.to_string());
            writer.write_record(&fields)?;
        }
        writer.flush()?;

        ::log::info!(
            "Saved {} cleaned rows to {}",
            self.rows.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Read a table written by [`CleanedTable::write_csv`]
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

        let fixed = BASE_COLUMNS.len() + 2;
        if headers.len() < fixed
            || headers[..BASE_COLUMNS.len()] != BASE_COLUMNS
            || headers[headers.len() - 2] != AGE_COLUMN
            || headers[headers.len() - 1] != TYPE_COLUMN
        {
            return Err(ScrapeError::Config(format!(
                "unexpected cleaned CSV header: {:?}",
                headers
            )));
        }
        let keywords = headers[BASE_COLUMNS.len()..headers.len() - 2].to_vec();

        let mut rows = Vec::new();
        for result in reader.records() {
            let row = result?;
            let field = |i: usize| row.get(i).unwrap_or_default().to_string();

            let flags = (0..keywords.len())
                .map(|k| field(BASE_COLUMNS.len() + k) == "1")
                .collect();
            let age_days = field(headers.len() - 2).parse().ok();
            let job_type = field(headers.len() - 1).parse()?;

            rows.push(CleanedJob {
                record: ListingRecord {
                    title: field(0),
                    company: field(1),
                    location: field(2),
                    date_posted: field(3),
                    description: field(4),
                },
                flags,
                age_days,
                job_type,
            });
        }

        Ok(Self { keywords, rows })
    }
}

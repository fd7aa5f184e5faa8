//! Summary statistics over a cleaned table.

use crate::clean::{CleanedTable, JobType};
use std::collections::HashMap;
use std::fmt;

/// Ridge term added to the feature diagonal so that constant or duplicated
/// keyword columns still give a solvable system
const RIDGE: f64 = 1e-6;

/// Value counts of non-empty values, most frequent first; ties keep the
/// order of first appearance
pub fn top_values<'a>(values: impl IntoIterator<Item = &'a str>, n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, value) in values.into_iter().enumerate() {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.1.1.cmp(&b.1.1)));
    ranked
        .into_iter()
        .take(n)
        .map(|(value, (count, _))| (value.to_string(), count))
        .collect()
}

/// Number of rows flagged for each keyword
pub fn skill_counts(table: &CleanedTable) -> Vec<(String, usize)> {
    table
        .keywords
        .iter()
        .enumerate()
        .map(|(k, keyword)| {
            let count = table
                .rows
                .iter()
                .filter(|row| row.flags.get(k).copied().unwrap_or(false))
                .count();
            (keyword.clone(), count)
        })
        .collect()
}

/// Percentage of rows of each job type
pub fn job_type_share(table: &CleanedTable) -> Vec<(JobType, f64)> {
    if table.rows.is_empty() {
        return Vec::new();
    }
    let total = table.rows.len() as f64;
    [JobType::Remote, JobType::InOffice]
        .into_iter()
        .map(|job_type| {
            let count = table.rows.iter().filter(|r| r.job_type == job_type).count();
            (job_type, count as f64 * 100.0 / total)
        })
        .collect()
}

/// Least-squares fit of posting age on the keyword flags
#[derive(Debug, Clone, PartialEq)]
pub struct Regression {
    pub intercept: f64,
    /// One coefficient per keyword
    pub coefficients: Vec<f64>,
    pub train_rows: usize,
    /// Predicted ages for the held-out rows
    pub test_predictions: Vec<f64>,
}

impl Regression {
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

/// Fit posting age on keyword flags.
///
/// Rows without an age are dropped; every fifth remaining row is held out
/// for prediction. Returns `None` with fewer than two training rows.
pub fn age_regression(table: &CleanedTable) -> Option<Regression> {
    let samples: Vec<(Vec<f64>, f64)> = table
        .rows
        .iter()
        .filter_map(|row| {
            let age = row.age_days? as f64;
            let features = (0..table.keywords.len())
                .map(|k| f64::from(u8::from(row.flags.get(k).copied().unwrap_or(false))))
                .collect();
            Some((features, age))
        })
        .collect();

    let (test, train): (Vec<_>, Vec<_>) = samples
        .into_iter()
        .enumerate()
        .partition(|(i, _)| i % 5 == 4);
    if train.len() < 2 {
        ::log::debug!("Too few rows with an age to fit ({})", train.len());
        return None;
    }

    let width = table.keywords.len() + 1;
    let mut gram = vec![vec![0.0; width]; width];
    let mut moment = vec![0.0; width];
    for (_, (features, age)) in &train {
        let x: Vec<f64> = std::iter::once(1.0).chain(features.iter().copied()).collect();
        for i in 0..width {
            moment[i] += x[i] * age;
            for j in 0..width {
                gram[i][j] += x[i] * x[j];
            }
        }
    }
    for (i, row) in gram.iter_mut().enumerate().skip(1) {
        row[i] += RIDGE;
    }

    let beta = solve(gram, moment)?;
    let mut regression = Regression {
        intercept: beta[0],
        coefficients: beta[1..].to_vec(),
        train_rows: train.len(),
        test_predictions: Vec::new(),
    };
    regression.test_predictions = test
        .iter()
        .map(|(_, (features, _))| regression.predict(features))
        .collect();
    Some(regression)
}

/// Gaussian elimination with partial pivoting
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                let delta = factor * a[col][k];
                a[row][k] -= delta;
            }
            let delta = factor * b[col];
            b[row] -= delta;
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

/// Everything the analysis stage reports
#[derive(Debug, Clone)]
pub struct Report {
    pub top_locations: Vec<(String, usize)>,
    pub top_companies: Vec<(String, usize)>,
    pub skills: Vec<(String, usize)>,
    pub job_types: Vec<(JobType, f64)>,
    pub regression: Option<Regression>,
}

impl Report {
    pub fn from_table(table: &CleanedTable) -> Self {
        Self {
            top_locations: top_values(table.rows.iter().map(|r| r.record.location.as_str()), 5),
            top_companies: top_values(table.rows.iter().map(|r| r.record.company.as_str()), 5),
            skills: skill_counts(table),
            job_types: job_type_share(table),
            regression: age_regression(table),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Top 5 Cities:")?;
        for (location, count) in &self.top_locations {
            writeln!(f, "  {:<40} {}", location, count)?;
        }
        writeln!(f, "Skill Trends:")?;
        for (skill, count) in &self.skills {
            writeln!(f, "  {:<40} {}", skill, count)?;
        }
        writeln!(f, "Top Companies:")?;
        for (company, count) in &self.top_companies {
            writeln!(f, "  {:<40} {}", company, count)?;
        }
        writeln!(f, "Job Types:")?;
        for (job_type, share) in &self.job_types {
            writeln!(f, "  {:<40} {:.1}%", job_type.to_string(), share)?;
        }
        match &self.regression {
            Some(model) => {
                writeln!(
                    f,
                    "Posting age model ({} training rows): intercept {:.2}, coefficients {:?}",
                    model.train_rows, model.intercept, model.coefficients
                )?;
                write!(f, "Predictions: {:?}", model.test_predictions)
            }
            None => write!(f, "Posting age model: not enough data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::CleanedJob;
    use crate::results::ListingRecord;

    fn row(location: &str, company: &str, flags: [bool; 2], age: Option<u32>, job_type: JobType) -> CleanedJob {
        CleanedJob {
            record: ListingRecord {
                location: location.into(),
                company: company.into(),
                ..ListingRecord::default()
            },
            flags: flags.to_vec(),
            age_days: age,
            job_type,
        }
    }

    fn table(rows: Vec<CleanedJob>) -> CleanedTable {
        CleanedTable {
            keywords: vec!["python".into(), "ai".into()],
            rows,
        }
    }

    #[test]
    fn test_top_values_ranking() {
        let values = ["Berlin", "Paris", "", "Paris", "Oslo", "Berlin", "Paris", "Rome"];
        let top = top_values(values, 3);
        assert_eq!(
            top,
            vec![
                ("Paris".to_string(), 3),
                ("Berlin".to_string(), 2),
                ("Oslo".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_skill_counts_and_shares() {
        let t = table(vec![
            row("A", "X", [true, false], None, JobType::Remote),
            row("A", "Y", [true, true], None, JobType::InOffice),
            row("B", "Y", [false, false], None, JobType::InOffice),
            row("C", "Z", [false, true], None, JobType::InOffice),
        ]);
        assert_eq!(
            skill_counts(&t),
            vec![("python".to_string(), 2), ("ai".to_string(), 2)]
        );
        assert_eq!(
            job_type_share(&t),
            vec![(JobType::Remote, 25.0), (JobType::InOffice, 75.0)]
        );
        assert!(job_type_share(&table(Vec::new())).is_empty());
    }

    #[test]
    fn test_regression_recovers_linear_ages() {
        // age = 2 + 10 * python + 3 * ai
        let combos = [
            ([false, false], 2),
            ([true, false], 12),
            ([false, true], 5),
            ([true, true], 15),
        ];
        let rows = (0..20)
            .map(|i| {
                let (flags, age) = combos[i % 4];
                row("", "", flags, Some(age), JobType::InOffice)
            })
            .collect();
        let model = age_regression(&table(rows)).unwrap();

        assert_eq!(model.train_rows, 16);
        assert_eq!(model.test_predictions.len(), 4);
        assert!((model.intercept - 2.0).abs() < 1e-3);
        assert!((model.coefficients[0] - 10.0).abs() < 1e-3);
        assert!((model.coefficients[1] - 3.0).abs() < 1e-3);
        assert!((model.predict(&[1.0, 1.0]) - 15.0).abs() < 1e-3);
    }

    #[test]
    fn test_regression_handles_constant_columns() {
        let rows = (0..6)
            .map(|i| row("", "", [false, false], Some(i), JobType::InOffice))
            .collect();
        let model = age_regression(&table(rows)).unwrap();
        assert!(model.coefficients.iter().all(|c| c.abs() < 1e-3));
    }

    #[test]
    fn test_regression_needs_rows_with_age() {
        let rows = vec![
            row("", "", [true, false], Some(3), JobType::InOffice),
            row("", "", [true, false], None, JobType::InOffice),
        ];
        assert!(age_regression(&table(rows)).is_none());
    }

    #[test]
    fn test_report_renders() {
        let t = table(vec![row("Berlin", "Acme", [true, false], Some(1), JobType::Remote)]);
        let text = Report::from_table(&t).to_string();
        assert!(text.contains("Top 5 Cities:"));
        assert!(text.contains("Berlin"));
        assert!(text.contains("not enough data"));
    }
}

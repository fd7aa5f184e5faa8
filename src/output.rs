use crate::error::Result;
use crate::results::ListingRecord;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write the scrape result as a pretty-printed JSON array
pub fn write_records<P: AsRef<Path>>(path: P, records: &[ListingRecord]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    ::log::info!(
        "Saved {} records to {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Read a scrape result written by [`write_records`]
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<ListingRecord>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_file_uses_contract_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs_data.json");
        let records = vec![
            ListingRecord {
                title: "Data Engineer".into(),
                company: "Acme".into(),
                location: "Remote".into(),
                date_posted: "2 weeks ago".into(),
                description: "Python and SQL".into(),
            },
            ListingRecord::default(),
        ];

        write_records(&path, &records).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let first = raw.as_array().unwrap()[0].as_object().unwrap();
        let mut keys: Vec<_> = first.keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "Company Name",
                "Date Posted",
                "Job Description",
                "Job Title",
                "Location"
            ]
        );
        assert_eq!(read_records(&path).unwrap(), records);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let result = read_records("/nonexistent/jobs_data.json");
        assert!(matches!(result, Err(crate::error::ScrapeError::Io(_))));
    }
}

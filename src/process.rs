use std::collections::BTreeMap;
use std::path::Path;

use chrono::Local;

use crate::extract::{extract_all, SchoolRecord, SelectorSchema};
use crate::fetch::{build_client, fetch_all, read_url_list, FetchConfig, FetchOutcome};
use crate::{info_time, Result, DOWNLOAD_DIR, RESULTS_PATH, URL_LIST_PATH};

/// Stage one: read the URL list, download every page into the download
/// directory, and print a per-URL summary. Failed URLs are reported, not
/// fatal.
pub async fn process_fetch() -> Result<()> {
    let start_time = Local::now();
    info_time!("Started fetching");

    let urls = read_url_list(Path::new(URL_LIST_PATH)).await?;
    info_time!("Found {} URLs to process", urls.len());

    let config = FetchConfig::default();
    let client = build_client(&config)?;
    let outcomes = fetch_all(&client, &urls, &config).await?;

    print_summary(&outcomes);
    let saved = outcomes.iter().filter(|outcome| outcome.is_saved()).count();
    info_time!(
        start_time,
        "Finished fetching {saved} out of {} pages",
        outcomes.len()
    );

    Ok(())
}

/// Stage two: run the extraction rules over every saved page and write the
/// aggregated records as pretty-printed JSON.
pub fn process_extract() -> Result<()> {
    let start_time = Local::now();
    info_time!("Started extracting");

    let records = extract_all(Path::new(DOWNLOAD_DIR), &SelectorSchema::default())?;
    write_records(Path::new(RESULTS_PATH), &records)?;
    info_time!(
        start_time,
        "Processed {} schools into {RESULTS_PATH}",
        records.len()
    );

    Ok(())
}

fn write_records(path: &Path, records: &BTreeMap<String, SchoolRecord>) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn print_summary(outcomes: &[FetchOutcome]) {
    let saved = outcomes.iter().filter(|outcome| outcome.is_saved()).count();

    println!("\nDownload Summary:");
    println!("{}", "-".repeat(50));
    println!(
        "Successfully downloaded {saved} out of {} files\n",
        outcomes.len()
    );
    println!("Detailed Results:");
    for outcome in outcomes {
        match outcome {
            FetchOutcome::Saved { url, .. } => println!("✓ {url}"),
            FetchOutcome::Failed { url, reason } => {
                println!("✗ {url}");
                println!("  Error: {reason}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(name: &str) -> SchoolRecord {
        SchoolRecord {
            school: name.to_owned(),
            overall_grade: "A-".to_owned(),
            academics: "A".to_owned(),
            diversity: "B".to_owned(),
            teachers: "A-".to_owned(),
            college_prep: "A".to_owned(),
            clubs_activities: "B+".to_owned(),
            administration: "B".to_owned(),
            sports: "C".to_owned(),
            food: "B-".to_owned(),
            resources_facilities: "B".to_owned(),
            website: "example.org".to_owned(),
            contact: "(555) 555-0100".to_owned(),
            address: "1 Main St, Town, ST 00000".to_owned(),
        }
    }

    #[test]
    fn results_json_keys_records_by_display_name() {
        let mut records = BTreeMap::new();
        let record = sample_record("École Secondaire");
        records.insert(record.school.clone(), record);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_records(&path, &records).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains(r#""École Secondaire""#));
        assert!(json.contains(r#""Overall Niche Grade": "A-""#));
        // Non-ASCII names stay readable, not \u-escaped.
        assert!(!json.contains(r"\u"));
    }

    #[test]
    fn record_fields_serialize_in_declaration_order() {
        let json = serde_json::to_string_pretty(&sample_record("Alpha")).unwrap();
        let school = json.find(r#""School""#).unwrap();
        let grade = json.find(r#""Overall Niche Grade""#).unwrap();
        let address = json.find(r#""Address""#).unwrap();
        assert!(school < grade);
        assert!(grade < address);
    }

    #[test]
    fn results_json_is_sorted_and_stable_across_reruns() {
        let mut records = BTreeMap::new();
        for name in ["Beta School", "Alpha School"] {
            records.insert(name.to_owned(), sample_record(name));
        }

        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        write_records(&first, &records).unwrap();
        write_records(&second, &records).unwrap();

        let first = std::fs::read_to_string(&first).unwrap();
        let second = std::fs::read_to_string(&second).unwrap();
        assert_eq!(first, second);
        assert!(first.find("Alpha School").unwrap() < first.find("Beta School").unwrap());
    }
}

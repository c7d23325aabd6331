use chrono::Local;
use niche_scrape::{info_time, process::process_extract, Result};

fn main() -> Result<()> {
    let start_time = Local::now();
    process_extract()?;
    info_time!(start_time, "Full extract stage time:");

    Ok(())
}

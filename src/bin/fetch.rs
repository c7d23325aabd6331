use chrono::Local;
use niche_scrape::{info_time, process::process_fetch, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Local::now();
    process_fetch().await?;
    info_time!(start_time, "Full fetch stage time:");

    Ok(())
}

/// Similar to the `info!` macro in tracing.
/// Pass a start time as the first argument and the line also reports how many
/// seconds have passed since then.
/// ```
/// use chrono::Local;
/// use niche_scrape::info_time;
///
/// info_time!("processed {} pages", 2);
/// let start = Local::now();
/// info_time!(start, "processed {} pages", 2);
/// ```
#[macro_export]
macro_rules! info_time {
    ($strfm:literal $(,)? $($arg:expr),*) => {{
        let now = ::chrono::Local::now();
        println!("[{}] {}", now.format("%H:%M:%S%.3f"), format!($strfm, $($arg),*));
    }};
    ($time:expr, $strfm:literal $(,)? $($arg:expr),*) => {{
        let now = ::chrono::Local::now();
        let elapsed = (now - $time).num_milliseconds() as f64 / 1000.0;
        println!(
            "[{}] {} ({elapsed:.2} sec)",
            now.format("%H:%M:%S%.3f"),
            format!($strfm, $($arg),*)
        );
    }};
}

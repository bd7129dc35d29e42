//! Run summary display
//!
//! This module prints the end-of-run summary: crawl totals and one line per
//! document that did not download.

use crate::runner::RunSummary;

/// Prints the run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The finished run to display
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Crawl:");
    println!("  Pages crawled: {}", summary.pages);
    println!("  Documents found: {}", summary.documents);
    println!("  Manifest: {}", summary.manifest_path.display());
    println!("  Output: {}", summary.run_root.display());
    println!();

    let Some(report) = &summary.report else {
        println!("Downloads skipped (crawl only)");
        return;
    };

    println!("Downloads:");
    println!("  Succeeded: {}", report.succeeded());
    println!("  Failed: {}", report.failed());
    println!("  Cancelled: {}", report.cancelled());
    println!("  Bytes written: {}", report.bytes_written());
    println!();

    if report.failures().next().is_some() {
        println!("Not downloaded:");
        for outcome in report.failures() {
            match &outcome.error {
                Some(error) => println!("  - {} ({}): {}", outcome.location, outcome.status, error),
                None => println!("  - {} ({})", outcome.location, outcome.status),
            }
        }
        println!();
    }

    let success_rate = if report.total() > 0 {
        (report.succeeded() as f64 / report.total() as f64) * 100.0
    } else {
        100.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} documents downloaded)",
        success_rate,
        report.succeeded(),
        report.total()
    );
}

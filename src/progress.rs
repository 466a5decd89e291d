//! Progress reporting for walk generation
//!
//! Provides a progress bar over the selected entities, fed from the walk
//! writer's counters, and the console summary printed after a run.

use crate::generation::{GenerationProgress, GenerationReport};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays generation status
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress template")
                .progress_chars("=> ")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Start a new generation cycle over `total` entities
    pub fn start_phase(&self, label: &str, total: u64) {
        self.bar.set_prefix(label.to_string());
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    /// Update the progress display
    pub fn update(&self, progress: &GenerationProgress) {
        let msg = format!(
            "Walks: {} | Text: {} | Rate: {:.0} entities/s | Workers: {}",
            format_number(progress.walks),
            format_size(progress.bytes, BINARY),
            progress.entities_per_second(),
            progress.workers,
        );

        self.bar.set_position(progress.processed.min(progress.total));
        self.bar.set_message(msg);
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the generation results
pub fn print_summary(report: &GenerationReport, walk_dir: &str) {
    let duration_secs = report.duration.as_secs_f64();

    println!();
    println!("{}", style("Walk Generation Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Entities:").bold(),
        format_number(report.entities)
    );
    println!(
        "  {} {}",
        style("Walks:").bold(),
        format_number(report.walks_written)
    );
    println!(
        "  {} {}",
        style("Text Size:").bold(),
        format_size(report.bytes_written, BINARY)
    );
    println!(
        "  {} {:.1}s ({:.0} walks/sec)",
        style("Duration:").bold(),
        duration_secs,
        report.walks_per_second()
    );
    if report.skipped > 0 {
        println!(
            "  {} {}",
            style("Without walks:").bold(),
            format_number(report.skipped)
        );
    }
    if report.errors > 0 {
        println!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(report.errors)
        );
    }
    if report.lines_dropped > 0 {
        println!(
            "  {} {}",
            style("Dropped lines:").yellow().bold(),
            format_number(report.lines_dropped)
        );
    }
    println!(
        "  {} {} ({} files)",
        style("Walk Directory:").bold(),
        walk_dir,
        report.segments
    );
    println!();
}

/// Print a header at the start of the run
pub fn print_header(graph: &str, mode: &str, threads: usize, walk_dir: &str) {
    println!();
    println!(
        "{} {}",
        style("kg-walker").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Graph:").bold(), graph);
    println!("  {} {}", style("Mode:").bold(), mode);
    println!("  {} {}", style("Threads:").bold(), threads);
    println!("  {} {}", style("Output:").bold(), walk_dir);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_reporter_tracks_phase() {
        let reporter = ProgressReporter::new();
        reporter.start_phase("graph", 10);
        reporter.update(&GenerationProgress {
            processed: 4,
            total: 10,
            walks: 40,
            bytes: 1024,
            workers: 2,
            elapsed: Duration::from_secs(2),
        });
        assert_eq!(reporter.bar.position(), 4);
        assert_eq!(reporter.bar.length(), Some(10));
        reporter.finish_and_clear();
    }
}

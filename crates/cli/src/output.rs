//! Terminal output utilities

use openmarket_image::{AttemptOutcome, PreparationReport};
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else {
        format!("{:.1}s", secs)
    }
}

/// Format a byte count for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// One line per resample attempt, without colors.
pub fn attempt_lines(report: &PreparationReport) -> Vec<String> {
    report
        .attempts
        .iter()
        .enumerate()
        .map(|(i, attempt)| {
            let result = match &attempt.outcome {
                AttemptOutcome::Encoded { len } => format_size(*len as u64),
                AttemptOutcome::NotSmaller { len } => {
                    format!("{} (kept previous)", format_size(*len as u64))
                }
                AttemptOutcome::DownsampleFailed { reason } => format!("resample failed: {}", reason),
                AttemptOutcome::EncodeFailed { reason } => format!("encode failed: {}", reason),
            };
            format!(
                "{:>2}. x{:.1} -> {}px  {}",
                i + 1,
                attempt.scale,
                attempt.target_side,
                result
            )
        })
        .collect()
}

/// Print a preparation summary for `name`
pub fn print_report(name: &str, report: &PreparationReport, elapsed: std::time::Duration) {
    Status::header(name);
    println!(
        "  Source:  {}x{}{}",
        report.source_width,
        report.source_height,
        if report.cropped {
            format!(" (cropped to {}x{})", report.square_side, report.square_side)
        } else {
            String::new()
        }
    );
    println!("  Initial: {}", format_size(report.initial_len as u64));

    for line in attempt_lines(report) {
        println!("  {}", line.dimmed());
    }

    let summary = format!(
        "{} {}px, {} in {}",
        format_size(report.final_len as u64),
        report.final_side,
        format_count(report.attempts.len(), "attempt", "attempts"),
        format_duration(elapsed)
    );
    if report.within_budget {
        Status::success(&summary);
    } else {
        Status::warning(&format!(
            "{} (over the {} budget)",
            summary,
            format_size(report.budget_bytes as u64)
        ));
    }
}

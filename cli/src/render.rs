//! Plain-text rendering of progress and results.

use std::fmt::Write as _;

use ideascore_engine::{ProgressSnapshot, ScoreDisplay};

/// One progress line, e.g. `[ 40%] AI Analysis`.
pub fn progress_line(snapshot: &ProgressSnapshot) -> Option<String> {
    let label = snapshot.active_label()?;
    Some(format!("[{:>3}%] {label}", snapshot.percent))
}

pub fn score_report(display: &ScoreDisplay) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Score:      {}", display.score_text);
    let _ = writeln!(
        out,
        "Confidence: {}% ({})",
        display.confidence_percent,
        display.confidence_label.as_str()
    );
    let _ = writeln!(out, "Language:   {}", display.language);

    if !display.key_details.is_empty() {
        out.push('\n');
        let width = display
            .key_details
            .iter()
            .map(|row| row.label.len())
            .max()
            .unwrap_or(0);
        for row in &display.key_details {
            let _ = writeln!(out, "{:<width$}  {}", row.label, row.value);
        }
    }

    if !display.dimensions.is_empty() {
        out.push_str("\nDimensions\n");
        for dimension in &display.dimensions {
            let _ = writeln!(
                out,
                "  {:<24} {:>3}/100  ({}% confidence)",
                dimension.name, dimension.score, dimension.confidence_percent
            );
        }
    }

    let feedback = &display.feedback;
    for (heading, items) in [
        ("Strengths", &feedback.strengths),
        ("Weaknesses", &feedback.weaknesses),
        ("Recommendations", &feedback.recommendations),
        ("Next steps", &feedback.next_steps),
    ] {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{heading}");
        for item in items {
            let _ = writeln!(out, "  - {item}");
        }
    }

    out
}

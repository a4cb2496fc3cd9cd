//! Output formatting module
//!
//! This module handles formatting attribution results for different output formats.

use crate::{
    Result,
    attribution::{
        AnalysisOutcome, AttributionReport, JourneyStructure, ModelComparison, TransitionMatrix,
    },
    data_source::InputTable,
};

/// Output the run outcome as JSON
pub fn output_json(w: &mut impl std::io::Write, outcome: &AnalysisOutcome) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, outcome)?;
    writeln!(w)?; // Add trailing newline
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

/// Output the report as text tables
pub fn output_table(
    w: &mut impl std::io::Write,
    report: &AttributionReport,
    structure: &JourneyStructure,
    comparison: &[ModelComparison],
) -> Result<()> {
    writeln!(w, "Markov Attribution - Analysis Results")?;
    writeln!(w, "{}", "=".repeat(80))?;
    writeln!(w)?;

    writeln!(w, "Summary:")?;
    writeln!(w, "  Conversion Paths:     {}", report.summary.path_count)?;
    writeln!(w, "  Channels:             {}", report.summary.channel_count)?;
    writeln!(
        w,
        "  Base Conversion Prob: {:.4}",
        report.summary.base_conversion_probability
    )?;
    writeln!(w, "  Journey Pattern:      {}", structure.pattern.display_name())?;
    writeln!(w, "  Branching Factor:     {:.2}", structure.branching_factor)?;
    if let Some(depth) = structure.max_depth {
        writeln!(w, "  Longest Journey:      {} hops", depth)?;
    }
    writeln!(w)?;

    if !report.attribution.is_empty() {
        writeln!(w, "Channel Attribution:")?;
        writeln!(w, "{:-<80}", "")?;
        writeln!(w, "{:<60} {:>19}", "Channel", "Attribution")?;
        writeln!(w, "{:-<80}", "")?;
        for record in &report.attribution {
            writeln!(
                w,
                "{:<60} {:>18.2}%",
                truncate(&record.channel, 60),
                record.attribution_weight * 100.0
            )?;
        }
        writeln!(w)?;
    }

    if !comparison.is_empty() {
        writeln!(w, "Model Comparison:")?;
        writeln!(w, "{:-<80}", "")?;
        writeln!(
            w,
            "{:<36} {:>11} {:>11} {:>11} {:>8}",
            "Channel", "Data-Driven", "First Click", "Last Click", "Post"
        )?;
        writeln!(w, "{:-<80}", "")?;
        for row in comparison {
            writeln!(
                w,
                "{:<36} {:>10.2}% {:>10.2}% {:>10.2}% {:>8}",
                truncate(&row.channel, 36),
                row.data_driven * 100.0,
                row.first_click * 100.0,
                row.last_click * 100.0,
                row.post_click_touches
            )?;
        }
        writeln!(w)?;
    }

    if !report.paths.is_empty() {
        writeln!(w, "Top Conversion Paths:")?;
        writeln!(w, "{:-<100}", "")?;
        writeln!(
            w,
            "{:<58} {:>8} {:>10} {:>10} {:>10}",
            "Path", "Orders", "Score", "Length", "Value"
        )?;
        writeln!(w, "{:-<100}", "")?;
        for path in &report.paths {
            writeln!(
                w,
                "{:<58} {:>8} {:>10.4} {:>10.2} {:>10.4}",
                truncate(&path.path_signature, 58),
                path.order_count,
                path.mean_score,
                path.mean_path_length,
                path.value
            )?;
        }
        writeln!(w)?;
    }

    if !report.pairs.is_empty() {
        writeln!(w, "Top Channel Pairs:")?;
        writeln!(w, "{:-<100}", "")?;
        writeln!(
            w,
            "{:<38} {:<38} {:>10} {:>10}",
            "Source", "Destination", "Value", "Frequency"
        )?;
        writeln!(w, "{:-<100}", "")?;
        for pair in &report.pairs {
            writeln!(
                w,
                "{:<38} {:<38} {:>10.4} {:>10}",
                truncate(&pair.source, 38),
                truncate(&pair.destination, 38),
                pair.total_value,
                pair.frequency
            )?;
        }
        writeln!(w)?;
    }

    Ok(())
}

/// Output the transition matrix as a Graphviz digraph
pub fn output_dot(w: &mut impl std::io::Write, matrix: &TransitionMatrix) -> Result<()> {
    write!(w, "{}", matrix.to_dot())?;
    Ok(())
}

/// Output the table's column list
pub fn output_columns(w: &mut impl std::io::Write, table: &InputTable) -> Result<()> {
    writeln!(w, "Rows:    {}", table.len())?;
    writeln!(w, "Columns: {}", table.columns.len())?;
    for column in &table.columns {
        writeln!(w, "  - {}", column)?;
    }
    Ok(())
}

//! Human-readable Markdown view of a report.

use fprobe_schema::{single_line, truncate_chars, Outcome};

use crate::report::Report;

/// Explanation width in the results table.
const TABLE_DETAIL_CHARS: usize = 80;
/// Explanation width in the discrepancy list.
const DISCREPANCY_DETAIL_CHARS: usize = 120;

fn glyph(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Pass => "✅",
        Outcome::Fail => "❌",
        Outcome::Skip => "⏭️",
        Outcome::Error => "⚠️",
        Outcome::Partial => "🟡",
    }
}

/// One line, with pipes escaped.
fn escape_cell(text: &str) -> String {
    single_line(text).replace('|', "\\|")
}

/// Render the report. The report is only read.
pub fn render_markdown(report: &Report) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {} Feature Probe Report\n\n", report.engine.name));
    md.push_str(&format!("- **Timestamp:** {}\n", report.timestamp));
    md.push_str(&format!("- **{} Version:** {}\n", report.engine.name, report.engine.version));
    md.push_str(&format!("- **Match Policy:** {}\n", report.policy.describe()));
    if !report.catalog_sha256.is_empty() {
        md.push_str(&format!("- **Catalog SHA-256:** `{}`\n", report.catalog_sha256));
    }
    md.push('\n');

    let s = &report.summary;
    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Total | {} |\n", s.total));
    md.push_str(&format!("| ✅ Passed | {} |\n", s.passed));
    md.push_str(&format!("| ❌ Failed | {} |\n", s.failed));
    md.push_str(&format!("| ⏭️ Skipped | {} |\n", s.skipped));
    md.push_str(&format!("| ⚠️ Errors | {} |\n", s.errors));
    md.push_str(&format!("| 🟡 Partial | {} |\n", s.partial));
    md.push_str(&format!("| 🔍 Discrepancies | {} |\n", s.discrepancies));
    md.push('\n');

    md.push_str("## Results\n\n");
    md.push_str("| Feature | Track | Result | Declared | Match | Details |\n");
    md.push_str("|---------|-------|--------|----------|-------|---------|\n");
    for r in &report.results {
        let match_str = if r.is_discrepancy { "❌ DISCREPANCY" } else { "✅" };
        md.push_str(&format!(
            "| {} | {} | {} {} | {} | {} | {} |\n",
            escape_cell(&r.result.display_name),
            r.result.spec_track,
            glyph(r.result.outcome),
            r.result.outcome,
            r.declared_level,
            match_str,
            escape_cell(&truncate_chars(&r.result.explanation, TABLE_DETAIL_CHARS)),
        ));
    }
    md.push('\n');

    md.push_str("## ⚠️ Discrepancies\n\n");
    let mut any = false;
    for r in report.discrepancies() {
        any = true;
        md.push_str(&format!(
            "- **{}** ({}): probe={}, declared={}: {}\n",
            single_line(&r.result.display_name),
            r.result.spec_track,
            r.result.outcome,
            r.declared_level,
            truncate_chars(&r.result.explanation, DISCREPANCY_DETAIL_CHARS),
        ));
    }
    if !any {
        md.push_str("No discrepancies.\n");
    }

    md
}

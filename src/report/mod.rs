//! Debug report rendering
//!
//! Pure rendering over already-loaded data; no storage access. Output is
//! Markdown suitable for pasting into an issue tracker or an AI assistant.

use crate::domain::{ConsoleLogEntry, ErrorDetail, ErrorOccurrence};

/// Response bodies are clipped to this many characters in reports.
const RESPONSE_BODY_LIMIT: usize = 500;

/// At most this many console error entries are rendered.
const CONSOLE_ERROR_LIMIT: usize = 10;

/// Render a debug report for a group and (optionally) one of its
/// occurrences. Sections appear in a fixed order; a section whose source
/// data is absent is omitted.
pub fn render(detail: &ErrorDetail, occurrence: Option<&ErrorOccurrence>) -> String {
    let group = &detail.group;
    let mut report = String::new();

    report.push_str("## Error Debug Report\n\n");
    report.push_str(&format!("**Error ID**: {}\n", group.id));
    report.push_str(&format!(
        "**Category**: {} (`{}`)\n",
        detail.category_label, group.category
    ));
    report.push_str(&format!("**Occurrences**: {} times\n", group.occurrence_count));

    report.push_str("\n### Timeline\n");
    report.push_str(&format!(
        "- **First Occurred**: {}\n",
        group.first_occurred.to_rfc3339()
    ));
    report.push_str(&format!(
        "- **Last Occurred**: {}\n",
        group.last_occurred.to_rfc3339()
    ));

    report.push_str("\n### Error Details\n");
    report.push_str(&format!("- **Type**: `{}`\n", group.error_type));
    report.push_str(&format!(
        "- **Message**:\n```\n{}\n```\n",
        group.error_message
    ));

    if let Some(occurrence) = occurrence {
        render_occurrence(&mut report, occurrence);
    }

    report.push_str(&format!(
        "\n---\n*This error has occurred {} time(s). Please investigate and suggest a fix.*\n",
        group.occurrence_count
    ));

    report
}

fn render_occurrence(report: &mut String, occurrence: &ErrorOccurrence) {
    if let Some(context) = &occurrence.context {
        report.push_str(&format!("\n### Context\n{context}\n"));
    }

    if let Some(stack_trace) = &occurrence.stack_trace {
        report.push_str(&format!("\n### Stack Trace\n```\n{stack_trace}\n```\n"));
    }

    if let Some(request_url) = &occurrence.request_url {
        report.push_str(&format!("\n### Request\n- **URL**: {request_url}\n"));
        if let Some(status) = occurrence.http_status {
            report.push_str(&format!("- **HTTP Status**: {status}\n"));
        }
        if let Some(body) = &occurrence.response_body {
            let clipped: String = body.chars().take(RESPONSE_BODY_LIMIT).collect();
            report.push_str(&format!("\n```\n{clipped}\n```\n"));
        }
    }

    if let Some(page_url) = &occurrence.page_url {
        report.push_str(&format!("\n### Page URL\n{page_url}\n"));
    }

    if let Some(logs) = &occurrence.console_logs {
        let errors: Vec<&ConsoleLogEntry> = logs.iter().filter(|l| l.is_error()).collect();
        if !errors.is_empty() {
            report.push_str(&format!("\n### Console Errors ({})\n```\n", errors.len()));
            for entry in errors.iter().take(CONSOLE_ERROR_LIMIT) {
                report.push_str(&format!(
                    "[{}] {}\n",
                    entry.kind.as_deref().unwrap_or(""),
                    entry.body()
                ));
            }
            report.push_str("```\n");
        }
    }

    if let Some(extra) = occurrence.extra_data.as_ref().filter(|map| !map.is_empty()) {
        let pretty =
            serde_json::to_string_pretty(extra).unwrap_or_else(|_| "{}".to_string());
        report.push_str(&format!("\n### Extra Data\n```json\n{pretty}\n```\n"));
    }

    if let Some(test_id) = &occurrence.test_id {
        report.push_str("\n### Test Details\n");
        report.push_str(&format!(
            "- **Test**: `{}` — {}\n",
            test_id,
            occurrence.test_name.as_deref().unwrap_or("")
        ));
        if let Some(suite) = &occurrence.suite {
            report.push_str(&format!("- **Suite**: {suite}\n"));
        }
        if let Some(run_id) = &occurrence.run_id {
            report.push_str(&format!("- **Run ID**: {run_id}\n"));
        }
    }
}

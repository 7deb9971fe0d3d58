use std::io::{self, Write};

use anyhow::Result;
use gistq_core::Message;

pub(super) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Message payloads on the command line are JSON when they parse as JSON,
/// plain strings otherwise.
pub(super) fn parse_content(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

pub(super) fn content_preview(content: &serde_json::Value, max: usize) -> String {
    let rendered = match content {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    truncate(&rendered, max)
}

pub(super) fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let clipped = value.chars().take(max).collect::<String>();
    format!("{clipped}...")
}

pub(super) fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| h.len()).collect::<Vec<_>>();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if index < widths.len() {
                widths[index] = widths[index].max(cell.chars().count());
            }
        }
    }

    let render_row = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(index, cell)| format!("{cell:<width$}", width = widths[index]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_row(
        &headers.iter().map(ToString::to_string).collect::<Vec<_>>(),
    ));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(render_row(row));
    }
    lines.join("\n")
}

pub(super) fn print_message_table(message: &Message) {
    println!("Id: {}", message.id);
    println!("Content: {}", content_preview(&message.content, 200));
    println!("Status: {}", message.status);
    println!("Status Datetime: {}", message.status_datetime);
    println!("Process: {}", message.process.as_deref().unwrap_or("-"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_parses_json_and_falls_back_to_string() {
        assert_eq!(
            parse_content("{\"a\": 1}"),
            serde_json::json!({"a": 1})
        );
        assert_eq!(parse_content("42"), serde_json::json!(42));
        assert_eq!(
            parse_content("plain text"),
            serde_json::Value::String("plain text".to_string())
        );
    }

    #[test]
    fn truncate_clips_long_values() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("0123456789abc", 10), "0123456789...");
    }

    #[test]
    fn table_aligns_columns() {
        let rendered = render_table(
            &["Name", "Deleted"],
            &[
                vec!["jobs".to_string(), "3".to_string()],
                vec!["background".to_string(), "0".to_string()],
            ],
        );
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Name        Deleted");
        assert_eq!(lines[1], "----------  -------");
        assert_eq!(lines[2], "jobs        3");
        assert_eq!(lines[3], "background  0");
    }
}

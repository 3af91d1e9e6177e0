//! Small HTML building blocks shared by pages.

use std::fmt::Write;

/// Escape text for element content and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Rounded panel with a heading.
pub fn card(title: &str, body: &str) -> String {
    format!(
        r#"<section class="rounded-xl border border-panelBorder bg-panel shadow-sm">
    <header class="flex flex-col space-y-1.5 p-6"><h2 class="text-lg font-semibold">{}</h2></header>
    <div class="p-6 pt-0">{body}</div>
</section>"#,
        escape(title)
    )
}

/// One row of a [`record_table`].
#[derive(Debug, Clone, Default)]
pub struct Row {
    /// Link target for the first cell.
    pub href: Option<String>,
    pub cells: Vec<String>,
    /// Trusted markup for a trailing actions cell. Not escaped.
    pub action: Option<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }
}

/// Data table; every cell is escaped.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let rows: Vec<Row> = rows.iter().map(|cells| Row::new(cells.clone())).collect();
    record_table(headers, &rows)
}

/// Like [`table`], with optional detail links and row actions. An "Actions"
/// column is added when any row has an action.
pub fn record_table(headers: &[&str], rows: &[Row]) -> String {
    let with_actions = rows.iter().any(|row| row.action.is_some());
    let columns = headers.len() + usize::from(with_actions);

    let mut out = String::from(r#"<table class="w-full text-sm"><thead><tr>"#);
    for header in headers {
        let _ = write!(out, r#"<th class="text-left p-2">{}</th>"#, escape(header));
    }
    if with_actions {
        out.push_str(r#"<th class="text-left p-2"><span class="sr-only">Actions</span></th>"#);
    }
    out.push_str("</tr></thead><tbody>");
    if rows.is_empty() {
        let _ = write!(
            out,
            r#"<tr><td class="p-2 text-textMuted" colspan="{columns}">No records yet.</td></tr>"#
        );
    }
    for row in rows {
        out.push_str("<tr>");
        for (i, cell) in row.cells.iter().enumerate() {
            match &row.href {
                Some(href) if i == 0 => {
                    let _ = write!(
                        out,
                        r#"<td class="p-2"><a href="{}" class="text-primary">{}</a></td>"#,
                        escape(href),
                        escape(cell)
                    );
                }
                _ => {
                    let _ = write!(out, r#"<td class="p-2">{}</td>"#, escape(cell));
                }
            }
        }
        if with_actions {
            let _ = write!(
                out,
                r#"<td class="p-2">{}</td>"#,
                row.action.as_deref().unwrap_or_default()
            );
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

/// Inline toast notification.
pub fn toast(message: &str) -> String {
    format!(
        r#"<div class="toast rounded-xl bg-danger text-white px-4 py-3" role="alert">{}</div>"#,
        escape(message)
    )
}

/// Inline "not found" state used in place of a crash.
pub fn not_found(label: &str, id: &str, back_href: &str) -> String {
    card(
        &format!("{label} not found"),
        &format!(
            r#"<p class="text-textMuted">No {} with id <code>{}</code> exists.</p>
<a href="{}" class="text-primary">Back to list</a>"#,
            escape(&label.to_lowercase()),
            escape(id),
            escape(back_href)
        ),
    )
}

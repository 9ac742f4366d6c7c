/// Generate a Markdown table from headers and rows.
///
/// Pipes and line breaks in cell content are escaped so they cannot break the
/// table structure.
pub fn markdown_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);

    let header_cells: Vec<String> = headers.iter().map(|h| escape_cell(h)).collect();
    lines.push(format!("| {} |", header_cells.join(" | ")));

    let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
    lines.push(format!("| {} |", separators.join(" | ")));

    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}

/// Markdown link, or plain `N/A` when there is no target.
pub fn link(text: &str, target: &str) -> String {
    let target = target.trim();
    if target.is_empty() || target == "N/A" {
        "N/A".to_string()
    } else {
        format!("[{text}]({})", target.replace(' ', "%20"))
    }
}

pub fn bold(text: &str) -> String {
    format!("**{text}**")
}

/// Collapse line breaks and whitespace runs to single spaces so a value stays
/// on the line it is substituted into.
pub fn inline(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_header_separator_and_rows() {
        let headers = vec!["Event".to_string(), "Date".to_string()];
        let rows = vec![vec!["Intake".to_string(), "2025-09-01".to_string()]];
        let table = markdown_table(&headers, &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines, vec!["| Event | Date |", "| --- | --- |", "| Intake | 2025-09-01 |"]);
    }

    #[test]
    fn inline_keeps_text_on_one_line() {
        assert_eq!(inline("Google\n\n# Injected  text"), "Google # Injected text");
        assert_eq!(inline("plain"), "plain");
    }

    #[test]
    fn table_escapes_pipes_and_newlines() {
        let headers = vec!["Notes".to_string()];
        let rows = vec![vec!["a|b\nc".to_string()]];
        assert!(markdown_table(&headers, &rows).ends_with("| a\\|b c |"));
    }

    #[test]
    fn empty_headers_give_empty_table() {
        assert_eq!(markdown_table(&[], &[]), "");
    }

    #[test]
    fn link_without_target_is_na() {
        assert_eq!(link("Apply Here", ""), "N/A");
        assert_eq!(link("Apply Here", "https://a.edu/apply"), "[Apply Here](https://a.edu/apply)");
    }
}

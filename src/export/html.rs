use pulldown_cmark::{Event, Options, Parser, html};

use crate::chart::RenderedChart;

/// Wrap body HTML in a complete, styled page.
pub fn generate_html(title: &str, body_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 2rem; line-height: 1.6; color: #333; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}
        th {{ background-color: #f4f4f4; font-weight: 600; }}
        tr:nth-child(even) {{ background-color: #fafafa; }}
        figure {{ margin: 1rem 0; }}
        figure svg {{ width: 100%; height: auto; }}
    </style>
</head>
<body>
{body_html}
</body>
</html>"#,
        title = escape_html(title),
        body_html = body_html,
    )
}

/// Convert report Markdown into an HTML page titled after its first line.
/// Headings, paragraphs and pipe tables map to their HTML elements; raw HTML
/// in the source is shown as text. Charts are appended as inline SVG.
pub fn report_to_html(markdown: &str, charts: &[RenderedChart]) -> String {
    let title = markdown
        .lines()
        .next()
        .map(|l| l.trim_start_matches('#').trim())
        .unwrap_or_default();

    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut body = String::new();
    html::push_html(&mut body, parser);

    if !charts.is_empty() {
        body.push_str("<h2>Graphs and Visualizations</h2>\n");
        for chart in charts {
            body.push_str(&format!(
                "<figure>\n{}\n<figcaption>{}</figcaption>\n</figure>\n",
                chart.svg,
                escape_html(&chart.title)
            ));
        }
    }

    generate_html(title, &body)
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "# MS CS in Canada\n\n## Overview\n\nThe course is **great**.\n\n\
                          | Event | Date |\n| --- | --- |\n| Intake | 2025-09-01 |\n";

    #[test]
    fn report_maps_headings_paragraphs_and_tables() {
        let html = report_to_html(REPORT, &[]);
        assert!(html.contains("<title>MS CS in Canada</title>"));
        assert!(html.contains("<h1>MS CS in Canada</h1>"));
        assert!(html.contains("<h2>Overview</h2>"));
        assert!(html.contains("<p>The course is <strong>great</strong>.</p>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<th>Event</th>"));
        assert!(html.contains("<td>Intake</td>"));
        assert!(!html.contains("Graphs and Visualizations"));
    }

    #[test]
    fn raw_html_in_data_is_escaped() {
        let html = report_to_html("# T\n\nBy <script>alert(1)</script>\n", &[]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn charts_are_inlined() {
        let chart = RenderedChart {
            title: "Tuition Fees by University".into(),
            svg: "<svg></svg>".into(),
            png: Vec::new(),
            width: 10,
            height: 10,
        };
        let html = report_to_html(REPORT, &[chart]);
        assert!(html.contains("<h2>Graphs and Visualizations</h2>"));
        assert!(html.contains("<svg></svg>"));
        assert!(html.contains("<figcaption>Tuition Fees by University</figcaption>"));
    }

    #[test]
    fn page_title_is_escaped() {
        let html = generate_html("<script>alert('xss')</script>", "body");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}

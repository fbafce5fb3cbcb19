use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::history::Report;

const HEADER: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Test report</title>
  <style type="text/css">
    .green {
        color: green;
    }
    .red {
        color: red;
    }
  </style>
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <link rel="stylesheet" href="https://netdna.bootstrapcdn.com/bootstrap/3.0.3/css/bootstrap.min.css">
  <link rel="stylesheet" href="https://netdna.bootstrapcdn.com/bootstrap/3.0.3/css/bootstrap-theme.min.css">
  <script src="https://netdna.bootstrapcdn.com/bootstrap/3.0.3/js/bootstrap.min.js"></script>
</head>
<body>
"#;

const FOOTER: &str = "</body>\n</html>\n";

const PASS_GLYPH: &str = r#"<span class="glyphicon glyphicon-star green" title="passed"></span>"#;
const FAIL_GLYPH: &str = r#"<span class="glyphicon glyphicon-fire red" title="failed"></span>"#;

/// Escape text for use in HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Standalone HTML page with one table per job
pub fn render(report: &Report) -> String {
    render_at(report, Utc::now())
}

/// Like [`render`], stamped with the given generation time
pub fn render_at(report: &Report, generated: DateTime<Utc>) -> String {
    let mut out = String::from(HEADER);
    let _ = writeln!(
        out,
        "<p class=\"text-muted\">Generated {}</p>",
        generated.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for (job, tests) in report.iter() {
        let _ = writeln!(out, "<h2>{}</h2>", escape(job));
        out.push_str("<table class=\"table\">\n<tr><td>Test</td><td>Results</td></tr>\n");
        for (identity, history) in tests.iter() {
            let glyphs: Vec<&str> = history
                .iter()
                .map(|passed| if passed { PASS_GLYPH } else { FAIL_GLYPH })
                .collect();
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(&identity.to_string()),
                glyphs.join(" ")
            );
        }
        out.push_str("</table>\n");
    }

    out.push_str(FOOTER);
    out
}

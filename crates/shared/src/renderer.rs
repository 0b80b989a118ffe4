use chrono::{DateTime, Local};

/// Line-oriented Markdown to HTML, just enough for an email body: heading
/// and bullet prefixes only, no inline emphasis, links or nesting. Runs of
/// bullet lines are wrapped in a single `<ul>`, tracked with an explicit
/// in-list flag that closes on the first non-bullet line and at end of input.
pub fn markdown_to_basic_html(markdown: &str) -> String {
    let mut converted: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in markdown.lines() {
        let stripped = line.trim_start();

        if let Some(item) = stripped.strip_prefix("- ") {
            if !in_list {
                converted.push("<ul>".to_string());
                in_list = true;
            }
            converted.push(format!("<li>{}</li>", item.trim()));
            continue;
        }

        if in_list {
            converted.push("</ul>".to_string());
            in_list = false;
        }

        if let Some(heading) = stripped.strip_prefix("### ") {
            converted.push(format!("<h3>{}</h3>", heading.trim()));
        } else if let Some(heading) = stripped.strip_prefix("## ") {
            converted.push(format!("<h2>{}</h2>", heading.trim()));
        } else if let Some(heading) = stripped.strip_prefix("# ") {
            converted.push(format!("<h1>{}</h1>", heading.trim()));
        } else {
            converted.push(format!("<p>{}</p>", line));
        }
    }

    if in_list {
        converted.push("</ul>".to_string());
    }

    format!(
        "<!DOCTYPE html><html><body>{}</body></html>",
        converted.join("\n")
    )
}

/// Fixed prefix plus the current local date.
pub fn subject_line(date: DateTime<Local>) -> String {
    format!("U.S. Treasury News Brief – {}", date.format("%Y-%m-%d"))
}

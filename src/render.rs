//! HTML rendering of page views, including the stored-newline round trip.
//!
//! Submitted text has `\r\n` rewritten to a literal backslash-n marker before
//! storage; at render time the marker becomes a `<br />` tag. A quote that
//! already contains the literal marker is indistinguishable from an encoded
//! newline and renders with a break as well.

use crate::page::PageView;

/// Two-character marker stored in place of a submitted newline.
pub const NEWLINE_MARKER: &str = "\\n";

/// Rewrite submitted newlines to the stored marker form.
pub fn encode_newlines(raw: &str) -> String {
    raw.replace("\r\n", NEWLINE_MARKER)
}

/// Rewrite stored markers to line-break markup.
pub fn render_breaks(stored: &str) -> String {
    stored.replace(NEWLINE_MARKER, "<br />")
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render the home/listing page.
pub fn home_page(view: &PageView) -> String {
    let mut body = String::new();

    for q in &view.quotes {
        let text = render_breaks(&escape_html(&q.quote));
        body.push_str(&format!(
            r#"    <div class="quote">
      <div class="quote-text">{text}</div>
      <div class="quote-meta">
        <a href="/viewquote.php?id={id}">#{id}</a>
        | rating {rating}
        | {submitted}
      </div>
    </div>
"#,
            id = q.id,
            rating = q.rating,
            submitted = q.submitted.format("%Y-%m-%d %H:%M"),
        ));
    }

    if view.quotes.is_empty() {
        body.push_str("    <p class=\"empty\">No quotes found.</p>\n");
    }

    let mut nav = String::new();
    if let Some(link) = view.prev_link.as_deref() {
        nav.push_str(&format!(
            "      <a class=\"nav-prev\" href=\"{}\">&laquo; Previous</a>\n",
            escape_html(link)
        ));
    }
    if view.page > 0 && view.pages > 0 {
        nav.push_str(&format!(
            "      <span class=\"nav-page\">Page {} of {}</span>\n",
            view.page, view.pages
        ));
    }
    if let Some(link) = view.next_link.as_deref() {
        nav.push_str(&format!(
            "      <a class=\"nav-next\" href=\"{}\">Next &raquo;</a>\n",
            escape_html(link)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Quote Board</title>
  <link rel="stylesheet" href="/static/style.css" />
</head>
<body>
  <h1><a href="/">Quote Board</a></h1>
  <div class="quotes">
{body}  </div>
  <div class="nav">
{nav}  </div>
  <div class="footer">
    {db_size} quotes | {queue_size} awaiting moderation | <a href="/add">Submit a quote</a>
  </div>
</body>
</html>
"#,
        db_size = view.db_size,
        queue_size = view.moderation_queue_size,
    )
}

/// Render the blank submission form.
pub fn add_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head>
  <title>Quote Board - Submit</title>
  <link rel="stylesheet" href="/static/style.css" />
</head>
<body>
  <h1><a href="/">Quote Board</a></h1>
  <form method="post" action="/add">
    <textarea name="Quote" rows="8" cols="60"></textarea>
    <br />
    <input type="submit" value="Submit for moderation" />
  </form>
</body>
</html>
"#
    .to_string()
}

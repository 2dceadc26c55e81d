//! HTML pages for directory listings, file contents and errors.
//!
//! Pure functions of their inputs. Every name, path and file body is
//! escaped before it reaches the markup.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::error::DispatchError;
use crate::view::{DirectoryEntry, ViewModel};

const STYLESHEET: &str = include_str!("../assets/browser.css");
const SCRIPT: &str = include_str!("../assets/browser.js");

/// Page-level settings shared by every rendered document.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub title: String,
    /// URL prefix the browse routes are mounted under, e.g. `/browse`.
    pub browse_prefix: String,
}

/// Render a listing or file view as a complete HTML document.
pub fn render_page(page: &PageContext, view: &ViewModel) -> String {
    let mut html = String::with_capacity(8192);
    let current_path = view.current_path();

    render_head(&mut html, &page.title);
    html.push_str("<main>\n<header>\n<div class=\"crumbs\">\n");
    let _ = writeln!(html, "<h1>{}</h1>", encode_text(&page.title));
    let _ = writeln!(
        html,
        "<div class=\"path\">{}</div>",
        encode_text(current_path)
    );
    if let Some(parent) = parent_path(current_path) {
        let _ = writeln!(
            html,
            "<a class=\"button\" href=\"{}\">&lt;&lt; Back</a>",
            encode_double_quoted_attribute(&browse_href(&page.browse_prefix, parent)),
        );
    }
    html.push_str("</div>\n<div class=\"tools\">\n");
    if view.is_file() {
        html.push_str(
            "<button class=\"button\" type=\"button\" onclick=\"changeFontSize(-1)\">A-</button>\n",
        );
        html.push_str(
            "<button class=\"button\" type=\"button\" onclick=\"changeFontSize(1)\">A+</button>\n",
        );
    }
    html.push_str(
        "<button id=\"theme-toggle\" class=\"button\" type=\"button\" onclick=\"toggleTheme()\">🌙</button>\n",
    );
    html.push_str("</div>\n</header>\n<div class=\"body\">\n");

    match view {
        ViewModel::Directory { entries, .. } => {
            render_listing(&mut html, &page.browse_prefix, entries);
        }
        ViewModel::File {
            file_name, content, ..
        } => {
            let _ = writeln!(html, "<h3>{}</h3>", encode_text(file_name));
            let _ = writeln!(html, "<pre>{}</pre>", encode_text(content));
        }
    }

    html.push_str("</div>\n</main>\n");
    render_tail(&mut html);
    html
}

/// Render the page shown for a failed request. Carries only the error's
/// public message.
pub fn render_error(page: &PageContext, error: &DispatchError) -> String {
    let mut html = String::with_capacity(4096);

    render_head(&mut html, &page.title);
    html.push_str("<main>\n<header>\n<div class=\"crumbs\">\n");
    let _ = writeln!(html, "<h1>{}</h1>", encode_text(&page.title));
    let _ = writeln!(
        html,
        "<a class=\"button\" href=\"{}\">Home</a>",
        encode_double_quoted_attribute(&browse_href(&page.browse_prefix, "/")),
    );
    html.push_str("</div>\n</header>\n<div class=\"body\">\n");
    let _ = writeln!(
        html,
        "<p class=\"error\">{} {}</p>",
        error.status().as_u16(),
        encode_text(error.public_message())
    );
    html.push_str("</div>\n</main>\n");
    render_tail(&mut html);
    html
}

fn render_head(html: &mut String, title: &str) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", encode_text(title));
    let _ = writeln!(html, "<style>\n{STYLESHEET}</style>");
    html.push_str("</head>\n<body>\n");
}

fn render_tail(html: &mut String) {
    let _ = writeln!(html, "<script>\n{SCRIPT}</script>");
    html.push_str("</body>\n</html>\n");
}

fn render_listing(html: &mut String, browse_prefix: &str, entries: &[DirectoryEntry]) {
    if entries.is_empty() {
        html.push_str("<p class=\"empty\">This directory is empty.</p>\n");
        return;
    }

    html.push_str("<ul class=\"listing\">\n");
    for entry in entries {
        let icon = if entry.is_dir { "📁" } else { "📄" };
        let _ = write!(
            html,
            "<li><a class=\"entry\" href=\"{}\"><span class=\"entry-icon\">{}</span><span class=\"entry-name\">{}</span>",
            encode_double_quoted_attribute(&browse_href(browse_prefix, &entry.path)),
            icon,
            encode_text(&entry.name),
        );
        if !entry.is_dir {
            let _ = write!(
                html,
                "<span class=\"entry-size\">{} bytes</span>",
                entry.size
            );
        }
        html.push_str("</a></li>\n");
    }
    html.push_str("</ul>\n");
}

/// URL for a request path under the browse prefix, percent-encoding each
/// segment. The root maps to the bare prefix.
pub fn browse_href(browse_prefix: &str, request_path: &str) -> String {
    let mut href = browse_prefix.trim_end_matches('/').to_string();
    for segment in request_path.split('/').filter(|s| !s.is_empty()) {
        href.push('/');
        href.push_str(&urlencoding::encode(segment));
    }
    if href.is_empty() {
        href.push('/');
    }
    href
}

/// Request path of the parent directory, or `None` at the root.
fn parent_path(request_path: &str) -> Option<&str> {
    let trimmed = request_path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(0) | None => Some("/"),
        Some(index) => Some(&trimmed[..index]),
    }
}

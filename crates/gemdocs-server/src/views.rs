//! HTML views for index, listing and error pages.
//!
//! Package documentation itself comes from the library index; these views
//! only wrap the listings around it.

use std::fmt::Write;

use gemdocs_library::{Page, PackageRef};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in URL path segments and query values.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Site-wide values shown on every page.
#[derive(Clone, Debug)]
pub(crate) struct SiteInfo {
    /// Site name.
    pub(crate) name: String,
    /// Public base URL.
    pub(crate) url: String,
}

/// What a listing page is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ListingKind<'a> {
    /// Every package.
    All,
    /// Packages starting with a letter.
    Letter(char),
    /// Packages matching a search query.
    Search(&'a str),
}

impl ListingKind<'_> {
    /// Link to page `n` of this listing.
    fn page_href(self, n: usize) -> String {
        match self {
            Self::All => format!("/gems/{n}"),
            Self::Letter(letter) => format!("/gems/~{letter}/{n}"),
            Self::Search(query) => format!(
                "/find/gems?q={}&page={n}",
                utf8_percent_encode(query, COMPONENT)
            ),
        }
    }

    /// Heading shown above the listing.
    fn heading(self) -> String {
        match self {
            Self::All => "All Gems".to_owned(),
            Self::Letter(letter) => format!("Gems: {}", letter.to_ascii_uppercase()),
            Self::Search(query) => format!("Search results for \"{query}\""),
        }
    }
}

/// Escape text for inclusion in HTML content and attribute values.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Link to a package's documentation.
fn package_href(package: &PackageRef) -> String {
    format!("/gems/{}/", utf8_percent_encode(&package.name, COMPONENT))
}

fn layout(site: &SiteInfo, title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - {name}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/css/style.css\">\n\
         </head>\n<body>\n\
         <header><a href=\"{url}\">{name}</a>\n\
         <form action=\"/find/gems\" method=\"get\"><input type=\"search\" name=\"q\"></form>\n\
         </header>\n<main>\n{body}</main>\n</body>\n</html>\n",
        title = escape_html(title),
        name = escape_html(&site.name),
        url = escape_html(&site.url),
    )
}

/// Layout for error pages, which have no site context.
fn error_layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape_html(title),
    )
}

fn package_list(packages: &[PackageRef]) -> String {
    let mut out = String::from("<ul class=\"libraries\">\n");
    for package in packages {
        let _ = write!(
            out,
            "<li><a href=\"{}\">{}</a>",
            escape_html(&package_href(package)),
            escape_html(&package.name)
        );
        if let Some(version) = &package.version {
            let _ = write!(out, " <small>({})</small>", escape_html(version));
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
    out
}

fn letter_nav(current: Option<char>) -> String {
    let mut out = String::from("<nav class=\"letters\">");
    for letter in 'a'..='z' {
        if Some(letter) == current {
            let _ = write!(out, "<strong>{}</strong>", letter.to_ascii_uppercase());
        } else {
            let _ = write!(
                out,
                "<a href=\"/gems/~{letter}\">{}</a>",
                letter.to_ascii_uppercase()
            );
        }
    }
    out.push_str("</nav>\n");
    out
}

fn pagination(kind: ListingKind<'_>, page: &Page) -> String {
    let mut out = String::from("<nav class=\"pages\">");
    if page.has_previous() {
        let previous = page.page_number.min(page.total_pages + 1) - 1;
        let _ = write!(
            out,
            "<a rel=\"prev\" href=\"{}\">Previous</a> ",
            escape_html(&kind.page_href(previous))
        );
    }
    let _ = write!(out, "Page {} of {}", page.page_number, page.total_pages);
    if page.has_next() {
        let _ = write!(
            out,
            " <a rel=\"next\" href=\"{}\">Next</a>",
            escape_html(&kind.page_href(page.page_number + 1))
        );
    }
    out.push_str("</nav>\n");
    out
}

/// Home page with featured packages.
pub(crate) fn home(site: &SiteInfo, featured: &[PackageRef]) -> String {
    let mut body = String::from("<h2>Featured Gems</h2>\n");
    if featured.is_empty() {
        body.push_str("<p>No gems available.</p>\n");
    } else {
        body.push_str(&package_list(featured));
    }
    body.push_str(&letter_nav(None));
    layout(site, "Documenting RubyGems", &body)
}

/// Listing or search results page.
pub(crate) fn gems_index(site: &SiteInfo, kind: ListingKind<'_>, page: &Page) -> String {
    let heading = kind.heading();
    let mut body = format!("<h2>{}</h2>\n", escape_html(&heading));
    let current = match kind {
        ListingKind::Letter(letter) => Some(letter),
        _ => None,
    };
    body.push_str(&letter_nav(current));

    if page.items.is_empty() {
        body.push_str("<p class=\"empty\">No further gems.</p>\n");
    } else {
        body.push_str(&package_list(&page.items));
    }
    body.push_str(&pagination(kind, page));

    layout(site, &heading, &body)
}

/// Dedicated page for a package missing from the library index.
pub(crate) fn gems_404(name: &str) -> String {
    error_layout(
        "Gem Not Found",
        &format!(
            "<p>No documentation is available for <code>{}</code>.</p>\n\
             <p><a href=\"/gems\">Browse all gems</a></p>\n",
            escape_html(name)
        ),
    )
}

/// Generic not-found page.
pub(crate) fn not_found() -> String {
    error_layout(
        "Not Found",
        "<p>The page you requested does not exist.</p>\n",
    )
}

/// Generic error page; never includes internal detail.
pub(crate) fn error_page() -> String {
    error_layout(
        "Unknown Error!",
        "<p>Something quite unexpected just happened. Please try again later.</p>\n",
    )
}

//! HTTP request handlers.

pub(crate) mod gems;
pub(crate) mod home;
pub(crate) mod search;

/// Parse a page number, defaulting to the first page.
///
/// Garbage parses as page 1; numbers too large for `usize` saturate, which
/// yields an empty page past the end rather than an error.
pub(crate) fn parse_page(raw: Option<&str>) -> usize {
    match raw.map(str::trim) {
        None | Some("") => 1,
        Some(s) if s.bytes().all(|b| b.is_ascii_digit()) => s.parse().unwrap_or(usize::MAX),
        Some(_) => 1,
    }
}

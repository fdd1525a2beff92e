//! Small helpers over `scraper` shared by the page parsers

use reqwest::Url;
use scraper::{ElementRef, Selector};

use crate::{ForecastError, Result};

/// Collapse whitespace runs to a single space and trim both ends
#[must_use]
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleaned text content of an element and its descendants
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ForecastError::parse(format!("Invalid selector '{css}': {e}")))
}

/// Resolve a possibly relative link against `base`
pub fn resolve(base: &Url, href: &str) -> Result<Url> {
    base.join(href)
        .map_err(|e| ForecastError::parse(format!("Invalid link '{href}': {e}")))
}

/// Last non-empty path segment of a URL
#[must_use]
pub fn last_path_segment(url: &Url) -> Option<&str> {
    url.path_segments()?.filter(|segment| !segment.is_empty()).next_back()
}

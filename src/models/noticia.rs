//! News item model
//!
//! This module provides:
//! - `NewsItem` entity representing a published news article
//! - `Category` enum for the fixed category set and the `CategoryFilter`
//!   sentinel used by listing queries
//! - `NewsDraft` input type for the admin form
//! - `Paginated` envelope for list queries

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default listing page size
pub const DEFAULT_PAGE_SIZE: u32 = 4;

/// News item entity
///
/// Immutable once fetched; built by the news repository from API records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Unique identifier (API-issued, except the reserved promotional id)
    pub id: i64,
    /// Headline
    pub title: String,
    /// Short description shown in listings
    pub description: String,
    /// Full article body
    pub body: String,
    /// Category name (expected to be one of the fixed set)
    pub category: String,
    /// Image URL or path
    pub image: String,
    /// Publish timestamp
    pub published_at: DateTime<Utc>,
    /// Author display name
    pub author: String,
}

/// Input for creating or updating a news item from the admin form.
///
/// `published_at` and `author` are stamped client-side for display; only the
/// five editable fields ever go on the wire.
#[derive(Debug, Clone)]
pub struct NewsDraft {
    /// Headline
    pub title: String,
    /// Short description
    pub description: String,
    /// Full body
    pub body: String,
    /// Category name
    pub category: String,
    /// Image URL or path
    pub image: String,
    /// Client-stamped publish timestamp
    pub published_at: DateTime<Utc>,
    /// Current session user's display name
    pub author: String,
}

/// Fixed news category set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// Local news
    #[serde(rename = "Noticias Locales")]
    Local,
    /// Sports
    #[serde(rename = "Deportes")]
    Sports,
    /// Culture
    #[serde(rename = "Cultura")]
    Culture,
    /// Community
    #[serde(rename = "Comunidad")]
    Community,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Category; 4] = [
        Category::Local,
        Category::Sports,
        Category::Culture,
        Category::Community,
    ];

    /// The label the API and the UI use for this category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Local => "Noticias Locales",
            Category::Sports => "Deportes",
            Category::Culture => "Cultura",
            Category::Community => "Comunidad",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Invalid category: {}", s))
    }
}

/// Category filter for listing queries: the "Todos" sentinel or a single
/// named category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No category restriction ("Todos")
    All,
    /// Restrict to one category
    Only(Category),
}

impl CategoryFilter {
    /// The filter list the UI populates its category bar from
    pub const ALL_FILTERS: [CategoryFilter; 5] = [
        CategoryFilter::All,
        CategoryFilter::Only(Category::Local),
        CategoryFilter::Only(Category::Sports),
        CategoryFilter::Only(Category::Culture),
        CategoryFilter::Only(Category::Community),
    ];

    /// Display label
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryFilter::All => "Todos",
            CategoryFilter::Only(category) => category.as_str(),
        }
    }

    /// The `categoria` query value, omitted for the "Todos" sentinel
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(category) => Some(category.as_str()),
        }
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        CategoryFilter::All
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CategoryFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("Todos") {
            return Ok(CategoryFilter::All);
        }
        Category::from_str(s).map(CategoryFilter::Only)
    }
}

/// Display color for a category name, with a fallback for unknown values
pub fn category_color(category: &str) -> &'static str {
    match category {
        "Noticias Locales" => "#2563eb",
        "Deportes" => "#dc2626",
        "Cultura" => "#7c3aed",
        "Comunidad" => "#059669",
        _ => "#666",
    }
}

/// Paginated result container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total_items: i64,
    /// Total number of pages
    pub total_pages: u32,
    /// Current page number (1-indexed)
    pub current_page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> Paginated<T> {
    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            total_pages: 1,
            current_page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated news listing
pub type PagedNews = Paginated<NewsItem>;

/// Parse the API's `fecha` string into a UTC timestamp.
///
/// The backend emits ISO timestamps, with or without an offset. Unparseable
/// values fall back to the current time.
pub(crate) fn parse_fecha(raw: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Utc.from_utc_datetime(&naive);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Utc.from_utc_datetime(&naive);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Utc.from_utc_datetime(&naive);
        }
    }
    tracing::debug!(fecha = raw, "unparseable publish date, defaulting to now");
    Utc::now()
}

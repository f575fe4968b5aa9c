//! Query option structs for the listing operations.
//!
//! Every recognised option is an explicit field with an explicit default;
//! there are no open-ended option bags.

use chrono::NaiveDate;

/// Options for the public event listing.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Only events dated today or later.
    pub upcoming_only: bool,
    /// Only events flagged as featured.
    pub featured_only: bool,
    /// Substring match on the category, case-insensitive.
    pub category: Option<String>,
    pub limit: Option<u32>,
}

/// Options for event search.
#[derive(Debug, Clone, Default)]
pub struct EventSearch {
    pub upcoming_only: bool,
    /// Defaults to 20 when unset.
    pub limit: Option<u32>,
}

/// Options for the announcement listing.
#[derive(Debug, Clone)]
pub struct AnnouncementQuery {
    /// Drafts are hidden unless this is switched off.
    pub published_only: bool,
    pub limit: Option<u32>,
}

impl Default for AnnouncementQuery {
    fn default() -> Self {
        Self {
            published_only: true,
            limit: None,
        }
    }
}

/// The fully-resolved filter handed to an events repository. Services
/// translate the public query options (plus "today") into this.
#[derive(Debug, Clone, Default)]
pub struct EventListFilter {
    pub on_or_after: Option<NaiveDate>,
    pub on_or_before: Option<NaiveDate>,
    pub before: Option<NaiveDate>,
    pub featured: Option<bool>,
    pub category_contains: Option<String>,
    /// Case-insensitive substring matched against title, description and
    /// location (any of the three).
    pub search: Option<String>,
    /// Date-descending instead of the default ascending.
    pub newest_first: bool,
    pub limit: Option<u32>,
}

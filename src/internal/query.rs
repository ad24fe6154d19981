use strum_macros::Display;

use super::prefs::Preferences;

/// Page sizes the API accepts; anything else falls back through the chain.
pub const PAGE_SIZE_OPTIONS: [u32; 3] = [10, 20, 50];
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Sort orders recognized by the ideas API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Default)]
pub enum SortOrder {
    #[default]
    #[strum(serialize = "Newest")]
    NewestFirst,
    #[strum(serialize = "Oldest")]
    OldestFirst,
}

impl SortOrder {
    /// The wire form used both in our own query string and upstream's `sort` parameter.
    pub fn as_query_str(&self) -> &'static str {
        match self {
            Self::NewestFirst => "-published_at",
            Self::OldestFirst => "published_at",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "-published_at" => Some(Self::NewestFirst),
            "published_at" => Some(Self::OldestFirst),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::NewestFirst => Self::OldestFirst,
            Self::OldestFirst => Self::NewestFirst,
        }
    }
}

/// The (page, pageSize, sort) triple that fully determines what is fetched
/// and displayed. The location's query string and the persisted preferences
/// are projections of (or initializers for) this value, never the other way
/// around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortOrder::default(),
        }
    }
}

impl ListQuery {
    /// Serialize into the query string owned by the front end
    /// (`page`, `pageSize`, `sort`), without a leading `?`.
    pub fn to_search(&self) -> String {
        format!(
            "page={}&pageSize={}&sort={}",
            self.page,
            self.page_size,
            self.sort.as_query_str()
        )
    }

    /// Derive a query from a location search string plus stored preferences.
    ///
    /// Fallback chain per parameter: URL value if present and recognized,
    /// else the stored preference if recognized, else the hard default.
    /// `page` ignores preferences entirely: absent or non-numeric means 1,
    /// and anything below 1 is clamped up to 1.
    pub fn from_search(search: &str, prefs: &Preferences) -> Self {
        let pairs = parse_pairs(search);
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k.as_str() == key)
                .map(|(_, v)| v.as_str())
        };

        let page = get("page")
            .and_then(|v| v.parse::<i64>().ok())
            .map(|p| p.clamp(1, u32::MAX as i64) as u32)
            .unwrap_or(1);

        let page_size = get("pageSize")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|s| PAGE_SIZE_OPTIONS.contains(s))
            .or_else(|| {
                prefs
                    .page_size
                    .filter(|s| PAGE_SIZE_OPTIONS.contains(s))
            })
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let sort = get("sort")
            .and_then(SortOrder::parse)
            .or_else(|| prefs.sort.as_deref().and_then(SortOrder::parse))
            .unwrap_or_default();

        Self {
            page,
            page_size,
            sort,
        }
    }
}

fn parse_pairs(search: &str) -> Vec<(String, String)> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (part.to_string(), String::new()),
        })
        .collect()
}

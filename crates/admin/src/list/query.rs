//! List query state and fetch strategy selection.

use serde::Serialize;

/// Current query of one list view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    /// 0-based page index.
    pub page_index: u32,
    pub sort_key: Option<String>,
    /// Raw filter expression (query-string fragment).
    pub filter: Option<String>,
    pub search: Option<String>,
}

/// Which list endpoint variant a request uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStrategy {
    /// `sortBy=<key>`, optionally narrowed by name.
    Sorted {
        sort_key: String,
        search: Option<String>,
    },
    /// Filter expression, with any search appended as `&name=`.
    Filtered { expression: String },
    /// Plain pagination.
    Plain,
}

/// One fully-resolved list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub page_index: u32,
    pub page_size: u32,
    pub strategy: ListStrategy,
}

/// `&name=<search>` with the search text URL-encoded.
#[must_use]
pub fn search_fragment(search: &str) -> String {
    format!("&name={}", urlencoding::encode(search))
}

/// Treat blank strings as unset.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ListQuery {
    /// Query for the given filter with everything else at defaults.
    #[must_use]
    pub fn filtered(filter: Option<String>) -> Self {
        Self {
            filter: non_blank(filter),
            ..Self::default()
        }
    }

    /// Pick the endpoint variant.
    ///
    /// A sort key takes precedence over a filter: when both are set the
    /// filter is not sent.
    #[must_use]
    pub fn strategy(&self) -> ListStrategy {
        let search = self.search.clone();
        if let Some(sort_key) = &self.sort_key {
            return ListStrategy::Sorted {
                sort_key: sort_key.clone(),
                search,
            };
        }
        match (&self.filter, search) {
            (Some(filter), search) => ListStrategy::Filtered {
                expression: format!(
                    "{filter}{}",
                    search.as_deref().map(search_fragment).unwrap_or_default()
                ),
            },
            (None, Some(search)) => ListStrategy::Filtered {
                expression: search_fragment(&search),
            },
            (None, None) => ListStrategy::Plain,
        }
    }

    /// Resolve the query into a request.
    #[must_use]
    pub fn request(&self, page_size: u32) -> ListRequest {
        ListRequest {
            page_index: self.page_index,
            page_size,
            strategy: self.strategy(),
        }
    }

    /// Select a page from the 1-based number shown in pagination controls.
    pub const fn select_page(&mut self, displayed: u32) {
        self.page_index = displayed.saturating_sub(1);
    }

    pub fn set_sort(&mut self, sort_key: Option<String>) {
        self.sort_key = non_blank(sort_key);
    }

    pub fn set_filter(&mut self, filter: Option<String>) {
        self.filter = non_blank(filter);
    }

    /// Change the search text. Any change of search goes back to the first page.
    pub fn set_search(&mut self, text: &str) {
        self.search = non_blank(Some(text.to_string()));
        self.page_index = 0;
    }

    /// Search text for form inputs.
    #[must_use]
    pub fn search_text(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }

    /// Sort key for form inputs.
    #[must_use]
    pub fn sort_text(&self) -> &str {
        self.sort_key.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(sort: Option<&str>, filter: Option<&str>, search: Option<&str>) -> ListQuery {
        ListQuery {
            page_index: 0,
            sort_key: sort.map(str::to_string),
            filter: filter.map(str::to_string),
            search: search.map(str::to_string),
        }
    }

    #[test]
    fn test_plain_when_nothing_is_set() {
        assert_eq!(query(None, None, None).strategy(), ListStrategy::Plain);
    }

    #[test]
    fn test_sort_wins_over_filter() {
        let strategy = query(Some("name"), Some("&inVacations=true"), Some("bio")).strategy();
        assert_eq!(
            strategy,
            ListStrategy::Sorted {
                sort_key: "name".to_string(),
                search: Some("bio".to_string()),
            }
        );
    }

    #[test]
    fn test_search_is_appended_to_filter() {
        let strategy = query(None, Some("&inVacations=true"), Some("bio")).strategy();
        assert_eq!(
            strategy,
            ListStrategy::Filtered {
                expression: "&inVacations=true&name=bio".to_string()
            }
        );
    }

    #[test]
    fn test_search_only_becomes_name_filter() {
        let strategy = query(None, None, Some("café crème")).strategy();
        assert_eq!(
            strategy,
            ListStrategy::Filtered {
                expression: "&name=caf%C3%A9%20cr%C3%A8me".to_string()
            }
        );
    }

    #[test]
    fn test_displayed_page_maps_to_index() {
        let mut q = ListQuery::default();
        q.select_page(3);
        assert_eq!(q.request(9).page_index, 2);
        q.select_page(0);
        assert_eq!(q.page_index, 0);
    }

    #[test]
    fn test_search_change_resets_page_and_blank_clears() {
        let mut q = ListQuery::default();
        q.select_page(4);
        q.set_search("bio");
        assert_eq!(q.page_index, 0);
        assert_eq!(q.search.as_deref(), Some("bio"));

        q.set_search("   ");
        assert_eq!(q.search, None);
        assert_eq!(q.strategy(), ListStrategy::Plain);
    }
}

//! Pagination bar view model.

/// One numbered link in the pagination bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// 1-based page number.
    pub number: u32,
    pub current: bool,
}

/// Pagination bar for a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub links: Vec<PageLink>,
    pub current: u32,
    pub total_pages: u32,
    pub previous: Option<u32>,
    pub next: Option<u32>,
}

impl Pagination {
    /// Build the bar for `current` (1-based) out of `total_pages`.
    #[must_use]
    pub fn new(current: u32, total_pages: u32) -> Self {
        let links = (1..=total_pages)
            .map(|number| PageLink {
                number,
                current: number == current,
            })
            .collect();
        Self {
            links,
            current,
            total_pages,
            previous: (current > 1).then(|| current - 1),
            next: (current < total_pages).then(|| current + 1),
        }
    }

    /// Whether the bar has anything to show.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.total_pages > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_page_has_both_neighbours() {
        let bar = Pagination::new(2, 3);
        assert_eq!(bar.previous, Some(1));
        assert_eq!(bar.next, Some(3));
        assert_eq!(bar.links.iter().filter(|l| l.current).count(), 1);
        assert!(bar.is_visible());
    }

    #[test]
    fn test_single_page_is_hidden() {
        let bar = Pagination::new(1, 1);
        assert_eq!(bar.previous, None);
        assert_eq!(bar.next, None);
        assert!(!bar.is_visible());
    }

    #[test]
    fn test_empty_list_has_no_links() {
        let bar = Pagination::new(1, 0);
        assert!(bar.links.is_empty());
        assert_eq!(bar.next, None);
    }
}

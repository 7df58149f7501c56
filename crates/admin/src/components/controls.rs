//! List toolbar selectors.

use crate::live::ListKind;

/// One `<option>` of a select box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        Self {
            selected: value == current,
            label: label.into(),
            value,
        }
    }
}

/// Sort keys offered by each list. The empty value means unsorted.
const SHOP_SORTS: &[(&str, &str)] = &[
    ("", "Default order"),
    ("name", "Name"),
    ("createdAt", "Creation date"),
    ("nbProducts", "Number of products"),
];

const PRODUCT_SORTS: &[(&str, &str)] = &[("", "Default order"), ("name", "Name"), ("price", "Price")];

const CATEGORY_SORTS: &[(&str, &str)] = &[("", "Default order"), ("name", "Name")];

/// Sort selector options for a list, marking `current` as selected.
#[must_use]
pub fn sort_options(kind: ListKind, current: &str) -> Vec<SelectOption> {
    let sorts = match kind {
        ListKind::Shops => SHOP_SORTS,
        ListKind::Products => PRODUCT_SORTS,
        ListKind::Categories => CATEGORY_SORTS,
    };
    sorts
        .iter()
        .map(|(value, label)| SelectOption::new(*value, *label, current))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_sort_is_selected() {
        let options = sort_options(ListKind::Shops, "createdAt");
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.first().map(|o| o.label.as_str()), Some("Creation date"));
    }

    #[test]
    fn test_unsorted_selects_default_entry() {
        let options = sort_options(ListKind::Categories, "");
        assert!(options.first().is_some_and(|o| o.selected && o.value.is_empty()));
    }
}

use tracing::trace;

use crate::filter::{FilterSet, ParsePolicy};
use crate::pagination::PageSetting;
use crate::sort::SortDirective;
use crate::users::UserRecord;

/// Result of one derivation pass over the loaded rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivedView {
    /// Indices into the loaded rows for the current page, in display order.
    pub rows: Vec<usize>,
    pub filtered_count: usize,
    pub page_count: usize,
}

/// Filter, sort, then cut out the current page. Nothing is cached; every call
/// starts from the raw rows.
pub fn derive(
    rows: &[UserRecord],
    filters: &FilterSet,
    sort: &SortDirective,
    page: &PageSetting,
    policy: ParsePolicy,
) -> DerivedView {
    let mut filtered: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| filters.matches(r, policy))
        .map(|(idx, _)| idx)
        .collect();
    sort.sort(rows, &mut filtered);

    let filtered_count = filtered.len();
    let range = page.slice(filtered_count);
    trace!(
        "Derived view: {} of {} rows match, page {} shows {:?}",
        filtered_count,
        rows.len(),
        page.page_index,
        range
    );
    DerivedView {
        rows: filtered[range].to_vec(),
        filtered_count,
        page_count: page.page_count(filtered_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use crate::sort::SortDirection;
    use crate::users::ColumnId;

    fn twelve_users() -> Vec<UserRecord> {
        (1..=12)
            .map(|i| UserRecord::new(&format!("user{i:02}"), &format!("u{i}@x.com"), &i.to_string()))
            .collect()
    }

    fn names(rows: &[UserRecord], view: &DerivedView) -> Vec<String> {
        view.rows.iter().map(|&i| rows[i].username.clone()).collect()
    }

    #[test]
    fn pages_through_sorted_rows() {
        let rows = twelve_users();
        let page = PageSetting::default();
        let sort = SortDirective::default();
        let filters = FilterSet::default();

        let view = derive(&rows, &filters, &sort, &page, ParsePolicy::Permissive);
        assert_eq!(view.page_count, 3);
        assert_eq!(view.filtered_count, 12);
        assert_eq!(names(&rows, &view), vec!["user01", "user02", "user03", "user04", "user05"]);

        let view = derive(&rows, &filters, &sort, &page.next(12), ParsePolicy::Permissive);
        assert_eq!(names(&rows, &view), vec!["user06", "user07", "user08", "user09", "user10"]);
    }

    #[test]
    fn sorts_before_paging() {
        let rows = twelve_users();
        let sort = SortDirective::default().toggle(ColumnId::Username, SortDirection::Descending);
        let view = derive(&rows, &FilterSet::default(), &sort, &PageSetting::default(), ParsePolicy::Permissive);
        assert_eq!(names(&rows, &view)[0], "user12");
    }

    #[test]
    fn filter_shrinking_pages_leaves_empty_page() {
        let rows = twelve_users();
        let page = PageSetting::default().with_page_index(2);
        let filters = FilterSet::default().with(ColumnId::Username, Some(FilterValue::Text("user1".into())));
        let view = derive(&rows, &filters, &SortDirective::default(), &page, ParsePolicy::Permissive);
        assert_eq!(view.filtered_count, 3);
        assert_eq!(view.page_count, 1);
        assert!(view.rows.is_empty());
    }

    #[test]
    fn empty_input() {
        let view = derive(
            &[],
            &FilterSet::default(),
            &SortDirective::default(),
            &PageSetting::default(),
            ParsePolicy::Permissive,
        );
        assert_eq!(view, DerivedView::default());
    }
}

//! Client-side filtering and pagination shared by the lists and the map.

pub mod filters;
pub mod pager;

pub use filters::{apply, Criteria, IncidentFilter, Period, StationFilter, UnknownPeriod};
pub use pager::{PageItem, PageSummary, PageWindow, Pager};

use chrono::NaiveDateTime;

/// A loaded collection together with its filter and page position.
///
/// The filtered view is recomputed whenever the collection or the filter
/// changes, never lazily, so `page_items` is always consistent with both.
#[derive(Clone, Debug)]
pub struct ListView<T, F> {
    items: Vec<T>,
    filter: F,
    matching: Vec<usize>,
    pager: Pager,
}

impl<T, F: Criteria<T> + Default> ListView<T, F> {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            filter: F::default(),
            matching: Vec::new(),
            pager: Pager::new(page_size),
        }
    }
}

impl<T, F: Criteria<T>> ListView<T, F> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn pager(&self) -> Pager {
        self.pager
    }

    pub fn filtered_len(&self) -> usize {
        self.matching.len()
    }

    pub fn filtered(&self) -> impl Iterator<Item = &T> + '_ {
        self.matching.iter().map(|&index| &self.items[index])
    }

    pub fn page_items(&self) -> Vec<&T> {
        self.matching[self.pager.range()]
            .iter()
            .map(|&index| &self.items[index])
            .collect()
    }

    /// Swaps in a freshly fetched collection, keeping the filter and the
    /// current page when it still exists.
    pub fn replace_items(&mut self, items: Vec<T>, now: NaiveDateTime) {
        self.items = items;
        self.matching = apply(&self.items, &self.filter, now);
        self.pager = self.pager.retain(self.matching.len());
    }

    pub fn set_filter(&mut self, filter: F, now: NaiveDateTime) {
        self.filter = filter;
        self.matching = apply(&self.items, &self.filter, now);
        self.pager = self.pager.restart(self.matching.len());
    }

    pub fn update_filter(&mut self, now: NaiveDateTime, change: impl FnOnce(&mut F)) {
        change(&mut self.filter);
        self.matching = apply(&self.items, &self.filter, now);
        self.pager = self.pager.restart(self.matching.len());
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pager = self.pager.with_page_size(page_size);
    }

    /// Returns whether the page changed.
    pub fn go_to(&mut self, page: usize) -> bool {
        let before = self.pager;
        self.pager = self.pager.go_to(page);
        self.pager != before
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to(self.pager.page() + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        match self.pager.page().checked_sub(1) {
            Some(page) => self.go_to(page),
            None => false,
        }
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| predicate(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gis_records::{Incident, Station};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 15)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .expect("valid date")
    }

    fn incidents(count: i64) -> Vec<Incident> {
        (1..=count)
            .map(|id| Incident {
                id,
                description: Some(if id % 2 == 0 { "pair" } else { "impair" }.into()),
                ..Incident::default()
            })
            .collect()
    }

    #[test]
    fn filter_change_resets_to_first_page() {
        let mut view: ListView<Incident, IncidentFilter> = ListView::new(10);
        view.replace_items(incidents(60), now());
        assert!(view.go_to(3));

        view.update_filter(now(), |f| f.search = "impair".into());
        assert_eq!(view.pager().page(), 1);
        assert_eq!(view.filtered_len(), 30);
        assert!(view.page_items().iter().all(|i| i.id % 2 == 1));
    }

    #[test]
    fn refresh_keeps_page_and_filter() {
        let mut view: ListView<Incident, IncidentFilter> = ListView::new(10);
        view.replace_items(incidents(60), now());
        view.update_filter(now(), |f| f.search = "impair".into());
        view.go_to(2);

        view.replace_items(incidents(80), now());
        assert_eq!(view.pager().page(), 2);
        assert_eq!(view.filtered_len(), 40);

        view.replace_items(incidents(10), now());
        assert_eq!(view.pager().page(), 1);
    }

    #[test]
    fn pages_partition_the_filtered_set() {
        let mut view: ListView<Station, StationFilter> = ListView::new(7);
        view.replace_items(
            (1..=23)
                .map(|id| Station {
                    id,
                    ..Station::default()
                })
                .collect(),
            now(),
        );

        let mut seen = Vec::new();
        loop {
            seen.extend(view.page_items().iter().map(|s| s.id));
            if !view.next_page() {
                break;
            }
        }
        assert_eq!(view.pager().page_count(), 4);
        assert_eq!(seen, (1..=23).collect::<Vec<_>>());
    }

    #[test]
    fn empty_view_ignores_navigation() {
        let mut view: ListView<Station, StationFilter> = ListView::new(25);
        assert!(!view.go_to(1));
        assert!(!view.next_page());
        assert!(!view.previous_page());
        assert!(view.page_items().is_empty());
    }
}

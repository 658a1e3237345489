use crate::listing::{Criteria, ListView};
use chrono::NaiveDateTime;

/// Issued when a collection fetch starts; later tickets compare greater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

/// A [`ListView`] fed by overlapping fetches.
///
/// Completions arriving out of order are resolved by ticket: once a newer
/// fetch has been applied, older results are dropped.
#[derive(Clone, Debug)]
pub struct CollectionStore<T, F> {
    view: ListView<T, F>,
    issued: u64,
    applied: Option<FetchTicket>,
    revision: u64,
}

impl<T, F: Criteria<T> + Default> CollectionStore<T, F> {
    pub fn new(page_size: usize) -> Self {
        Self {
            view: ListView::new(page_size),
            issued: 0,
            applied: None,
            revision: 0,
        }
    }
}

impl<T, F: Criteria<T>> CollectionStore<T, F> {
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Applies a completed fetch unless something newer already landed.
    pub fn complete(&mut self, ticket: FetchTicket, items: Vec<T>, now: NaiveDateTime) -> bool {
        if self.applied.is_some_and(|applied| applied > ticket) {
            tracing::warn!(
                ticket = ticket.0,
                applied = self.applied.map(|t| t.0),
                "discarding superseded fetch"
            );
            return false;
        }
        self.view.replace_items(items, now);
        self.applied = Some(ticket);
        self.revision += 1;
        true
    }

    pub fn view(&self) -> &ListView<T, F> {
        &self.view
    }

    /// Local changes (filters, paging) go through here so the revision moves.
    pub fn update(&mut self, change: impl FnOnce(&mut ListView<T, F>)) {
        change(&mut self.view);
        self.revision += 1;
    }

    /// Bumped on every applied change; lets a UI tell when to re-render.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

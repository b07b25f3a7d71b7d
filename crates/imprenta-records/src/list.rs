//! Local list state for one collection.
//!
//! Plain data: the service does the talking to the backend and uses the
//! helpers here to apply (and undo) changes.

use crate::Record;

/// What a list page shows: the records, whether a load is in flight, the
/// last error and the current search term.
#[derive(Debug, Clone)]
pub struct RecordList<R: Record> {
    items: Vec<R>,
    loading: bool,
    error: Option<String>,
    search: String,
}

impl<R: Record> Default for RecordList<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            search: String::new(),
        }
    }
}

impl<R: Record> RecordList<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// The last failure, cleared when the next operation starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// The records matching the search term, in list order. An empty (or
    /// blank) term matches everything.
    pub fn filtered(&self) -> Vec<&R> {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return self.items.iter().collect();
        }
        self.items.iter().filter(|r| r.matches(&needle)).collect()
    }

    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.items.iter().find(|r| r.id() == *id)
    }

    pub fn position(&self, id: &R::Id) -> Option<usize> {
        self.items.iter().position(|r| r.id() == *id)
    }

    /// Replaces every record, e.g. after a fresh load.
    pub fn replace(&mut self, items: Vec<R>) {
        self.items = items;
    }

    /// Appends a record.
    pub fn push(&mut self, record: R) {
        self.items.push(record);
    }

    /// Replaces the record with the same id in place, returning the one it
    /// replaced (what an undo needs). Does nothing if no such record is in
    /// the list: a record removed meanwhile is never brought back.
    pub fn replace_existing(&mut self, record: R) -> Option<R> {
        let index = self.position(&record.id())?;
        Some(std::mem::replace(&mut self.items[index], record))
    }

    /// Removes a record, returning it with the index it held.
    pub fn remove(&mut self, id: &R::Id) -> Option<(usize, R)> {
        let index = self.position(id)?;
        Some((index, self.items.remove(index)))
    }

    /// Puts back a record taken out by [`remove`](Self::remove), at its old
    /// index (or the end, if the list has shrunk since).
    pub fn restore(&mut self, index: usize, record: R) {
        let index = index.min(self.items.len());
        self.items.insert(index, record);
    }
}

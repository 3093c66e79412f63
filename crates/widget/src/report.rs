//! Submitted reports and the session-scoped store holding them.

use crate::category::Category;
use chrono::{DateTime, Utc};
use fixmap_geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Identifier handed out by [`ReportStore::next_id`]; strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(u64);

impl ReportId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A submitted issue. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    id: ReportId,
    category: Category,
    description: Option<String>,
    location: Coordinate,
    created_at: DateTime<Utc>,
}

impl Report {
    /// Builds a report; a blank description is stored as `None`.
    pub fn new(
        id: ReportId,
        category: Category,
        description: &str,
        location: Coordinate,
        created_at: DateTime<Utc>,
    ) -> Self {
        let description = description.trim();
        Self {
            id,
            category,
            description: (!description.is_empty()).then(|| description.to_string()),
            location,
            created_at,
        }
    }

    pub fn id(&self) -> ReportId {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn location(&self) -> Coordinate {
        self.location
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// In-memory reports, most recent first. Lost when the session ends.
#[derive(Debug, Clone, Default)]
pub struct ReportStore {
    reports: VecDeque<Report>,
    last_id: u64,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next identifier.
    pub fn next_id(&mut self) -> ReportId {
        self.last_id += 1;
        ReportId(self.last_id)
    }

    /// Prepends `report`.
    pub fn add(&mut self, report: Report) {
        self.reports.push_front(report);
    }

    /// All reports, most recent first.
    pub fn all(&self) -> impl ExactSizeIterator<Item = &Report> + '_ {
        self.reports.iter()
    }

    pub fn latest(&self) -> Option<&Report> {
        self.reports.front()
    }

    pub fn get(&self, id: ReportId) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(store: &mut ReportStore, category: Category) -> Report {
        Report::new(
            store.next_id(),
            category,
            "",
            Coordinate::new(8.36, 124.86),
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
        )
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut store = ReportStore::new();
        let a = store.next_id();
        let b = store.next_id();
        assert!(b > a);
    }

    #[test]
    fn test_add_prepends() {
        let mut store = ReportStore::new();
        let first = report(&mut store, Category::Pothole);
        let second = report(&mut store, Category::Flooding);
        store.add(first.clone());
        store.add(second.clone());

        let order: Vec<_> = store.all().map(Report::id).collect();
        assert_eq!(order, vec![second.id(), first.id()]);
        assert_eq!(store.latest(), Some(&second));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(first.id()), Some(&first));
    }

    #[test]
    fn test_blank_description_is_none() {
        let r = Report::new(
            ReportId(1),
            Category::Other,
            "   ",
            Coordinate::new(0.0, 0.0),
            DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        );
        assert_eq!(r.description(), None);

        let r = Report::new(
            ReportId(2),
            Category::Other,
            "  deep hole ",
            Coordinate::new(0.0, 0.0),
            DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        );
        assert_eq!(r.description(), Some("deep hole"));
    }

    #[test]
    fn test_empty_store() {
        let store = ReportStore::new();
        assert!(store.is_empty());
        assert_eq!(store.all().len(), 0);
        assert!(store.latest().is_none());
    }
}

//! Store-agnostic collection operations

use async_trait::async_trait;
use bson::{Bson, Document};
use serde::{de::DeserializeOwned, Serialize};
use std::cmp::Ordering;

use crate::db::mongo::IntoIndexes;
use crate::types::Result;

/// A document type bound to one named collection
pub trait Record: Serialize + DeserializeOwned + IntoIndexes + Unpin + Send + Sync + 'static {
    /// Collection the documents live in
    const COLLECTION: &'static str;
}

/// Sort direction for `FindQuery`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_i32(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

/// Conjunction of field equality clauses; empty matches everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Bson)>,
}

impl Filter {
    /// Match every document
    pub fn all() -> Self {
        Self::default()
    }

    /// Match documents whose `field` equals `value`
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::all().and_eq(field, value)
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    /// MongoDB query document
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (field, value) in &self.clauses {
            doc.insert(field.clone(), value.clone());
        }
        doc
    }

    /// Evaluate against a document with MongoDB's numeric equality rules
    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|(field, expected)| {
            doc.get(field)
                .map(|actual| compare_bson(actual, expected) == Some(Ordering::Equal))
                .unwrap_or(false)
        })
    }
}

/// Filter, optional single-field sort and optional limit
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: Filter,
    pub sort: Option<(String, SortOrder)>,
    pub limit: Option<i64>,
}

impl FindQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// MongoDB sort document
    pub fn sort_document(&self) -> Option<Document> {
        self.sort.as_ref().map(|(field, order)| {
            let mut doc = Document::new();
            doc.insert(field.clone(), order.as_i32());
            doc
        })
    }
}

/// Ordering between two BSON scalars of comparable kinds
///
/// Numbers compare across Int32/Int64/Double; strings compare lexically.
/// Anything else only compares equal to an identical value.
pub fn compare_bson(a: &Bson, b: &Bson) -> Option<Ordering> {
    fn as_f64(v: &Bson) -> Option<f64> {
        match v {
            Bson::Int32(i) => Some(*i as f64),
            Bson::Int64(i) => Some(*i as f64),
            Bson::Double(d) => Some(*d),
            _ => None,
        }
    }

    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ if a == b => Some(Ordering::Equal),
            _ => None,
        },
    }
}

/// Collection operations the reconciler and the query handlers depend on
///
/// `insert_many` skips documents whose `_id` is already present and reports
/// how many were written, so two instances re-seeding the same store
/// concurrently both succeed.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Number of documents in the collection
    async fn count<T: Record>(&self) -> Result<u64>;

    /// Documents matching the query
    async fn find<T: Record>(&self, query: FindQuery) -> Result<Vec<T>>;

    /// First document matching the filter
    async fn find_one<T: Record>(&self, filter: Filter) -> Result<Option<T>>;

    /// Insert documents, returning how many were written
    async fn insert_many<T: Record>(&self, docs: &[T]) -> Result<usize>;

    /// Delete documents matching the filter, returning how many were removed
    async fn delete_many<T: Record>(&self, filter: Filter) -> Result<u64>;

    /// Build the schemas' indexes once the content is consistent
    async fn ensure_schema_indexes(&self) -> Result<()> {
        Ok(())
    }

    /// Release connections before exit
    async fn close(&self) {}
}

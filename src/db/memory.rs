//! In-process document store
//!
//! Keeps each collection as an insertion-ordered list of BSON documents.
//! Filters follow MongoDB's equality rules, and inserts honour `_id` plus
//! the unique indexes a schema declares. Non-unique indexes, transactions
//! and the query planner have no counterpart here.

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::db::store::{compare_bson, DocumentStore, Filter, FindQuery, Record, SortOrder};
use crate::types::Result;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<&'static str, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw documents of a collection, in insertion order
    pub async fn snapshot(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Insert raw documents without schema checks
    pub async fn insert_raw(&self, collection: &'static str, docs: Vec<Document>) {
        let mut collections = self.collections.write().await;
        let entries = collections.entry(collection).or_default();
        for mut doc in docs {
            if !doc.contains_key("_id") {
                doc.insert("_id", ObjectId::new());
            }
            entries.push(doc);
        }
    }
}

fn decode<T: Record>(doc: &Document) -> Option<T> {
    match bson::from_document::<T>(doc.clone()) {
        Ok(record) => Some(record),
        Err(e) => {
            error!("Error reading document from '{}': {}", T::COLLECTION, e);
            None
        }
    }
}

/// Field sets of the schema's unique indexes
fn unique_keys<T: Record>() -> Vec<Vec<String>> {
    T::into_indices()
        .into_iter()
        .filter(|(_, options)| options.as_ref().and_then(|o| o.unique).unwrap_or(false))
        .map(|(keys, _)| keys.keys().cloned().collect())
        .collect()
}

/// Missing fields index as null, as they do in MongoDB
fn same_key(a: &Document, b: &Document, fields: &[String]) -> bool {
    fields.iter().all(|field| {
        let x = a.get(field).unwrap_or(&Bson::Null);
        let y = b.get(field).unwrap_or(&Bson::Null);
        compare_bson(x, y) == Some(Ordering::Equal)
    })
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn count<T: Record>(&self) -> Result<u64> {
        let collections = self.collections.read().await;
        Ok(collections.get(T::COLLECTION).map(|c| c.len() as u64).unwrap_or(0))
    }

    async fn find<T: Record>(&self, query: FindQuery) -> Result<Vec<T>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(T::COLLECTION) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Document> = docs.iter().filter(|d| query.filter.matches(d)).collect();

        if let Some((ref field, order)) = query.sort {
            // Stable sort keeps insertion order among equal keys
            matched.sort_by(|a, b| {
                let ord = match (a.get(field), b.get(field)) {
                    (Some(x), Some(y)) => compare_bson(x, y).unwrap_or(Ordering::Equal),
                    (None, Some(_)) => Ordering::Less,
                    (Some(_), None) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }

        let limit = match query.limit {
            Some(n) if n > 0 => n as usize,
            _ => usize::MAX,
        };

        Ok(matched.into_iter().take(limit).filter_map(decode::<T>).collect())
    }

    async fn find_one<T: Record>(&self, filter: Filter) -> Result<Option<T>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(T::COLLECTION)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
            .and_then(decode::<T>))
    }

    async fn insert_many<T: Record>(&self, docs: &[T]) -> Result<usize> {
        let encoded = docs
            .iter()
            .map(bson::to_document)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let unique = unique_keys::<T>();

        let mut collections = self.collections.write().await;
        let entries = collections.entry(T::COLLECTION).or_default();

        let mut inserted = 0;
        for mut doc in encoded {
            let id = match doc.get("_id") {
                Some(id) => id.clone(),
                None => {
                    let id = Bson::ObjectId(ObjectId::new());
                    doc.insert("_id", id.clone());
                    id
                }
            };

            if entries.iter().any(|existing| existing.get("_id") == Some(&id)) {
                debug!(collection = T::COLLECTION, id = %id, "Duplicate _id skipped");
                continue;
            }

            if let Some(fields) = unique
                .iter()
                .find(|fields| entries.iter().any(|existing| same_key(existing, &doc, fields)))
            {
                debug!(collection = T::COLLECTION, key = ?fields, "Duplicate unique key skipped");
                continue;
            }

            entries.push(doc);
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn delete_many<T: Record>(&self, filter: Filter) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(entries) = collections.get_mut(T::COLLECTION) else {
            return Ok(0);
        };

        let before = entries.len();
        entries.retain(|d| !filter.matches(d));
        Ok((before - entries.len()) as u64)
    }
}

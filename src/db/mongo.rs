//! MongoDB client and `DocumentStore` implementation

use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::StreamExt;
use mongodb::{
    error::{ErrorKind, InsertManyError},
    options::{FindOptions, IndexOptions, InsertManyOptions},
    Client, Collection, IndexModel,
};
use tracing::{error, info, warn};

use crate::db::schemas::{Chapter, Emotion, Guidance, Mood};
use crate::db::store::{DocumentStore, Filter, FindQuery, Record};
use crate::types::{Result, ShlokaError};

/// Duplicate key server error code
const DUPLICATE_KEY: i32 = 11000;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify the server answers a ping
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", uri);

        // Use serverSelectionTimeoutMS to avoid hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| ShlokaError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ShlokaError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Typed handle on a record's collection
    pub fn collection<T: Record>(&self) -> Collection<T> {
        self.client.database(&self.db_name).collection::<T>(T::COLLECTION)
    }

    /// Apply schema-defined indexes
    pub async fn ensure_indexes<T: Record>(&self) -> Result<()> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.collection::<T>()
            .create_indexes(indices)
            .await
            .map_err(|e| {
                ShlokaError::Database(format!(
                    "Failed to create indexes on '{}': {}",
                    T::COLLECTION,
                    e
                ))
            })?;

        Ok(())
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// True when every write error is a duplicate key and nothing else failed
fn only_duplicates(failure: &InsertManyError) -> bool {
    failure.write_concern_error.is_none()
        && failure
            .write_errors
            .as_ref()
            .map(|errors| errors.iter().all(|e| e.code == DUPLICATE_KEY))
            .unwrap_or(false)
}

#[async_trait]
impl DocumentStore for MongoClient {
    async fn count<T: Record>(&self) -> Result<u64> {
        self.collection::<T>()
            .count_documents(doc! {})
            .await
            .map_err(|e| ShlokaError::Database(format!("Count on '{}' failed: {}", T::COLLECTION, e)))
    }

    async fn find<T: Record>(&self, query: FindQuery) -> Result<Vec<T>> {
        let options = FindOptions::builder()
            .sort(query.sort_document())
            .limit(query.limit)
            .build();

        let cursor = self
            .collection::<T>()
            .find(query.filter.to_document())
            .with_options(options)
            .await
            .map_err(|e| ShlokaError::Database(format!("Find on '{}' failed: {}", T::COLLECTION, e)))?;

        let results: Vec<T> = cursor
            .filter_map(|doc| async {
                match doc {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!("Error reading document from '{}': {}", T::COLLECTION, e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(results)
    }

    async fn find_one<T: Record>(&self, filter: Filter) -> Result<Option<T>> {
        self.collection::<T>()
            .find_one(filter.to_document())
            .await
            .map_err(|e| ShlokaError::Database(format!("Find on '{}' failed: {}", T::COLLECTION, e)))
    }

    async fn insert_many<T: Record>(&self, docs: &[T]) -> Result<usize> {
        // The server rejects an empty batch
        if docs.is_empty() {
            return Ok(0);
        }

        let options = InsertManyOptions::builder().ordered(false).build();

        match self.collection::<T>().insert_many(docs).with_options(options).await {
            Ok(result) => Ok(result.inserted_ids.len()),
            Err(e) => match *e.kind {
                ErrorKind::InsertMany(ref failure) if only_duplicates(failure) => {
                    let skipped = failure.write_errors.as_ref().map(Vec::len).unwrap_or(0);
                    warn!(
                        collection = T::COLLECTION,
                        skipped, "Documents already present, skipped"
                    );
                    Ok(docs.len().saturating_sub(skipped))
                }
                _ => Err(ShlokaError::Database(format!(
                    "Insert into '{}' failed: {}",
                    T::COLLECTION,
                    e
                ))),
            },
        }
    }

    async fn delete_many<T: Record>(&self, filter: Filter) -> Result<u64> {
        self.collection::<T>()
            .delete_many(filter.to_document())
            .await
            .map(|result| result.deleted_count)
            .map_err(|e| ShlokaError::Database(format!("Delete on '{}' failed: {}", T::COLLECTION, e)))
    }

    /// Unique indexes fail to build over duplicates, so this runs after reconcile
    async fn ensure_schema_indexes(&self) -> Result<()> {
        self.ensure_indexes::<Emotion>().await?;
        self.ensure_indexes::<Mood>().await?;
        self.ensure_indexes::<Guidance>().await?;
        self.ensure_indexes::<Chapter>().await?;
        info!("Indexes ready on '{}'", self.db_name);
        Ok(())
    }

    async fn close(&self) {
        info!("Closing MongoDB connection to '{}'", self.db_name);
        self.client.clone().shutdown().immediate(true).await;
    }
}

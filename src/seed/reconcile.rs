//! Seed reconciler
//!
//! Two policies are supported:
//!
//! - `Selective` (default): emotions, moods and guidance are cleared and
//!   rewritten on every boot so the three stay mutually consistent with the
//!   compiled-in catalog. Chapters are never rewritten; they are inserted
//!   when missing and otherwise left as found.
//! - `IfEmpty`: seed all four collections only when the emotion collection
//!   is empty. A partially seeded store stays partial under this policy.
//!
//! Clearing and re-inserting are separate operations, so a request that
//! lands mid-reconcile can see an empty collection. Concurrent reconciles
//! converge on the same content because duplicate inserts are skipped.

use tracing::{info, warn};

use crate::config::SeedPolicy;
use crate::db::schemas::{Chapter, Emotion, Guidance, Mood};
use crate::db::store::{DocumentStore, Filter, FindQuery};
use crate::seed::catalog::{check_consistency, Catalog};
use crate::types::{Result, ShlokaError};

/// What a reconcile run did to each collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub policy: SeedPolicy,
    /// `IfEmpty` found existing data and changed nothing
    pub skipped: bool,
    pub emotions_cleared: u64,
    pub moods_cleared: u64,
    pub guidance_cleared: u64,
    pub emotions_inserted: usize,
    pub moods_inserted: usize,
    pub guidance_inserted: usize,
    pub chapters_inserted: usize,
    /// Chapters already present and left untouched
    pub chapters_existing: u64,
}

/// Prepare a store for serving: check the list cap, reconcile, then index
///
/// A drifted store can hold duplicates that only the reconcile removes, so
/// unique indexes are built last.
pub async fn bootstrap<S: DocumentStore>(
    store: &S,
    policy: SeedPolicy,
    max_list: i64,
) -> Result<ReconcileReport> {
    let catalog = Catalog::canonical()?;
    catalog.check_list_cap(max_list)?;

    let report = reconcile_catalog(store, policy, &catalog).await?;
    store.ensure_schema_indexes().await?;
    Ok(report)
}

/// Bring the store in line with the canonical catalog
///
/// Must complete before the server accepts traffic. Store errors propagate
/// unchanged so that startup aborts.
pub async fn reconcile<S: DocumentStore>(store: &S, policy: SeedPolicy) -> Result<ReconcileReport> {
    let catalog = Catalog::canonical()?;
    reconcile_catalog(store, policy, &catalog).await
}

async fn reconcile_catalog<S: DocumentStore>(
    store: &S,
    policy: SeedPolicy,
    catalog: &Catalog,
) -> Result<ReconcileReport> {
    let report = match policy {
        SeedPolicy::Selective => reconcile_selective(store, catalog).await?,
        SeedPolicy::IfEmpty => reconcile_if_empty(store, catalog).await?,
    };

    info!(
        policy = %report.policy,
        skipped = report.skipped,
        emotions = report.emotions_inserted,
        moods = report.moods_inserted,
        guidance = report.guidance_inserted,
        chapters_inserted = report.chapters_inserted,
        chapters_existing = report.chapters_existing,
        "Seed reconciliation complete"
    );

    Ok(report)
}

async fn reconcile_selective<S: DocumentStore>(store: &S, catalog: &Catalog) -> Result<ReconcileReport> {
    let mut report = ReconcileReport {
        policy: SeedPolicy::Selective,
        ..ReconcileReport::default()
    };

    // Children first so no mood is ever left without its emotion
    report.guidance_cleared = store.delete_many::<Guidance>(Filter::all()).await?;
    report.moods_cleared = store.delete_many::<Mood>(Filter::all()).await?;
    report.emotions_cleared = store.delete_many::<Emotion>(Filter::all()).await?;
    info!(
        emotions = report.emotions_cleared,
        moods = report.moods_cleared,
        guidance = report.guidance_cleared,
        "Cleared emotion hierarchy"
    );

    // Parents first, for the same reason
    report.emotions_inserted = store.insert_many(&catalog.emotions).await?;
    report.moods_inserted = store.insert_many(&catalog.moods).await?;
    report.guidance_inserted = store.insert_many(&catalog.guidance).await?;
    info!(
        emotions = report.emotions_inserted,
        moods = report.moods_inserted,
        guidance = report.guidance_inserted,
        "Inserted emotion hierarchy"
    );

    report.chapters_existing = store.count::<Chapter>().await?;
    if report.chapters_existing < catalog.chapters.len() as u64 {
        // Present chapters are skipped by _id, only the missing ones land
        report.chapters_inserted = store.insert_many(&catalog.chapters).await?;
        info!(
            existing = report.chapters_existing,
            inserted = report.chapters_inserted,
            "Inserted missing chapters"
        );
    } else {
        info!(existing = report.chapters_existing, "Chapters already present, left untouched");
    }

    Ok(report)
}

async fn reconcile_if_empty<S: DocumentStore>(store: &S, catalog: &Catalog) -> Result<ReconcileReport> {
    let mut report = ReconcileReport {
        policy: SeedPolicy::IfEmpty,
        ..ReconcileReport::default()
    };

    let existing = store.count::<Emotion>().await?;
    if existing > 0 {
        info!(existing, "Sample data already exists");
        report.skipped = true;
        return Ok(report);
    }

    report.emotions_inserted = store.insert_many(&catalog.emotions).await?;
    report.moods_inserted = store.insert_many(&catalog.moods).await?;
    report.guidance_inserted = store.insert_many(&catalog.guidance).await?;
    report.chapters_inserted = store.insert_many(&catalog.chapters).await?;

    Ok(report)
}

/// Check the post-reconcile invariants against live store contents
pub async fn verify<S: DocumentStore>(store: &S) -> Result<()> {
    let emotions: Vec<Emotion> = store.find(FindQuery::default()).await?;
    let moods: Vec<Mood> = store.find(FindQuery::default()).await?;
    let guidance: Vec<Guidance> = store.find(FindQuery::default()).await?;
    let chapters: Vec<Chapter> = store.find(FindQuery::default()).await?;

    let violations = check_consistency(&emotions, &moods, &guidance, &chapters);
    if violations.is_empty() {
        return Ok(());
    }

    for v in &violations {
        warn!(violation = %v, "Seed postcondition violated");
    }
    Err(ShlokaError::Seed(format!(
        "{} seed postcondition violation(s): {}",
        violations.len(),
        violations.join("; ")
    )))
}

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{event, Level};

use crate::db::recreate_schema;
use crate::DbModelManager;

/// One record of the JSON fixture. `average_price` and `brand_name` may be
/// absent in the data; a record without a `brand_name` still seeds a model
/// row, just with no brand reference.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SeedRecord {
    pub id: i64,
    pub name: String,
    pub average_price: Option<i64>,
    pub brand_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub brands: usize,
    pub models: usize,
}

pub fn load_fixture(fixture_path: &Path) -> Result<Vec<SeedRecord>> {
    let raw = fs::read_to_string(fixture_path).with_context(|| format!("reading fixture file {}", fixture_path.display()))?;

    let records: Vec<SeedRecord> = serde_json::from_str(&raw).with_context(|| format!("parsing fixture file {}", fixture_path.display()))?;

    Ok(records)
}

/// Distinct brand names across the fixture, lexicographically ordered.
/// Records without a `brand_name` are skipped.
pub fn derive_brand_names(records: &[SeedRecord]) -> BTreeSet<String> {
    records.iter().filter_map(|record| record.brand_name.clone()).collect()
}

/// Inserts the derived brands and then every model row, all in one
/// transaction. Model rows keep their fixture-supplied id. A record whose
/// `brand_name` resolves to no derived brand gets a NULL `brand_id`.
pub async fn seed_records(mm: &DbModelManager, records: &[SeedRecord]) -> Result<SeedSummary> {
    let brand_names = derive_brand_names(records);

    let mut tx = mm.pool().begin().await?;

    let mut brand_ids: HashMap<String, i64> = HashMap::new();

    for brand_name in &brand_names {
        let result = sqlx::query("insert into brands (name) values (?)")
            .bind(brand_name)
            .execute(&mut *tx)
            .await?;

        brand_ids.insert(brand_name.clone(), result.last_insert_rowid());
    }

    for record in records {
        let brand_id = record.brand_name.as_ref().and_then(|name| brand_ids.get(name)).copied();

        sqlx::query(
            r#"
insert into models (id, name, average_price, brand_id)
values (?, ?, ?, ?)
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(record.average_price)
        .bind(brand_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(SeedSummary {
        brands: brand_names.len(),
        models: records.len(),
    })
}

/// Recreates the schema and populates it from the fixture file. Any error
/// must abort startup; the caller decides how to terminate.
pub async fn seed_from_fixture(mm: &DbModelManager, fixture_path: &Path) -> Result<SeedSummary> {
    recreate_schema(mm.pool()).await.context("recreating the database schema")?;

    let records = load_fixture(fixture_path)?;

    let summary = seed_records(mm, &records).await?;

    event!(
        Level::INFO,
        "Seeded {} brands and {} models from {}",
        summary.brands,
        summary.models,
        fixture_path.display()
    );

    Ok(summary)
}

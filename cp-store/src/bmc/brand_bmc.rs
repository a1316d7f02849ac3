use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use mockall::automock;
use sqlx::FromRow;
use tokio::sync::RwLock;

use cp_domain::{Brand, BrandWithAveragePrice};

use crate::bmc::InMemoryCatalog;
use crate::{DbModelManager, StoreError};

#[automock]
#[async_trait]
pub trait BrandBmcTrait: Send + Sync + Debug {
    async fn list_brands_with_average_price(&self) -> Result<Vec<BrandWithAveragePrice>, StoreError>;
    async fn create_brand(&self, name: String) -> Result<Brand, StoreError>;
}

#[derive(Debug)]
pub struct DbBrandBmc {
    pub(crate) mm: DbModelManager,
}

#[derive(FromRow)]
struct DbBrandAverageRow {
    id: i64,
    name: String,
    average_price: Option<f64>,
}

#[async_trait]
impl BrandBmcTrait for DbBrandBmc {
    async fn list_brands_with_average_price(&self) -> Result<Vec<BrandWithAveragePrice>, StoreError> {
        let rows: Vec<DbBrandAverageRow> = sqlx::query_as(
            r#"
select b.id
     , b.name
     , round(avg(m.average_price), 2) as average_price
  from brands b
       left join models m on m.brand_id = b.id
 group by b.id, b.name
 order by b.id
            "#,
        )
        .fetch_all(self.mm.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| BrandWithAveragePrice {
                id: row.id,
                name: row.name,
                average_price: row.average_price,
            })
            .collect_vec())
    }

    async fn create_brand(&self, name: String) -> Result<Brand, StoreError> {
        let result = sqlx::query("insert into brands (name) values (?)")
            .bind(&name)
            .execute(self.mm.pool())
            .await;

        match result {
            Ok(done) => Ok(Brand {
                id: done.last_insert_rowid(),
                name,
            }),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(StoreError::BrandAlreadyExists(name)),
            Err(other) => Err(StoreError::Database(other)),
        }
    }
}

/// Brand controller over the shared in-memory catalog.
#[derive(Debug)]
pub struct InMemoryBrandBmc {
    catalog: Arc<RwLock<InMemoryCatalog>>,
}

impl InMemoryBrandBmc {
    pub fn new(catalog: Arc<RwLock<InMemoryCatalog>>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl BrandBmcTrait for InMemoryBrandBmc {
    async fn list_brands_with_average_price(&self) -> Result<Vec<BrandWithAveragePrice>, StoreError> {
        let catalog = self.catalog.read().await;

        Ok(catalog
            .brands
            .values()
            .sorted_by_key(|brand| brand.id)
            .map(|brand| {
                let prices = catalog
                    .models
                    .values()
                    .filter(|model| model.brand_id == Some(brand.id))
                    .filter_map(|model| model.average_price)
                    .collect_vec();

                let average_price = (!prices.is_empty()).then(|| {
                    let average = prices.iter().sum::<i64>() as f64 / prices.len() as f64;
                    (average * 100.0).round() / 100.0
                });

                BrandWithAveragePrice {
                    id: brand.id,
                    name: brand.name.clone(),
                    average_price,
                }
            })
            .collect_vec())
    }

    async fn create_brand(&self, name: String) -> Result<Brand, StoreError> {
        let mut catalog = self.catalog.write().await;

        if catalog.brands.values().any(|brand| brand.name == name) {
            return Err(StoreError::BrandAlreadyExists(name));
        }

        let brand = Brand {
            id: catalog.next_brand_id,
            name,
        };
        catalog.next_brand_id += 1;
        catalog.brands.insert(brand.id, brand.clone());

        Ok(brand)
    }
}

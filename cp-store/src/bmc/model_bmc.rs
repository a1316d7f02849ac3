use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use mockall::automock;
use tokio::sync::RwLock;

use cp_domain::{Model, ModelSummary, NewModel, PriceFilter, UpdatedModelPrice, MIN_AVERAGE_PRICE};

use crate::bmc::InMemoryCatalog;
use crate::{DbModelManager, StoreError};

#[automock]
#[async_trait]
pub trait ModelBmcTrait: Send + Sync + Debug {
    async fn count_models(&self) -> Result<i64, StoreError>;
    async fn list_models_of_brand(&self, brand_id: i64) -> Result<Vec<ModelSummary>, StoreError>;
    async fn list_models_filtered(&self, filter: PriceFilter) -> Result<Vec<ModelSummary>, StoreError>;
    async fn create_model(&self, brand_id: i64, new_model: NewModel) -> Result<Model, StoreError>;
    async fn update_average_price(&self, model_id: i64, average_price: i64) -> Result<UpdatedModelPrice, StoreError>;
}

/// Assembles the filtered model listing. Bounds become bound parameters,
/// never interpolated text. Contradictory bounds build a valid statement
/// that simply selects nothing.
pub fn build_price_filter_query(filter: &PriceFilter) -> (String, Vec<i64>) {
    let mut statement = String::from("select id, name, average_price from models");
    let mut predicates: Vec<&str> = Vec::new();
    let mut params: Vec<i64> = Vec::new();

    if let Some(greater_than) = filter.greater_than {
        predicates.push("average_price > ?");
        params.push(greater_than);
    }

    if let Some(lower_than) = filter.lower_than {
        predicates.push("average_price < ?");
        params.push(lower_than);
    }

    if !predicates.is_empty() {
        statement.push_str(" where ");
        statement.push_str(&predicates.join(" and "));
    }

    statement.push_str(" order by average_price asc");

    (statement, params)
}

fn ensure_average_price(average_price: i64) -> Result<(), StoreError> {
    if average_price > MIN_AVERAGE_PRICE {
        Ok(())
    } else {
        Err(StoreError::AveragePriceTooLow(average_price))
    }
}

#[derive(Debug)]
pub struct DbModelBmc {
    pub(crate) mm: DbModelManager,
}

#[async_trait]
impl ModelBmcTrait for DbModelBmc {
    async fn count_models(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("select count(*) from models").fetch_one(self.mm.pool()).await?;

        Ok(count)
    }

    async fn list_models_of_brand(&self, brand_id: i64) -> Result<Vec<ModelSummary>, StoreError> {
        let rows: Vec<(i64, String, Option<i64>)> = sqlx::query_as(
            r#"
select id
     , name
     , average_price
  from models
 where brand_id = ?
 order by id
            "#,
        )
        .bind(brand_id)
        .fetch_all(self.mm.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, average_price)| ModelSummary { id, name, average_price })
            .collect_vec())
    }

    async fn list_models_filtered(&self, filter: PriceFilter) -> Result<Vec<ModelSummary>, StoreError> {
        let (statement, params) = build_price_filter_query(&filter);

        let mut query = sqlx::query_as::<_, (i64, String, Option<i64>)>(&statement);
        for param in params {
            query = query.bind(param);
        }

        let rows = query.fetch_all(self.mm.pool()).await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, average_price)| ModelSummary { id, name, average_price })
            .collect_vec())
    }

    async fn create_model(&self, brand_id: i64, new_model: NewModel) -> Result<Model, StoreError> {
        let existing_brand: Option<i64> = sqlx::query_scalar("select id from brands where id = ?")
            .bind(brand_id)
            .fetch_optional(self.mm.pool())
            .await?;

        if existing_brand.is_none() {
            return Err(StoreError::BrandNotFound(brand_id));
        }

        let duplicate: Option<i64> = sqlx::query_scalar("select id from models where brand_id = ? and name = ?")
            .bind(brand_id)
            .bind(&new_model.name)
            .fetch_optional(self.mm.pool())
            .await?;

        if duplicate.is_some() {
            return Err(StoreError::ModelAlreadyExists {
                name: new_model.name,
                brand_id,
            });
        }

        if let Some(average_price) = new_model.average_price {
            ensure_average_price(average_price)?;
        }

        let result = sqlx::query(
            r#"
insert into models (name, average_price, brand_id)
values (?, ?, ?)
            "#,
        )
        .bind(&new_model.name)
        .bind(new_model.average_price)
        .bind(brand_id)
        .execute(self.mm.pool())
        .await?;

        Ok(Model {
            id: result.last_insert_rowid(),
            name: new_model.name,
            average_price: new_model.average_price,
            brand_id: Some(brand_id),
        })
    }

    async fn update_average_price(&self, model_id: i64, average_price: i64) -> Result<UpdatedModelPrice, StoreError> {
        let existing_model: Option<i64> = sqlx::query_scalar("select id from models where id = ?")
            .bind(model_id)
            .fetch_optional(self.mm.pool())
            .await?;

        if existing_model.is_none() {
            return Err(StoreError::ModelNotFound(model_id));
        }

        ensure_average_price(average_price)?;

        sqlx::query("update models set average_price = ? where id = ?")
            .bind(average_price)
            .bind(model_id)
            .execute(self.mm.pool())
            .await?;

        Ok(UpdatedModelPrice { id: model_id, average_price })
    }
}

/// Model controller over the shared in-memory catalog. Mirrors the SQL
/// backend's check order and result ordering.
#[derive(Debug)]
pub struct InMemoryModelBmc {
    catalog: Arc<RwLock<InMemoryCatalog>>,
}

impl InMemoryModelBmc {
    pub fn new(catalog: Arc<RwLock<InMemoryCatalog>>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ModelBmcTrait for InMemoryModelBmc {
    async fn count_models(&self) -> Result<i64, StoreError> {
        Ok(self.catalog.read().await.models.len() as i64)
    }

    async fn list_models_of_brand(&self, brand_id: i64) -> Result<Vec<ModelSummary>, StoreError> {
        let catalog = self.catalog.read().await;

        Ok(catalog
            .models
            .values()
            .filter(|model| model.brand_id == Some(brand_id))
            .sorted_by_key(|model| model.id)
            .map(|model| ModelSummary {
                id: model.id,
                name: model.name.clone(),
                average_price: model.average_price,
            })
            .collect_vec())
    }

    async fn list_models_filtered(&self, filter: PriceFilter) -> Result<Vec<ModelSummary>, StoreError> {
        let catalog = self.catalog.read().await;

        Ok(catalog
            .models
            .values()
            .filter(|model| match filter.greater_than {
                Some(greater_than) => model.average_price.map_or(false, |price| price > greater_than),
                None => true,
            })
            .filter(|model| match filter.lower_than {
                Some(lower_than) => model.average_price.map_or(false, |price| price < lower_than),
                None => true,
            })
            .sorted_by_key(|model| model.average_price)
            .map(|model| ModelSummary {
                id: model.id,
                name: model.name.clone(),
                average_price: model.average_price,
            })
            .collect_vec())
    }

    async fn create_model(&self, brand_id: i64, new_model: NewModel) -> Result<Model, StoreError> {
        let mut catalog = self.catalog.write().await;

        if !catalog.brands.contains_key(&brand_id) {
            return Err(StoreError::BrandNotFound(brand_id));
        }

        let duplicate = catalog
            .models
            .values()
            .any(|model| model.brand_id == Some(brand_id) && model.name == new_model.name);

        if duplicate {
            return Err(StoreError::ModelAlreadyExists {
                name: new_model.name,
                brand_id,
            });
        }

        if let Some(average_price) = new_model.average_price {
            ensure_average_price(average_price)?;
        }

        let model = Model {
            id: catalog.next_model_id,
            name: new_model.name,
            average_price: new_model.average_price,
            brand_id: Some(brand_id),
        };
        catalog.next_model_id += 1;
        catalog.models.insert(model.id, model.clone());

        Ok(model)
    }

    async fn update_average_price(&self, model_id: i64, average_price: i64) -> Result<UpdatedModelPrice, StoreError> {
        let mut catalog = self.catalog.write().await;

        if !catalog.models.contains_key(&model_id) {
            return Err(StoreError::ModelNotFound(model_id));
        }

        ensure_average_price(average_price)?;

        if let Some(model) = catalog.models.get_mut(&model_id) {
            model.average_price = Some(average_price);
        }

        Ok(UpdatedModelPrice { id: model_id, average_price })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmc::brand_bmc::BrandBmcTrait;
    use crate::bmc::DbBrandBmc;
    use crate::db::{get_in_memory_connection_pool, recreate_schema};

    fn new_model(name: &str, average_price: Option<i64>) -> NewModel {
        NewModel {
            name: name.to_string(),
            average_price,
        }
    }

    async fn test_model_manager() -> DbModelManager {
        let pool = get_in_memory_connection_pool().await.unwrap();
        recreate_schema(&pool).await.unwrap();
        DbModelManager::new(pool)
    }

    /// One brand with three priced models at 150k / 400k / 900k.
    async fn seeded_bmcs() -> (DbBrandBmc, DbModelBmc, i64) {
        let mm = test_model_manager().await;
        let brand_bmc = DbBrandBmc { mm: mm.clone() };
        let model_bmc = DbModelBmc { mm };

        let brand = brand_bmc.create_brand("Nissan".to_string()).await.unwrap();

        model_bmc.create_model(brand.id, new_model("March", Some(150_000))).await.unwrap();
        model_bmc.create_model(brand.id, new_model("Sentra", Some(400_000))).await.unwrap();
        model_bmc.create_model(brand.id, new_model("GT-R", Some(900_000))).await.unwrap();

        (brand_bmc, model_bmc, brand.id)
    }

    #[test]
    fn test_build_price_filter_query_without_bounds_has_no_where_clause() {
        let (statement, params) = build_price_filter_query(&PriceFilter::default());

        assert_eq!(statement, "select id, name, average_price from models order by average_price asc");
        assert!(params.is_empty());
    }

    #[test]
    fn test_build_price_filter_query_with_lower_bound_only() {
        let filter = PriceFilter {
            greater_than: Some(100_000),
            lower_than: None,
        };

        let (statement, params) = build_price_filter_query(&filter);

        assert_eq!(
            statement,
            "select id, name, average_price from models where average_price > ? order by average_price asc"
        );
        assert_eq!(params, vec![100_000]);
    }

    #[test]
    fn test_build_price_filter_query_with_upper_bound_only() {
        let filter = PriceFilter {
            greater_than: None,
            lower_than: Some(500_000),
        };

        let (statement, params) = build_price_filter_query(&filter);

        assert_eq!(
            statement,
            "select id, name, average_price from models where average_price < ? order by average_price asc"
        );
        assert_eq!(params, vec![500_000]);
    }

    #[test]
    fn test_build_price_filter_query_with_both_bounds_combines_with_and() {
        let filter = PriceFilter {
            greater_than: Some(100_000),
            lower_than: Some(500_000),
        };

        let (statement, params) = build_price_filter_query(&filter);

        assert_eq!(
            statement,
            "select id, name, average_price from models where average_price > ? and average_price < ? order by average_price asc"
        );
        assert_eq!(params, vec![100_000, 500_000]);
    }

    #[tokio::test]
    async fn test_list_models_filtered_without_bounds_returns_all_ascending() {
        let (_, model_bmc, _) = seeded_bmcs().await;

        let models = model_bmc.list_models_filtered(PriceFilter::default()).await.unwrap();

        let prices: Vec<Option<i64>> = models.iter().map(|model| model.average_price).collect();
        assert_eq!(prices, vec![Some(150_000), Some(400_000), Some(900_000)]);
    }

    #[tokio::test]
    async fn test_list_models_filtered_applies_exclusive_bounds() {
        let (_, model_bmc, _) = seeded_bmcs().await;

        let filter = PriceFilter {
            greater_than: Some(150_000),
            lower_than: Some(900_000),
        };

        let models = model_bmc.list_models_filtered(filter).await.unwrap();

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "Sentra");
    }

    #[tokio::test]
    async fn test_list_models_filtered_with_contradictory_bounds_is_empty_not_an_error() {
        let (_, model_bmc, _) = seeded_bmcs().await;

        let filter = PriceFilter {
            greater_than: Some(500_000),
            lower_than: Some(100_000),
        };

        let models = model_bmc.list_models_filtered(filter).await.unwrap();

        assert!(models.is_empty());
    }

    #[tokio::test]
    async fn test_count_models_matches_inserted_rows() {
        let (_, model_bmc, _) = seeded_bmcs().await;

        assert_eq!(model_bmc.count_models().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_create_model_under_unknown_brand_is_not_found() {
        let mm = test_model_manager().await;
        let model_bmc = DbModelBmc { mm };

        let result = model_bmc.create_model(7, new_model("Sentra", Some(350_000))).await;

        assert!(matches!(result, Err(StoreError::BrandNotFound(7))));
    }

    #[tokio::test]
    async fn test_create_model_with_duplicate_name_under_same_brand_conflicts() {
        let (_, model_bmc, brand_id) = seeded_bmcs().await;

        let result = model_bmc.create_model(brand_id, new_model("Sentra", Some(410_000))).await;

        assert!(matches!(result, Err(StoreError::ModelAlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_create_model_rejects_average_price_at_or_below_minimum() {
        let (_, model_bmc, brand_id) = seeded_bmcs().await;

        let at_minimum = model_bmc.create_model(brand_id, new_model("Tsuru", Some(100_000))).await;
        assert!(matches!(at_minimum, Err(StoreError::AveragePriceTooLow(100_000))));

        let just_above = model_bmc.create_model(brand_id, new_model("Tsuru", Some(100_001))).await;
        assert!(just_above.is_ok());
    }

    #[tokio::test]
    async fn test_create_model_without_average_price_is_allowed() {
        let (_, model_bmc, brand_id) = seeded_bmcs().await;

        let created = model_bmc.create_model(brand_id, new_model("Kicks", None)).await.unwrap();

        assert_eq!(created.average_price, None);
        assert_eq!(created.brand_id, Some(brand_id));
    }

    #[tokio::test]
    async fn test_update_average_price_of_unknown_model_is_not_found() {
        let mm = test_model_manager().await;
        let model_bmc = DbModelBmc { mm };

        let result = model_bmc.update_average_price(99, 500_000).await;

        assert!(matches!(result, Err(StoreError::ModelNotFound(99))));
    }

    #[tokio::test]
    async fn test_update_average_price_rejection_leaves_stored_price_unchanged() {
        let (_, model_bmc, brand_id) = seeded_bmcs().await;

        let result = model_bmc.update_average_price(1, 90_000).await;
        assert!(matches!(result, Err(StoreError::AveragePriceTooLow(90_000))));

        let models = model_bmc.list_models_of_brand(brand_id).await.unwrap();
        assert_eq!(models[0].average_price, Some(150_000));
    }

    #[tokio::test]
    async fn test_update_average_price_persists_the_new_value() {
        let (_, model_bmc, brand_id) = seeded_bmcs().await;

        let updated = model_bmc.update_average_price(1, 175_000).await.unwrap();
        assert_eq!(updated, UpdatedModelPrice { id: 1, average_price: 175_000 });

        let models = model_bmc.list_models_of_brand(brand_id).await.unwrap();
        assert_eq!(models[0].average_price, Some(175_000));
    }

    #[tokio::test]
    async fn test_in_memory_model_bmc_matches_db_filter_semantics() {
        let catalog = Arc::new(RwLock::new(InMemoryCatalog::new()));
        let brand_bmc = crate::bmc::InMemoryBrandBmc::new(Arc::clone(&catalog));
        let model_bmc = InMemoryModelBmc::new(catalog);

        let brand = brand_bmc.create_brand("Nissan".to_string()).await.unwrap();
        model_bmc.create_model(brand.id, new_model("GT-R", Some(900_000))).await.unwrap();
        model_bmc.create_model(brand.id, new_model("March", Some(150_000))).await.unwrap();

        let filter = PriceFilter {
            greater_than: Some(100_000),
            lower_than: None,
        };

        let models = model_bmc.list_models_filtered(filter).await.unwrap();

        let names: Vec<&str> = models.iter().map(|model| model.name.as_str()).collect();
        assert_eq!(names, vec!["March", "GT-R"]);

        let contradictory = PriceFilter {
            greater_than: Some(500_000),
            lower_than: Some(100_000),
        };
        assert!(model_bmc.list_models_filtered(contradictory).await.unwrap().is_empty());
    }
}

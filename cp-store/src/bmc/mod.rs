use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use mockall::automock;
use tokio::sync::RwLock;

use cp_domain::{Brand, Model};

use crate::DbModelManager;

pub mod brand_bmc;
pub mod model_bmc;

pub use brand_bmc::*;
pub use model_bmc::*;

#[automock]
pub trait Bmc: Send + Sync + Debug {
    fn brand_bmc(&self) -> Arc<dyn BrandBmcTrait>;
    fn model_bmc(&self) -> Arc<dyn ModelBmcTrait>;
}

#[derive(Debug, Clone)]
pub struct DbBmc {
    pub db_model_manager: DbModelManager,
    brand_bmc: Arc<DbBrandBmc>,
    model_bmc: Arc<DbModelBmc>,
}

impl DbBmc {
    pub fn new(mm: DbModelManager) -> Self {
        Self {
            db_model_manager: mm.clone(),
            brand_bmc: Arc::new(DbBrandBmc { mm: mm.clone() }),
            model_bmc: Arc::new(DbModelBmc { mm: mm.clone() }),
        }
    }
}

impl Bmc for DbBmc {
    fn brand_bmc(&self) -> Arc<dyn BrandBmcTrait> {
        self.brand_bmc.clone() as Arc<dyn BrandBmcTrait>
    }

    fn model_bmc(&self) -> Arc<dyn ModelBmcTrait> {
        self.model_bmc.clone() as Arc<dyn ModelBmcTrait>
    }
}

/// Backing state for the in-memory backend. Brand and model controllers
/// share it so brand-existence checks see the same data.
#[derive(Debug)]
pub struct InMemoryCatalog {
    pub(crate) brands: HashMap<i64, Brand>,
    pub(crate) models: HashMap<i64, Model>,
    pub(crate) next_brand_id: i64,
    pub(crate) next_model_id: i64,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            brands: Default::default(),
            models: Default::default(),
            next_brand_id: 1,
            next_model_id: 1,
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct InMemoryBmc {
    pub in_mem_brand_bmc: Arc<InMemoryBrandBmc>,
    pub in_mem_model_bmc: Arc<InMemoryModelBmc>,
}

impl InMemoryBmc {
    pub fn new() -> Self {
        let catalog = Arc::new(RwLock::new(InMemoryCatalog::new()));

        Self {
            in_mem_brand_bmc: Arc::new(InMemoryBrandBmc::new(Arc::clone(&catalog))),
            in_mem_model_bmc: Arc::new(InMemoryModelBmc::new(catalog)),
        }
    }
}

impl Default for InMemoryBmc {
    fn default() -> Self {
        Self::new()
    }
}

impl Bmc for InMemoryBmc {
    fn brand_bmc(&self) -> Arc<dyn BrandBmcTrait> {
        Arc::clone(&self.in_mem_brand_bmc) as Arc<dyn BrandBmcTrait>
    }

    fn model_bmc(&self) -> Arc<dyn ModelBmcTrait> {
        Arc::clone(&self.in_mem_model_bmc) as Arc<dyn ModelBmcTrait>
    }
}

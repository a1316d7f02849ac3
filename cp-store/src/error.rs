use thiserror::Error;

/// Conditions a storage operation can surface. The HTTP boundary maps each
/// variant to a status code exactly once; nothing below it decides statuses.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("average price must be greater than 100000, got {0}")]
    AveragePriceTooLow(i64),
    #[error("brand {0} not found")]
    BrandNotFound(i64),
    #[error("model {0} not found")]
    ModelNotFound(i64),
    #[error("brand '{0}' already exists")]
    BrandAlreadyExists(String),
    #[error("model '{name}' already exists for brand {brand_id}")]
    ModelAlreadyExists { name: String, brand_id: i64 },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

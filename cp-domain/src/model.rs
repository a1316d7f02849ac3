use serde::{Deserialize, Serialize};

/// Lower bound (exclusive) for an average price accepted on the write path.
pub const MIN_AVERAGE_PRICE: i64 = 100_000;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Brand {
    pub id: i64,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub id: i64,
    pub name: String,
    pub average_price: Option<i64>,
    pub brand_id: Option<i64>,
}

/// Listing shape shared by `/models`, `/brands/{id}/models` and the
/// filtered queries.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub id: i64,
    pub name: String,
    pub average_price: Option<i64>,
}

/// One row of `/brands`: the brand plus the average of its models' prices,
/// rounded to two decimals. `None` when the brand has no priced models.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BrandWithAveragePrice {
    pub id: i64,
    pub name: String,
    pub average_price: Option<f64>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewModel {
    pub name: String,
    pub average_price: Option<i64>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateBrandPayload {
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UpdateModelPricePayload {
    pub average_price: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UpdatedModelPrice {
    pub id: i64,
    pub average_price: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ModelCount {
    pub total: i64,
}

/// Optional price bounds for the model listing. Both bounds are exclusive;
/// contradictory bounds are legal and simply select nothing.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceFilter {
    pub greater_than: Option<i64>,
    pub lower_than: Option<i64>,
}

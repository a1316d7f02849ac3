use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use cp_domain::{
    Brand, BrandWithAveragePrice, CreateBrandPayload, Model, ModelCount, ModelSummary, NewModel, PriceFilter,
    UpdateModelPricePayload, UpdatedModelPrice,
};
use cp_store::Bmc;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub bmc: Arc<dyn Bmc>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/models_qty", get(models_qty))
        .route("/brands", get(list_brands).post(create_brand))
        .route("/brands/{brand_id}/models", get(list_models_of_brand).post(create_model))
        .route("/models", get(list_models))
        .route("/models/{model_id}", put(update_model_price))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Query parameters of `/models`; both price bounds are optional.
#[derive(Debug, Default, Deserialize)]
pub struct ModelListingParams {
    pub greater: Option<i64>,
    pub lower: Option<i64>,
}

async fn models_qty(State(state): State<AppState>) -> Result<Json<ModelCount>, ApiError> {
    let total = state.bmc.model_bmc().count_models().await?;

    Ok(Json(ModelCount { total }))
}

async fn list_brands(State(state): State<AppState>) -> Result<Json<Vec<BrandWithAveragePrice>>, ApiError> {
    let brands = state.bmc.brand_bmc().list_brands_with_average_price().await?;

    Ok(Json(brands))
}

async fn list_models_of_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<i64>,
) -> Result<Json<Vec<ModelSummary>>, ApiError> {
    let models = state.bmc.model_bmc().list_models_of_brand(brand_id).await?;

    Ok(Json(models))
}

async fn list_models(
    State(state): State<AppState>,
    Query(params): Query<ModelListingParams>,
) -> Result<Json<Vec<ModelSummary>>, ApiError> {
    let filter = PriceFilter {
        greater_than: params.greater,
        lower_than: params.lower,
    };

    let models = state.bmc.model_bmc().list_models_filtered(filter).await?;

    Ok(Json(models))
}

async fn create_brand(
    State(state): State<AppState>,
    Json(payload): Json<CreateBrandPayload>,
) -> Result<(StatusCode, Json<Brand>), ApiError> {
    let brand = state.bmc.brand_bmc().create_brand(payload.name).await?;

    Ok((StatusCode::CREATED, Json(brand)))
}

async fn create_model(
    State(state): State<AppState>,
    Path(brand_id): Path<i64>,
    Json(new_model): Json<NewModel>,
) -> Result<(StatusCode, Json<Model>), ApiError> {
    let model = state.bmc.model_bmc().create_model(brand_id, new_model).await?;

    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_model_price(
    State(state): State<AppState>,
    Path(model_id): Path<i64>,
    Json(payload): Json<UpdateModelPricePayload>,
) -> Result<Json<UpdatedModelPrice>, ApiError> {
    let updated = state
        .bmc
        .model_bmc()
        .update_average_price(model_id, payload.average_price)
        .await?;

    Ok(Json(updated))
}

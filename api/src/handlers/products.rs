use axum::{extract::State, http::StatusCode, Json};

use crate::{
    db::products::ProductRepository,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    models::{
        product::{CreateProduct, Product, ProductFilter, StockAdjustment, UpdateProduct},
        validation::Validate,
        MessageResponse,
    },
    AppState,
};

pub async fn list(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<ProductFilter>,
) -> Result<Json<Vec<Product>>, AppError> {
    filter.validate()?;
    let products = ProductRepository::new(&state.db).list(&filter).await?;
    Ok(Json(products))
}

pub async fn get(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Product>, AppError> {
    ProductRepository::new(&state.db)
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Product", id))
}

pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    input.validate()?;
    let product = ProductRepository::new(&state.db).create(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<UpdateProduct>,
) -> Result<Json<Product>, AppError> {
    input.validate()?;
    ProductRepository::new(&state.db)
        .update(id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Product", id))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<StockAdjustment>,
) -> Result<Json<Product>, AppError> {
    ProductRepository::new(&state.db)
        .adjust_stock(id, input.quantity_change)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Product", id))
}

pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !ProductRepository::new(&state.db).delete(id).await? {
        return Err(AppError::not_found("Product", id));
    }
    Ok(Json(MessageResponse::new(format!(
        "Product with id {id} deleted successfully"
    ))))
}

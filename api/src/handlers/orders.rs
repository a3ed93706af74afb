use axum::{extract::State, http::StatusCode, Json};

use crate::{
    db::orders::OrderRepository,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    models::{
        order::{CreateOrder, Order, OrderFilter, UpdateOrder},
        validation::Validate,
        MessageResponse,
    },
    AppState,
};

pub async fn list(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<OrderFilter>,
) -> Result<Json<Vec<Order>>, AppError> {
    filter.validate()?;
    let orders = OrderRepository::new(&state.db).list(&filter).await?;
    Ok(Json(orders))
}

pub async fn get(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Order>, AppError> {
    OrderRepository::new(&state.db)
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Order", id))
}

pub async fn list_for_customer(
    State(state): State<AppState>,
    AppPath(customer_id): AppPath<i64>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = OrderRepository::new(&state.db)
        .list_for_customer(customer_id)
        .await?;
    Ok(Json(orders))
}

/// Place an order. Either every line is accepted or nothing is written.
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateOrder>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    input.validate()?;
    let order = OrderRepository::new(&state.db).create(&input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<UpdateOrder>,
) -> Result<Json<Order>, AppError> {
    let Some(status) = input.status else {
        return Err(AppError::BadRequest("No update data provided".into()));
    };

    OrderRepository::new(&state.db)
        .update_status(id, status)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Order", id))
}

pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !OrderRepository::new(&state.db).delete(id).await? {
        return Err(AppError::not_found("Order", id));
    }
    Ok(Json(MessageResponse::new(format!(
        "Order with id {id} deleted successfully"
    ))))
}

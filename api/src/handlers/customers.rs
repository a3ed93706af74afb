use axum::{extract::State, http::StatusCode, Json};

use crate::{
    db::customers::CustomerRepository,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    models::{
        customer::{CreateCustomer, Customer, CustomerFilter, UpdateCustomer},
        validation::Validate,
        MessageResponse,
    },
    AppState,
};

pub async fn list(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<CustomerFilter>,
) -> Result<Json<Vec<Customer>>, AppError> {
    filter.validate()?;
    let customers = CustomerRepository::new(&state.db).list(&filter).await?;
    Ok(Json(customers))
}

pub async fn get(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Customer>, AppError> {
    CustomerRepository::new(&state.db)
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Customer", id))
}

pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCustomer>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    input.validate()?;
    let customer = CustomerRepository::new(&state.db).create(&input).await?;
    tracing::info!(customer_id = customer.id, "customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<UpdateCustomer>,
) -> Result<Json<Customer>, AppError> {
    input.validate()?;
    CustomerRepository::new(&state.db)
        .update(id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Customer", id))
}

pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !CustomerRepository::new(&state.db).delete(id).await? {
        return Err(AppError::not_found("Customer", id));
    }
    tracing::info!(customer_id = id, "customer deleted");
    Ok(Json(MessageResponse::new(format!(
        "Customer with id {id} deleted successfully"
    ))))
}

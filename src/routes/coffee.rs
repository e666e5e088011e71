//! Beverage endpoints under `/api/v1/coffee`.

use axum::{extract::State, Json};

use crate::coffee::{CoffeeService, Drink};
use crate::error::AppError;
use crate::state::AppState;

/// Recommend a drink, 404 when the upstream has nothing suitable.
pub async fn recommend(State(state): State<AppState>) -> Result<Json<Drink>, AppError> {
    state
        .coffee_service()
        .recommend()
        .await?
        .map(Json)
        .ok_or(AppError::NoRecommendation)
}

/// List every drink, hot first then iced.
pub async fn drinks(State(state): State<AppState>) -> Result<Json<Vec<Drink>>, AppError> {
    Ok(Json(state.coffee.get_all().await?))
}

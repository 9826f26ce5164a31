//! Meal API routes

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use meal_tracker_shared::{ApiResponse, CreateMealRequest, Meal, MealSummary, UpdateMealRequest};

/// Create meal routes
pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_meals).post(create_meal))
        .route("/:id", get(get_meal).put(update_meal).delete(delete_meal))
        .route("/summary/:date", get(daily_summary))
        .route("/category/:category", get(meals_by_category))
        .route("/init/sample-data", post(init_sample_data))
}

/// GET /api/meals - All meals, newest first
async fn list_meals(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Meal>>>> {
    let meals = state.meals().get_all_meals().await?;
    let message = format!("Found {} meals", meals.len());
    Ok(Json(ApiResponse::ok(meals, message)))
}

/// GET /api/meals/:id
async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Meal>>> {
    let meal = state.meals().get_meal_by_id(&id).await?;
    Ok(Json(ApiResponse::ok(meal, "Meal found successfully")))
}

/// POST /api/meals - Log a meal for today
async fn create_meal(
    State(state): State<AppState>,
    payload: Result<Json<CreateMealRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Meal>>)> {
    let Json(req) = payload?;
    let meal = state.meals().create_meal(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(meal, "Meal created successfully")),
    ))
}

/// PUT /api/meals/:id - Partial update
async fn update_meal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateMealRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Meal>>> {
    let Json(req) = payload?;
    let meal = state.meals().update_meal(&id, req).await?;
    Ok(Json(ApiResponse::ok(meal, "Meal updated successfully")))
}

/// DELETE /api/meals/:id
async fn delete_meal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.meals().delete_meal(&id).await?;
    Ok(Json(ApiResponse::message("Meal deleted successfully")))
}

/// GET /api/meals/summary/:date - Totals for one day
async fn daily_summary(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<ApiResponse<MealSummary>>> {
    let summary = state.meals().get_daily_summary(&date).await?;
    Ok(Json(ApiResponse::ok(
        summary,
        "Daily summary retrieved successfully",
    )))
}

/// GET /api/meals/category/:category
async fn meals_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Meal>>>> {
    let meals = state.meals().get_meals_by_category(&category).await?;
    let message = format!("Found {} {} meals", meals.len(), category);
    Ok(Json(ApiResponse::ok(meals, message)))
}

/// POST /api/meals/init/sample-data
async fn init_sample_data(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<()>>> {
    state.meals().initialize_sample_data().await?;
    Ok(Json(ApiResponse::message(
        "Sample data initialized successfully",
    )))
}

//! Recipe endpoints. Recipes are the resources comments attach to; their id
//! doubles as the realtime room id.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use ladle_common::Recipe;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/{recipe_id}", get(get_recipe))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub title: String,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "Recipes",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Recipe created", body = Recipe),
        (status = 400, description = "Validation failed", body = crate::error::ApiErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn create_recipe(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    let recipe = state.recipes.create_recipe(&user_id, &body.title).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "Recipes",
    responses(
        (status = 200, description = "All recipes, oldest first", body = [Recipe]),
    ),
)]
pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    Ok(Json(state.recipes.list_recipes().await?))
}

#[utoipa::path(
    get,
    path = "/api/recipes/{recipe_id}",
    tag = "Recipes",
    params(("recipe_id" = String, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "The recipe", body = Recipe),
        (status = 404, description = "Recipe not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    Ok(Json(state.recipes.get_recipe(&recipe_id).await?))
}

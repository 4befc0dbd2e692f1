//! Comment CRUD endpoints.
//!
//! These call the same `CommentStore` and `TokenVerifier` instances as the
//! realtime gateway, and publish through the same broadcaster after every
//! successful mutation, so clients who mutate over REST still light up
//! realtime subscribers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use ladle_common::Comment;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::error::ApiError;
use crate::gateway::broadcast::RoomEvent;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/recipes/{recipe_id}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/comments/{comment_id}",
            patch(update_comment).delete(delete_comment),
        )
}

// ---------------------------------------------------------------------------
// GET /api/recipes/:recipe_id/comments
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/recipes/{recipe_id}/comments",
    tag = "Comments",
    params(("recipe_id" = String, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = [Comment]),
        (status = 404, description = "Recipe not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    Ok(Json(state.comments.list_by_recipe(&recipe_id).await?))
}

// ---------------------------------------------------------------------------
// POST /api/recipes/:recipe_id/comments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub body: String,
}

#[utoipa::path(
    post,
    path = "/api/recipes/{recipe_id}/comments",
    tag = "Comments",
    security(("bearer" = [])),
    params(("recipe_id" = String, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Validation failed", body = crate::error::ApiErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ApiErrorBody),
        (status = 404, description = "Recipe not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn create_comment(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let comment = state.comments.create(&recipe_id, &user_id, &body.body).await?;

    state
        .broadcast
        .publish(&recipe_id, RoomEvent::Created(comment.clone()));

    Ok((StatusCode::CREATED, Json(comment)))
}

// ---------------------------------------------------------------------------
// PATCH /api/comments/:comment_id
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCommentRequest {
    pub body: String,
}

#[utoipa::path(
    patch,
    path = "/api/comments/{comment_id}",
    tag = "Comments",
    security(("bearer" = [])),
    params(("comment_id" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment updated", body = Comment),
        (status = 400, description = "Validation failed", body = crate::error::ApiErrorBody),
        (status = 401, description = "Unauthorized", body = crate::error::ApiErrorBody),
        (status = 403, description = "Not the author", body = crate::error::ApiErrorBody),
        (status = 404, description = "Comment not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn update_comment(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Json(body): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state.comments.update(&comment_id, &user_id, &body.body).await?;

    state
        .broadcast
        .publish(&comment.recipe_id, RoomEvent::Updated(comment.clone()));

    Ok(Json(comment))
}

// ---------------------------------------------------------------------------
// DELETE /api/comments/:comment_id
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/api/comments/{comment_id}",
    tag = "Comments",
    security(("bearer" = [])),
    params(("comment_id" = String, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized", body = crate::error::ApiErrorBody),
        (status = 403, description = "Not the author", body = crate::error::ApiErrorBody),
        (status = 404, description = "Comment not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn delete_comment(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state.comments.delete(&comment_id, &user_id).await?;

    state.broadcast.publish(
        &removed.recipe_id,
        RoomEvent::Deleted {
            comment_id: removed.id,
        },
    );

    Ok(StatusCode::NO_CONTENT)
}

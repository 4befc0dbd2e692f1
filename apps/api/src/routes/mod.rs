pub mod comments;
pub mod health;
pub mod recipes;

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .route("/api-doc/openapi.json", get(openapi_json))
        .nest("/api", recipes::router().merge(comments::router()))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Recipes
        recipes::create_recipe,
        recipes::list_recipes,
        recipes::get_recipe,
        // Comments
        comments::list_comments,
        comments::create_comment,
        comments::update_comment,
        comments::delete_comment,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            // Models
            ladle_common::Comment,
            ladle_common::Recipe,
            // Route request/response types
            health::HealthResponse,
            recipes::CreateRecipeRequest,
            comments::CreateCommentRequest,
            comments::UpdateCommentRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Recipes", description = "Recipe catalog"),
        (name = "Comments", description = "Recipe comments"),
    )
)]
pub struct ApiDoc;

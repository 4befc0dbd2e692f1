//! Storage seam for comments and recipes.
//!
//! Durable persistence is a collaborator behind these traits; the rest of the
//! system only sees the contract. `MemoryStore` implements both traits and is
//! what the binary and the tests run against.

pub mod memory;

use std::fmt;

use async_trait::async_trait;
use ladle_common::{Comment, Recipe};

/// Failure modes of the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The comment does not exist.
    CommentNotFound,
    /// The target recipe does not exist.
    RecipeNotFound,
    /// The requester is not the author of the comment. Checked before any
    /// mutation is applied, so a forbidden request has no side effect.
    Forbidden,
    /// A field failed validation.
    Validation {
        field: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn empty_field(field: &'static str) -> Self {
        StoreError::Validation {
            field,
            message: format!("{field} cannot be empty"),
        }
    }

    /// Stable machine-readable code, mirrored in REST responses and realtime
    /// error events.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::CommentNotFound | StoreError::RecipeNotFound => "NOT_FOUND",
            StoreError::Forbidden => "FORBIDDEN",
            StoreError::Validation { .. } => "VALIDATION_ERROR",
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::CommentNotFound => write!(f, "Comment not found"),
            StoreError::RecipeNotFound => write!(f, "Recipe not found"),
            StoreError::Forbidden => write!(f, "You can only modify your own comments"),
            StoreError::Validation { message, .. } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Authoritative CRUD for comments, including the ownership check for
/// mutations. Shared verbatim by the REST routes and the realtime gateway.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Create a comment. Any authenticated principal may comment on any
    /// existing recipe; fails only on an empty body or an unknown recipe.
    async fn create(
        &self,
        recipe_id: &str,
        author_id: &str,
        body: &str,
    ) -> Result<Comment, StoreError>;

    /// Replace a comment's body. Author-only.
    async fn update(
        &self,
        comment_id: &str,
        requester_id: &str,
        body: &str,
    ) -> Result<Comment, StoreError>;

    /// Delete a comment. Author-only. Returns the removed record so the
    /// caller can broadcast to the right room.
    async fn delete(&self, comment_id: &str, requester_id: &str) -> Result<Comment, StoreError>;

    /// All comments on a recipe, oldest first.
    async fn list_by_recipe(&self, recipe_id: &str) -> Result<Vec<Comment>, StoreError>;
}

/// Minimal recipe surface: enough to create the resources comments attach to
/// and to check they exist.
#[async_trait]
pub trait RecipeCatalog: Send + Sync {
    async fn create_recipe(&self, owner_id: &str, title: &str) -> Result<Recipe, StoreError>;

    async fn get_recipe(&self, recipe_id: &str) -> Result<Recipe, StoreError>;

    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError>;

    /// Cheap existence probe. The comment paths call this before accepting a
    /// write, so comments can never attach to a recipe id nobody created.
    async fn recipe_exists(&self, recipe_id: &str) -> Result<bool, StoreError>;
}

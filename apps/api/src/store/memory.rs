//! In-memory store implementation.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use ladle_common::id::PrefixedId;
use ladle_common::{Comment, Recipe};

use super::{CommentStore, RecipeCatalog, StoreError};

/// DashMap-backed store. Backs the server in single-process deployments and
/// every test suite.
pub struct MemoryStore {
    recipes: DashMap<String, Recipe>,
    comments: DashMap<String, Comment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            recipes: DashMap::new(),
            comments: DashMap::new(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create(
        &self,
        recipe_id: &str,
        author_id: &str,
        body: &str,
    ) -> Result<Comment, StoreError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(StoreError::empty_field("body"));
        }
        if !self.recipe_exists(recipe_id).await? {
            return Err(StoreError::RecipeNotFound);
        }

        let now = Utc::now();
        let comment = Comment {
            id: Comment::generate(),
            recipe_id: recipe_id.to_string(),
            author_id: author_id.to_string(),
            body: body.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.comments.insert(comment.id.clone(), comment.clone());
        Ok(comment)
    }

    async fn update(
        &self,
        comment_id: &str,
        requester_id: &str,
        body: &str,
    ) -> Result<Comment, StoreError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(StoreError::empty_field("body"));
        }

        let mut entry = self
            .comments
            .get_mut(comment_id)
            .ok_or(StoreError::CommentNotFound)?;
        if entry.author_id != requester_id {
            return Err(StoreError::Forbidden);
        }

        entry.body = body.to_string();
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete(&self, comment_id: &str, requester_id: &str) -> Result<Comment, StoreError> {
        // Ownership check first, so a forbidden delete leaves the record
        // untouched.
        {
            let entry = self
                .comments
                .get(comment_id)
                .ok_or(StoreError::CommentNotFound)?;
            if entry.author_id != requester_id {
                return Err(StoreError::Forbidden);
            }
        }

        self.comments
            .remove(comment_id)
            .map(|(_, comment)| comment)
            .ok_or(StoreError::CommentNotFound)
    }

    async fn list_by_recipe(&self, recipe_id: &str) -> Result<Vec<Comment>, StoreError> {
        if !self.recipe_exists(recipe_id).await? {
            return Err(StoreError::RecipeNotFound);
        }

        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| entry.recipe_id == recipe_id)
            .map(|entry| entry.clone())
            .collect();
        comments.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(comments)
    }
}

#[async_trait]
impl RecipeCatalog for MemoryStore {
    async fn create_recipe(&self, owner_id: &str, title: &str) -> Result<Recipe, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::empty_field("title"));
        }

        let recipe = Recipe {
            id: Recipe::generate(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            created_at: Utc::now(),
        };
        self.recipes.insert(recipe.id.clone(), recipe.clone());
        Ok(recipe)
    }

    async fn get_recipe(&self, recipe_id: &str) -> Result<Recipe, StoreError> {
        self.recipes
            .get(recipe_id)
            .map(|entry| entry.clone())
            .ok_or(StoreError::RecipeNotFound)
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        let mut recipes: Vec<Recipe> = self.recipes.iter().map(|entry| entry.clone()).collect();
        recipes.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(recipes)
    }

    async fn recipe_exists(&self, recipe_id: &str) -> Result<bool, StoreError> {
        Ok(self.recipes.contains_key(recipe_id))
    }
}

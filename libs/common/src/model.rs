//! Shared data model for recipes and their comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::id::{prefix, PrefixedId};

/// A comment on a recipe.
///
/// Belongs to exactly one recipe and exactly one author; both links are set at
/// creation and never change. Only the body (and `updated_at`) mutate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub recipe_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrefixedId for Comment {
    const PREFIX: &'static str = prefix::COMMENT;
}

/// A recipe. Comments attach to it; its id doubles as the room id for
/// realtime subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl PrefixedId for Recipe {
    const PREFIX: &'static str = prefix::RECIPE;
}

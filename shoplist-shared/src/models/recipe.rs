use serde::{Deserialize, Serialize};

use super::{GroupId, OrderEntry, Timestamp, User, amount, lenient_number};

pub type RecipeId = i64;
pub type IngredientId = i64;

/// A recipe shared within a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: RecipeId,
    pub group: GroupId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Image URL, when one was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Cooking time in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeIngredient {
    pub id: IngredientId,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient_number::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl RecipeIngredient {
    #[must_use]
    pub fn amount(&self) -> Option<String> {
        amount(self.quantity, self.unit.as_deref())
    }
}

/// Text fields of the multipart recipe form used on create and update.
///
/// The image travels as a separate file part and is not part of this struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFields {
    pub group: Option<GroupId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub cooking_time: Option<u32>,
    pub servings: Option<u32>,
}

impl RecipeFields {
    /// Form field pairs in submission order, skipping unset fields.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(group) = self.group {
            pairs.push(("group", group.to_string()));
        }
        if let Some(title) = &self.title {
            pairs.push(("title", title.clone()));
        }
        if let Some(description) = &self.description {
            pairs.push(("description", description.clone()));
        }
        if let Some(cooking_time) = self.cooking_time {
            pairs.push(("cooking_time", cooking_time.to_string()));
        }
        if let Some(servings) = self.servings {
            pairs.push(("servings", servings.to_string()));
        }
        pairs
    }
}

/// Body of `POST recipes/ingredients/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateIngredientRequest {
    pub recipe: RecipeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Body of `PATCH recipes/ingredients/{id}/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateIngredientRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Body of `POST recipes/ingredients/reorder/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReorderIngredientsRequest {
    pub ingredients: Vec<OrderEntry>,
}

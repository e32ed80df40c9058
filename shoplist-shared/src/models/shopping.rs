use serde::{Deserialize, Serialize};

use super::{GroupId, Timestamp, User, amount, lenient_number};

pub type ShoppingListId = i64;
pub type ShoppingItemId = i64;

/// A shopping list belonging to a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingList {
    pub id: ShoppingListId,
    pub group: GroupId,
    pub name: String,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub items: Vec<ShoppingItem>,
    #[serde(default)]
    pub items_count: u32,
    #[serde(default)]
    pub checked_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl ShoppingList {
    /// Progress as `checked/total`.
    #[must_use]
    pub fn progress(&self) -> String {
        format!("{}/{}", self.checked_count, self.items_count)
    }
}

/// One entry on a shopping list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingItem {
    pub id: ShoppingItemId,
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
    pub is_checked: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<User>,
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl ShoppingItem {
    /// Quantity and unit rendered together, e.g. `1.5 kg`.
    #[must_use]
    pub fn amount(&self) -> Option<String> {
        amount(self.quantity, self.unit.as_deref())
    }
}

/// Body of `POST shopping/lists/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateShoppingListRequest {
    pub group: GroupId,
    pub name: String,
}

/// Body of `PATCH shopping/lists/{id}/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateShoppingListRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
}

/// Body of `POST shopping/items/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateShoppingItemRequest {
    pub shopping_list: ShoppingListId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Body of `PATCH shopping/items/{id}/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateShoppingItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
}

/// Position assignment used by the reorder endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderEntry {
    pub id: i64,
    pub order: i32,
}

impl OrderEntry {
    /// Number `ids` consecutively from zero in the order given.
    #[must_use]
    pub fn sequence(ids: &[i64]) -> Vec<Self> {
        ids.iter()
            .zip(0..)
            .map(|(&id, order)| Self { id, order })
            .collect()
    }
}

/// Body of `POST shopping/items/reorder/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReorderItemsRequest {
    pub items: Vec<OrderEntry>,
}

//! Serde models for every resource the ShopList API exposes.

pub mod auth;
pub mod errors;
pub mod group;
pub mod invitation;
pub mod recipe;
pub mod shopping;
pub mod timestamp;
pub mod user;

pub use auth::{
    AuthTokens, LoginCredentials, RefreshRequest, RefreshResponse, RegisterData, RegisterResponse,
};
pub use errors::{ErrorResponse, FieldErrors};
pub use group::{
    CreateGroupRequest, Group, GroupId, GroupMembership, RemoveMemberRequest,
    SendInvitationRequest, UpdateGroupRequest,
};
pub use invitation::{Invitation, InvitationStatus};
pub use recipe::{
    CreateIngredientRequest, IngredientId, Recipe, RecipeFields, RecipeId, RecipeIngredient,
    ReorderIngredientsRequest, UpdateIngredientRequest,
};
pub use shopping::{
    CreateShoppingItemRequest, CreateShoppingListRequest, OrderEntry, ReorderItemsRequest,
    ShoppingItem, ShoppingItemId, ShoppingList, ShoppingListId, UpdateShoppingItemRequest,
    UpdateShoppingListRequest,
};
pub use timestamp::Timestamp;
pub use user::{User, UserId};

/// Render a quantity and unit together, trimming a redundant `.0`.
pub(crate) fn amount(quantity: Option<f64>, unit: Option<&str>) -> Option<String> {
    let quantity = quantity?;
    let number = if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        quantity.to_string()
    };
    match unit.map(str::trim).filter(|unit| !unit.is_empty()) {
        Some(unit) => Some(format!("{number} {unit}")),
        None => Some(number),
    }
}

/// Decimal fields arrive either as JSON numbers or as decimal strings.
pub(crate) mod lenient_number {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(value)) => Ok(Some(value)),
            Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(Raw::Text(text)) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid decimal `{text}`"))),
        }
    }
}

use reqwest::Method;
use shared::models::{
    CreateShoppingItemRequest, CreateShoppingListRequest, GroupId, OrderEntry,
    ReorderItemsRequest, ShoppingItem, ShoppingItemId, ShoppingList, ShoppingListId,
    UpdateShoppingItemRequest, UpdateShoppingListRequest,
};
use tracing::instrument;

use super::ApiClient;
use crate::error::ClientResult;

const LISTS_PATH: &str = "shopping/lists/";
const ITEMS_PATH: &str = "shopping/items/";

fn list_path(id: ShoppingListId) -> String {
    format!("{LISTS_PATH}{id}/")
}

fn item_path(id: ShoppingItemId) -> String {
    format!("{ITEMS_PATH}{id}/")
}

impl ApiClient {
    /// Shopping lists of a group, pinned lists first as the server orders them.
    ///
    /// # Errors
    /// Propagates any API failure.
    pub async fn list_shopping_lists(&self, group: GroupId) -> ClientResult<Vec<ShoppingList>> {
        self.get_json(LISTS_PATH, &[("group", group.to_string())])
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    pub async fn get_shopping_list(&self, id: ShoppingListId) -> ClientResult<ShoppingList> {
        self.get_json(&list_path(id), &[]).await
    }

    /// # Errors
    /// [`crate::ClientError::Validation`] when the name is rejected.
    #[instrument(skip(self))]
    pub async fn create_shopping_list(
        &self,
        group: GroupId,
        name: &str,
    ) -> ClientResult<ShoppingList> {
        let request = CreateShoppingListRequest {
            group,
            name: name.to_string(),
        };
        self.send_json(Method::POST, LISTS_PATH, Some(&request))
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self, patch))]
    pub async fn update_shopping_list(
        &self,
        id: ShoppingListId,
        patch: &UpdateShoppingListRequest,
    ) -> ClientResult<ShoppingList> {
        self.send_json(Method::PATCH, &list_path(id), Some(patch))
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self))]
    pub async fn delete_shopping_list(&self, id: ShoppingListId) -> ClientResult<()> {
        self.send_unit::<()>(Method::DELETE, &list_path(id), None)
            .await
    }

    /// Flip the pinned flag of a list.
    ///
    /// # Errors
    /// Propagates any API failure.
    pub async fn toggle_list_pin(&self, id: ShoppingListId) -> ClientResult<ShoppingList> {
        self.send_json::<(), _>(Method::POST, &format!("{LISTS_PATH}{id}/toggle_pin/"), None)
            .await
    }

    /// Items of a list in their stored order.
    ///
    /// # Errors
    /// Propagates any API failure.
    pub async fn list_items(&self, list: ShoppingListId) -> ClientResult<Vec<ShoppingItem>> {
        self.get_json(ITEMS_PATH, &[("shopping_list", list.to_string())])
            .await
    }

    /// # Errors
    /// [`crate::ClientError::Validation`] when the server rejects the fields.
    #[instrument(skip_all, fields(list = request.shopping_list, name = %request.name))]
    pub async fn add_item(&self, request: &CreateShoppingItemRequest) -> ClientResult<ShoppingItem> {
        self.send_json(Method::POST, ITEMS_PATH, Some(request))
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self, patch))]
    pub async fn update_item(
        &self,
        id: ShoppingItemId,
        patch: &UpdateShoppingItemRequest,
    ) -> ClientResult<ShoppingItem> {
        self.send_json(Method::PATCH, &item_path(id), Some(patch))
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: ShoppingItemId) -> ClientResult<()> {
        self.send_unit::<()>(Method::DELETE, &item_path(id), None)
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    pub async fn toggle_item_check(&self, id: ShoppingItemId) -> ClientResult<ShoppingItem> {
        self.send_json::<(), _>(Method::POST, &format!("{ITEMS_PATH}{id}/toggle_check/"), None)
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    pub async fn toggle_item_pin(&self, id: ShoppingItemId) -> ClientResult<ShoppingItem> {
        self.send_json::<(), _>(Method::POST, &format!("{ITEMS_PATH}{id}/toggle_pin/"), None)
            .await
    }

    /// Store `ids` as the new item order, first id at position zero.
    ///
    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self))]
    pub async fn reorder_items(&self, ids: &[ShoppingItemId]) -> ClientResult<()> {
        let request = ReorderItemsRequest {
            items: OrderEntry::sequence(ids),
        };
        self.send_unit(Method::POST, &format!("{ITEMS_PATH}reorder/"), Some(&request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_paths() {
        assert_eq!(list_path(3), "shopping/lists/3/");
        assert_eq!(item_path(41), "shopping/items/41/");
    }

    #[test]
    fn test_reorder_body_shape() {
        let request = ReorderItemsRequest {
            items: OrderEntry::sequence(&[9, 4]),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"items": [{"id": 9, "order": 0}, {"id": 4, "order": 1}]})
        );
    }
}

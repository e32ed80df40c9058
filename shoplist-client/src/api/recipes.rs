use std::{io, path::Path};

use reqwest::{
    Method,
    multipart::{Form, Part},
};
use shared::models::{
    CreateIngredientRequest, GroupId, IngredientId, OrderEntry, Recipe, RecipeFields, RecipeId,
    RecipeIngredient, ReorderIngredientsRequest, UpdateIngredientRequest,
};
use tracing::{debug, instrument};

use super::{ApiClient, decode};
use crate::error::ClientResult;

const RECIPES_PATH: &str = "recipes/recipes/";
const INGREDIENTS_PATH: &str = "recipes/ingredients/";

fn recipe_path(id: RecipeId) -> String {
    format!("{RECIPES_PATH}{id}/")
}

fn ingredient_path(id: IngredientId) -> String {
    format!("{INGREDIENTS_PATH}{id}/")
}

/// An image file attached to a recipe form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

impl RecipeImage {
    /// Read an image from disk, guessing its content type from the extension.
    ///
    /// # Errors
    /// Returns the I/O error if the file cannot be read.
    pub async fn load(path: &Path) -> io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());
        Ok(Self {
            content_type: content_type_for(path),
            file_name,
            bytes,
        })
    }

    fn part(&self) -> Part {
        let part = Part::bytes(self.bytes.clone()).file_name(self.file_name.clone());
        match part.mime_str(self.content_type) {
            Ok(part) => part,
            Err(err) => {
                debug!(error = %err, "unusable image content type; sending without one");
                Part::bytes(self.bytes.clone()).file_name(self.file_name.clone())
            }
        }
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn recipe_form(fields: &RecipeFields, image: Option<&RecipeImage>) -> Form {
    let form = fields
        .pairs()
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));
    match image {
        Some(image) => form.part("image", image.part()),
        None => form,
    }
}

impl ApiClient {
    /// Recipes of a group.
    ///
    /// # Errors
    /// Propagates any API failure.
    pub async fn list_recipes(&self, group: GroupId) -> ClientResult<Vec<Recipe>> {
        self.get_json(RECIPES_PATH, &[("group", group.to_string())])
            .await
    }

    /// A recipe with its ingredients.
    ///
    /// # Errors
    /// Propagates any API failure.
    pub async fn get_recipe(&self, id: RecipeId) -> ClientResult<Recipe> {
        self.get_json(&recipe_path(id), &[]).await
    }

    /// Create a recipe from a multipart form.
    ///
    /// # Errors
    /// [`crate::ClientError::Validation`] when the server rejects the fields.
    #[instrument(skip_all, fields(group = fields.group))]
    pub async fn create_recipe(
        &self,
        fields: &RecipeFields,
        image: Option<&RecipeImage>,
    ) -> ClientResult<Recipe> {
        self.send_form(Method::POST, RECIPES_PATH, fields, image)
            .await
    }

    /// Update the given recipe fields, optionally replacing the image.
    ///
    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self, fields, image))]
    pub async fn update_recipe(
        &self,
        id: RecipeId,
        fields: &RecipeFields,
        image: Option<&RecipeImage>,
    ) -> ClientResult<Recipe> {
        self.send_form(Method::PATCH, &recipe_path(id), fields, image)
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self))]
    pub async fn delete_recipe(&self, id: RecipeId) -> ClientResult<()> {
        self.send_unit::<()>(Method::DELETE, &recipe_path(id), None)
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    pub async fn toggle_recipe_pin(&self, id: RecipeId) -> ClientResult<Recipe> {
        self.send_json::<(), _>(Method::POST, &format!("{RECIPES_PATH}{id}/toggle_pin/"), None)
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    pub async fn list_ingredients(&self, recipe: RecipeId) -> ClientResult<Vec<RecipeIngredient>> {
        self.get_json(INGREDIENTS_PATH, &[("recipe", recipe.to_string())])
            .await
    }

    /// # Errors
    /// [`crate::ClientError::Validation`] when the server rejects the fields.
    #[instrument(skip_all, fields(recipe = request.recipe, name = %request.name))]
    pub async fn add_ingredient(
        &self,
        request: &CreateIngredientRequest,
    ) -> ClientResult<RecipeIngredient> {
        self.send_json(Method::POST, INGREDIENTS_PATH, Some(request))
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self, patch))]
    pub async fn update_ingredient(
        &self,
        id: IngredientId,
        patch: &UpdateIngredientRequest,
    ) -> ClientResult<RecipeIngredient> {
        self.send_json(Method::PATCH, &ingredient_path(id), Some(patch))
            .await
    }

    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self))]
    pub async fn delete_ingredient(&self, id: IngredientId) -> ClientResult<()> {
        self.send_unit::<()>(Method::DELETE, &ingredient_path(id), None)
            .await
    }

    /// Store `ids` as the new ingredient order, first id at position zero.
    ///
    /// # Errors
    /// Propagates any API failure.
    #[instrument(skip(self))]
    pub async fn reorder_ingredients(&self, ids: &[IngredientId]) -> ClientResult<()> {
        let request = ReorderIngredientsRequest {
            ingredients: OrderEntry::sequence(ids),
        };
        self.send_unit(
            Method::POST,
            &format!("{INGREDIENTS_PATH}reorder/"),
            Some(&request),
        )
        .await
    }

    async fn send_form(
        &self,
        method: Method,
        path: &str,
        fields: &RecipeFields,
        image: Option<&RecipeImage>,
    ) -> ClientResult<Recipe> {
        let url = self.api_url(path);
        debug!(%method, %url, with_image = image.is_some(), "sending recipe form");
        let response = self
            .send_with_refresh(|| {
                self.client
                    .request(method.clone(), url.as_str())
                    .multipart(recipe_form(fields, image))
            })
            .await?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("borscht.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("cake.webp")), "image/webp");
        assert_eq!(content_type_for(Path::new("notes")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_load_reads_file_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pie.png");
        tokio::fs::write(&path, [0x89, b'P', b'N', b'G']).await.unwrap();

        let image = RecipeImage::load(&path).await.unwrap();

        assert_eq!(image.file_name, "pie.png");
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes.len(), 4);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();

        assert!(RecipeImage::load(&dir.path().join("absent.png")).await.is_err());
    }
}

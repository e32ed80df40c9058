use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use client::RecipeImage;
use shared::models::{
    CreateIngredientRequest, GroupId, IngredientId, Recipe, RecipeFields, RecipeId,
    RecipeIngredient, UpdateIngredientRequest,
};

use super::pin_marker;
use crate::app::App;

/// Optional recipe fields shared by `create` and `update`.
#[derive(Args, Debug)]
pub struct RecipeDetails {
    #[arg(long, short)]
    description: Option<String>,
    /// Cooking time in minutes
    #[arg(long, short = 't')]
    cooking_time: Option<u32>,
    #[arg(long, short)]
    servings: Option<u32>,
    /// Image file to upload with the recipe
    #[arg(long, short)]
    image: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum RecipesCommand {
    /// List a group's recipes
    List {
        /// Group to list; defaults to the selected group
        #[arg(long, short)]
        group: Option<GroupId>,
    },
    /// Show a recipe with its ingredients
    Show { id: RecipeId },
    /// Create a recipe
    Create {
        title: String,
        #[arg(long, short)]
        group: Option<GroupId>,
        #[command(flatten)]
        details: RecipeDetails,
    },
    /// Change a recipe's fields or image
    Update {
        id: RecipeId,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        details: RecipeDetails,
    },
    /// Delete a recipe
    Delete { id: RecipeId },
    /// Pin or unpin a recipe
    Pin { id: RecipeId },
}

#[derive(Subcommand, Debug)]
pub enum IngredientsCommand {
    /// Add an ingredient to a recipe
    Add {
        recipe: RecipeId,
        name: String,
        #[arg(long, short)]
        quantity: Option<f64>,
        #[arg(long, short)]
        unit: Option<String>,
    },
    /// Change an ingredient's name or amount
    Update {
        id: IngredientId,
        #[arg(long, short)]
        name: Option<String>,
        #[arg(long, short)]
        quantity: Option<f64>,
        #[arg(long, short)]
        unit: Option<String>,
    },
    /// Remove an ingredient
    Delete { id: IngredientId },
    /// Store a new ingredient order, first id on top
    Reorder {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<IngredientId>,
    },
}

pub async fn run_recipes(app: &App, command: RecipesCommand) -> Result<()> {
    app.require_user().await?;
    let api = app.api();

    match command {
        RecipesCommand::List { group } => {
            let group = app.group_or_current(group)?;
            let recipes = api.list_recipes(group).await?;
            if recipes.is_empty() {
                println!("No recipes in group #{group}.");
            }
            for recipe in recipes {
                println!(
                    "{} {:>5}  {}{}",
                    pin_marker(recipe.is_pinned),
                    recipe.id,
                    recipe.title,
                    summary(&recipe)
                );
            }
        }
        RecipesCommand::Show { id } => print_recipe(&api.get_recipe(id).await?),
        RecipesCommand::Create {
            title,
            group,
            details,
        } => {
            let fields = RecipeFields {
                group: Some(app.group_or_current(group)?),
                title: Some(title),
                ..details.fields()
            };
            let image = details.load_image().await?;
            let recipe = api.create_recipe(&fields, image.as_ref()).await?;
            println!("Created recipe {} (#{})", recipe.title, recipe.id);
        }
        RecipesCommand::Update { id, title, details } => {
            let fields = RecipeFields {
                title,
                ..details.fields()
            };
            let image = details.load_image().await?;
            if fields.pairs().is_empty() && image.is_none() {
                bail!("nothing to update; pass at least one field or --image");
            }
            let recipe = api.update_recipe(id, &fields, image.as_ref()).await?;
            println!("Updated recipe {} (#{})", recipe.title, recipe.id);
        }
        RecipesCommand::Delete { id } => {
            api.delete_recipe(id).await?;
            println!("Deleted recipe #{id}");
        }
        RecipesCommand::Pin { id } => {
            let recipe = api.toggle_recipe_pin(id).await?;
            let state = if recipe.is_pinned { "Pinned" } else { "Unpinned" };
            println!("{state} recipe {}", recipe.title);
        }
    }
    Ok(())
}

pub async fn run_ingredients(app: &App, command: IngredientsCommand) -> Result<()> {
    app.require_user().await?;
    let api = app.api();

    match command {
        IngredientsCommand::Add {
            recipe,
            name,
            quantity,
            unit,
        } => {
            let request = CreateIngredientRequest {
                recipe,
                name,
                quantity,
                unit,
            };
            print_ingredient(&api.add_ingredient(&request).await?);
        }
        IngredientsCommand::Update {
            id,
            name,
            quantity,
            unit,
        } => {
            if name.is_none() && quantity.is_none() && unit.is_none() {
                bail!("nothing to update; pass --name, --quantity or --unit");
            }
            let patch = UpdateIngredientRequest {
                name,
                quantity,
                unit,
            };
            print_ingredient(&api.update_ingredient(id, &patch).await?);
        }
        IngredientsCommand::Delete { id } => {
            api.delete_ingredient(id).await?;
            println!("Deleted ingredient #{id}");
        }
        IngredientsCommand::Reorder { ids } => {
            api.reorder_ingredients(&ids).await?;
            println!("Reordered {} ingredients", ids.len());
        }
    }
    Ok(())
}

impl RecipeDetails {
    fn fields(&self) -> RecipeFields {
        RecipeFields {
            description: self.description.clone(),
            cooking_time: self.cooking_time,
            servings: self.servings,
            ..RecipeFields::default()
        }
    }

    async fn load_image(&self) -> Result<Option<RecipeImage>> {
        let Some(path) = &self.image else {
            return Ok(None);
        };
        let image = RecipeImage::load(path)
            .await
            .with_context(|| format!("failed to read image {}", path.display()))?;
        Ok(Some(image))
    }
}

fn summary(recipe: &Recipe) -> String {
    let mut parts = Vec::new();
    if let Some(minutes) = recipe.cooking_time {
        parts.push(format!("{minutes} min"));
    }
    if let Some(servings) = recipe.servings {
        parts.push(format!("serves {servings}"));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("  ({})", parts.join(", "))
    }
}

fn print_recipe(recipe: &Recipe) {
    println!(
        "{} {} (#{}){}",
        pin_marker(recipe.is_pinned),
        recipe.title,
        recipe.id,
        summary(recipe)
    );
    if !recipe.description.is_empty() {
        println!("{}", recipe.description);
    }
    if let Some(image) = &recipe.image {
        println!("image: {image}");
    }
    println!("ingredients:");
    for ingredient in &recipe.ingredients {
        print_ingredient(ingredient);
    }
}

fn print_ingredient(ingredient: &RecipeIngredient) {
    let amount = ingredient
        .amount()
        .map(|amount| format!("  {amount}"))
        .unwrap_or_default();
    println!("  {:>5}  {}{amount}", ingredient.id, ingredient.name);
}

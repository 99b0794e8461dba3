//! Drink and recipe types plus their public (short) and detailed (long) views.

use serde::{Deserialize, Serialize};

use crate::db::DrinkRecord;
use crate::menu::store::StoreError;

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    /// Ratio of this ingredient relative to the others.
    pub parts: i64,
}

/// Ingredient as shown to anonymous callers: no quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortIngredient {
    pub name: String,
    pub color: String,
}

/// Recipe as accepted from clients: either a list or a single ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl RecipeInput {
    pub fn into_ingredients(self) -> Vec<Ingredient> {
        match self {
            Self::Many(ingredients) => ingredients,
            Self::One(ingredient) => vec![ingredient],
        }
    }
}

/// A menu drink with its decoded recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortDrink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongDrink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> ShortDrink {
        ShortDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|i| ShortIngredient {
                    name: i.name.clone(),
                    color: i.color.clone(),
                })
                .collect(),
        }
    }

    pub fn long(&self) -> LongDrink {
        LongDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }

    /// Decode a stored record. A recipe column that is not valid recipe JSON
    /// is reported as a database error.
    pub fn from_record(record: DrinkRecord) -> Result<Self, StoreError> {
        let recipe = decode_recipe(&record.recipe).map_err(|e| {
            StoreError::Database(format!(
                "drink {} has an unreadable recipe: {}",
                record.drink_id, e
            ))
        })?;

        Ok(Self {
            id: record.drink_id,
            title: record.title,
            recipe,
        })
    }
}

pub fn encode_recipe(recipe: &[Ingredient]) -> Result<String, StoreError> {
    serde_json::to_string(recipe).map_err(|e| StoreError::Database(e.to_string()))
}

fn decode_recipe(raw: &str) -> Result<Vec<Ingredient>, serde_json::Error> {
    let input: RecipeInput = serde_json::from_str(raw)?;
    Ok(input.into_ingredients())
}

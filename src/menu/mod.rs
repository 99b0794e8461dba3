//! The drink menu: recipe types, views and the drink store.

pub mod recipe;
pub mod store;

pub use recipe::{Drink, Ingredient, LongDrink, RecipeInput, ShortDrink, ShortIngredient};
pub use store::{DrinkStore, DrinkUpdate, NewDrink, SEED_DRINK_TITLE, StoreError};

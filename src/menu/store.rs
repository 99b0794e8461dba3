//! Drink persistence.

use std::fmt;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::db::{Db, DrinkRecord};
use crate::menu::recipe::{Drink, Ingredient, encode_recipe};

/// Title of the drink written by [`DrinkStore::reset`].
pub const SEED_DRINK_TITLE: &str = "water";

/// Errors returned by [`DrinkStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No drink with this id exists.
    NotFound(i64),
    /// A drink with this title already exists.
    DuplicateTitle(String),
    /// The underlying database operation failed.
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Drink {} not found", id),
            Self::DuplicateTitle(title) => write!(f, "Drink titled '{}' already exists", title),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<surrealdb::Error> for StoreError {
    fn from(e: surrealdb::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// Payload for a new drink.
#[derive(Debug, Clone)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Changes to an existing drink. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct DrinkUpdate {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

/// Store for drink records.
pub struct DrinkStore {
    db: Db,
    /// Serializes title checks and id allocation of inserts and updates.
    insert_lock: Mutex<()>,
}

impl DrinkStore {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            insert_lock: Mutex::new(()),
        }
    }

    /// All drinks in ascending id order.
    pub async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        let mut res = self
            .db
            .query("SELECT * FROM drink ORDER BY drink_id ASC")
            .await?;

        let records: Vec<DrinkRecord> = res.take(0)?;
        records.into_iter().map(Drink::from_record).collect()
    }

    /// Find a drink by exact title.
    pub async fn find_by_title(&self, title: &str) -> Result<Option<Drink>, StoreError> {
        let query = r#"
            SELECT * FROM drink
            WHERE title = $title
            LIMIT 1
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("title", title.to_string()))
            .await?;

        let records: Vec<DrinkRecord> = res.take(0)?;
        records.into_iter().next().map(Drink::from_record).transpose()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        let mut res = self
            .db
            .query("SELECT * FROM type::thing('drink', $id)")
            .bind(("id", id))
            .await?;

        let records: Vec<DrinkRecord> = res.take(0)?;
        records.into_iter().next().map(Drink::from_record).transpose()
    }

    /// Insert a drink, rejecting titles that are already on the menu.
    pub async fn insert(&self, new: NewDrink) -> Result<Drink, StoreError> {
        let _guard = self.insert_lock.lock().await;

        if self.find_by_title(&new.title).await?.is_some() {
            debug!("Rejecting duplicate drink title: {}", new.title);
            return Err(StoreError::DuplicateTitle(new.title));
        }

        let id = self.next_id().await?;
        let recipe = encode_recipe(&new.recipe)?;

        let query = r#"
            CREATE type::thing('drink', $id) CONTENT {
                drink_id: $id,
                title: $title,
                recipe: $recipe
            }
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("id", id))
            .bind(("title", new.title))
            .bind(("recipe", recipe))
            .await?;

        let records: Vec<DrinkRecord> = res.take(0)?;
        let drink = records
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Database("failed to create drink record".to_string()))
            .and_then(Drink::from_record)?;

        info!("Created drink {} ('{}')", drink.id, drink.title);
        Ok(drink)
    }

    /// Apply `update` to an existing drink and return the stored result.
    ///
    /// Renaming to a title held by another drink is a
    /// [`StoreError::DuplicateTitle`].
    pub async fn update(&self, id: i64, update: DrinkUpdate) -> Result<Drink, StoreError> {
        let _guard = self.insert_lock.lock().await;

        let current = self.find_by_id(id).await?.ok_or(StoreError::NotFound(id))?;

        if let Some(title) = update.title.as_deref()
            && title != current.title
            && self.find_by_title(title).await?.is_some()
        {
            debug!("Rejecting rename of drink {} to taken title: {}", id, title);
            return Err(StoreError::DuplicateTitle(title.to_string()));
        }

        let title = update.title.unwrap_or(current.title);
        let recipe = encode_recipe(&update.recipe.unwrap_or(current.recipe))?;

        let query = r#"
            UPDATE type::thing('drink', $id) SET
                title = $title,
                recipe = $recipe
            RETURN AFTER
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("id", id))
            .bind(("title", title))
            .bind(("recipe", recipe))
            .await?;

        let records: Vec<DrinkRecord> = res.take(0)?;
        let drink = records
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound(id))
            .and_then(Drink::from_record)?;

        info!("Updated drink {}", id);
        Ok(drink)
    }

    /// Delete a drink, returning its id.
    pub async fn delete(&self, id: i64) -> Result<i64, StoreError> {
        let mut res = self
            .db
            .query("DELETE type::thing('drink', $id) RETURN BEFORE")
            .bind(("id", id))
            .await?;

        let removed: Vec<DrinkRecord> = res.take(0)?;
        if removed.is_empty() {
            return Err(StoreError::NotFound(id));
        }

        info!("Deleted drink {}", id);
        Ok(id)
    }

    /// Remove every drink and insert the seed drink.
    pub async fn reset(&self) -> Result<Drink, StoreError> {
        {
            let _guard = self.insert_lock.lock().await;
            self.db.query("DELETE drink").await?.check()?;
        }

        self.insert(NewDrink {
            title: SEED_DRINK_TITLE.to_string(),
            recipe: vec![Ingredient {
                name: "water".to_string(),
                color: "blue".to_string(),
                parts: 1,
            }],
        })
        .await
    }

    /// One past the largest stored id. Callers must hold `insert_lock`.
    async fn next_id(&self) -> Result<i64, StoreError> {
        let mut res = self.db.query("SELECT VALUE drink_id FROM drink").await?;
        let ids: Vec<i64> = res.take(0)?;
        Ok(ids.into_iter().max().unwrap_or(0) + 1)
    }
}

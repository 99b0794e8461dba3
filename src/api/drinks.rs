//! Drink route handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Extension, Path, State};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::AppContext;
use crate::api::error::ApiError;
use crate::auth::Claims;
use crate::menu::{DrinkUpdate, LongDrink, NewDrink, RecipeInput, ShortDrink};

/// `{"success": true, "drinks": [...]}`
#[derive(Debug, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

/// `{"success": true, "delete": id}`
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateDrinkBody {
    pub title: String,
    pub recipe: RecipeInput,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateDrinkBody {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

fn subject(claims: &Claims) -> &str {
    claims.sub.as_deref().unwrap_or("<unknown>")
}

/// `GET /drinks`: public short views.
pub async fn list_drinks(
    State(ctx): State<AppContext>,
) -> Result<Json<DrinksResponse<ShortDrink>>, ApiError> {
    let drinks = ctx.store().list_all().await?;
    if drinks.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(DrinksResponse::new(
        drinks.iter().map(|d| d.short()).collect(),
    )))
}

/// `GET /drinks-detail`: long views.
pub async fn list_drink_details(
    State(ctx): State<AppContext>,
) -> Result<Json<DrinksResponse<LongDrink>>, ApiError> {
    let drinks = ctx.store().list_all().await?;
    if drinks.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(DrinksResponse::new(
        drinks.iter().map(|d| d.long()).collect(),
    )))
}

/// `POST /drinks`
pub async fn create_drink(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<CreateDrinkBody>, JsonRejection>,
) -> Result<Json<DrinksResponse<LongDrink>>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        warn!("Rejected drink body: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    let drink = ctx
        .store()
        .insert(NewDrink {
            title: body.title,
            recipe: body.recipe.into_ingredients(),
        })
        .await?;

    info!("Drink {} created by {}", drink.id, subject(&claims));
    Ok(Json(DrinksResponse::new(vec![drink.long()])))
}

/// `PATCH /drinks/{id}`
///
/// The drink is looked up before the body is read, so a missing drink is
/// always 404 and an unreadable body on an existing drink is 405.
pub async fn update_drink(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateDrinkBody>, JsonRejection>,
) -> Result<Json<DrinksResponse<LongDrink>>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;

    if ctx
        .store()
        .find_by_id(id)
        .await
        .map_err(ApiError::from_mutation)?
        .is_none()
    {
        return Err(ApiError::NotFound);
    }

    let Json(body) = body.map_err(|rejection| {
        warn!("Rejected update body for drink {}: {}", id, rejection.body_text());
        ApiError::MethodNotAllowed
    })?;

    let update = DrinkUpdate {
        title: body.title,
        recipe: body.recipe.map(RecipeInput::into_ingredients),
    };

    let drink = ctx
        .store()
        .update(id, update)
        .await
        .map_err(ApiError::from_mutation)?;

    info!("Drink {} updated by {}", id, subject(&claims));
    Ok(Json(DrinksResponse::new(vec![drink.long()])))
}

/// `DELETE /drinks/{id}`
pub async fn delete_drink(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;

    let deleted = ctx
        .store()
        .delete(id)
        .await
        .map_err(ApiError::from_mutation)?;

    info!("Drink {} deleted by {}", deleted, subject(&claims));
    Ok(Json(DeleteResponse {
        success: true,
        delete: deleted,
    }))
}

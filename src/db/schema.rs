use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Persisted representation of a drink (table: `drink`).
///
/// The record key and `drink_id` carry the same integer; `drink_id` is kept
/// as a plain field so it can be sorted on and read back without unpacking
/// the record key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkRecord {
    pub id: RecordId,
    pub drink_id: i64,
    pub title: String,
    /// Recipe serialized as JSON text.
    pub recipe: String,
}

//! # In-memory item store.
//!
//! Append-only list backing the `/api/items` endpoints. Ids are assigned as
//! `max(existing ids, default 0) + 1`, so they stay unique without a counter.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::ItemError;

/// One stored item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Assigned on insert.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Optional reading; serialized as `null` when absent.
    pub value: Option<f64>,
}

/// Accepted shape of a create request.
#[derive(Debug, Deserialize)]
struct NewItem {
    name: String,
    #[serde(default)]
    value: Option<f64>,
}

/// Append-only item list.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: RwLock<Vec<Item>>,
}

impl ItemStore {
    /// Store holding `items`.
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Store with the two demo readings.
    pub fn seeded() -> Self {
        Self::new(vec![
            Item {
                id: 1,
                name: "Temperature".into(),
                value: Some(23.4),
            },
            Item {
                id: 2,
                name: "Humidity".into(),
                value: Some(56.1),
            },
        ])
    }

    /// Snapshot of every item, in insertion order.
    pub async fn list(&self) -> Vec<Item> {
        self.items.read().await.clone()
    }

    /// Validates a raw JSON request body and appends the new item.
    ///
    /// Rejects bodies that are not a JSON object with a string `name`, or whose
    /// `value` is present but not a number. A rejected request leaves the
    /// store untouched.
    pub async fn create(&self, body: &[u8]) -> Result<Item, ItemError> {
        let payload: Value = serde_json::from_slice(body).map_err(|_| ItemError::InvalidPayload)?;
        let new: NewItem = serde_json::from_value(payload).map_err(|_| ItemError::InvalidPayload)?;

        let mut items = self.items.write().await;
        let id = items.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        let item = Item {
            id,
            name: new.name,
            value: new.value,
        };
        items.push(item.clone());
        Ok(item)
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// True if the store holds no items.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

//! API handlers module

pub mod citations;
pub mod favorites;
pub mod health;
pub mod institutes;
pub mod search;
pub mod sessions;

use serde::Serialize;

/// Message attached to graph responses with no rows
pub const NO_DATA_MESSAGE: &str = "No data found for this selection.";

/// List payload that tells "no data" apart from a fault
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        let message = items.is_empty().then_some(NO_DATA_MESSAGE);
        Self { items, message }
    }
}

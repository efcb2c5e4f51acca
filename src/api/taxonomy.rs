use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::check_length;
use crate::database::models::TaxonomyItem;
use crate::error::ApiError;

pub const DEFAULT_COLOR: &str = "#808080";

#[derive(Debug, Deserialize)]
pub struct CreateTaxonomyItemRequest {
    pub name: String,
    pub color: Option<String>,
}

impl CreateTaxonomyItemRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        check_length("name", self.name.trim(), 1, 50)?;
        if let Some(color) = &self.color {
            check_color(color)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaxonomyItemRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl UpdateTaxonomyItemRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            check_length("name", name.trim(), 1, 50)?;
        }
        if let Some(color) = &self.color {
            check_color(color)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOrder {
    pub id: Uuid,
    pub display_order: i32,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub orders: Vec<DisplayOrder>,
}

impl ReorderRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.orders.is_empty() {
            return Err(ApiError::invalid_field("orders", "must not be empty"));
        }
        if self.orders.iter().any(|o| o.display_order < 0) {
            return Err(ApiError::invalid_field("orders", "displayOrder must not be negative"));
        }
        Ok(())
    }
}

/// `#RRGGBB`
fn check_color(color: &str) -> Result<(), ApiError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(ApiError::invalid_field("color", "must be a #RRGGBB hex color"))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyItemResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub color: String,
    pub is_system_default: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&TaxonomyItem> for TaxonomyItemResponse {
    fn from(item: &TaxonomyItem) -> Self {
        Self {
            id: item.id,
            project_id: item.project_id,
            name: item.name.clone(),
            color: item.color.clone(),
            is_system_default: item.is_system_default,
            display_order: item.display_order,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

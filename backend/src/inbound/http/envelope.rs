//! Response envelopes shared by the item endpoints.
//!
//! Every successful response is `{status: "OK", ...payload}` and every failed
//! one `{status: "FAILED", message}`, except unmatched routes which answer
//! with a bare `{message}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::Item;

/// Outcome marker carried by every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ResponseStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAILED")]
    Failed,
}

/// Item representation on the wire.
///
/// `cost` is rendered as a decimal string with two fraction digits so that no
/// precision is lost to floating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    #[schema(example = "10.00")]
    pub cost: String,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Item> for ItemResponse {
    fn from(value: Item) -> Self {
        Self {
            id: value.id.to_string(),
            owner_id: value.owner_id.to_string(),
            title: value.title.to_string(),
            description: value.description.to_string(),
            cost: value.cost.to_string(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// `{status, item}` returned by insert.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemEnvelope {
    pub status: ResponseStatus,
    pub item: ItemResponse,
}

impl ItemEnvelope {
    pub fn ok(item: Item) -> Self {
        Self {
            status: ResponseStatus::Ok,
            item: item.into(),
        }
    }
}

/// `{status, items}` returned by the list endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemsEnvelope {
    pub status: ResponseStatus,
    pub items: Vec<ItemResponse>,
}

impl ItemsEnvelope {
    pub fn ok(items: Vec<Item>) -> Self {
        Self {
            status: ResponseStatus::Ok,
            items: items.into_iter().map(ItemResponse::from).collect(),
        }
    }
}

/// `{status, message}` returned by delete.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageEnvelope {
    pub status: ResponseStatus,
    pub message: String,
}

impl MessageEnvelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Ok,
            message: message.into(),
        }
    }
}

/// Failure body for client and server errors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailureEnvelope {
    pub status: ResponseStatus,
    #[schema(example = "Missed Parameter(s)")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl FailureEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failed,
            message: message.into(),
            details: None,
            trace_id: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Option<Value>) -> Self {
        self.details = details;
        self
    }

    #[must_use]
    pub fn with_trace_id(mut self, trace_id: Option<String>) -> Self {
        self.trace_id = trace_id;
        self
    }
}

/// Body returned for unmatched routes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotFoundEnvelope {
    #[schema(example = "Bad request")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cost, ItemDescription, ItemId, ItemTitle, NewItem, OwnerId};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    #[rstest]
    fn item_envelope_uses_camel_case_and_decimal_cost() {
        let created_at = Utc
            .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp");
        let item = Item::from_new(
            NewItem {
                owner_id: OwnerId::new("u1").expect("owner"),
                title: ItemTitle::new("Book").expect("title"),
                description: ItemDescription::new("d").expect("description"),
                cost: Cost::from_cents(1000).expect("cost"),
            },
            ItemId::from_uuid(Uuid::nil()),
            created_at,
        );

        let value = serde_json::to_value(ItemEnvelope::ok(item)).expect("serialise");
        assert_eq!(
            value,
            json!({
                "status": "OK",
                "item": {
                    "id": "00000000-0000-0000-0000-000000000000",
                    "ownerId": "u1",
                    "title": "Book",
                    "description": "d",
                    "cost": "10.00",
                    "createdAt": "2026-01-02T03:04:05+00:00",
                }
            })
        );
    }

    #[rstest]
    fn failure_envelope_omits_absent_fields() {
        let value = serde_json::to_value(FailureEnvelope::new("Missed Parameter")).expect("json");
        assert_eq!(value, json!({"status": "FAILED", "message": "Missed Parameter"}));
    }
}

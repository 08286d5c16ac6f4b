//! Wire types for the Yelp Fusion AI Chat API (`POST /ai/chat/v2`).
//!
//! Business entities are deserialized leniently: every field the concierge
//! does not strictly need is optional or defaulted, and an explicit `null`
//! is read the same as a missing field.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_context: Option<UserContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UserContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Free-text alternative to coordinates, e.g. "Austin, TX".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub response: ResponseText,
    #[serde(default, deserialize_with = "null_as_default")]
    pub types: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Vec<Entity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chat_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseText {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entity {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    pub businesses: Option<Vec<BusinessEntity>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BusinessEntity {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alias: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_closed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub review_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<BusinessCategory>,
    pub coordinates: Option<Coordinates>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transactions: Vec<String>,
    pub price: Option<String>,
    pub location: Option<BusinessLocation>,
    pub phone: Option<String>,
    pub display_phone: Option<String>,
    /// Meters from the user's coordinates, when the API knows them.
    pub distance: Option<f64>,
    pub contextual_info: Option<ContextualInfo>,
    pub summaries: Option<BusinessSummaries>,
    pub review_snippet: Option<ReviewSnippet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BusinessCategory {
    #[serde(default, deserialize_with = "null_as_default")]
    pub alias: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BusinessLocation {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_address: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ContextualInfo {
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BusinessSummaries {
    pub short: Option<String>,
    pub medium: Option<String>,
    pub long: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReviewSnippet {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    pub rating: Option<f32>,
    pub user_name: Option<String>,
}

/// Businesses of the first `"business"` entity that actually carries a list.
pub fn extract_businesses(response: &ChatResponse) -> Vec<BusinessEntity> {
    response
        .entities
        .iter()
        .find(|e| e.kind == "business" && e.businesses.is_some())
        .and_then(|e| e.businesses.clone())
        .unwrap_or_default()
}

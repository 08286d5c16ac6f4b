use clutch_common::ai_chat::BusinessEntity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fewest items that still render as a suggestion list.
pub const MIN_LIST_ITEMS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SuggestionItem {
    /// Restaurant name, or empty for a body-only continuation.
    pub title: String,
    pub body: String,
}

impl SuggestionItem {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.body.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentationResult {
    pub intro: Option<String>,
    #[serde(default)]
    pub items: Vec<SuggestionItem>,
}

impl SegmentationResult {
    /// Whether the reply should render as a list rather than paragraphs.
    pub fn has_list(&self) -> bool {
        self.items.len() >= MIN_LIST_ITEMS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LinkedSuggestion {
    pub title: String,
    pub body: String,
    /// Yelp URL of the business whose normalized name equals the title.
    pub business_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ChatTurnResult {
    pub response_text: String,
    pub conversation_id: String,
    pub businesses: Vec<BusinessEntity>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TurnOutcome {
    #[serde(flatten)]
    pub turn: ChatTurnResult,
    pub segmentation: SegmentationResult,
    pub suggestions: Vec<LinkedSuggestion>,
    pub should_offer_booking: bool,
    pub top_pick: Option<BusinessEntity>,
}

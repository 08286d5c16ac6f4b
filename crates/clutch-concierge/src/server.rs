/// MCP server for the Clutch dinner concierge.
///
/// Exposes six tools:
/// - `panic_button`: One-shot emergency recommendation near a location
/// - `chat`: Follow-up turn in an existing Yelp AI conversation
/// - `segment_response`: Split a free-text reply into suggestions
/// - `detect_booking_intent`: Does a message ask for a reservation?
/// - `link_suggestions`: Attach Yelp URLs to suggestion titles
/// - `request_reservation`: Simulated table booking
use std::sync::Arc;
use std::time::Duration;

use clutch_common::ai_chat::BusinessEntity;
use clutch_common::yelp::YelpClient;
use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::model::{LinkedSuggestion, SuggestionItem, TurnOutcome};
use crate::reservation::{self, ReservationConfirmation, ReservationRequest};
use crate::turn::{self, TurnRequest};
use crate::{intent, linker, segment};

#[derive(Clone)]
pub struct ConciergeServer {
    yelp: Arc<YelpClient>,
    locale: String,
    reservation_delay: Duration,
    tool_router: ToolRouter<ConciergeServer>,
}

impl ConciergeServer {
    pub fn new(yelp: Arc<YelpClient>, config: &Config) -> Self {
        Self {
            yelp,
            locale: config.locale.clone(),
            reservation_delay: config.reservation_delay,
            tool_router: Self::tool_router(),
        }
    }

    async fn run_turn(&self, request: TurnRequest) -> Result<Json<TurnOutcome>, String> {
        turn::run_turn(&self.yelp, &self.locale, request)
            .await
            .map(Json)
            .map_err(|e| {
                warn!(error = %e, "chat turn failed");
                e.to_string()
            })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PanicButtonParams {
    /// Optional custom request; defaults to "find me dinner right now".
    query: Option<String>,
    /// Conversation to continue, if any.
    chat_id: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    /// Typed location (city, neighborhood, address) when coordinates are unknown.
    location: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ChatParams {
    query: String,
    chat_id: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    location: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SegmentParams {
    /// Raw AI reply text.
    text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct BookingIntentParams {
    /// The user's message exactly as typed.
    query: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct LinkSuggestionsParams {
    items: Vec<SuggestionItem>,
    businesses: Vec<BusinessEntity>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct SegmentResponse {
    intro: Option<String>,
    items: Vec<SuggestionItem>,
    /// False means render the reply as plain paragraphs.
    has_list: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
struct BookingIntentResponse {
    should_offer_booking: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
struct LinkSuggestionsResponse {
    suggestions: Vec<LinkedSuggestion>,
}

#[tool_router]
impl ConciergeServer {
    #[tool(description = "Emergency dinner: ask Yelp AI for a highly rated restaurant open now near the given coordinates or typed location. Returns the reply, segmented suggestions, businesses and a top pick.")]
    async fn panic_button(
        &self,
        Parameters(params): Parameters<PanicButtonParams>,
    ) -> Result<Json<TurnOutcome>, String> {
        let request = turn::panic_request(TurnRequest {
            query: params.query.unwrap_or_default(),
            chat_id: params.chat_id,
            latitude: params.latitude,
            longitude: params.longitude,
            location: params.location,
        })
        .map_err(|e| e.to_string())?;
        info!(continuing = request.chat_id.is_some(), "panic button pressed");
        self.run_turn(request).await
    }

    #[tool(description = "Send a follow-up message to Yelp AI. Pass chat_id from a previous turn to continue the conversation. Sets should_offer_booking when the message reads like a reservation request.")]
    async fn chat(
        &self,
        Parameters(params): Parameters<ChatParams>,
    ) -> Result<Json<TurnOutcome>, String> {
        self.run_turn(TurnRequest {
            query: params.query,
            chat_id: params.chat_id,
            latitude: params.latitude,
            longitude: params.longitude,
            location: params.location,
        })
        .await
    }

    #[tool(description = "Split a free-text restaurant recommendation into an optional intro and titled suggestions. has_list is false when the text should render as paragraphs.")]
    async fn segment_response(
        &self,
        Parameters(params): Parameters<SegmentParams>,
    ) -> Result<Json<SegmentResponse>, String> {
        let result = segment::parse_restaurant_suggestions(&params.text);
        let has_list = result.has_list();
        Ok(Json(SegmentResponse {
            intro: result.intro,
            items: result.items,
            has_list,
        }))
    }

    #[tool(description = "Heuristically decide whether a user message asks to book or reserve a table.")]
    async fn detect_booking_intent(
        &self,
        Parameters(params): Parameters<BookingIntentParams>,
    ) -> Result<Json<BookingIntentResponse>, String> {
        Ok(Json(BookingIntentResponse {
            should_offer_booking: intent::detect_booking_intent(&params.query),
        }))
    }

    #[tool(description = "Attach the Yelp URL of a business to every suggestion whose title matches the business name (case and punctuation insensitive).")]
    async fn link_suggestions(
        &self,
        Parameters(params): Parameters<LinkSuggestionsParams>,
    ) -> Result<Json<LinkSuggestionsResponse>, String> {
        Ok(Json(LinkSuggestionsResponse {
            suggestions: linker::link_suggestions_to_businesses(&params.items, &params.businesses),
        }))
    }

    #[tool(description = "Request a table. This is a simulation: no restaurant is contacted; a valid request is confirmed after a short delay.")]
    async fn request_reservation(
        &self,
        Parameters(params): Parameters<ReservationRequest>,
    ) -> Result<Json<ReservationConfirmation>, String> {
        reservation::reserve(params, self.reservation_delay)
            .await
            .map(Json)
            .map_err(|e| e.to_string())
    }
}

#[tool_handler]
impl ServerHandler for ConciergeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "clutch-concierge".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Emergency dinner concierge backed by Yelp AI. Start with panic_button (coordinates \
or a typed location), then continue with chat using the returned conversation_id. When \
should_offer_booking is true, offer request_reservation for the top pick. segment_response, \
detect_booking_intent and link_suggestions expose the text heuristics directly."
                    .to_string(),
            ),
        }
    }
}

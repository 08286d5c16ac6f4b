use clutch_common::ai_chat::{extract_businesses, BusinessEntity, ChatResponse, UserContext};
use clutch_common::yelp::YelpClient;
use tracing::info;

use crate::error::AppError;
use crate::intent::detect_booking_intent;
use crate::linker::link_suggestions_to_businesses;
use crate::model::{ChatTurnResult, TurnOutcome};
use crate::segment::parse_restaurant_suggestions;

pub const PANIC_QUERY: &str =
    "I need dinner right now! Find me a highly rated restaurant that's open now and nearby.";

const MIN_PICK_RATING: f32 = 4.0;
const MIN_PICK_REVIEWS: u32 = 10;

#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    pub query: String,
    pub chat_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location: Option<String>,
}

impl TurnRequest {
    fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    fn manual_location(&self) -> Option<&str> {
        self.location.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }

    pub fn has_location(&self) -> bool {
        self.coordinates().is_some() || self.manual_location().is_some()
    }
}

/// The panic button: a default query, and a location is mandatory.
pub fn panic_request(mut request: TurnRequest) -> Result<TurnRequest, AppError> {
    if request.query.trim().is_empty() {
        request.query = PANIC_QUERY.to_string();
    }
    if !request.has_location() {
        return Err(AppError::InvalidInput(
            "Please allow location access or enter your city manually.".to_string(),
        ));
    }
    Ok(request)
}

/// Coordinates win over a typed location. A typed location is folded into
/// the query text only when no coordinate was supplied at all.
pub fn upstream_query(request: &TurnRequest, locale: &str) -> (String, UserContext) {
    let mut context = UserContext {
        locale: Some(locale.to_string()),
        ..UserContext::default()
    };

    if let Some((latitude, longitude)) = request.coordinates() {
        context.latitude = Some(latitude);
        context.longitude = Some(longitude);
    } else if let Some(location) = request.manual_location() {
        context.location = Some(location.to_string());
    }

    let no_coordinates = request.latitude.is_none() && request.longitude.is_none();
    let query = match request.manual_location() {
        Some(location) if no_coordinates => format!("{} near {}", request.query, location),
        _ => request.query.clone(),
    };

    (query, context)
}

pub async fn run_turn(
    client: &YelpClient,
    locale: &str,
    request: TurnRequest,
) -> Result<TurnOutcome, AppError> {
    if request.query.trim().is_empty() {
        return Err(AppError::InvalidInput("Please enter a message.".to_string()));
    }

    let (query, context) = upstream_query(&request, locale);
    let response = client
        .send_chat_message(&query, request.chat_id.as_deref(), Some(context))
        .await?;

    let outcome = assemble_outcome(&request.query, response);
    info!(
        conversation_id = %outcome.turn.conversation_id,
        businesses = outcome.turn.businesses.len(),
        suggestions = outcome.segmentation.items.len(),
        should_offer_booking = outcome.should_offer_booking,
        "chat turn complete"
    );
    Ok(outcome)
}

/// Booking intent is read from what the user typed, not the augmented query.
pub fn assemble_outcome(user_query: &str, response: ChatResponse) -> TurnOutcome {
    let businesses = extract_businesses(&response);
    let turn = ChatTurnResult {
        response_text: response.response.text,
        conversation_id: response.chat_id,
        businesses,
    };

    let segmentation = parse_restaurant_suggestions(&turn.response_text);
    let suggestions = link_suggestions_to_businesses(&segmentation.items, &turn.businesses);
    let top_pick = pick_best(&turn.businesses).cloned();

    TurnOutcome {
        segmentation,
        suggestions,
        should_offer_booking: detect_booking_intent(user_query),
        top_pick,
        turn,
    }
}

/// First well-reviewed business, falling back to the first one returned.
pub fn pick_best(businesses: &[BusinessEntity]) -> Option<&BusinessEntity> {
    businesses
        .iter()
        .find(|b| b.rating >= MIN_PICK_RATING && b.review_count > MIN_PICK_REVIEWS)
        .or_else(|| businesses.first())
}

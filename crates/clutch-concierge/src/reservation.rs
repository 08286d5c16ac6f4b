//! Simulated reservations. Nothing is sent anywhere: a valid request is
//! confirmed after a fixed delay so callers can exercise the booking flow.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;

const MAX_PARTY_SIZE: u32 = 20;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReservationRequest {
    /// Restaurant the table is for, usually the current top pick.
    pub restaurant_name: String,
    pub party_size: u32,
    /// Calendar date, e.g. "2026-10-18".
    pub date: String,
    /// Local time, e.g. "19:30".
    pub time: String,
    pub guest_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ReservationConfirmation {
    pub restaurant_name: String,
    pub party_size: u32,
    pub date: String,
    pub time: String,
    pub guest_name: Option<String>,
    pub confirmed: bool,
    /// Always true: no restaurant was contacted.
    pub simulated: bool,
}

fn validate(request: &ReservationRequest) -> Result<(), AppError> {
    if request.restaurant_name.trim().is_empty() {
        return Err(AppError::InvalidInput("restaurant_name must not be empty".to_string()));
    }
    if request.party_size == 0 || request.party_size > MAX_PARTY_SIZE {
        return Err(AppError::InvalidInput(format!(
            "party_size must be between 1 and {MAX_PARTY_SIZE}"
        )));
    }
    if request.date.trim().is_empty() {
        return Err(AppError::InvalidInput("date must not be empty".to_string()));
    }
    if request.time.trim().is_empty() {
        return Err(AppError::InvalidInput("time must not be empty".to_string()));
    }
    Ok(())
}

pub async fn reserve(
    request: ReservationRequest,
    delay: Duration,
) -> Result<ReservationConfirmation, AppError> {
    validate(&request)?;
    tokio::time::sleep(delay).await;

    info!(
        restaurant = %request.restaurant_name,
        party_size = request.party_size,
        date = %request.date,
        time = %request.time,
        "simulated reservation confirmed"
    );

    Ok(ReservationConfirmation {
        restaurant_name: request.restaurant_name.trim().to_string(),
        party_size: request.party_size,
        date: request.date.trim().to_string(),
        time: request.time.trim().to_string(),
        guest_name: request
            .guest_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        confirmed: true,
        simulated: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(party_size: u32) -> ReservationRequest {
        ReservationRequest {
            restaurant_name: " Luigi's ".to_string(),
            party_size,
            date: "2026-10-18".to_string(),
            time: "19:30".to_string(),
            guest_name: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn valid_request_is_confirmed() {
        let confirmation = reserve(request(4), Duration::ZERO).await.expect("valid");
        assert!(confirmation.confirmed);
        assert!(confirmation.simulated);
        assert_eq!(confirmation.restaurant_name, "Luigi's");
        assert_eq!(confirmation.party_size, 4);
        assert_eq!(confirmation.guest_name, None);
    }

    #[tokio::test]
    async fn party_size_out_of_range_is_rejected() {
        for size in [0, MAX_PARTY_SIZE + 1] {
            let err = reserve(request(size), Duration::ZERO).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn missing_restaurant_is_rejected() {
        let mut req = request(2);
        req.restaurant_name = String::new();
        assert!(reserve(req, Duration::ZERO).await.is_err());
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to get response from Yelp AI: {0}")]
    Yelp(#[from] clutch_common::yelp::YelpClientError),
}

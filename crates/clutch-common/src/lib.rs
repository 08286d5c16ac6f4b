pub mod ai_chat;
pub mod yelp;

pub mod bot;
pub mod chat;
pub mod health;
pub mod suggestions;

pub mod auth;
pub mod health;
pub mod requests;
pub mod users;

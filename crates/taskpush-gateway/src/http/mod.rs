pub mod auth;
pub mod health;
pub mod push;
pub mod response;
pub mod tasks;

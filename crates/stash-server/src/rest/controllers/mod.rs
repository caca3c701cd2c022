//! REST controllers.

pub mod cache_controller;
pub mod health_controller;
pub mod user_controller;

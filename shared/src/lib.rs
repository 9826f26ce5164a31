//! Meal Tracker Shared Library
//!
//! Domain model, API types and validation rules used by the backend and
//! by anything else that speaks the meal tracker API.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{Meal, MealCategory, MealSummary, Nutrition};
pub use types::*;

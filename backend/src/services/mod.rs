//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the routes and the repositories.

pub mod meal;

pub use meal::{summarize_meals, MealService};

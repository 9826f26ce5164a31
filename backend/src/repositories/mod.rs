//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod meal;

pub use meal::{sample_meals, CreateMeal, MealPatch, MealStore, SqliteMealRepository};

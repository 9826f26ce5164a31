//! Input validation functions
//!
//! Pure checks used by the meal service. Each returns the user-facing
//! message on failure.

use crate::models::MealCategory;
use chrono::{DateTime, NaiveDate};

/// Maximum meal name length, in characters
pub const MAX_MEAL_NAME_LEN: usize = 255;

/// Inclusive calorie bounds for a single meal
pub const CALORIES_RANGE: (i64, i64) = (0, 10_000);

/// Inclusive gram bounds for protein, carbs and fat
pub const MACRO_GRAMS_RANGE: (f64, f64) = (0.0, 1000.0);

/// Validate a meal name
pub fn validate_meal_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Meal name is required".to_string());
    }
    if name.chars().count() > MAX_MEAL_NAME_LEN {
        return Err(format!(
            "Meal name is too long (max {} characters)",
            MAX_MEAL_NAME_LEN
        ));
    }
    Ok(())
}

/// Validate calorie value
pub fn validate_calories(calories: i64) -> Result<(), String> {
    let (min, max) = CALORIES_RANGE;
    if calories < min || calories > max {
        return Err(format!("Calories must be between {} and {}", min, max));
    }
    Ok(())
}

/// Validate a macro nutrient amount in grams.
///
/// `label` is the capitalised nutrient name used in the message.
pub fn validate_macro_grams(label: &str, grams: f64) -> Result<(), String> {
    let (min, max) = MACRO_GRAMS_RANGE;
    if grams.is_nan() || grams.is_infinite() {
        return Err(format!("{} must be a valid number", label));
    }
    if grams < min || grams > max {
        return Err(format!("{} must be between {} and {}g", label, min, max));
    }
    Ok(())
}

/// Validate a meal category and return its typed form
pub fn validate_meal_category(category: &str) -> Result<MealCategory, String> {
    category
        .parse::<MealCategory>()
        .map_err(|_| "Invalid meal category".to_string())
}

/// Parse the date given to the daily summary.
///
/// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp, in which case
/// the UTC calendar day of that instant is used.
pub fn parse_summary_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.naive_utc().date())
        .map_err(|_| "Invalid date format".to_string())
}

/// Parse a calendar date supplied in an update payload
pub fn parse_meal_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| "Invalid date format (expected YYYY-MM-DD)".to_string())
}

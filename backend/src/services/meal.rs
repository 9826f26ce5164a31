//! Meal service
//!
//! Provides business logic for meal tracking including:
//! - Validation of create and update payloads
//! - Existence checks before mutations
//! - Daily nutrition summaries

use crate::error::{ApiError, ApiResult};
use crate::repositories::{CreateMeal, MealPatch, MealStore};
use chrono::{NaiveDate, Utc};
use meal_tracker_shared::validation::{
    parse_meal_date, parse_summary_date, validate_calories, validate_macro_grams,
    validate_meal_category, validate_meal_name,
};
use meal_tracker_shared::{
    CreateMealRequest, Meal, MealError, MealSummary, Nutrition, NutritionInput, UpdateMealRequest,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Meal service for business logic
#[derive(Clone)]
pub struct MealService {
    store: Arc<dyn MealStore>,
}

impl MealService {
    pub fn new(store: Arc<dyn MealStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a new meal dated today (UTC)
    #[instrument(skip(self, request), fields(category = %request.category))]
    pub async fn create_meal(&self, request: CreateMealRequest) -> ApiResult<Meal> {
        let input = validate_create(request, Utc::now().date_naive())?;

        let meal = self.store.create(input).await.map_err(ApiError::Internal)?;

        info!(meal_id = %meal.id, "Meal created");
        Ok(meal)
    }

    /// Apply a partial update to an existing meal
    #[instrument(skip(self, request))]
    pub async fn update_meal(&self, id: &str, request: UpdateMealRequest) -> ApiResult<Meal> {
        self.get_meal_by_id(id).await?;

        let patch = validate_update(request)?;

        let meal = self
            .store
            .update(id, patch)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| MealError::Internal("Failed to update meal".to_string()))?;

        info!(meal_id = %meal.id, "Meal updated");
        Ok(meal)
    }

    #[instrument(skip(self))]
    pub async fn delete_meal(&self, id: &str) -> ApiResult<()> {
        self.get_meal_by_id(id).await?;

        let deleted = self.store.delete(id).await.map_err(ApiError::Internal)?;
        if !deleted {
            return Err(MealError::Internal("Failed to delete meal".to_string()).into());
        }

        info!(meal_id = %id, "Meal deleted");
        Ok(())
    }

    /// Totals for every meal logged on `date`
    #[instrument(skip(self))]
    pub async fn get_daily_summary(&self, date: &str) -> ApiResult<MealSummary> {
        let date = parse_summary_date(date).map_err(ApiError::Validation)?;

        let meals = self
            .store
            .find_by_date(date)
            .await
            .map_err(ApiError::Internal)?;

        Ok(summarize_meals(date, &meals))
    }

    #[instrument(skip(self))]
    pub async fn get_meals_by_category(&self, category: &str) -> ApiResult<Vec<Meal>> {
        let category = validate_meal_category(category).map_err(ApiError::Validation)?;

        self.store
            .find_by_category(category)
            .await
            .map_err(ApiError::Internal)
    }

    pub async fn get_meal_by_id(&self, id: &str) -> ApiResult<Meal> {
        self.store
            .find_by_id(id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Meal not found".to_string()))
    }

    pub async fn get_all_meals(&self) -> ApiResult<Vec<Meal>> {
        self.store.find_all().await.map_err(ApiError::Internal)
    }

    /// Seed the example meals into an empty store; returns how many were added
    #[instrument(skip(self))]
    pub async fn initialize_sample_data(&self) -> ApiResult<usize> {
        let inserted = self
            .store
            .seed_sample_data()
            .await
            .map_err(ApiError::Internal)?;

        info!(inserted, "Sample data initialized");
        Ok(inserted)
    }
}

/// Sum calories and macros over `meals`
pub fn summarize_meals(date: NaiveDate, meals: &[Meal]) -> MealSummary {
    meals
        .iter()
        .fold(MealSummary::empty(date), |mut summary, meal| {
            summary.total_calories += meal.calories;
            summary.total_protein += meal.nutrition.protein;
            summary.total_carbs += meal.nutrition.carbs;
            summary.total_fat += meal.nutrition.fat;
            summary
        })
}

/// Check a create payload and turn it into a repository input dated `today`
fn validate_create(request: CreateMealRequest, today: NaiveDate) -> Result<CreateMeal, MealError> {
    validate_meal_name(&request.name).map_err(MealError::Validation)?;

    let calories = request
        .calories
        .ok_or_else(|| MealError::Validation("Calories are required".to_string()))?;
    validate_calories(calories).map_err(MealError::Validation)?;

    let nutrition = required_nutrition(&request.nutrition)?;
    let category = validate_meal_category(&request.category).map_err(MealError::Validation)?;

    Ok(CreateMeal {
        name: request.name,
        description: request.description,
        category,
        calories,
        nutrition,
        date: today,
    })
}

fn required_nutrition(input: &NutritionInput) -> Result<Nutrition, MealError> {
    let required = |label: &str, value: Option<f64>| -> Result<f64, MealError> {
        let grams =
            value.ok_or_else(|| MealError::Validation(format!("{} is required", label)))?;
        validate_macro_grams(label, grams).map_err(MealError::Validation)?;
        Ok(grams)
    };

    Ok(Nutrition {
        protein: required("Protein", input.protein)?,
        carbs: required("Carbs", input.carbs)?,
        fat: required("Fat", input.fat)?,
        fiber: input.fiber.unwrap_or_default(),
        sugar: input.sugar.unwrap_or_default(),
        sodium: input.sodium.unwrap_or_default(),
    })
}

/// Check the supplied fields of an update payload and build the patch.
///
/// Only calories and the three macros are range-checked; the name is
/// written as given.
fn validate_update(request: UpdateMealRequest) -> Result<MealPatch, MealError> {
    if let Some(calories) = request.calories {
        validate_calories(calories).map_err(MealError::Validation)?;
    }

    let nutrition = request.nutrition.unwrap_or_default();
    for (label, value) in [
        ("Protein", nutrition.protein),
        ("Carbs", nutrition.carbs),
        ("Fat", nutrition.fat),
    ] {
        if let Some(grams) = value {
            validate_macro_grams(label, grams).map_err(MealError::Validation)?;
        }
    }

    let category = request
        .category
        .as_deref()
        .map(validate_meal_category)
        .transpose()
        .map_err(MealError::Validation)?;

    let date = request
        .date
        .as_deref()
        .map(parse_meal_date)
        .transpose()
        .map_err(MealError::Validation)?;

    Ok(MealPatch {
        name: request.name,
        description: request.description,
        category,
        calories: request.calories,
        protein: nutrition.protein,
        carbs: nutrition.carbs,
        fat: nutrition.fat,
        fiber: nutrition.fiber,
        sugar: nutrition.sugar,
        sodium: nutrition.sodium,
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::repositories::SqliteMealRepository;
    use anyhow::Result;
    use async_trait::async_trait;
    use fake::faker::lorem::en::Words;
    use fake::Fake;
    use meal_tracker_shared::MealCategory;
    use proptest::prelude::*;
    use rstest::rstest;

    async fn sqlite_service() -> (MealService, Arc<SqliteMealRepository>) {
        let pool = db::create_pool("sqlite::memory:", 1).await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let repo = Arc::new(SqliteMealRepository::new(pool));
        (MealService::new(repo.clone()), repo)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn valid_request() -> CreateMealRequest {
        CreateMealRequest {
            name: "Oatmeal".to_string(),
            description: Some("with banana".to_string()),
            category: "breakfast".to_string(),
            calories: Some(350),
            nutrition: NutritionInput {
                protein: Some(12.0),
                carbs: Some(54.0),
                fat: Some(8.0),
                ..Default::default()
            },
        }
    }

    fn meal_with(calories: i64, protein: f64, carbs: f64, fat: f64) -> Meal {
        let now = Utc::now();
        Meal {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Meal".to_string(),
            description: None,
            category: MealCategory::Lunch,
            calories,
            nutrition: Nutrition {
                protein,
                carbs,
                fat,
                ..Default::default()
            },
            date: day(2025, 7, 29),
            created_at: now,
            updated_at: now,
        }
    }

    /// Store whose meals exist for lookups but vanish before any write lands
    struct VanishingStore {
        meal: Meal,
    }

    #[async_trait]
    impl MealStore for VanishingStore {
        async fn find_all(&self) -> Result<Vec<Meal>> {
            Ok(vec![self.meal.clone()])
        }
        async fn find_by_id(&self, _id: &str) -> Result<Option<Meal>> {
            Ok(Some(self.meal.clone()))
        }
        async fn find_by_date(&self, _date: NaiveDate) -> Result<Vec<Meal>> {
            Ok(vec![])
        }
        async fn find_by_category(&self, _category: MealCategory) -> Result<Vec<Meal>> {
            Ok(vec![])
        }
        async fn create(&self, _input: CreateMeal) -> Result<Meal> {
            anyhow::bail!("read-only store")
        }
        async fn update(&self, _id: &str, _patch: MealPatch) -> Result<Option<Meal>> {
            Ok(None)
        }
        async fn delete(&self, _id: &str) -> Result<bool> {
            Ok(false)
        }
        async fn count(&self) -> Result<i64> {
            Ok(1)
        }
    }

    #[test]
    fn test_validate_create_stamps_today() {
        let today = day(2025, 7, 29);
        let input = validate_create(valid_request(), today).unwrap();
        assert_eq!(input.date, today);
        assert_eq!(input.category, MealCategory::Breakfast);
        assert_eq!(input.nutrition.fiber, 0.0);
    }

    #[test]
    fn test_validate_create_accepts_generated_names() {
        let name: Vec<String> = Words(1..5).fake();
        let request = CreateMealRequest {
            name: name.join(" "),
            ..valid_request()
        };
        assert!(validate_create(request, day(2025, 7, 29)).is_ok());
    }

    #[rstest]
    #[case::empty_name(CreateMealRequest { name: "".into(), ..valid_request() }, "Meal name is required")]
    #[case::negative_calories(CreateMealRequest { calories: Some(-1), ..valid_request() }, "Calories must be between 0 and 10000")]
    #[case::too_many_calories(CreateMealRequest { calories: Some(10001), ..valid_request() }, "Calories must be between 0 and 10000")]
    #[case::missing_calories(CreateMealRequest { calories: None, ..valid_request() }, "Calories are required")]
    #[case::unknown_category(CreateMealRequest { category: "brunch".into(), ..valid_request() }, "Invalid meal category")]
    #[case::missing_protein(
        CreateMealRequest { nutrition: NutritionInput { protein: None, carbs: Some(1.0), fat: Some(1.0), ..Default::default() }, ..valid_request() },
        "Protein is required"
    )]
    #[case::heavy_fat(
        CreateMealRequest { nutrition: NutritionInput { protein: Some(1.0), carbs: Some(1.0), fat: Some(1000.5), ..Default::default() }, ..valid_request() },
        "Fat must be between 0 and 1000g"
    )]
    fn test_validate_create_rejects(#[case] request: CreateMealRequest, #[case] message: &str) {
        let err = validate_create(request, day(2025, 7, 29)).unwrap_err();
        assert_eq!(err, MealError::Validation(message.to_string()));
    }

    #[test]
    fn test_validate_update_skips_name_and_passes_unchecked_fields() {
        let request = UpdateMealRequest {
            name: Some(String::new()),
            nutrition: Some(NutritionInput {
                sodium: Some(5000.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let patch = validate_update(request).unwrap();
        assert_eq!(patch.name.as_deref(), Some(""));
        assert_eq!(patch.sodium, Some(5000.0));
        assert_eq!(patch.protein, None);
    }

    #[rstest]
    #[case(UpdateMealRequest { calories: Some(10001), ..Default::default() })]
    #[case(UpdateMealRequest { category: Some("brunch".into()), ..Default::default() })]
    #[case(UpdateMealRequest { date: Some("29/07/2025".into()), ..Default::default() })]
    #[case(UpdateMealRequest {
        nutrition: Some(NutritionInput { carbs: Some(-0.5), ..Default::default() }),
        ..Default::default()
    })]
    fn test_validate_update_rejects(#[case] request: UpdateMealRequest) {
        assert!(matches!(
            validate_update(request),
            Err(MealError::Validation(_))
        ));
    }

    #[test]
    fn test_summarize_empty_day_is_zero() {
        let summary = summarize_meals(day(2025, 7, 30), &[]);
        assert_eq!(summary, MealSummary::empty(day(2025, 7, 30)));
    }

    proptest! {
        #[test]
        fn test_summary_totals_are_order_independent(
            values in prop::collection::vec(
                (0i64..=10_000, 0.0f64..=1000.0, 0.0f64..=1000.0, 0.0f64..=1000.0),
                0..20,
            )
        ) {
            let meals: Vec<Meal> = values
                .iter()
                .map(|&(kcal, p, c, f)| meal_with(kcal, p, c, f))
                .collect();
            let mut reversed = meals.clone();
            reversed.reverse();

            let forward = summarize_meals(day(2025, 7, 29), &meals);
            let backward = summarize_meals(day(2025, 7, 29), &reversed);

            prop_assert_eq!(forward.total_calories, values.iter().map(|v| v.0).sum::<i64>());
            prop_assert_eq!(forward.total_calories, backward.total_calories);
            prop_assert!((forward.total_protein - backward.total_protein).abs() < 1e-6);
            prop_assert!((forward.total_fat - backward.total_fat).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch_returns_equal_record() {
        let (service, _) = sqlite_service().await;

        let created = service.create_meal(valid_request()).await.unwrap();
        let other = service.create_meal(valid_request()).await.unwrap();
        assert!(!created.id.is_empty());
        assert_ne!(created.id, other.id);
        assert_eq!(created.date, Utc::now().date_naive());

        let fetched = service.get_meal_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_update_changes_only_supplied_fields() {
        let (service, _) = sqlite_service().await;
        let created = service.create_meal(valid_request()).await.unwrap();

        let request = UpdateMealRequest {
            calories: Some(500),
            ..Default::default()
        };
        let updated = service.update_meal(&created.id, request).await.unwrap();

        assert_eq!(updated.calories, 500);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(
            Meal {
                calories: created.calories,
                updated_at: created.updated_at,
                ..updated
            },
            created
        );
    }

    #[tokio::test]
    async fn test_mutations_on_missing_meal_are_not_found() {
        let (service, _) = sqlite_service().await;

        let update = service
            .update_meal("missing", UpdateMealRequest::default())
            .await;
        assert!(matches!(update, Err(ApiError::NotFound(ref m)) if m == "Meal not found"));

        let delete = service.delete_meal("missing").await;
        assert!(matches!(delete, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (service, _) = sqlite_service().await;
        let created = service.create_meal(valid_request()).await.unwrap();

        service.delete_meal(&created.id).await.unwrap();
        assert!(matches!(
            service.delete_meal(&created.id).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_daily_summary_totals() {
        let (service, repo) = sqlite_service().await;
        for sample in crate::repositories::sample_meals(day(2025, 7, 29)) {
            repo.create(sample).await.unwrap();
        }
        let mut elsewhere = crate::repositories::sample_meals(day(2025, 7, 30));
        repo.create(elsewhere.remove(0)).await.unwrap();

        let summary = service.get_daily_summary("2025-07-29").await.unwrap();
        assert_eq!(summary.total_calories, 800);
        assert_eq!(summary.total_protein, 47.0);
        assert_eq!(summary.total_carbs, 69.0);
        assert_eq!(summary.total_fat, 33.0);
        assert_eq!(summary.date, day(2025, 7, 29));

        let from_timestamp = service
            .get_daily_summary("2025-07-29T12:30:00Z")
            .await
            .unwrap();
        assert_eq!(from_timestamp, summary);
    }

    #[tokio::test]
    async fn test_daily_summary_edge_cases() {
        let (service, _) = sqlite_service().await;

        let empty = service.get_daily_summary("2025-07-30").await.unwrap();
        assert_eq!(empty, MealSummary::empty(day(2025, 7, 30)));

        let invalid = service.get_daily_summary("not-a-date").await;
        assert!(matches!(invalid, Err(ApiError::Validation(ref m)) if m == "Invalid date format"));
    }

    #[tokio::test]
    async fn test_meals_by_category() {
        let (service, _) = sqlite_service().await;
        service.create_meal(valid_request()).await.unwrap();

        assert_eq!(service.get_meals_by_category("breakfast").await.unwrap().len(), 1);
        assert!(service.get_meals_by_category("dinner").await.unwrap().is_empty());
        assert!(matches!(
            service.get_meals_by_category("brunch").await,
            Err(ApiError::Validation(ref m)) if m == "Invalid meal category"
        ));
    }

    #[tokio::test]
    async fn test_initialize_sample_data_is_idempotent() {
        let (service, _) = sqlite_service().await;
        assert_eq!(service.initialize_sample_data().await.unwrap(), 2);
        assert_eq!(service.initialize_sample_data().await.unwrap(), 0);
        assert_eq!(service.get_all_meals().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_vanished_meal_surfaces_internal_errors() {
        let service = MealService::new(Arc::new(VanishingStore {
            meal: meal_with(100, 1.0, 1.0, 1.0),
        }));

        let update = service
            .update_meal("any", UpdateMealRequest::default())
            .await;
        assert!(matches!(update, Err(ApiError::OperationFailed(ref m)) if m == "Failed to update meal"));

        let delete = service.delete_meal("any").await;
        assert!(matches!(delete, Err(ApiError::OperationFailed(ref m)) if m == "Failed to delete meal"));
    }
}

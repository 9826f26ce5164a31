//! Meal repository - database operations for meal records

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use meal_tracker_shared::{Meal, MealCategory, Nutrition};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

/// Meal row as stored in the `meals` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MealRow {
    id: String,
    name: String,
    description: Option<String>,
    category: String,
    calories: i64,
    protein: f64,
    carbs: f64,
    fat: f64,
    fiber: f64,
    sugar: f64,
    sodium: f64,
    date: NaiveDate,
    created_at: String,
    updated_at: String,
}

impl TryFrom<MealRow> for Meal {
    type Error = anyhow::Error;

    fn try_from(r: MealRow) -> Result<Self> {
        let category = r
            .category
            .parse::<MealCategory>()
            .map_err(|e| anyhow!("meal {}: {}", r.id, e))?;

        Ok(Self {
            category,
            calories: r.calories,
            nutrition: Nutrition {
                protein: r.protein,
                carbs: r.carbs,
                fat: r.fat,
                fiber: r.fiber,
                sugar: r.sugar,
                sodium: r.sodium,
            },
            date: r.date,
            created_at: parse_timestamp(&r.created_at)?,
            updated_at: parse_timestamp(&r.updated_at)?,
            id: r.id,
            name: r.name,
            description: r.description,
        })
    }
}

/// Input for creating a new meal
#[derive(Debug, Clone)]
pub struct CreateMeal {
    pub name: String,
    pub description: Option<String>,
    pub category: MealCategory,
    pub calories: i64,
    pub nutrition: Nutrition,
    pub date: NaiveDate,
}

/// Typed partial update.
///
/// `Some` fields are written, `None` fields are left untouched. For the
/// description, `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct MealPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<MealCategory>,
    pub calories: Option<i64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
    pub date: Option<NaiveDate>,
}

/// Meal persistence operations.
///
/// Absence is reported through `Option`/`bool`, never as an error; errors
/// are reserved for storage failures.
#[async_trait]
pub trait MealStore: Send + Sync {
    /// All meals, newest date first, then most recently created first
    async fn find_all(&self) -> Result<Vec<Meal>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Meal>>;

    /// Meals on one calendar day, oldest created first
    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Meal>>;

    /// Meals of one category, ordered like `find_all`
    async fn find_by_category(&self, category: MealCategory) -> Result<Vec<Meal>>;

    async fn create(&self, input: CreateMeal) -> Result<Meal>;

    /// Apply a patch; `None` when no meal has this id
    async fn update(&self, id: &str, patch: MealPatch) -> Result<Option<Meal>>;

    /// Whether a row was actually removed
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn count(&self) -> Result<i64>;

    /// Insert the sample meals, only into an empty store.
    ///
    /// Returns how many meals were inserted.
    async fn seed_sample_data(&self) -> Result<usize> {
        if self.count().await? > 0 {
            return Ok(0);
        }

        let samples = sample_meals(Utc::now().date_naive());
        let inserted = samples.len();
        for sample in samples {
            self.create(sample).await?;
        }
        Ok(inserted)
    }
}

/// The fixed set of example meals, dated `today`
pub fn sample_meals(today: NaiveDate) -> Vec<CreateMeal> {
    vec![
        CreateMeal {
            name: "Breakfast: Oatmeal".to_string(),
            description: Some("With banana and nuts".to_string()),
            category: MealCategory::Breakfast,
            calories: 350,
            nutrition: Nutrition {
                protein: 12.0,
                carbs: 54.0,
                fat: 8.0,
                ..Default::default()
            },
            date: today,
        },
        CreateMeal {
            name: "Lunch: Grilled Chicken Salad".to_string(),
            description: Some("Loaded with vegetables".to_string()),
            category: MealCategory::Lunch,
            calories: 450,
            nutrition: Nutrition {
                protein: 35.0,
                carbs: 15.0,
                fat: 25.0,
                ..Default::default()
            },
            date: today,
        },
    ]
}

/// SQLite-backed meal repository
#[derive(Clone)]
pub struct SqliteMealRepository {
    pool: SqlitePool,
}

impl SqliteMealRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MealStore for SqliteMealRepository {
    async fn find_all(&self) -> Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, name, description, category, calories,
                   protein, carbs, fat, fiber, sugar, sodium,
                   date, created_at, updated_at
            FROM meals
            ORDER BY date DESC, created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Meal::try_from).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Meal>> {
        let row = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, name, description, category, calories,
                   protein, carbs, fat, fiber, sugar, sodium,
                   date, created_at, updated_at
            FROM meals
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Meal::try_from).transpose()
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, name, description, category, calories,
                   protein, carbs, fat, fiber, sugar, sodium,
                   date, created_at, updated_at
            FROM meals
            WHERE date = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Meal::try_from).collect()
    }

    async fn find_by_category(&self, category: MealCategory) -> Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, name, description, category, calories,
                   protein, carbs, fat, fiber, sugar, sodium,
                   date, created_at, updated_at
            FROM meals
            WHERE category = ?
            ORDER BY date DESC, created_at DESC, rowid DESC
            "#,
        )
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Meal::try_from).collect()
    }

    async fn create(&self, input: CreateMeal) -> Result<Meal> {
        let now = timestamp_text(now_micros());

        let row = sqlx::query_as::<_, MealRow>(
            r#"
            INSERT INTO meals (
                id, name, description, category, calories,
                protein, carbs, fat, fiber, sugar, sodium,
                date, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, name, description, category, calories,
                      protein, carbs, fat, fiber, sugar, sodium,
                      date, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category.as_str())
        .bind(input.calories)
        .bind(input.nutrition.protein)
        .bind(input.nutrition.carbs)
        .bind(input.nutrition.fat)
        .bind(input.nutrition.fiber)
        .bind(input.nutrition.sugar)
        .bind(input.nutrition.sodium)
        .bind(input.date)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        Meal::try_from(row)
    }

    async fn update(&self, id: &str, patch: MealPatch) -> Result<Option<Meal>> {
        let mut query = build_update_query(id, patch, now_micros());

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .with_context(|| format!("updating meal {}", id))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM meals WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM meals")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Build `UPDATE meals SET ... WHERE id = ?` touching only the patched
/// columns plus `updated_at`.
fn build_update_query(
    id: &str,
    patch: MealPatch,
    updated_at: DateTime<Utc>,
) -> QueryBuilder<'static, Sqlite> {
    let mut query = QueryBuilder::<Sqlite>::new("UPDATE meals SET ");
    let mut set = query.separated(", ");

    if let Some(name) = patch.name {
        set.push("name = ").push_bind_unseparated(name);
    }
    if let Some(description) = patch.description {
        set.push("description = ").push_bind_unseparated(description);
    }
    if let Some(category) = patch.category {
        set.push("category = ")
            .push_bind_unseparated(category.as_str());
    }
    if let Some(calories) = patch.calories {
        set.push("calories = ").push_bind_unseparated(calories);
    }
    for (column, value) in [
        ("protein", patch.protein),
        ("carbs", patch.carbs),
        ("fat", patch.fat),
        ("fiber", patch.fiber),
        ("sugar", patch.sugar),
        ("sodium", patch.sodium),
    ] {
        if let Some(value) = value {
            set.push(column).push_unseparated(" = ").push_bind_unseparated(value);
        }
    }
    if let Some(date) = patch.date {
        set.push("date = ").push_bind_unseparated(date);
    }
    set.push("updated_at = ")
        .push_bind_unseparated(timestamp_text(updated_at));

    query.push(" WHERE id = ").push_bind(id.to_string());
    query
}

/// Current time at the precision that survives storage
fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering
fn timestamp_text(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .with_context(|| format!("invalid stored timestamp {:?}", raw))
}

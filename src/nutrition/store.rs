use sqlx::SqlitePool;
use time::Date;
use tracing::{error, warn};

use super::types::{DailyMeals, EntryPatch, FoodEntry, MealType};

const MEAL_KEY_PREFIX: &str = "fit-me-data";

/// Per-date meal persistence over the kv_store table, one record per
/// calendar day.
///
/// The mutating operations are plain read-modify-write with no
/// coordination. The app is the record's only writer; were a second writer
/// ever in flight for the same date (multi-tab, multi-device), the later
/// write would silently clobber the earlier one. Known limitation of the
/// single-client design.
#[derive(Clone)]
pub struct MealStore {
    db: SqlitePool,
}

/// Date-only key: lookups for the same calendar date always hit the same
/// record, whatever clock or timezone produced the `Date`.
fn meal_key(date: Date) -> String {
    format!(
        "{}-{:04}-{:02}-{:02}",
        MEAL_KEY_PREFIX,
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

impl MealStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Never fails: a missing, unreadable, or corrupt record is an empty day.
    pub async fn read(&self, date: Date) -> DailyMeals {
        let key = meal_key(date);
        let row: Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
                .bind(&key)
                .fetch_optional(&self.db)
                .await;

        match row {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(meals) => meals,
                Err(e) => {
                    warn!(%key, error = %e, "corrupt meal record, treating as empty");
                    DailyMeals::default()
                }
            },
            Ok(None) => DailyMeals::default(),
            Err(e) => {
                warn!(%key, error = %e, "meal read failed, treating as empty");
                DailyMeals::default()
            }
        }
    }

    /// Whole-record replace. Write failures are logged and dropped; there
    /// is no user-facing recovery flow.
    pub async fn write(&self, date: Date, meals: &DailyMeals) {
        if let Err(e) = self.try_write(date, meals).await {
            error!(key = %meal_key(date), error = %e, "meal write failed");
        }
    }

    async fn try_write(&self, date: Date, meals: &DailyMeals) -> anyhow::Result<()> {
        let value = serde_json::to_string(meals)?;
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE
                SET value = excluded.value, updated_at = datetime('now')
            "#,
        )
        .bind(meal_key(date))
        .bind(value)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Appends the entry to the named bucket.
    pub async fn add_entry(
        &self,
        date: Date,
        meal_type: MealType,
        entry: FoodEntry,
    ) -> DailyMeals {
        let mut meals = self.read(date).await;
        tracing::debug!(bucket = meal_type.as_str(), entry = %entry.name, "logging entry");
        meals.bucket_mut(meal_type).push(entry);
        self.write(date, &meals).await;
        meals
    }

    /// Removes the entry from whichever bucket holds it; no-op when the id
    /// is not found.
    pub async fn remove_entry(&self, date: Date, entry_id: &str) -> DailyMeals {
        let mut meals = self.read(date).await;
        let before = meals.entry_count();
        for meal_type in MealType::ALL {
            meals.bucket_mut(meal_type).retain(|e| e.id != entry_id);
        }
        if meals.entry_count() != before {
            self.write(date, &meals).await;
        }
        meals
    }

    /// Merges the patch into the matching entry; no-op when the id is not
    /// found.
    pub async fn update_entry(
        &self,
        date: Date,
        entry_id: &str,
        patch: &EntryPatch,
    ) -> DailyMeals {
        let mut meals = self.read(date).await;
        let mut found = false;
        for meal_type in MealType::ALL {
            if let Some(entry) = meals
                .bucket_mut(meal_type)
                .iter_mut()
                .find(|e| e.id == entry_id)
            {
                patch.apply(entry);
                found = true;
                break;
            }
        }
        if found {
            self.write(date, &meals).await;
        }
        meals
    }
}

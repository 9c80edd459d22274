use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::{error, warn};
use uuid::Uuid;

use crate::analysis::types::{ChatRole, ParsedMeal};

use super::types::{
    ConversationMessage, PreferencesPatch, UserProfile, MAX_CONVERSATION_HISTORY,
    MAX_MEAL_HISTORY,
};

const PROFILE_KEY: &str = "master-shredder-user-profile";

/// The single user-profile record. Same degradation rules as the meal
/// store: unreadable data is a fresh default profile, failed writes are
/// logged and dropped.
#[derive(Clone)]
pub struct ProfileStore {
    db: SqlitePool,
}

impl ProfileStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn get(&self) -> UserProfile {
        let row: Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
                .bind(PROFILE_KEY)
                .fetch_optional(&self.db)
                .await;

        match row {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(error = %e, "corrupt profile record, starting fresh");
                    UserProfile::default()
                }
            },
            Ok(None) => UserProfile::default(),
            Err(e) => {
                warn!(error = %e, "profile read failed, starting fresh");
                UserProfile::default()
            }
        }
    }

    pub async fn save(&self, profile: &UserProfile) {
        if let Err(e) = self.try_save(profile).await {
            error!(error = %e, "profile write failed");
        }
    }

    async fn try_save(&self, profile: &UserProfile) -> anyhow::Result<()> {
        let value = serde_json::to_string(profile)?;
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE
                SET value = excluded.value, updated_at = datetime('now')
            "#,
        )
        .bind(PROFILE_KEY)
        .bind(value)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Appends a chat turn, keeping only the most recent
    /// [`MAX_CONVERSATION_HISTORY`] messages.
    pub async fn add_message(&self, role: ChatRole, content: String) -> UserProfile {
        let mut profile = self.get().await;
        profile.conversation_history.push(ConversationMessage {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: OffsetDateTime::now_utc(),
        });
        let len = profile.conversation_history.len();
        if len > MAX_CONVERSATION_HISTORY {
            profile
                .conversation_history
                .drain(..len - MAX_CONVERSATION_HISTORY);
        }
        profile.last_updated = OffsetDateTime::now_utc();
        self.save(&profile).await;
        profile
    }

    /// Records a confirmed meal, learns preferences from its ingredients,
    /// and keeps only the most recent [`MAX_MEAL_HISTORY`] meals.
    pub async fn add_meal(&self, meal: ParsedMeal) -> UserProfile {
        let mut profile = self.get().await;
        profile.preferences.learn_from_meal(&meal);
        profile.meal_history.push(meal);
        let len = profile.meal_history.len();
        if len > MAX_MEAL_HISTORY {
            profile.meal_history.drain(..len - MAX_MEAL_HISTORY);
        }
        profile.last_updated = OffsetDateTime::now_utc();
        self.save(&profile).await;
        profile
    }

    pub async fn update_preferences(&self, patch: &PreferencesPatch) -> UserProfile {
        let mut profile = self.get().await;
        patch.apply(&mut profile.preferences);
        profile.last_updated = OffsetDateTime::now_utc();
        self.save(&profile).await;
        profile
    }

    /// Resets the record to a fresh default profile.
    pub async fn clear(&self) -> UserProfile {
        let profile = UserProfile::default();
        self.save(&profile).await;
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_store() -> ProfileStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("open in-memory database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("run migrations");
        ProfileStore::new(pool)
    }

    fn meal(name: &str) -> ParsedMeal {
        ParsedMeal {
            name: name.to_string(),
            calories: 100.0,
            protein: 10.0,
            carbs: 10.0,
            fats: 2.0,
            confidence: 0.8,
            assumptions: Vec::new(),
            sources: Vec::new(),
            ingredients: Vec::new(),
        }
    }

    #[tokio::test]
    async fn missing_record_is_a_default_profile() {
        let store = test_store().await;
        let profile = store.get().await;
        assert!(profile.conversation_history.is_empty());
        assert!(profile.meal_history.is_empty());
    }

    #[tokio::test]
    async fn messages_round_trip_and_cap_at_fifty() {
        let store = test_store().await;
        for i in 0..55 {
            store.add_message(ChatRole::User, format!("message {i}")).await;
        }
        let profile = store.get().await;
        assert_eq!(profile.conversation_history.len(), MAX_CONVERSATION_HISTORY);
        assert_eq!(profile.conversation_history[0].content, "message 5");
        assert_eq!(
            profile.conversation_history.last().unwrap().content,
            "message 54"
        );
    }

    #[tokio::test]
    async fn meal_history_caps_at_one_hundred() {
        let store = test_store().await;
        for i in 0..103 {
            store.add_meal(meal(&format!("meal {i}"))).await;
        }
        let profile = store.get().await;
        assert_eq!(profile.meal_history.len(), MAX_MEAL_HISTORY);
        assert_eq!(profile.meal_history[0].name, "meal 3");
    }

    #[tokio::test]
    async fn preference_patch_merges_into_the_stored_profile() {
        let store = test_store().await;
        let patch = PreferencesPatch {
            dietary_restrictions: Some(vec!["vegetarian".into()]),
            ..PreferencesPatch::default()
        };
        store.update_preferences(&patch).await;

        let profile = store.get().await;
        assert_eq!(profile.preferences.dietary_restrictions, vec!["vegetarian"]);
        assert!(profile.preferences.favorite_brands.is_empty());
    }

    #[tokio::test]
    async fn clear_resets_history() {
        let store = test_store().await;
        store.add_message(ChatRole::User, "hello".into()).await;
        store.add_meal(meal("lunch")).await;

        let profile = store.clear().await;
        assert!(profile.conversation_history.is_empty());
        assert!(profile.meal_history.is_empty());
        assert_eq!(store.get().await.meal_history.len(), 0);
    }

    #[tokio::test]
    async fn corrupt_profile_degrades_to_default() {
        let store = test_store().await;
        sqlx::query("INSERT INTO kv_store (key, value) VALUES (?1, ?2)")
            .bind(PROFILE_KEY)
            .bind("[1, 2")
            .execute(&store.db)
            .await
            .expect("seed corrupt record");
        let profile = store.get().await;
        assert!(profile.meal_history.is_empty());
    }
}

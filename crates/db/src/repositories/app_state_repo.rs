//! Repository for the `app_state` key/value table.

use sqlx::PgPool;

pub struct AppStateRepo;

impl AppStateRepo {
    /// Read a value, `None` if the key was never written.
    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT value FROM app_state WHERE key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or overwrite a value.
    pub async fn set(pool: &PgPool, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO app_state (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }
}

use anyhow::Result;

use super::schema::Database;

/// Key holding the theme name (`"light"` or `"dark"`).
pub const THEME_KEY: &str = "theme";

impl Database {
    // ========================================================================
    // Key-Value Operations
    // ========================================================================

    /// Get a stored value, or `None` if the key was never set.
    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM local_storage WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Store a value (UPSERT), refreshing its timestamp.
    pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a key. Returns true if it existed.
    pub async fn remove_item(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Theme
    // ========================================================================

    pub async fn stored_theme(&self) -> Result<Option<String>> {
        self.get_item(THEME_KEY).await
    }

    pub async fn store_theme(&self, name: &str) -> Result<()> {
        self.set_item(THEME_KEY, name).await
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::Database;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_get_item_missing() {
        let db = test_db().await;
        assert_eq!(db.get_item("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_item_upsert() {
        let db = test_db().await;
        db.set_item("theme", "dark").await.unwrap();
        db.set_item("theme", "light").await.unwrap();

        assert_eq!(db.get_item("theme").await.unwrap(), Some("light".to_string()));

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM local_storage")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_remove_item() {
        let db = test_db().await;
        db.set_item("k", "v").await.unwrap();

        assert!(db.remove_item("k").await.unwrap());
        assert!(!db.remove_item("k").await.unwrap());
        assert_eq!(db.get_item("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_theme_helpers() {
        let db = test_db().await;
        assert_eq!(db.stored_theme().await.unwrap(), None);

        db.store_theme("dark").await.unwrap();
        assert_eq!(db.stored_theme().await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_set_item_records_timestamp() {
        let db = test_db().await;
        db.set_item("k", "v").await.unwrap();

        let row: (String,) = sqlx::query_as("SELECT updated_at FROM local_storage WHERE key = ?")
            .bind("k")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert!(!row.0.is_empty());
    }
}

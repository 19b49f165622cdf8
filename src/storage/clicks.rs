use anyhow::Result;

use super::schema::Database;
use super::types::ClickRecord;

/// Key holding the click history as a JSON array, newest first.
pub const CLICKS_KEY: &str = "clicks";

/// Maximum number of click records kept.
pub const MAX_CLICK_HISTORY: usize = 50;

impl Database {
    // ========================================================================
    // Click History
    // ========================================================================

    /// Record an opened link at the current time.
    ///
    /// The new record is placed first and the list is cut to
    /// [`MAX_CLICK_HISTORY`]. A malformed stored list is replaced.
    pub async fn track_click(&self, title: &str, url: &str) -> Result<()> {
        let record = ClickRecord {
            title: title.to_string(),
            url: url.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.push_click(record).await
    }

    pub(crate) async fn push_click(&self, record: ClickRecord) -> Result<()> {
        let _guard = self.click_lock.lock().await;

        let mut clicks = self.recent_clicks().await?;
        clicks.insert(0, record);
        clicks.truncate(MAX_CLICK_HISTORY);

        let json = serde_json::to_string(&clicks)?;
        self.set_item(CLICKS_KEY, &json).await
    }

    /// Stored click history, newest first.
    ///
    /// Unparsable stored data is logged and treated as an empty history.
    pub async fn recent_clicks(&self) -> Result<Vec<ClickRecord>> {
        let Some(raw) = self.get_item(CLICKS_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<ClickRecord>>(&raw) {
            Ok(clicks) => Ok(clicks),
            Err(e) => {
                tracing::warn!(error = %e, "Stored click history is malformed, ignoring");
                Ok(Vec::new())
            }
        }
    }

    /// Forget the stored theme and click history.
    pub async fn reset_state(&self) -> Result<()> {
        self.remove_item(CLICKS_KEY).await?;
        self.remove_item(super::local_storage::THEME_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn record(n: i64) -> ClickRecord {
        ClickRecord {
            title: format!("Site {n}"),
            url: format!("https://site{n}.example"),
            timestamp: 1_700_000_000_000 + n,
        }
    }

    #[tokio::test]
    async fn test_empty_history() {
        let db = test_db().await;
        assert!(db.recent_clicks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_track_click_newest_first() {
        let db = test_db().await;
        db.track_click("Baidu", "https://www.baidu.com").await.unwrap();
        db.track_click("GitHub", "https://github.com").await.unwrap();

        let clicks = db.recent_clicks().await.unwrap();
        assert_eq!(clicks.len(), 2);
        assert_eq!(clicks[0].title, "GitHub");
        assert_eq!(clicks[1].url, "https://www.baidu.com");
        assert!(clicks[0].timestamp >= clicks[1].timestamp);
    }

    #[tokio::test]
    async fn test_history_capped_at_fifty() {
        let db = test_db().await;
        for n in 0..51 {
            db.push_click(record(n)).await.unwrap();
        }

        let clicks = db.recent_clicks().await.unwrap();
        assert_eq!(clicks.len(), MAX_CLICK_HISTORY);
        assert_eq!(clicks[0], record(50));
        assert_eq!(clicks[49], record(1));
        assert!(!clicks.contains(&record(0)));
    }

    #[tokio::test]
    async fn test_stored_format_matches_local_storage_layout() {
        let db = test_db().await;
        db.push_click(record(7)).await.unwrap();

        let raw = db.get_item(CLICKS_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "title": "Site 7",
                "url": "https://site7.example",
                "timestamp": 1_700_000_000_007i64
            }])
        );
    }

    #[tokio::test]
    async fn test_malformed_history_degrades_to_empty() {
        let db = test_db().await;
        db.set_item(CLICKS_KEY, "{not json").await.unwrap();
        assert!(db.recent_clicks().await.unwrap().is_empty());

        db.track_click("GitHub", "https://github.com").await.unwrap();
        let clicks = db.recent_clicks().await.unwrap();
        assert_eq!(clicks.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_clicks_are_all_recorded() {
        let db = test_db().await;
        let mut handles = Vec::new();
        for n in 0..10 {
            let db = db.clone();
            handles.push(tokio::spawn(async move { db.push_click(record(n)).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(db.recent_clicks().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_reset_state() {
        let db = test_db().await;
        db.store_theme("dark").await.unwrap();
        db.track_click("GitHub", "https://github.com").await.unwrap();

        db.reset_state().await.unwrap();
        assert_eq!(db.stored_theme().await.unwrap(), None);
        assert!(db.recent_clicks().await.unwrap().is_empty());
    }
}

use crate::core::settings::{SettingKey, SettingsError, SettingsStore, Universe, UniverseDirectory};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

/// Settings and universes in one SQLite file.
pub struct SqliteSettingsStore {
    pool: Pool<Sqlite>,
}

fn storage(e: sqlx::Error) -> SettingsError {
    SettingsError::Storage(e.to_string())
}

impl SqliteSettingsStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let path_str = database_url.trim_start_matches("sqlite://");
        if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path_str)?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        // Every connection to `sqlite::memory:` is its own database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&conn_str)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS universes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get(&self, key: SettingKey) -> Result<Option<String>, SettingsError> {
        let row = sqlx::query("SELECT name FROM settings WHERE id = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        Ok(row.map(|r| r.get::<String, _>("name")))
    }

    async fn set(&self, key: SettingKey, value: &str) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            INSERT INTO settings (id, name)
            VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name
            "#,
        )
        .bind(key.as_str())
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn clear(&self, key: SettingKey) -> Result<bool, SettingsError> {
        let result = sqlx::query("DELETE FROM settings WHERE id = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UniverseDirectory for SqliteSettingsStore {
    async fn list(&self) -> Result<Vec<Universe>, SettingsError> {
        let rows = sqlx::query("SELECT id, name FROM universes ORDER BY name COLLATE NOCASE")
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        Ok(rows
            .into_iter()
            .map(|row| Universe {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn upsert(&self, universe: Universe) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            INSERT INTO universes (id, name)
            VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name
            "#,
        )
        .bind(&universe.id)
        .bind(&universe.name)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool, SettingsError> {
        let result = sqlx::query("DELETE FROM universes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::SettingsService;
    use tempfile::NamedTempFile;

    async fn memory_store() -> SqliteSettingsStore {
        SqliteSettingsStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_set_get_clear() {
        let store = memory_store().await;

        assert_eq!(store.get(SettingKey::LogChannel).await.unwrap(), None);

        store.set(SettingKey::LogChannel, "123").await.unwrap();
        store.set(SettingKey::LogChannel, "456").await.unwrap();
        assert_eq!(
            store.get(SettingKey::LogChannel).await.unwrap().as_deref(),
            Some("456")
        );

        assert!(store.clear(SettingKey::LogChannel).await.unwrap());
        assert!(!store.clear(SettingKey::LogChannel).await.unwrap());
        assert_eq!(store.get(SettingKey::LogChannel).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_settings_use_original_key_names() {
        let store = memory_store().await;
        store
            .set(SettingKey::MessagingApiKey, "secret")
            .await
            .unwrap();

        let row = sqlx::query("SELECT id FROM settings")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("id"), "msgServAPIKey");
    }

    #[tokio::test]
    async fn test_universe_upsert_and_remove() {
        let store = memory_store().await;

        store
            .upsert(Universe {
                id: "1".to_string(),
                name: "beta".to_string(),
            })
            .await
            .unwrap();
        store
            .upsert(Universe {
                id: "2".to_string(),
                name: "Alpha".to_string(),
            })
            .await
            .unwrap();
        store
            .upsert(Universe {
                id: "1".to_string(),
                name: "Beta".to_string(),
            })
            .await
            .unwrap();

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);

        assert!(store.remove("2").await.unwrap());
        assert!(!store.remove("2").await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_string_lossy().to_string();
        drop(tmp);

        {
            let store = SqliteSettingsStore::connect(&path).await.unwrap();
            store
                .set(SettingKey::DatastoreApiKey, "ds-key")
                .await
                .unwrap();
            store
                .upsert(Universe {
                    id: "4242".to_string(),
                    name: "Main Game".to_string(),
                })
                .await
                .unwrap();
        }

        let service = SettingsService::new(SqliteSettingsStore::connect(&path).await.unwrap());
        assert_eq!(
            service
                .get(SettingKey::DatastoreApiKey)
                .await
                .unwrap()
                .as_deref(),
            Some("ds-key")
        );
        assert_eq!(
            service.universe_name("4242").await.unwrap().as_deref(),
            Some("Main Game")
        );

        let _ = std::fs::remove_file(&path);
    }
}

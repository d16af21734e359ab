use crate::db::Database;
use crate::error::Result;
use crate::models::{PresetRegistry, Preferences, PREFS_STORAGE_KEY};
use rusqlite::{params, OptionalExtension};

// Settings Queries

impl Database {
    pub fn load_setting(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn save_setting(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO settings (key, value, updated_at)
                VALUES (?1, ?2, datetime('now'))
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                params![key, value],
            )?;
            Ok(())
        })
    }
}

// Preference Queries

impl Database {
    /// Stored preferences validated against `registry`. A missing blob gives
    /// the defaults; a malformed one gives the defaults with a warning.
    pub fn load_preferences(&self, registry: &PresetRegistry) -> Result<Preferences> {
        Ok(self
            .load_setting(PREFS_STORAGE_KEY)?
            .map(|raw| Preferences::from_json(&raw, registry))
            .unwrap_or_default())
    }

    pub fn save_preferences(&self, prefs: &Preferences) -> Result<()> {
        self.save_setting(PREFS_STORAGE_KEY, &prefs.to_json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_upsert() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_setting("k").unwrap(), None);

        db.save_setting("k", "uno").unwrap();
        db.save_setting("k", "due").unwrap();
        assert_eq!(db.load_setting("k").unwrap().as_deref(), Some("due"));
    }

    #[test]
    fn preferences_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let registry = PresetRegistry::builtin();
        assert_eq!(db.load_preferences(&registry).unwrap(), Preferences::default());

        let prefs = Preferences {
            selected_crop: "olivo".into(),
            selected_product: "diserbante".into(),
            wind_sensitivity: "tolerant".into(),
            min_window_hours: 5.0,
        };
        db.save_preferences(&prefs).unwrap();
        assert_eq!(db.load_preferences(&registry).unwrap(), prefs);
    }

    #[test]
    fn corrupt_blob_loads_defaults() {
        let db = Database::open_in_memory().unwrap();
        db.save_setting(PREFS_STORAGE_KEY, "{\"selectedCrop\":").unwrap();
        let registry = PresetRegistry::builtin();
        assert_eq!(db.load_preferences(&registry).unwrap(), Preferences::default());
    }

    #[test]
    fn preset_missing_from_registry_falls_back() {
        let db = Database::open_in_memory().unwrap();
        db.save_setting(
            PREFS_STORAGE_KEY,
            r#"{"selectedCrop":"mais","minWindowHours":3}"#,
        )
        .unwrap();
        let prefs = db.load_preferences(&PresetRegistry::builtin()).unwrap();
        assert_eq!(prefs.selected_crop, "standard");
        assert_eq!(prefs.min_window_hours, 3.0);
    }
}

//! `shelf demo`: a walkthrough of the SQLite-backed profile collection.
//!
//! Declares the profiles table, inserts two profiles, commits, and reads them
//! back as `LastName, Name: Age` lines.

use shelf_core::{BackendConfig, FieldValue, Record, TableSchema};
use tracing::info;

/// Profiles inserted by the demo, as `(Name, LastName, Age)`
pub const DEMO_PROFILES: &[(&str, &str, i64)] = &[("Jon", "Doe", 10), ("Linda", "Witherfork", 34)];

pub async fn run_demo(database_url: &str) -> anyhow::Result<Vec<String>> {
    let backend = BackendConfig::sqlite(database_url, TableSchema::user_profiles()).open().await?;

    for (name, last_name, age) in DEMO_PROFILES {
        let profile = Record::new()
            .with_field("Name", *name)
            .with_field("LastName", *last_name)
            .with_field("Age", *age);
        let id = backend.insert(profile).await?;
        info!(id, name, "Inserted demo profile");
    }

    let lines = backend.list().await?.iter().map(describe_profile).collect();
    Ok(lines)
}

fn describe_profile(profile: &Record) -> String {
    let field = |name: &str| profile.get(name).cloned().unwrap_or(FieldValue::Null);
    format!("{}, {}: {}", field("LastName"), field("Name"), field("Age"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_lists_seeded_profiles() {
        let lines = run_demo("sqlite::memory:").await.unwrap();
        assert_eq!(lines, vec!["Doe, Jon: 10".to_string(), "Witherfork, Linda: 34".to_string()]);
    }

    #[test]
    fn test_describe_profile_with_missing_fields() {
        let profile = Record::new().with_field("Name", "Ana");
        assert_eq!(describe_profile(&profile), "null, Ana: null");
    }
}

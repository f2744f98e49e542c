use serde::{Deserialize, Serialize};

/// Record store location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite file (default: "/etc/homedns/records.sqlite")
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "/etc/homedns/records.sqlite".to_string()
}

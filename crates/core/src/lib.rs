pub mod domain;
pub mod engine;
pub mod error;
pub mod http;
pub mod ingest;
pub mod location;
pub mod skill;
pub mod speech;
pub mod time;

pub mod config {
    use anyhow::Context;

    const DEFAULT_ZIP_TABLE_PATH: &str = "data/zip_lat_long.json";

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub dark_sky_api_key: Option<String>,
        pub dark_sky_base_url: Option<String>,
        pub device_api_base_url: Option<String>,
        pub zip_table_path: Option<String>,
        pub fixed_postal_code: Option<String>,
        pub skill_app_id: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                dark_sky_api_key: non_empty_var("DARK_SKY_API_KEY"),
                dark_sky_base_url: non_empty_var("DARK_SKY_BASE_URL"),
                device_api_base_url: non_empty_var("DEVICE_API_BASE_URL"),
                zip_table_path: non_empty_var("ZIP_TABLE_PATH"),
                fixed_postal_code: non_empty_var("FIXED_POSTAL_CODE"),
                skill_app_id: non_empty_var("SKILL_APP_ID"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_dark_sky_api_key(&self) -> anyhow::Result<&str> {
            self.dark_sky_api_key
                .as_deref()
                .context("DARK_SKY_API_KEY is required")
        }

        pub fn zip_table_path(&self) -> &str {
            self.zip_table_path
                .as_deref()
                .unwrap_or(DEFAULT_ZIP_TABLE_PATH)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

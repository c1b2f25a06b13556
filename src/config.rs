use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{Context, anyhow};
use tracing::info;

use crate::repository::SearchOptions;

const DEFAULT_CONTACT: &str = "Reach the editors through the contact address published on the about page.";

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub search: SearchOptions,
    pub static_dir: String,
    pub contact_content: String,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: try_load("HOST", "0.0.0.0")?,
            port: try_load("PORT", "3000")?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            search: SearchOptions {
                limit: try_load("SEARCH_LIMIT", "25")?,
                time_budget: Duration::from_millis(try_load("SEARCH_TIMEOUT_MS", "1000")?),
            },
            static_dir: try_load("STATIC_DIR", "public")?,
            contact_content: try_load("CONTACT_CONTENT", DEFAULT_CONTACT)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow!("invalid {key} value {raw:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_falls_back_to_default() {
        let port: u16 = try_load("BLOG_PORTAL_TEST_UNSET_PORT", "3000").unwrap();
        assert_eq!(port, 3000);
    }

    #[test]
    fn unparsable_default_is_an_error() {
        let err = try_load::<u16>("BLOG_PORTAL_TEST_UNSET_PORT", "not-a-port").unwrap_err();
        assert!(err.to_string().contains("BLOG_PORTAL_TEST_UNSET_PORT"));
    }
}

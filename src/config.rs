//! Configuration for the Perch gateway
//!
//! Layered the usual way: environment variables override an optional TOML
//! file (`~/.config/perch/config.toml`), which overrides defaults. All file
//! fields are optional — the file is a partial overlay.

use std::path::PathBuf;

use serde::Deserialize;

use crate::{Error, Result};

/// Resolved gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Nextcloud account (calendar, notes, tasks, music catalog)
    pub nextcloud: Option<NextcloudConfig>,

    /// IMAP mailbox for email summaries
    pub email: Option<EmailConfig>,

    /// News feed endpoint
    pub news: Option<NewsConfig>,

    /// Wake-on-lan target machine
    pub wake_on_lan: Option<WakeOnLanConfig>,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Skill application id; when set, every request envelope must carry it
    pub application_id: Option<String>,

    /// Local directory served under `/media` for self-hosted audio files
    pub media_dir: Option<PathBuf>,
}

/// Nextcloud account configuration
#[derive(Debug, Clone)]
pub struct NextcloudConfig {
    /// Base URL of the instance, e.g. `https://cloud.example.org`
    pub base_url: String,
    pub username: String,
    pub password: String,
}

/// IMAP mailbox configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// News feed configuration
#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// Endpoint returning `{"articles": [{"title": ...}, ...]}`
    pub endpoint: String,

    /// Optional API key sent as a bearer token
    pub api_key: Option<String>,

    /// Number of headlines to read out
    pub headline_count: usize,
}

/// Wake-on-lan target configuration
#[derive(Debug, Clone)]
pub struct WakeOnLanConfig {
    /// MAC address of the target machine, e.g. `AA:BB:CC:DD:EE:FF`
    pub mac: String,

    /// Broadcast address for the magic packet
    pub broadcast: String,
}

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct PerchConfigFile {
    #[serde(default)]
    pub server: ServerFileConfig,

    #[serde(default)]
    pub nextcloud: Option<NextcloudFileConfig>,

    #[serde(default)]
    pub email: Option<EmailFileConfig>,

    #[serde(default)]
    pub news: Option<NewsFileConfig>,

    #[serde(default)]
    pub wake_on_lan: Option<WakeOnLanFileConfig>,
}

/// Server section of the config file
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub port: Option<u16>,
    pub application_id: Option<String>,
    pub media_dir: Option<PathBuf>,
}

/// Nextcloud section of the config file
#[derive(Debug, Deserialize)]
pub struct NextcloudFileConfig {
    pub base_url: String,
    pub username: String,
    pub password: Option<String>,
}

/// Email section of the config file
#[derive(Debug, Deserialize)]
pub struct EmailFileConfig {
    pub host: String,
    pub port: Option<u16>,
    pub username: String,
    pub password: Option<String>,
}

/// News section of the config file
#[derive(Debug, Deserialize)]
pub struct NewsFileConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub headline_count: Option<usize>,
}

/// Wake-on-lan section of the config file
#[derive(Debug, Deserialize)]
pub struct WakeOnLanFileConfig {
    pub mac: String,
    pub broadcast: Option<String>,
}

/// Default config file path: `~/.config/perch/config.toml`
#[must_use]
pub fn default_config_path() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".config/perch/config.toml"),
        |d| d.config_dir().join("perch").join("config.toml"),
    )
}

/// Load the optional TOML config file, tolerating its absence
fn load_config_file(path: Option<&PathBuf>) -> Result<PerchConfigFile> {
    let path = path.cloned().unwrap_or_else(default_config_path);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using env and defaults");
        return Ok(PerchConfigFile::default());
    }

    let raw = std::fs::read_to_string(&path)?;
    let parsed = toml::from_str(&raw)?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(parsed)
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Merge the news section, env values taking precedence per field
fn merge_news(
    env_endpoint: Option<String>,
    env_api_key: Option<String>,
    file: Option<NewsFileConfig>,
) -> Option<NewsConfig> {
    match (env_endpoint, file) {
        (Some(endpoint), file) => Some(NewsConfig {
            endpoint,
            api_key: env_api_key.or_else(|| file.as_ref().and_then(|f| f.api_key.clone())),
            headline_count: file.and_then(|f| f.headline_count).unwrap_or(5),
        }),
        (None, Some(file)) => Some(NewsConfig {
            endpoint: file.endpoint,
            api_key: env_api_key.or(file.api_key),
            headline_count: file.headline_count.unwrap_or(5),
        }),
        (None, None) => None,
    }
}

impl Config {
    /// Load configuration, env > file > default
    ///
    /// # Errors
    ///
    /// Returns an error when the config file exists but cannot be read or
    /// parsed, or when a section is present without its credential.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let fc = load_config_file(config_path)?;

        let server = ServerConfig {
            port: env("PERCH_PORT")
                .or_else(|| env("PORT"))
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(5000),
            application_id: env("PERCH_SKILL_ID").or(fc.server.application_id),
            media_dir: env("PERCH_MEDIA_DIR").map(PathBuf::from).or(fc.server.media_dir),
        };

        let nextcloud = match (env("NEXTCLOUD_URL"), fc.nextcloud) {
            (Some(base_url), file) => Some(NextcloudConfig {
                base_url,
                username: env("NEXTCLOUD_USER")
                    .or_else(|| file.as_ref().map(|f| f.username.clone()))
                    .ok_or_else(|| Error::Config("NEXTCLOUD_USER not set".into()))?,
                password: env("NEXTCLOUD_PASSWORD")
                    .or_else(|| file.and_then(|f| f.password))
                    .ok_or_else(|| Error::Config("NEXTCLOUD_PASSWORD not set".into()))?,
            }),
            (None, Some(file)) => Some(NextcloudConfig {
                base_url: file.base_url,
                username: file.username,
                password: env("NEXTCLOUD_PASSWORD").or(file.password).ok_or_else(|| {
                    Error::Config("nextcloud configured without a password".into())
                })?,
            }),
            (None, None) => None,
        };

        let email = match (env("IMAP_HOST"), fc.email) {
            (Some(host), file) => Some(EmailConfig {
                host,
                port: env("IMAP_PORT")
                    .and_then(|p| p.parse().ok())
                    .or_else(|| file.as_ref().and_then(|f| f.port))
                    .unwrap_or(993),
                username: env("IMAP_USER")
                    .or_else(|| file.as_ref().map(|f| f.username.clone()))
                    .ok_or_else(|| Error::Config("IMAP_USER not set".into()))?,
                password: env("IMAP_PASSWORD")
                    .or_else(|| file.and_then(|f| f.password))
                    .ok_or_else(|| Error::Config("IMAP_PASSWORD not set".into()))?,
            }),
            (None, Some(file)) => Some(EmailConfig {
                host: file.host,
                port: file.port.unwrap_or(993),
                username: file.username,
                password: env("IMAP_PASSWORD")
                    .or(file.password)
                    .ok_or_else(|| Error::Config("email configured without a password".into()))?,
            }),
            (None, None) => None,
        };

        let news = merge_news(
            env("PERCH_NEWS_ENDPOINT"),
            env("PERCH_NEWS_API_KEY"),
            fc.news,
        );

        let wake_on_lan = match (env("PERCH_WOL_MAC"), fc.wake_on_lan) {
            (Some(mac), file) => Some(WakeOnLanConfig {
                mac,
                broadcast: env("PERCH_WOL_BROADCAST")
                    .or_else(|| file.and_then(|f| f.broadcast))
                    .unwrap_or_else(|| "255.255.255.255:9".to_string()),
            }),
            (None, Some(file)) => Some(WakeOnLanConfig {
                mac: file.mac,
                broadcast: file
                    .broadcast
                    .unwrap_or_else(|| "255.255.255.255:9".to_string()),
            }),
            (None, None) => None,
        };

        Ok(Self {
            server,
            nextcloud,
            email,
            news,
            wake_on_lan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_only_named_sections() {
        let fc: PerchConfigFile = toml::from_str(
            r#"
            [server]
            port = 8080

            [nextcloud]
            base_url = "https://cloud.example.org"
            username = "perch"
            password = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(fc.server.port, Some(8080));
        let nc = fc.nextcloud.unwrap();
        assert_eq!(nc.base_url, "https://cloud.example.org");
        assert!(fc.email.is_none());
        assert!(fc.news.is_none());
    }

    #[test]
    fn empty_file_parses_to_defaults() {
        let fc: PerchConfigFile = toml::from_str("").unwrap();
        assert!(fc.server.port.is_none());
        assert!(fc.wake_on_lan.is_none());
    }

    #[test]
    fn news_endpoint_from_env_keeps_file_headline_count() {
        let file = NewsFileConfig {
            endpoint: "https://file.example/news".to_string(),
            api_key: Some("file-key".to_string()),
            headline_count: Some(3),
        };
        let news = merge_news(
            Some("https://env.example/news".to_string()),
            None,
            Some(file),
        )
        .unwrap();

        assert_eq!(news.endpoint, "https://env.example/news");
        assert_eq!(news.api_key.as_deref(), Some("file-key"));
        assert_eq!(news.headline_count, 3);
    }

    #[test]
    fn news_headline_count_defaults_without_a_file() {
        let news = merge_news(Some("https://env.example/news".to_string()), None, None).unwrap();
        assert_eq!(news.headline_count, 5);

        assert!(merge_news(None, Some("orphan-key".to_string()), None).is_none());
    }

    #[test]
    fn wol_broadcast_defaults_when_omitted() {
        let fc: PerchConfigFile = toml::from_str(
            r#"
            [wake_on_lan]
            mac = "AA:BB:CC:DD:EE:FF"
            "#,
        )
        .unwrap();
        let wol = fc.wake_on_lan.unwrap();
        assert_eq!(wol.mac, "AA:BB:CC:DD:EE:FF");
        assert!(wol.broadcast.is_none());
    }
}

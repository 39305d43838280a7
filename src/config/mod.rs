mod file_config;

pub use file_config::{FileConfig, MatchingConfig};

use crate::catalog::DEFAULT_PAGE_SIZE;
use crate::matching::MatchPolicy;
use crate::server::RequestsLoggingLevel;
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;

/// Environment variable consulted when no token is given on the command line.
pub const TOKEN_ENV_VAR: &str = "JELLYFIN_TOKEN";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub jellyfin_url: Option<String>,
    pub jellyfin_token: Option<String>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub request_timeout_sec: u64,
    pub page_size: usize,
    pub parallel_matching: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jellyfin_url: String,
    pub jellyfin_token: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub request_timeout_sec: u64,
    pub page_size: usize,
    pub match_policy: MatchPolicy,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let jellyfin_url = file
            .jellyfin_url
            .or_else(|| cli.jellyfin_url.clone())
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("jellyfin_url must be specified via --jellyfin-url or in config file")
            })?;
        if !jellyfin_url.starts_with("http://") && !jellyfin_url.starts_with("https://") {
            bail!("jellyfin_url must be an http(s) URL: {}", jellyfin_url);
        }

        let jellyfin_token = file
            .jellyfin_token
            .or_else(|| cli.jellyfin_token.clone())
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "jellyfin_token must be specified via --jellyfin-token, {} or in config file",
                    TOKEN_ENV_VAR
                )
            })?;

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let request_timeout_sec = file.request_timeout_sec.unwrap_or(cli.request_timeout_sec);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than 0");
        }

        let page_size = file.page_size.unwrap_or(cli.page_size);
        if page_size == 0 {
            bail!("page_size must be greater than 0");
        }

        // Matching settings - merge file config with defaults
        let matching_file = file.matching.unwrap_or_default();
        let defaults = MatchPolicy::default();
        let match_policy = MatchPolicy {
            title_threshold: matching_file
                .title_threshold
                .unwrap_or(defaults.title_threshold),
            contributor_threshold: matching_file
                .contributor_threshold
                .unwrap_or(defaults.contributor_threshold),
            parallel: matching_file.parallel.unwrap_or(cli.parallel_matching),
        };
        validate_threshold("title_threshold", match_policy.title_threshold)?;
        validate_threshold("contributor_threshold", match_policy.contributor_threshold)?;

        Ok(Self {
            jellyfin_url,
            jellyfin_token,
            port,
            logging_level,
            frontend_dir_path,
            request_timeout_sec,
            page_size,
            match_policy,
        })
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            jellyfin_url: None,
            jellyfin_token: None,
            port: 8080,
            logging_level: RequestsLoggingLevel::default(),
            frontend_dir_path: None,
            request_timeout_sec: 15,
            page_size: DEFAULT_PAGE_SIZE,
            parallel_matching: false,
        }
    }
}

fn validate_threshold(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        bail!("{} must be between 0 and 1, got {}", name, value);
    }
    Ok(())
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

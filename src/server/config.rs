use super::RequestsLoggingLevel;
use crate::catalog::DEFAULT_PAGE_SIZE;
use crate::matching::MatchPolicy;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub frontend_dir_path: Option<String>,
    /// Page size used when the local catalog is re-fetched.
    pub page_size: usize,
    pub match_policy: MatchPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 8080,
            frontend_dir_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            match_policy: MatchPolicy::default(),
        }
    }
}

use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub const DEFAULT_CONFIG_FILE: &str = "fund-catalog.json";
pub const DEFAULT_SEARCH_URL: &str =
    "https://info.tase.co.il/Heb/MarketData/MutualFunds/Pages/SearchFund.aspx";
pub const DEFAULT_API_BASE_URL: &str = "https://mayaapi.tase.co.il";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Discover ids, fetch every instrument, rank.
    #[default]
    Full,
    /// Fetch the ids persisted by an earlier run, rank.
    FromIds,
    /// Re-rank a persisted catalog.
    RankOnly,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub search_url: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub category_link: Option<String>,
    #[serde(default)]
    pub full_listing_link: Option<String>,
    #[serde(default)]
    pub id_link: Option<String>,
    #[serde(default)]
    pub ids_path: Option<String>,
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default)]
    pub sorted_catalog_path: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Href fragments that drive the two navigation steps and the id scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySettings {
    pub search_url: String,
    pub category_link: String,
    pub full_listing_link: String,
    pub id_link: String,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            category_link: "'2')".to_string(),
            full_listing_link: "submitall".to_string(),
            id_link: "ObjectID=".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub ids: Utf8PathBuf,
    pub catalog: Utf8PathBuf,
    pub sorted_catalog: Utf8PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            ids: Utf8PathBuf::from("ids.json"),
            catalog: Utf8PathBuf::from("catalog.json"),
            sorted_catalog: Utf8PathBuf::from("funds.json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub mode: Mode,
    pub discovery: DiscoverySettings,
    pub api_base_url: String,
    pub paths: ArtifactPaths,
    pub timeout_secs: u64,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or the default file when present. A missing default file means defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, CatalogError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(Self::resolve_config(Config::default()));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| CatalogError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| CatalogError::ConfigParse(err.to_string()))?;

        Ok(Self::resolve_config(config))
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        let discovery_defaults = DiscoverySettings::default();
        let path_defaults = ArtifactPaths::default();

        ResolvedConfig {
            mode: config.mode.unwrap_or_default(),
            discovery: DiscoverySettings {
                search_url: config.search_url.unwrap_or(discovery_defaults.search_url),
                category_link: config
                    .category_link
                    .unwrap_or(discovery_defaults.category_link),
                full_listing_link: config
                    .full_listing_link
                    .unwrap_or(discovery_defaults.full_listing_link),
                id_link: config.id_link.unwrap_or(discovery_defaults.id_link),
            },
            api_base_url: config
                .api_base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            paths: ArtifactPaths {
                ids: config.ids_path.map(Utf8PathBuf::from).unwrap_or(path_defaults.ids),
                catalog: config
                    .catalog_path
                    .map(Utf8PathBuf::from)
                    .unwrap_or(path_defaults.catalog),
                sorted_catalog: config
                    .sorted_catalog_path
                    .map(Utf8PathBuf::from)
                    .unwrap_or(path_defaults.sorted_catalog),
            },
            timeout_secs: config.timeout_secs.unwrap_or(30),
        }
    }
}

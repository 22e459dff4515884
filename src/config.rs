use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::categories::{FallbackOverrides, Round, GENERAL_MERIT};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub applicant: ApplicantConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantConfig {
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataConfig {
    #[serde(default)]
    pub cutoff_path: Option<String>,
    #[serde(default)]
    pub branches_path: Option<String>,
}

/// Category chains that replace the built-in table for matching categories.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FallbackConfig {
    #[serde(default)]
    pub chains: FallbackOverrides,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendConfig {
    #[serde(default = "default_year")]
    pub year: String,
    #[serde(default = "default_round")]
    pub round: Round,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub category: Option<String>,
    pub rank: Option<u32>,
    pub cutoff_path: Option<String>,
    pub year: Option<String>,
    pub round: Option<Round>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/admission-oracle/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(category) = overrides.category {
            self.applicant.category = category;
        }
        if let Some(rank) = overrides.rank {
            self.applicant.rank = Some(rank);
        }
        if let Some(cutoff_path) = overrides.cutoff_path {
            self.data.cutoff_path = Some(cutoff_path);
        }
        if let Some(year) = overrides.year {
            self.recommend.year = year;
        }
        if let Some(round) = overrides.round {
            self.recommend.round = round;
        }
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_cutoff_path(&self) -> Option<PathBuf> {
        self.data.cutoff_path.as_deref().map(expand_tilde)
    }

    pub fn resolved_branches_path(&self) -> Option<PathBuf> {
        self.data.branches_path.as_deref().map(expand_tilde)
    }

    pub fn default_template() -> String {
        let template = r#"[applicant]
category = "GM"
# rank = 12000

[data]
cutoff_path = "~/.local/share/admission-oracle/cutoffs.json"
branches_path = "~/.local/share/admission-oracle/branches.json"

[fallback.chains]
# "2AG" = ["2AG", "GM"]

[recommend]
year = "2025"
round = "r1"

[server]
host = "127.0.0.1"
port = 3001
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for ApplicantConfig {
    fn default() -> Self {
        Self {
            category: default_category(),
            rank: None,
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            year: default_year(),
            round: default_round(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_category() -> String {
    GENERAL_MERIT.to_string()
}

fn default_year() -> String {
    "2025".to_string()
}

fn default_round() -> Round {
    Round::R1
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

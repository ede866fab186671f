use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::{ProgramId, Variant};
use crate::output::{RenderOptions, ReportFormat};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub programs: ProgramsConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_portal_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    #[serde(default = "default_message_path")]
    pub message_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProgramsConfig {
    #[serde(default)]
    pub variant: Variant,
    /// Empty means every program of the variant.
    #[serde(default)]
    pub enabled: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
    #[serde(default)]
    pub mark_new_programs: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub variant: Option<Variant>,
    pub format: Option<ReportFormat>,
    pub enabled_programs: Option<Vec<String>>,
    pub snapshot_path: Option<String>,
    pub message_path: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/admission-campaign/config.toml")
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
        if let Some(variant) = overrides.variant {
            self.programs.variant = variant;
        }
        if let Some(format) = overrides.format {
            self.report.format = format;
        }
        if let Some(programs) = overrides.enabled_programs {
            self.programs.enabled = programs;
        }
        if let Some(path) = overrides.snapshot_path {
            self.storage.snapshot_path = path;
        }
        if let Some(path) = overrides.message_path {
            self.storage.message_path = path;
        }
    }

    /// Programs to poll: the configured list, or the whole variant when empty.
    /// Programs outside the variant are rejected.
    pub fn selected_programs(&self) -> Result<Vec<ProgramId>> {
        let variant_programs = self.programs.variant.programs();
        if self.programs.enabled.is_empty() {
            return Ok(variant_programs.to_vec());
        }
        let mut out = Vec::new();
        for entry in &self.programs.enabled {
            let id = entry.parse::<ProgramId>()?;
            if !variant_programs.contains(&id) {
                anyhow::bail!(
                    "program {id} is not part of the {:?} variant",
                    self.programs.variant
                );
            }
            out.push(id);
        }
        out.sort();
        out.dedup();
        Ok(out)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            mark_new_programs: self.report.mark_new_programs,
        }
    }

    pub fn resolved_snapshot_path(&self) -> PathBuf {
        expand_tilde(&self.storage.snapshot_path)
    }

    pub fn resolved_message_path(&self) -> PathBuf {
        expand_tilde(&self.storage.message_path)
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

    pub fn default_template() -> String {
        let template = r#"[portal]
url = "https://raitinglistpk.mospolytech.ru/rating_list_ajax.php"
timeout_secs = 30
connect_timeout_secs = 10
user_agent = "admission-campaign/0.1"

[storage]
snapshot_path = "ParsedData.json"
message_path = "MessageContent.txt"

[programs]
# "extended" polls all ten programs and scrapes the accepted score,
# "base" polls the four IiIT programs only.
variant = "extended"
enabled = []

[report]
# line | table | json
format = "line"
mark_new_programs = false
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

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            url: default_portal_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            message_path: default_message_path(),
        }
    }
}

fn default_portal_url() -> String {
    "https://raitinglistpk.mospolytech.ru/rating_list_ajax.php".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "admission-campaign/0.1".to_string()
}

fn default_snapshot_path() -> String {
    "ParsedData.json".to_string()
}

fn default_message_path() -> String {
    "MessageContent.txt".to_string()
}

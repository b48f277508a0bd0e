use anyhow::{Context, Result, anyhow, bail};
use scraper::Selector;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        let template = &self.source.url_template;
        if !template.contains("{year}") || !template.contains("{page}") {
            bail!("source.url_template must contain {{year}} and {{page}} placeholders");
        }
        parse_selector(&self.source.rows_selector)
            .context("source.rows_selector is not a valid css selector")?;
        parse_selector(&self.source.last_page_selector)
            .context("source.last_page_selector is not a valid css selector")?;
        if self.dataset.dir.as_os_str().is_empty() {
            bail!("dataset.dir must not be empty");
        }
        if self.output.worksheet_name.trim().is_empty() {
            bail!("output.worksheet_name must not be empty");
        }
        Ok(())
    }

    pub fn page_url(&self, year: i32, page: u32) -> String {
        self.source
            .url_template
            .replace("{year}", &year.to_string())
            .replace("{page}", &page.to_string())
    }

    pub fn output_path(&self, year: i32) -> PathBuf {
        PathBuf::from(
            self.output
                .path_template
                .replace("{year}", &year.to_string()),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_url_template")]
    pub url_template: String,
    #[serde(default = "default_rows_selector")]
    pub rows_selector: String,
    #[serde(default = "default_last_page_selector")]
    pub last_page_selector: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            rows_selector: default_rows_selector(),
            last_page_selector: default_last_page_selector(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u8,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,
    #[serde(default = "default_true")]
    pub use_system_proxy: bool,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            request_interval_ms: default_request_interval_ms(),
            use_system_proxy: true,
            user_agent: None,
            headers: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_dir")]
    pub dir: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dir: default_dataset_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path_template")]
    pub path_template: String,
    #[serde(default = "default_worksheet_name")]
    pub worksheet_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path_template: default_output_path_template(),
            worksheet_name: default_worksheet_name(),
        }
    }
}

/// Loads the config file, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        let config = AppConfig::default();
        config.validate()?;
        return Ok(config);
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config: AppConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse toml in {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|err| anyhow!("invalid css selector {selector}: {err:?}"))
}

fn default_true() -> bool {
    true
}

fn default_url_template() -> String {
    "https://inspect.rospotrebnadzor.ru/{year}/?page={page}".to_string()
}

fn default_rows_selector() -> String {
    "table.tlist > tbody > tr".to_string()
}

fn default_last_page_selector() -> String {
    "center > .scroller > a:last-of-type".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_retry_attempts() -> u8 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_request_interval_ms() -> u64 {
    10
}

fn default_dataset_dir() -> PathBuf {
    PathBuf::from("dataset")
}

fn default_output_path_template() -> String {
    "output/inspect.rospotrebnadzor.{year}.xlsx".to_string()
}

fn default_worksheet_name() -> String {
    "Dataset".to_string()
}

//! Analyzer configuration management

use anyhow::{Context, Result, anyhow};
use common::DeviceFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub analyzer: AnalyzerSettings,
    #[serde(default)]
    pub timing: TimingSettings,
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub usb: UsbSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerSettings {
    #[serde(default = "AnalyzerSettings::default_log_level")]
    pub log_level: String,
    /// Interface claimed for the handshake and report monitoring
    #[serde(default)]
    pub interface: u8,
    /// Directories searched for the libusb header (empty = system defaults)
    #[serde(default)]
    pub include_dirs: Vec<String>,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            interface: 0,
            include_dirs: Vec::new(),
        }
    }
}

impl AnalyzerSettings {
    fn default_log_level() -> String {
        "info".to_string()
    }

    /// Include directories with `~` expanded, or the system defaults
    pub fn resolved_include_dirs(&self) -> Vec<PathBuf> {
        if self.include_dirs.is_empty() {
            return libusb_bridge::header::default_include_dirs();
        }
        self.include_dirs
            .iter()
            .map(|d| PathBuf::from(shellexpand::tilde(d).as_ref()))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingSettings {
    #[serde(default = "TimingSettings::default_read_timeout")]
    pub read_timeout_ms: u64,
    #[serde(default = "TimingSettings::default_write_timeout")]
    pub write_timeout_ms: u64,
    /// Pause between handshake packets
    #[serde(default = "TimingSettings::default_init_delay")]
    pub init_delay_ms: u64,
    #[serde(default = "TimingSettings::default_monitor_duration")]
    pub monitor_duration_secs: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            read_timeout_ms: Self::default_read_timeout(),
            write_timeout_ms: Self::default_write_timeout(),
            init_delay_ms: Self::default_init_delay(),
            monitor_duration_secs: Self::default_monitor_duration(),
        }
    }
}

impl TimingSettings {
    fn default_read_timeout() -> u64 {
        100
    }

    fn default_write_timeout() -> u64 {
        100
    }

    fn default_init_delay() -> u64 {
        50
    }

    fn default_monitor_duration() -> u64 {
        5
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn init_delay(&self) -> Duration {
        Duration::from_millis(self.init_delay_ms)
    }

    pub fn monitor_duration(&self) -> Duration {
        Duration::from_secs(self.monitor_duration_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    #[serde(default = "MonitorSettings::default_max_reports")]
    pub max_reports: u32,
    /// Read buffer size for a single input report
    #[serde(default = "MonitorSettings::default_report_size")]
    pub report_size: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            max_reports: Self::default_max_reports(),
            report_size: Self::default_report_size(),
        }
    }
}

impl MonitorSettings {
    fn default_max_reports() -> u32 {
        20
    }

    fn default_report_size() -> usize {
        64
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsbSettings {
    /// Restrict the device list to these VID:PID patterns
    #[serde(default)]
    pub filters: Vec<DeviceFilter>,
}

impl AnalyzerConfig {
    /// Load configuration from the specified path
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref())
        } else {
            let candidates = vec![
                Self::default_path(),
                PathBuf::from("/etc/gamepad-usb/analyzer.toml"),
            ];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AnalyzerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("gamepad-usb").join("analyzer.toml")
        } else {
            PathBuf::from(".config/gamepad-usb/analyzer.toml")
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        common::logging::validate_level(&self.analyzer.log_level)?;

        if self.monitor.max_reports == 0 {
            return Err(anyhow!("monitor.max_reports must be greater than 0"));
        }

        if self.monitor.report_size == 0 {
            return Err(anyhow!("monitor.report_size must be greater than 0"));
        }

        Ok(())
    }
}

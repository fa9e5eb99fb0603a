use anyhow::anyhow;
use clap::Parser;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::{Read, Write},
    path::PathBuf,
};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

use crate::domain::ActivationPolicy;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to Settings.toml file holding configuration options
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level to run with the service (default: info)
    #[arg(short, long)]
    pub level: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Settings {
    pub config: Option<String>,
    pub level: Option<String>,
    #[serde(default)]
    pub api_settings: APISettings,
    #[serde(default)]
    pub backend_settings: BackendSettings,
    #[serde(default)]
    pub console_settings: ConsoleSettings,
}

impl ConfigurableSettings for Settings {
    fn apply_cli_overrides(&mut self, cli_settings: &CliSettings) {
        if let Some(level) = &cli_settings.level {
            self.level = Some(level.clone());
        }
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("./config/local.toml")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct APISettings {
    pub domain: String,
    pub port: String,
    pub origins: Vec<String>,
}

impl Default for APISettings {
    fn default() -> Self {
        APISettings {
            domain: String::from("127.0.0.1"),
            port: String::from("9990"),
            origins: vec![String::from("http://localhost:9990")],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base url of the commerce backend's admin api, the spin wheel
    /// endpoints are resolved relative to it
    pub base_url: String,
    /// Bearer token sent with every backend request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Use the in-memory backend instead of the real one
    /// (only honored in debug builds or with the e2e-testing feature)
    #[serde(default)]
    pub mock_enabled: bool,
    /// Upper bound on a single backend call, in seconds
    pub request_timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            base_url: String::from("http://127.0.0.1:8000/api/admin/"),
            api_token: None,
            mock_enabled: false,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsoleSettings {
    pub title: String,
    /// What to do when an active wheel cannot be switched off before
    /// another one is activated
    #[serde(default)]
    pub activation_policy: ActivationPolicy,
    /// Editor sessions untouched for this long are dropped
    pub session_idle_secs: u64,
    /// How often idle editor sessions are swept
    pub session_sweep_interval_secs: u64,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        ConsoleSettings {
            title: String::from("Spin Wheel Admin"),
            activation_policy: ActivationPolicy::default(),
            session_idle_secs: 3600,
            session_sweep_interval_secs: 60,
        }
    }
}

pub fn get_settings() -> Result<Settings, anyhow::Error> {
    get_settings_with_cli(Cli::parse().into())
}

pub struct CliSettings {
    pub config: Option<String>,
    pub level: Option<String>,
}

impl From<Cli> for CliSettings {
    fn from(cli: Cli) -> Self {
        Self {
            config: cli.config,
            level: cli.level,
        }
    }
}

pub trait ConfigurableSettings: Serialize + for<'de> Deserialize<'de> + Default {
    /// Apply CLI settings after loading from file
    fn apply_cli_overrides(&mut self, cli_settings: &CliSettings);

    fn default_config_path() -> PathBuf {
        PathBuf::from("./config/settings.toml")
    }

    fn config_directory() -> PathBuf {
        PathBuf::from("./config")
    }
}

pub fn get_settings_with_cli<T: ConfigurableSettings>(
    cli_settings: CliSettings,
) -> Result<T, anyhow::Error> {
    let mut settings = if let Some(config_path) = cli_settings.config.clone() {
        let path = PathBuf::from(config_path);

        let absolute_path = if path.is_absolute() {
            path
        } else {
            env::current_dir()?.join(path)
        };

        match File::open(absolute_path) {
            Ok(mut file) => read_settings(&mut file)?,
            Err(err) => return Err(anyhow!("Failed to find file: {}", err)),
        }
    } else {
        let default_path = T::default_config_path();
        match File::open(&default_path) {
            Ok(mut file) => read_settings(&mut file)?,
            Err(_) => write_default_settings::<T>(&default_path)?,
        }
    };

    settings.apply_cli_overrides(&cli_settings);

    Ok(settings)
}

fn read_settings<T: ConfigurableSettings>(file: &mut File) -> Result<T, anyhow::Error> {
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| anyhow!("Failed to read config: {}", e))?;
    toml::from_str(&content).map_err(|e| anyhow!("Failed to map config to settings: {}", e))
}

fn write_default_settings<T: ConfigurableSettings>(path: &PathBuf) -> Result<T, anyhow::Error> {
    let default_settings = T::default();

    fs::create_dir_all(T::config_directory())
        .map_err(|e| anyhow!("Failed to create config directory: {}", e))?;

    let toml_content = toml::to_string(&default_settings)
        .map_err(|e| anyhow!("Failed to serialize default settings: {}", e))?;

    let mut file =
        fs::File::create(path).map_err(|e| anyhow!("Failed to create config file: {}", e))?;
    file.write_all(toml_content.as_bytes())
        .map_err(|e| anyhow!("Failed to write default config: {}", e))?;

    Ok(default_settings)
}

pub fn setup_logger(
    level: Option<String>,
    filter_targets: Vec<String>,
) -> Result<(), fern::InitError> {
    let rust_log = get_log_level(level);
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let now = OffsetDateTime::now_utc()
                .format(&Iso8601::DEFAULT)
                .unwrap_or_default();
            out.finish(format_args!(
                "[{} {}] {}: {}",
                now,
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .level(rust_log)
        .filter(move |metadata| {
            !filter_targets
                .iter()
                .any(|filter| metadata.target().starts_with(filter))
        })
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

pub fn get_log_level(level: Option<String>) -> LevelFilter {
    let raw = level.unwrap_or_else(|| env::var("RUST_LOG").unwrap_or_default());
    match raw.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

//! Fleet configuration file.
//!
//! Settings live in an INI file, by default at
//! `~/.config/trainerfleet/config.ini`:
//!
//! ```ini
//! [fleet]
//! scan_delay_secs = 10
//! rate_interval_ms = 500
//! location_timeout_secs = 30
//! login_attempts = 5
//! login_backoff_secs = 10
//! coordinate_queue_capacity = 16
//! result_queue_capacity = 64
//!
//! [location]
//! mode = honeycomb
//! latitude = 40.7829
//! longitude = -73.9654
//! radius_m = 1000
//! spacing_m = 70
//!
//! [account:ash]
//! password = pikachu
//! provider = ptc
//!
//! [logging]
//! level = info
//! file = /var/log/trainerfleet.log
//! ```
//!
//! Every key except the `[location]` geometry has a default. Polygon areas use
//! `mode = polygon` with `polygon = lat,lon;lat,lon;...` and an
//! `elevation_api_key`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};
use thiserror::Error;

use crate::geo::Coordinate;
use crate::location::{LocationConfig, DEFAULT_CELL_SPACING_M};
use crate::logging::LoggingConfig;
use crate::rate::RateConfig;
use crate::session::{Account, DEFAULT_AUTH_PROVIDER};
use crate::trainer::TrainerConfig;

/// Default capacity of the coordinate queue.
pub const DEFAULT_COORDINATE_QUEUE_CAPACITY: usize = 16;

/// Default capacity of the results queue.
pub const DEFAULT_RESULT_QUEUE_CAPACITY: usize = 64;

const ACCOUNT_SECTION_PREFIX: &str = "account:";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("missing [{section}] {key}")]
    MissingKey { section: String, key: String },

    #[error("invalid value for [{section}] {key}: '{value}'")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },

    #[error("no [account:<username>] sections configured")]
    NoAccounts,
}

/// Complete fleet configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetConfig {
    pub trainer: TrainerConfig,
    pub rate: RateConfig,
    pub location: LocationConfig,
    pub accounts: Vec<Account>,
    pub coordinate_queue_capacity: usize,
    pub result_queue_capacity: usize,
    pub logging: LoggingConfig,
}

impl FleetConfig {
    /// Creates a configuration with default fleet settings.
    pub fn new(location: LocationConfig, accounts: Vec<Account>) -> Self {
        Self {
            trainer: TrainerConfig::default(),
            rate: RateConfig::default(),
            location,
            accounts,
            coordinate_queue_capacity: DEFAULT_COORDINATE_QUEUE_CAPACITY,
            result_queue_capacity: DEFAULT_RESULT_QUEUE_CAPACITY,
            logging: LoggingConfig::default(),
        }
    }

    pub fn with_trainer(mut self, trainer: TrainerConfig) -> Self {
        self.trainer = trainer;
        self
    }

    pub fn with_rate(mut self, rate: RateConfig) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_queue_capacities(mut self, coordinates: usize, results: usize) -> Self {
        self.coordinate_queue_capacity = coordinates;
        self.result_queue_capacity = results;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Loads the configuration from [`config_file_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads the configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut trainer = TrainerConfig::default();
        let mut rate = RateConfig::default();
        let mut coordinate_queue_capacity = DEFAULT_COORDINATE_QUEUE_CAPACITY;
        let mut result_queue_capacity = DEFAULT_RESULT_QUEUE_CAPACITY;

        if let Some(fleet) = ini.section(Some("fleet")) {
            let s = Section::new("fleet", fleet);
            if let Some(secs) = s.parse::<u64>("scan_delay_secs")? {
                trainer.scan_delay = Duration::from_secs(secs);
            }
            if let Some(ms) = s.parse::<u64>("rate_interval_ms")? {
                rate.interval = Duration::from_millis(ms);
            }
            if let Some(secs) = s.parse::<u64>("location_timeout_secs")? {
                trainer.location_timeout = Duration::from_secs(secs);
            }
            if let Some(attempts) = s.parse::<u32>("login_attempts")? {
                trainer.login_attempts = attempts;
            }
            if let Some(secs) = s.parse::<u64>("login_backoff_secs")? {
                trainer.login_backoff = Duration::from_secs(secs);
            }
            if let Some(capacity) = s.parse::<usize>("coordinate_queue_capacity")? {
                coordinate_queue_capacity = capacity;
            }
            if let Some(capacity) = s.parse::<usize>("result_queue_capacity")? {
                result_queue_capacity = capacity;
            }
        }

        let location = parse_location(ini)?;
        let accounts = parse_accounts(ini)?;

        let mut logging = LoggingConfig::default();
        if let Some(section) = ini.section(Some("logging")) {
            if let Some(level) = section.get("level") {
                logging.level = level.to_string();
            }
            if let Some(file) = section.get("file").filter(|f| !f.trim().is_empty()) {
                logging.file = Some(PathBuf::from(file));
            }
        }

        Ok(Self {
            trainer,
            rate,
            location,
            accounts,
            coordinate_queue_capacity,
            result_queue_capacity,
            logging,
        })
    }
}

impl FromStr for FleetConfig {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }
}

/// Default configuration file location.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trainerfleet")
        .join("config.ini")
}

/// Typed accessors over one INI section.
struct Section<'a> {
    name: &'a str,
    props: &'a Properties,
}

impl<'a> Section<'a> {
    fn new(name: &'a str, props: &'a Properties) -> Self {
        Self { name, props }
    }

    fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let Some(raw) = self.props.get(key) else {
            return Ok(None);
        };
        raw.trim()
            .parse()
            .map(Some)
            .map_err(|_| self.invalid(key, raw))
    }

    fn require<T: FromStr>(&self, key: &str) -> Result<T, ConfigError> {
        self.parse(key)?.ok_or_else(|| ConfigError::MissingKey {
            section: self.name.to_string(),
            key: key.to_string(),
        })
    }

    fn invalid(&self, key: &str, value: &str) -> ConfigError {
        ConfigError::InvalidValue {
            section: self.name.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

fn parse_location(ini: &Ini) -> Result<LocationConfig, ConfigError> {
    let props = ini
        .section(Some("location"))
        .ok_or_else(|| ConfigError::MissingKey {
            section: "location".to_string(),
            key: "mode".to_string(),
        })?;
    let s = Section::new("location", props);

    let mode: String = s.require("mode")?;
    match mode.to_ascii_lowercase().as_str() {
        "fixed" => Ok(LocationConfig::Fixed {
            location: parse_point(&s)?,
        }),
        "honeycomb" => Ok(LocationConfig::Honeycomb {
            center: parse_point(&s)?,
            radius_m: s.require("radius_m")?,
            spacing_m: s.parse("spacing_m")?.unwrap_or(DEFAULT_CELL_SPACING_M),
        }),
        "polygon" => {
            let raw: String = s.require("polygon")?;
            let vertices = parse_polygon(&raw).ok_or_else(|| s.invalid("polygon", &raw))?;
            Ok(LocationConfig::Polygon {
                vertices,
                spacing_m: s.parse("spacing_m")?.unwrap_or(DEFAULT_CELL_SPACING_M),
                elevation_api_key: s.require("elevation_api_key")?,
            })
        }
        _ => Err(s.invalid("mode", &mode)),
    }
}

fn parse_point(s: &Section<'_>) -> Result<Coordinate, ConfigError> {
    let point = Coordinate::new(s.require("latitude")?, s.require("longitude")?);
    Ok(match s.parse("altitude")? {
        Some(altitude) => point.with_altitude(altitude),
        None => point,
    })
}

/// Parses `lat,lon;lat,lon;...`. Empty segments are skipped.
fn parse_polygon(raw: &str) -> Option<Vec<Coordinate>> {
    raw.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (lat, lon) = pair.split_once(',')?;
            Some(Coordinate::new(
                lat.trim().parse().ok()?,
                lon.trim().parse().ok()?,
            ))
        })
        .collect()
}

fn parse_accounts(ini: &Ini) -> Result<Vec<Account>, ConfigError> {
    let mut accounts = Vec::new();

    for (name, props) in ini.iter() {
        let Some(username) = name.and_then(|n| n.strip_prefix(ACCOUNT_SECTION_PREFIX)) else {
            continue;
        };
        let section = format!("{}{}", ACCOUNT_SECTION_PREFIX, username);
        let s = Section::new(&section, props);

        let password: String = s.require("password")?;
        let provider = props.get("provider").unwrap_or(DEFAULT_AUTH_PROVIDER);
        accounts.push(Account::new(username.trim(), password).with_provider(provider));
    }

    if accounts.is_empty() {
        return Err(ConfigError::NoAccounts);
    }
    Ok(accounts)
}

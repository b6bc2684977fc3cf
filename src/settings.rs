//! Configuration management for ConeZen.
//!
//! This module provides an INI-based configuration layer so users can tune
//! grid resolution and rendering without touching the command line every
//! run. Configuration files are merged with the following precedence:
//!
//! 1. Local configuration (`./conezen_config.cfg`)
//! 2. User configuration (`~/.config/conezen/conezen_config.cfg`)
//! 3. Built-in defaults
//!
//! # Configuration File Format
//!
//! ```ini
//! [grid]
//! r_max = 0.001
//! r_samples = 500
//! theta_samples = 500
//!
//! [render]
//! width = 900
//! height = 720
//! elev = 28.0
//! azim = -133.0
//! frames = 24
//!
//! [logging]
//! level = info
//! ```

use crate::render::RenderOptions;
use crate::surface::GridConfig;
use configparser::ini::Ini;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading and processing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error when reading configuration files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// INI parsing error
    #[error("INI parsing error: {0}")]
    IniParse(String),
    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Main configuration structure containing all program settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Surface evaluation grid settings
    pub grid: GridSettings,
    /// SVG rendering settings
    pub render: RenderSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Surface evaluation grid settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSettings {
    /// Upper bound of the radial display window (default: 0.001)
    pub r_max: f64,
    /// Number of radial samples (default: 500)
    pub r_samples: usize,
    /// Number of angular samples (default: 500)
    pub theta_samples: usize,
}

impl Default for GridSettings {
    fn default() -> Self {
        let defaults = GridConfig::default();
        Self {
            r_max: defaults.r_max,
            r_samples: defaults.r_samples,
            theta_samples: defaults.theta_samples,
        }
    }
}

impl GridSettings {
    /// Converts to the grid configuration the surface evaluator takes.
    pub fn to_grid_config(&self) -> GridConfig {
        GridConfig {
            r_max: self.r_max,
            r_samples: self.r_samples,
            theta_samples: self.theta_samples,
            ..GridConfig::default()
        }
    }
}

/// SVG rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Output width in pixels (default: 900)
    pub width: u32,
    /// Output height in pixels (default: 720)
    pub height: u32,
    /// Camera elevation in degrees (default: 28.0)
    pub elev: f64,
    /// Camera azimuth in degrees (default: -133.0)
    pub azim: f64,
    /// Number of frames in the rotation animation (default: 24)
    pub frames: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        let defaults = RenderOptions::default();
        Self {
            width: defaults.width,
            height: defaults.height,
            elev: defaults.elev_deg,
            azim: defaults.azim_deg,
            frames: 24,
        }
    }
}

impl RenderSettings {
    /// Converts to the options struct the renderer takes.
    pub fn to_render_options(&self) -> RenderOptions {
        RenderOptions {
            width: self.width,
            height: self.height,
            elev_deg: self.elev,
            azim_deg: self.azim,
            ..RenderOptions::default()
        }
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (default: "info")
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingSettings {
    /// Parses the configured level into a logger filter.
    ///
    /// Unknown values fall back to Info rather than failing the run.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

/// Configuration manager that handles loading and accessing program settings.
pub struct SettingsManager {
    settings: Settings,
    config_source: String,
}

impl SettingsManager {
    /// Loads configuration from available configuration files.
    ///
    /// Searches `./conezen_config.cfg` first, then the user configuration
    /// directory, falling back to built-in defaults. A file that fails to
    /// parse is reported and skipped rather than aborting the run.
    ///
    /// Loading happens before the logger is initialized, since the
    /// `[logging]` section decides the logger's level; the caller announces
    /// [`config_source`](Self::config_source) once logging is up.
    pub fn load() -> Result<Self, ConfigError> {
        let (settings, source) = Self::load_from_files()?;
        Ok(Self {
            settings,
            config_source: source,
        })
    }

    /// Returns the source of the loaded configuration.
    pub fn config_source(&self) -> &str {
        &self.config_source
    }

    /// Gets a reference to the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Gets the grid settings.
    pub fn grid(&self) -> &GridSettings {
        &self.settings.grid
    }

    /// Gets the render settings.
    pub fn render(&self) -> &RenderSettings {
        &self.settings.render
    }

    /// Gets the logging settings.
    pub fn logging(&self) -> &LoggingSettings {
        &self.settings.logging
    }

    /// Loads configuration from files with hierarchical precedence.
    fn load_from_files() -> Result<(Settings, String), ConfigError> {
        let mut settings = Settings::default();
        let mut config_source = "built-in defaults".to_string();

        if let Some(user_path) = Self::get_user_config_path() {
            if user_path.exists() {
                match Self::load_config(&user_path) {
                    Ok(user_config) => {
                        settings = user_config;
                        config_source = format!("user config ({})", user_path.display());
                        debug!("Loaded user configuration from: {}", user_path.display());
                    }
                    Err(e) => {
                        warn!(
                            "Failed to load user config from {}: {}",
                            user_path.display(),
                            e
                        );
                    }
                }
            }
        }

        // Local configuration overrides the user one
        let local_path = PathBuf::from("conezen_config.cfg");
        if local_path.exists() {
            match Self::load_config(&local_path) {
                Ok(local_config) => {
                    settings = local_config;
                    config_source = format!("local config ({})", local_path.display());
                    debug!("Loaded local configuration from: {}", local_path.display());
                }
                Err(e) => {
                    warn!(
                        "Failed to load local config from {}: {}",
                        local_path.display(),
                        e
                    );
                }
            }
        }

        Ok((settings, config_source))
    }

    /// Loads configuration from a single INI file.
    fn load_config(path: &Path) -> Result<Settings, ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut ini = Ini::new();
        ini.read(content)
            .map_err(|e| ConfigError::IniParse(format!("Failed to parse INI: {}", e)))?;

        let mut settings = Settings::default();

        if let Some(grid_map) = ini.get_map_ref().get("grid") {
            settings.grid = Self::parse_grid(grid_map)?;
        }
        if let Some(render_map) = ini.get_map_ref().get("render") {
            settings.render = Self::parse_render(render_map)?;
        }
        if let Some(logging_map) = ini.get_map_ref().get("logging") {
            settings.logging = Self::parse_logging(logging_map)?;
        }

        Ok(settings)
    }

    /// Parses the grid section from INI configuration.
    fn parse_grid(
        section: &std::collections::HashMap<String, Option<String>>,
    ) -> Result<GridSettings, ConfigError> {
        let mut grid = GridSettings::default();

        if let Some(Some(r_max)) = section.get("r_max") {
            grid.r_max = r_max
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("Invalid r_max: {}", r_max)))?;
            if grid.r_max <= 0.0 {
                return Err(ConfigError::InvalidValue(format!(
                    "r_max must be positive, got {}",
                    grid.r_max
                )));
            }
        }
        if let Some(Some(r_samples)) = section.get("r_samples") {
            grid.r_samples = Self::parse_samples("r_samples", r_samples)?;
        }
        if let Some(Some(theta_samples)) = section.get("theta_samples") {
            grid.theta_samples = Self::parse_samples("theta_samples", theta_samples)?;
        }

        Ok(grid)
    }

    /// Parses a sample count; fewer than two samples cannot form a grid.
    fn parse_samples(key: &str, value: &str) -> Result<usize, ConfigError> {
        let n: usize = value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("Invalid {}: {}", key, value)))?;
        if n < 2 {
            return Err(ConfigError::InvalidValue(format!(
                "{} must be at least 2, got {}",
                key, n
            )));
        }
        Ok(n)
    }

    /// Parses the render section from INI configuration.
    fn parse_render(
        section: &std::collections::HashMap<String, Option<String>>,
    ) -> Result<RenderSettings, ConfigError> {
        let mut render = RenderSettings::default();

        if let Some(Some(width)) = section.get("width") {
            render.width = width
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("Invalid width: {}", width)))?;
        }
        if let Some(Some(height)) = section.get("height") {
            render.height = height
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("Invalid height: {}", height)))?;
        }
        if let Some(Some(elev)) = section.get("elev") {
            render.elev = elev
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("Invalid elev: {}", elev)))?;
        }
        if let Some(Some(azim)) = section.get("azim") {
            render.azim = azim
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("Invalid azim: {}", azim)))?;
        }
        if let Some(Some(frames)) = section.get("frames") {
            render.frames = frames
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("Invalid frames: {}", frames)))?;
            if render.frames == 0 {
                return Err(ConfigError::InvalidValue(
                    "frames must be at least 1".to_string(),
                ));
            }
        }

        Ok(render)
    }

    /// Parses the logging section from INI configuration.
    fn parse_logging(
        section: &std::collections::HashMap<String, Option<String>>,
    ) -> Result<LoggingSettings, ConfigError> {
        let mut logging = LoggingSettings::default();
        if let Some(Some(level)) = section.get("level") {
            logging.level = level.clone();
        }
        Ok(logging)
    }

    /// Gets the user configuration file path.
    fn get_user_config_path() -> Option<PathBuf> {
        #[cfg(unix)]
        {
            std::env::var("HOME").ok().map(|home| {
                PathBuf::from(home)
                    .join(".config")
                    .join("conezen")
                    .join("conezen_config.cfg")
            })
        }
        #[cfg(windows)]
        {
            std::env::var("APPDATA").ok().map(|appdata| {
                PathBuf::from(appdata)
                    .join("conezen")
                    .join("conezen_config.cfg")
            })
        }
    }
}

impl SettingsManager {
    /// Creates a default conezen_config.cfg file with all available options.
    pub fn create_template(path: &Path) -> Result<(), ConfigError> {
        let template_content = Self::generate_template_content();
        fs::write(path, template_content)?;
        info!("Created settings template at: {}", path.display());
        Ok(())
    }

    /// Generates the content for a conezen_config.cfg template file.
    fn generate_template_content() -> String {
        let grid = GridSettings::default();
        let render = RenderSettings::default();
        let logging = LoggingSettings::default();
        format!(
            r#"# ConeZen Configuration File
#
# Configuration files are loaded with local settings taking precedence:
#
# 1. Current working directory (./conezen_config.cfg) - highest priority
# 2. User config directory (~/.config/conezen/conezen_config.cfg on Unix,
#    %APPDATA%/conezen/conezen_config.cfg on Windows)
# 3. Built-in defaults (fallback)
#
# Any missing sections or values use the built-in defaults shown below.

[grid]
# Polar sampling grid for the surface evaluation

# Upper bound of the radial display window in gradient length units
# (default: 0.001). This is a display window, not a molecular property.
r_max = {}

# Number of radial samples from 0 to r_max (default: 500)
r_samples = {}

# Number of angular samples over a full turn (default: 500)
theta_samples = {}

[render]
# SVG output settings

# Canvas size in pixels (defaults: 900 x 720)
width = {}
height = {}

# Camera angles in degrees (defaults: elev 28, azim -133)
elev = {}
azim = {}

# Number of frames in the rotation animation (default: 24)
# More frames give smoother rotation but larger files
frames = {}

[logging]
# Log level: debug, info, warn, error (default: info)
level = {}
"#,
            grid.r_max,
            grid.r_samples,
            grid.theta_samples,
            render.width,
            render.height,
            render.elev,
            render.azim,
            render.frames,
            logging.level,
        )
    }
}

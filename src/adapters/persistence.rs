use anyhow::{Context, Result};
use directories::ProjectDirs;
use repopulse_core::ports::{AppConfig, CachedState, ConfigStore, StateStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Platform directories, falling back to `~/.repopulse` where the platform
/// has no notion of them
fn app_dir(pick: fn(&ProjectDirs) -> &Path) -> Result<PathBuf> {
    if let Some(dirs) = ProjectDirs::from("", "", "repopulse") {
        return Ok(pick(&dirs).to_path_buf());
    }

    dirs::home_dir()
        .map(|home| home.join(".repopulse"))
        .context("Failed to determine project directories")
}

fn write_toml<T: serde::Serialize>(path: &Path, value: &T, what: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {} directory", what))?;
    }

    let contents = toml::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {} to TOML", what))?;

    fs::write(path, contents)
        .with_context(|| format!("Failed to write {} file: {}", what, path.display()))
}

/// File-based configuration store that implements ConfigStore
pub struct FileConfigStore {
    config_path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Result<Self> {
        let config_path = Self::get_default_config_path()?;
        Ok(Self { config_path })
    }

    pub fn with_path<P: AsRef<Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    fn get_default_config_path() -> Result<PathBuf> {
        Ok(app_dir(ProjectDirs::config_dir)?.join("repopulse.toml"))
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            debug!("Creating default config at {}", self.config_path.display());
            let default_config = AppConfig::default();
            self.save(&default_config)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config: AppConfig = toml::from_str(&contents).with_context(|| {
            format!("Failed to parse config file: {}", self.config_path.display())
        })?;

        config.validate().with_context(|| {
            format!("Invalid config file: {}", self.config_path.display())
        })?;

        Ok(config)
    }

    fn save(&self, config: &AppConfig) -> Result<()> {
        write_toml(&self.config_path, config, "config")
    }
}

/// File-based store for state that survives restarts (the filter selection)
pub struct FileStateStore {
    state_path: PathBuf,
}

impl FileStateStore {
    pub fn new() -> Result<Self> {
        Ok(Self {
            state_path: app_dir(ProjectDirs::data_dir)?.join("state.toml"),
        })
    }

    pub fn with_path<P: AsRef<Path>>(state_path: P) -> Self {
        Self {
            state_path: state_path.as_ref().to_path_buf(),
        }
    }
}

impl StateStore for FileStateStore {
    fn load_state(&self) -> Result<Option<CachedState>> {
        if !self.state_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.state_path).with_context(|| {
            format!("Failed to read state file: {}", self.state_path.display())
        })?;

        let state = toml::from_str(&contents).with_context(|| {
            format!("Failed to parse state file: {}", self.state_path.display())
        })?;

        Ok(Some(state))
    }

    fn save_state(&self, state: &CachedState) -> Result<()> {
        write_toml(&self.state_path, state, "state")
    }
}

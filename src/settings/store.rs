use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use super::{Settings, SettingsError};

pub const APP_DIR_NAME: &str = "ProfitFirstCalculator";
pub const SETTINGS_FILE_NAME: &str = "profit_first_defaults.json";
const TMP_SUFFIX: &str = "tmp";

/// Where the saved defaults live. Loading never fails: anything unreadable
/// yields the starter defaults.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Settings;

    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;

    /// Human-readable location, shown after a successful save.
    fn location(&self) -> String;
}

/// Stores settings as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store in the per-user config directory, e.g.
    /// `~/.config/ProfitFirstCalculator/profit_first_defaults.json`.
    pub fn at_default_location() -> Self {
        Self::new(default_settings_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Settings, String> {
        let data = fs::read_to_string(&self.path).map_err(|err| err.to_string())?;
        serde_json::from_str(&data).map_err(|err| err.to_string())
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Settings {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no saved settings, using starter defaults");
            return Settings::default();
        }

        match self.read() {
            Ok(settings) => {
                tracing::debug!(path = %self.path.display(), "loaded saved settings");
                settings
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "unreadable settings file, using starter defaults"
                );
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(settings)?;
        let tmp = tmp_path(&self.path);
        write_file(&tmp, &json)
            .and_then(|()| {
                fs::rename(&tmp, &self.path).inspect_err(|_| {
                    let _ = fs::remove_file(&tmp);
                })
            })
            .map_err(|source| SettingsError::Write {
                path: self.path.clone(),
                source,
            })?;
        tracing::info!(path = %self.path.display(), "saved settings");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps settings in memory only; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<Settings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            saved: Mutex::new(Some(settings)),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Settings {
        let saved = self.saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        (*saved).unwrap_or_default()
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let mut saved = self.saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *saved = Some(*settings);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

pub fn default_settings_path() -> PathBuf {
    let base = dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()
}

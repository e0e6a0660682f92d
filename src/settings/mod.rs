//! Saved Profit First defaults and the stores that persist them.

mod error;
mod model;
mod store;

pub use error::{DefaultsError, SettingsError};
pub use model::Settings;
pub use store::{
    APP_DIR_NAME, JsonFileStore, MemoryStore, SETTINGS_FILE_NAME, SettingsStore,
    default_settings_path,
};

/// Saves `settings` as the new defaults after checking the split totals 100%.
pub fn save_defaults(
    store: &dyn SettingsStore,
    settings: Settings,
) -> Result<Settings, DefaultsError> {
    settings.validate()?;
    store.save(&settings)?;
    Ok(settings)
}

/// Overwrites the saved defaults with the starter defaults.
pub fn reset_defaults(store: &dyn SettingsStore) -> Result<Settings, SettingsError> {
    let settings = Settings::default();
    store.save(&settings)?;
    tracing::info!("restored starter defaults");
    Ok(settings)
}

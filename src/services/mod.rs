pub mod recycle_bin;
pub mod settings_service;

pub use recycle_bin::RecycleBin;
pub use settings_service::SettingsService;

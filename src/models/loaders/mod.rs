pub mod toml_loader;

pub use toml_loader::{load_settings, load_settings_or_default, parse_settings};

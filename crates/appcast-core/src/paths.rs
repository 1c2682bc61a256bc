use dirs::home_dir;
use std::path::PathBuf;

/// Returns the appcast home directory, or None if the user's home cannot be resolved.
pub fn try_appcast_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("APPCAST_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".appcast"))
}

/// Default signing key file: ~/.appcast/appcast.key
pub fn default_key_path() -> Option<PathBuf> {
    try_appcast_home().map(|h| h.join("appcast.key"))
}

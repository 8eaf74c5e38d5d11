//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default persona
pub const DEFAULT_PERSONA: &str = "premium";

/// Default scan radius in meters
pub const DEFAULT_RADIUS: u32 = 500;

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "openstreetmap";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "franchise-scout";

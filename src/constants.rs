//! Application constants for the Atlas CLI
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

/// Credential and server-config storage constants
pub mod store {
    /// Directory under the user's home that holds the token and config files
    pub const STORE_DIR_NAME: &str = ".atlas";

    /// Token file name inside the store directory
    pub const TOKEN_FILE_NAME: &str = "token";

    /// Server-config file name inside the store directory
    pub const CONFIG_FILE_NAME: &str = "config";

    /// File permissions for the token and config files - owner read/write only
    #[cfg(unix)]
    pub const FILE_PERMISSIONS: u32 = 0o600;

    /// Directory permissions - owner read/write/execute only
    #[cfg(unix)]
    pub const DIR_PERMISSIONS: u32 = 0o700;
}

/// API server constants
pub mod server {
    /// Default base URL used when no URL is passed in or persisted
    pub const DEFAULT_BASE_URL: &str = "https://api.atlasmaps.io";
}

/// HTTP client configuration constants
pub mod http {
    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "Atlas-CLI/0.1.0 (Mapping Data Client)";
}

/// Tile format aliases recognized by the download destination policy
pub mod formats {
    /// Format names that denote a 3-D protobuf tile
    pub const TILE_3D_ALIASES: [&str; 2] = ["LMapTile3D", "lmap"];

    /// Format names that denote a GeoJSON tile archive
    pub const GEOJSON_ALIASES: [&str; 2] = ["GeoJsonTile", "geojson"];
}

/// User-facing fatal messages
pub mod messages {
    /// Printed when no stored credential exists
    pub const CREDENTIAL_ABSENT: &str =
        "Please login. Your authentication token could not be found.";

    /// Printed when the stored credential's expiry claim is in the past
    pub const CREDENTIAL_EXPIRED: &str = "Please login. Your authentication token is expired.";

    /// Printed when a multi-level command is missing a discriminator
    pub const MISSING_ARGUMENT: &str =
        "Missing a positional argument: use the help flag after your command.";
}

// Re-export commonly used constants for convenience
pub use http::USER_AGENT;
pub use server::DEFAULT_BASE_URL;
pub use store::{CONFIG_FILE_NAME, STORE_DIR_NAME, TOKEN_FILE_NAME};

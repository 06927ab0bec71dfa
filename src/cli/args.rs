//! Command-line argument parsing for the Atlas CLI
//!
//! This module defines the command grammar using clap derive macros. Every
//! multi-level command keeps its subcommand levels optional: a branch node
//! reached with no further segment is a legal parser state, and the
//! dispatcher turns it into the missing-argument failure after parsing.

use clap::{Args, Parser, Subcommand};

/// Atlas CLI - client for the Atlas mapping-data API
#[derive(Parser, Debug)]
#[command(
    name = "atlas",
    version,
    about = "Authenticate against the Atlas mapping-data API and manage maps, tiles, users and tokens",
    long_about = "A command-line client for the Atlas mapping-data API.

Commands cover login and token management, user administration, and
listing, searching and downloading map data. Flag names may be given as
any unambiguous prefix, e.g. --s or --server for --server_url."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Login to receive an authorization token using an API access token
    Login(LoginArgs),

    /// Trigger a password reset
    #[command(name = "reset_password")]
    ResetPassword(ResetPasswordArgs),

    /// Create an access token or session token
    Create(CreateArgs),

    /// Download map data
    Download(DownloadArgs),

    /// List maps, feature tiles, users, tokens, or updated tiles
    List(ListArgs),

    /// Search map data
    Search(SearchArgs),

    /// Invite a user to join your account
    Invite(InviteArgs),

    /// Get information about an object
    Get(GetArgs),

    /// Edit an object
    Edit(EditArgs),

    /// Delete a user or token
    Delete(DeleteArgs),
}

/// Arguments for the login command
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// An API access token
    pub token: String,

    /// The base url of the api server requested. Persists until reset
    /// with a new --server_url
    #[arg(long = "server_url")]
    pub server_url: Option<String>,
}

/// Arguments for the reset_password command
#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    /// The email of the account to reset password
    pub email: String,
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(subcommand)]
    pub target: Option<CreateTarget>,
}

/// First-level create discriminator
#[derive(Subcommand, Debug)]
pub enum CreateTarget {
    /// Create an access token
    Token {
        #[command(subcommand)]
        target: Option<CreateTokenTarget>,
    },

    /// Create a session token
    Session {
        #[command(subcommand)]
        target: Option<CreateSessionTarget>,
    },
}

/// Access-token kinds the create command can issue
#[derive(Subcommand, Debug)]
pub enum CreateTokenTarget {
    /// Create an API access token
    Api {
        /// User-provided description for the token user
        description: String,
    },

    /// Create a vehicle access token
    Vehicle {
        /// User-provided id for the vehicle
        vehicle_id: String,

        /// User-provided description for the vehicle
        description: String,
    },
}

/// Session-token kinds the create command can issue
#[derive(Subcommand, Debug)]
pub enum CreateSessionTarget {
    /// Create an API session token
    Api {
        /// A valid API access token
        token: String,
    },

    /// Create a vehicle session token
    Vehicle {
        /// A valid vehicle access token
        token: String,
    },
}

/// Arguments for the download command
#[derive(Args, Debug)]
pub struct DownloadArgs {
    #[command(subcommand)]
    pub target: Option<DownloadCommand>,
}

/// Download targets
#[derive(Subcommand, Debug)]
pub enum DownloadCommand {
    /// Download a feature tile of a map
    #[command(name = "feature_tile")]
    FeatureTile {
        /// The id of the feature tile to download
        id: String,

        /// Folder to place the downloaded file in
        #[arg(long = "dest_folder")]
        dest_folder: Option<String>,
    },

    /// Download a map distribution
    Distribution {
        /// The id of the map distribution to download
        id: String,

        /// Format of the distribution. Required if multiple formats are available
        #[arg(long)]
        format: Option<String>,

        /// Version of the map to download. Latest version when unset
        #[arg(long)]
        version: Option<String>,

        /// Folder to place the downloaded file in
        #[arg(long = "dest_folder")]
        dest_folder: Option<String>,
    },

    /// Download a tile of a map
    Tile {
        /// The id of the map
        id: String,

        /// Zoom level of the map
        z: String,

        /// The x offset into the tile grid at the specified zoom level
        x: String,

        /// The y offset into the tile grid at the specified zoom level
        y: String,

        /// The format for the desired tile. Must be available for this map;
        /// see `atlas list maps`
        format: String,

        /// Upper bound (ms) of the release-time window for the tile
        #[arg(long)]
        before: Option<String>,

        /// Lower bound (ms) of the release-time window for the tile
        #[arg(long)]
        after: Option<String>,

        /// Folder to place the downloaded file in
        #[arg(long = "dest_folder")]
        dest_folder: Option<String>,
    },
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(subcommand)]
    pub target: Option<ListTarget>,
}

/// List targets
#[derive(Subcommand, Debug)]
pub enum ListTarget {
    /// List maps
    Maps,

    /// List feature tiles for a map
    #[command(name = "feature_tiles")]
    FeatureTiles {
        /// Id of the map
        id: String,
    },

    /// List users
    Users,

    /// List issued access tokens
    Tokens {
        #[command(subcommand)]
        target: Option<ListTokensTarget>,
    },

    /// List updated tiles for a map
    #[command(name = "tiles_diff")]
    TilesDiff {
        /// Id of the map
        id: String,

        /// Zoom level of the map
        z: String,

        /// The format for the desired tile
        format: String,

        /// Upper bound (ms) of the release-time window
        #[arg(long)]
        before: Option<String>,

        /// Lower bound (ms) of the release-time window
        #[arg(long)]
        after: Option<String>,
    },
}

/// Token kinds the list command can enumerate
#[derive(Subcommand, Debug)]
pub enum ListTokensTarget {
    /// List issued API access tokens
    Api,

    /// List issued vehicle access tokens
    Vehicle,
}

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    #[command(subcommand)]
    pub target: Option<SearchTarget>,
}

/// Search targets
#[derive(Subcommand, Debug)]
pub enum SearchTarget {
    /// Search tiles for a map
    Tiles {
        /// Id of the map
        id: String,

        /// Zoom level of the map
        z: String,

        /// The first latitude of the web mercator bounding box
        lat1: String,

        /// The second latitude of the web mercator bounding box
        lat2: String,

        /// The first longitude of the web mercator bounding box
        lng1: String,

        /// The second longitude of the web mercator bounding box
        lng2: String,

        /// The format for the desired tile
        format: String,

        /// Upper bound (ms) of the release-time window
        #[arg(long)]
        before: Option<String>,

        /// Lower bound (ms) of the release-time window
        #[arg(long)]
        after: Option<String>,
    },
}

/// Arguments for the invite command
#[derive(Args, Debug)]
pub struct InviteArgs {
    /// The email of the user to invite
    pub email: String,

    /// True if the user should be an admin; absent leaves the server default
    #[arg(long, value_parser = ["True", "False"])]
    pub admin: Option<String>,
}

/// Arguments for the get command
#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(subcommand)]
    pub target: Option<GetTarget>,
}

/// Get targets
#[derive(Subcommand, Debug)]
pub enum GetTarget {
    /// Get user information
    User {
        /// The id of the user
        id: String,
    },
}

/// Arguments for the edit command
#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(subcommand)]
    pub target: Option<EditTarget>,
}

/// Edit targets
#[derive(Subcommand, Debug)]
pub enum EditTarget {
    /// Edit a user's information
    User {
        /// The target user to edit
        id: String,

        /// The user's new email
        #[arg(long)]
        email: Option<String>,

        /// True or False, if the user is to be an admin; absent leaves it unchanged
        #[arg(long, value_parser = ["True", "False"])]
        admin: Option<String>,
    },
}

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(subcommand)]
    pub target: Option<DeleteTarget>,
}

/// Delete targets
#[derive(Subcommand, Debug)]
pub enum DeleteTarget {
    /// Delete a user
    User {
        /// The id of the user
        id: String,
    },

    /// Delete a token
    Token {
        #[command(subcommand)]
        target: Option<DeleteTokenTarget>,
    },
}

/// Token kinds the delete command can revoke
#[derive(Subcommand, Debug)]
pub enum DeleteTokenTarget {
    /// Delete an issued API access token
    Api {
        /// The id of the API token
        id: String,
    },

    /// Delete an issued vehicle access token
    Vehicle {
        /// The id of the vehicle token
        id: String,
    },
}

impl Cli {
    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

/// Parses a tri-state True/False flag value into an optional boolean
///
/// Absent stays absent: the external API distinguishes "unset" from "false".
pub fn tristate(value: Option<&str>) -> Option<bool> {
    value.map(|v| v == "True")
}

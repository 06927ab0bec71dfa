//! Credential and session management for the Atlas API
//!
//! This module provides the persisted credential store: a single bearer
//! token plus an optional server URL, both kept as one-line files with
//! owner-only permissions under the user's home directory.
//!
//! # Examples
//!
//! ```rust,no_run
//! use atlas_cli::auth::{CredentialStore, StoreConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = CredentialStore::new(StoreConfig::resolve()?);
//! let token = store.active_token(chrono::Utc::now().timestamp())?;
//! # Ok(())
//! # }
//! ```

pub mod claims;
pub mod store;

// Re-export main public API
pub use claims::decode_expiry;
pub use store::{Credential, CredentialStore, StoreConfig};

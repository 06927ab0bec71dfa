//! Atlas API interaction
//!
//! This module contains everything that touches the remote API:
//! - `endpoints`: the operation catalogue mapping each operation and its
//!   parameters to a method, URL, and optional JSON payload
//! - `models`: response shapes the client actually inspects
//! - `transfer`: request execution, JSON reporting, and streaming downloads

pub mod endpoints;
pub mod models;
pub mod transfer;

pub use endpoints::Endpoint;
pub use models::{TileDescriptor, TileSearchParams};
pub use transfer::{destination_path, print_json, ApiClient, DownloadTarget, TileCoords};

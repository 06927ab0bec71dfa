//! Response shapes the client inspects
//!
//! The client treats almost every response as opaque JSON to pretty-print;
//! only the session issue and tile search responses are deserialized.

use serde::{Deserialize, Serialize};

/// A tile descriptor returned by the tile search operation
///
/// The composite bounding-box download uses each descriptor's coordinates
/// and release timestamp to build that tile's own download request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileDescriptor {
    /// The x offset into the tile grid at the given zoom level
    pub x: i64,
    /// The y offset into the tile grid at the given zoom level
    pub y: i64,
    /// Zoom level of the tile
    pub z: i64,
    /// Release timestamp of this tile version, milliseconds
    pub release_timestamp: i64,
}

/// Parameters for the tile search operation
///
/// Coordinates and the zoom level stay as the strings the user typed; the
/// server validates them, the client only forwards.
#[derive(Debug, Clone)]
pub struct TileSearchParams {
    /// Id of the map to search
    pub id: String,
    /// Zoom level
    pub z: String,
    /// First latitude of the web mercator bounding box
    pub lat1: String,
    /// Second latitude of the bounding box
    pub lat2: String,
    /// First longitude of the bounding box
    pub lng1: String,
    /// Second longitude of the bounding box
    pub lng2: String,
    /// Tile format to search for
    pub format: String,
    /// Optional upper bound of the release-time window, milliseconds
    pub before: Option<String>,
    /// Optional lower bound of the release-time window, milliseconds
    pub after: Option<String>,
}

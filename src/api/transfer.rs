//! Transfer engine: request execution and streaming downloads
//!
//! Executes one resolved [`Endpoint`] at a time. JSON bodies are parsed and
//! handed back (or pretty-printed to stderr on non-200); binary bodies are
//! streamed chunk by chunk to a destination file named by the ordered
//! filename policy, never buffered whole in memory. The file and the
//! response are released on every exit path, including partial writes.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::api::endpoints::{self, Endpoint};
use crate::api::models::{TileDescriptor, TileSearchParams};
use crate::constants::{formats, http};
use crate::errors::{TransferError, TransferResult};

/// The resource a download names its destination after
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    /// Id of the map, feature tile, or distribution
    pub id: String,
    /// Tile or distribution format, when one applies
    pub format: Option<String>,
    /// Grid coordinates for single-tile downloads
    pub coords: Option<TileCoords>,
}

/// Tile grid coordinates as the user (or a search descriptor) supplied them
#[derive(Debug, Clone)]
pub struct TileCoords {
    pub x: String,
    pub y: String,
    pub z: String,
}

/// Computes the destination path for a download
///
/// Ordered policy: without a destination folder everything lands in the
/// literal `result` in the current directory. With one, 3-D tile formats
/// get a `.pb.bin` name embedding format, id and coordinates, GeoJSON
/// formats the same name with `.tar.gz`, and everything else a short
/// `{id}_{format}.tar.gz` name. The three branches are mutually exclusive.
pub fn destination_path(dest_folder: Option<&str>, target: &DownloadTarget) -> PathBuf {
    let dir = match dest_folder {
        Some(dir) if !dir.is_empty() => dir,
        _ => return PathBuf::from("result"),
    };

    if let (Some(format), Some(coords)) = (&target.format, &target.coords) {
        let stem = format!(
            "{}_{}_{}_{}_{}",
            format, target.id, coords.x, coords.y, coords.z
        );
        if formats::TILE_3D_ALIASES.contains(&format.as_str()) {
            return Path::new(dir).join(format!("{stem}.pb.bin"));
        }
        if formats::GEOJSON_ALIASES.contains(&format.as_str()) {
            return Path::new(dir).join(format!("{stem}.tar.gz"));
        }
    }

    let name = match &target.format {
        Some(format) => format!("{}_{}.tar.gz", target.id, format),
        None => format!("{}.tar.gz", target.id),
    };
    Path::new(dir).join(name)
}

/// Pretty-prints a JSON value to stdout
pub fn print_json(value: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

/// Reproduces a server error body on stderr, pretty-printed when it parses
fn report_error_body(body: &str) {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => eprintln!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string())
        ),
        Err(_) if !body.is_empty() => eprintln!("{body}"),
        Err(_) => {}
    }
}

/// HTTP client bound to one API base URL
///
/// One invocation of the CLI issues at most one request through this
/// client, except the composite bounding-box download which stays strictly
/// sequential.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Creates a client for the given base URL
    ///
    /// # Errors
    ///
    /// Returns `TransferError::Http` if the underlying client cannot be built.
    pub fn new(base: Url) -> TransferResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(http::USER_AGENT)
            .build()?;
        Ok(Self { http, base })
    }

    /// The base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn request(&self, endpoint: &Endpoint, bearer: Option<&str>) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .request(endpoint.method.clone(), endpoint.url.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(payload) = &endpoint.payload {
            request = request.json(payload);
        }
        request
    }

    /// Executes a JSON operation and returns the parsed 200 body
    ///
    /// On any non-200 the error body is reproduced on stderr and
    /// `TransferError::Api` carries the status for the exit code.
    pub async fn execute_json(
        &self,
        endpoint: &Endpoint,
        bearer: Option<&str>,
    ) -> TransferResult<Value> {
        tracing::info!("{} {}", endpoint.method, endpoint.url);
        let response = self.request(endpoint, bearer).send().await?;
        let status = response.status().as_u16();

        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            report_error_body(&body);
            return Err(TransferError::Api { status });
        }

        let body = response.json::<Value>().await?;
        Ok(body)
    }

    /// Streams a binary download to the destination path
    ///
    /// The body is written chunk by chunk as it arrives. On non-200 no file
    /// is created and the error body goes to stderr.
    pub async fn download(
        &self,
        endpoint: &Endpoint,
        bearer: &str,
        destination: &Path,
    ) -> TransferResult<()> {
        tracing::info!("{} {}", endpoint.method, endpoint.url);
        let response = self.request(endpoint, Some(bearer)).send().await?;
        let status = response.status().as_u16();

        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            report_error_body(&body);
            return Err(TransferError::Api { status });
        }

        let io_err = |source: std::io::Error| TransferError::Io {
            path: destination.to_path_buf(),
            source,
        };

        let mut file = File::create(destination).await.map_err(io_err)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(io_err)?;
        }
        file.flush().await.map_err(io_err)?;

        println!("write to dest {}", destination.display());
        Ok(())
    }

    /// Composite bounding-box download
    ///
    /// Searches tiles in the bounding box, then downloads each descriptor
    /// sequentially, using its own coordinates and release timestamp as
    /// both time-window bounds for that tile's URL. Individual failures are
    /// reported as they occur and do not stop the run; the returned count
    /// is the number of descriptors the search produced.
    pub async fn download_tiles_in_bbox(
        &self,
        bearer: &str,
        params: &TileSearchParams,
        dest_folder: Option<&str>,
    ) -> TransferResult<usize> {
        let search = endpoints::search_tiles(params, &self.base);
        let body = self.execute_json(&search, Some(bearer)).await?;
        let tiles: Vec<TileDescriptor> =
            serde_json::from_value(body).map_err(|e| TransferError::UnexpectedBody {
                reason: format!("tile search result is not a descriptor list: {e}"),
            })?;

        for tile in &tiles {
            let (x, y, z) = (tile.x.to_string(), tile.y.to_string(), tile.z.to_string());
            let stamp = tile.release_timestamp.to_string();
            let endpoint = endpoints::download_tile(
                &params.id,
                &self.base,
                &z,
                &x,
                &y,
                &params.format,
                Some(&stamp),
                Some(&stamp),
            );
            let target = DownloadTarget {
                id: params.id.clone(),
                format: Some(params.format.clone()),
                coords: Some(TileCoords { x, y, z }),
            };
            let destination = destination_path(dest_folder, &target);
            if let Err(e) = self.download(&endpoint, bearer, &destination).await {
                // Per-tile failure policy: report and keep going
                eprintln!("{e}");
            }
        }

        Ok(tiles.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tile_target(format: &str) -> DownloadTarget {
        DownloadTarget {
            id: "m1".to_string(),
            format: Some(format.to_string()),
            coords: Some(TileCoords {
                x: "1".to_string(),
                y: "2".to_string(),
                z: "3".to_string(),
            }),
        }
    }

    #[test]
    fn test_destination_without_folder_is_literal_result() {
        let dest = destination_path(None, &tile_target("lmap"));
        assert_eq!(dest, PathBuf::from("result"));
    }

    #[test]
    fn test_destination_3d_format_gets_pb_bin() {
        let dest = destination_path(Some("out"), &tile_target("lmap"));
        assert_eq!(dest, PathBuf::from("out/lmap_m1_1_2_3.pb.bin"));

        let dest = destination_path(Some("out"), &tile_target("LMapTile3D"));
        assert_eq!(dest, PathBuf::from("out/LMapTile3D_m1_1_2_3.pb.bin"));
    }

    #[test]
    fn test_destination_geojson_format_gets_tar_gz() {
        let dest = destination_path(Some("out"), &tile_target("geojson"));
        assert_eq!(dest, PathBuf::from("out/geojson_m1_1_2_3.tar.gz"));
    }

    #[test]
    fn test_destination_default_embeds_id_and_format_only() {
        let dest = destination_path(Some("out"), &tile_target("osm"));
        assert_eq!(dest, PathBuf::from("out/m1_osm.tar.gz"));
    }

    #[test]
    fn test_destination_without_format() {
        let target = DownloadTarget {
            id: "ft9".to_string(),
            format: None,
            coords: None,
        };
        let dest = destination_path(Some("out"), &target);
        assert_eq!(dest, PathBuf::from("out/ft9.tar.gz"));
    }

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(Url::parse(&server.uri()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_execute_json_returns_parsed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "u1"}])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let endpoint = endpoints::list_users(client.base_url());
        let body = client.execute_json(&endpoint, Some("tok-1")).await.unwrap();
        assert_eq!(body[0]["id"], "u1");
    }

    #[tokio::test]
    async fn test_execute_json_non_200_is_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "forbidden"})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let endpoint = endpoints::list_users(client.base_url());
        let result = client.execute_json(&endpoint, Some("tok-1")).await;
        assert!(matches!(
            result.unwrap_err(),
            TransferError::Api { status: 403 }
        ));
    }

    #[tokio::test]
    async fn test_download_streams_body_to_destination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/feature_tiles/ft9/content"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"tile-bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("ft9.tar.gz");
        let client = client_for(&server).await;
        let endpoint = endpoints::download_feature_tile("ft9", client.base_url());
        client
            .download(&endpoint, "tok-1", &destination)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"tile-bytes");
    }

    #[tokio::test]
    async fn test_download_non_200_creates_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/feature_tiles/ft9/content"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("ft9.tar.gz");
        let client = client_for(&server).await;
        let endpoint = endpoints::download_feature_tile("ft9", client.base_url());
        let result = client.download(&endpoint, "tok-1", &destination).await;

        assert!(matches!(
            result.unwrap_err(),
            TransferError::Api { status: 404 }
        ));
        assert!(!destination.exists());
    }

    fn bbox_params() -> TileSearchParams {
        TileSearchParams {
            id: "m1".to_string(),
            z: "12".to_string(),
            lat1: "37.0".to_string(),
            lat2: "37.1".to_string(),
            lng1: "-122.1".to_string(),
            lng2: "-122.0".to_string(),
            format: "lmap".to_string(),
            before: None,
            after: None,
        }
    }

    #[tokio::test]
    async fn test_bbox_composite_issues_one_search_plus_n_downloads() {
        let server = MockServer::start().await;
        let descriptors = json!([
            {"x": 1, "y": 2, "z": 12, "release_timestamp": 1000},
            {"x": 3, "y": 4, "z": 12, "release_timestamp": 2000},
        ]);
        Mock::given(method("GET"))
            .and(path("/api/v1/maps/m1/tiles/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(descriptors))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/maps/m1/tiles/12/1/2"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/maps/m1/tiles/12/3/4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"b".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().to_str().unwrap().to_string();
        let client = client_for(&server).await;
        let count = client
            .download_tiles_in_bbox("tok-1", &bbox_params(), Some(&dest))
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert!(dir.path().join("lmap_m1_1_2_12.pb.bin").exists());
        assert!(dir.path().join("lmap_m1_3_4_12.pb.bin").exists());
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_bbox_composite_counts_descriptors_despite_tile_failures() {
        let server = MockServer::start().await;
        let descriptors = json!([
            {"x": 1, "y": 2, "z": 12, "release_timestamp": 1000},
            {"x": 3, "y": 4, "z": 12, "release_timestamp": 2000},
        ]);
        Mock::given(method("GET"))
            .and(path("/api/v1/maps/m1/tiles/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(descriptors))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/maps/m1/tiles/12/1/2"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/maps/m1/tiles/12/3/4"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "tile unavailable"})),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().to_str().unwrap().to_string();
        let client = client_for(&server).await;
        let count = client
            .download_tiles_in_bbox("tok-1", &bbox_params(), Some(&dest))
            .await
            .unwrap();

        // Final count reflects the search result, not per-tile outcomes
        assert_eq!(count, 2);
        assert!(dir.path().join("lmap_m1_1_2_12.pb.bin").exists());
        assert!(!dir.path().join("lmap_m1_3_4_12.pb.bin").exists());
    }
}

//! Operation catalogue for the Atlas API
//!
//! Each function resolves one named operation and its parameters into an
//! [`Endpoint`]: the HTTP method, the full request URL, and an optional
//! JSON payload. The URLs themselves are an implementation choice of the
//! remote API; nothing outside this module builds request paths.

use reqwest::Method;
use serde_json::{json, Value};
use url::Url;

use crate::api::models::TileSearchParams;

/// A fully resolved API operation, ready for the transfer engine
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// HTTP method of the operation
    pub method: Method,
    /// Complete request URL including query parameters
    pub url: Url,
    /// JSON payload for POST operations
    pub payload: Option<Value>,
}

impl Endpoint {
    fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            payload: None,
        }
    }

    fn post(url: Url, payload: Value) -> Self {
        Self {
            method: Method::POST,
            url,
            payload: Some(payload),
        }
    }

    fn delete(url: Url) -> Self {
        Self {
            method: Method::DELETE,
            url,
            payload: None,
        }
    }
}

/// Builds a URL below the versioned API root
fn at(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    url.set_path(&format!("api/v1/{}", segments.join("/")));
    url
}

/// Appends an optional query pair when the value is present
fn push_opt(url: &mut Url, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        url.query_pairs_mut().append_pair(key, value);
    }
}

/// Exchange an API access token for a session token
pub fn create_api_session(token: &str, base: &Url) -> Endpoint {
    Endpoint::post(at(base, &["session", "api"]), json!({ "token": token }))
}

/// Exchange a vehicle access token for a session token
pub fn create_vehicle_session(token: &str, base: &Url) -> Endpoint {
    Endpoint::post(at(base, &["session", "vehicle"]), json!({ "token": token }))
}

/// Trigger a password reset for the account with the given email
pub fn reset_password(email: &str, base: &Url) -> Endpoint {
    Endpoint::post(
        at(base, &["users", "reset_password"]),
        json!({ "email": email }),
    )
}

/// Create an API access token
pub fn create_api_token(description: &str, base: &Url) -> Endpoint {
    Endpoint::post(
        at(base, &["tokens", "api"]),
        json!({ "description": description }),
    )
}

/// Create a vehicle access token
pub fn create_vehicle_token(vehicle_id: &str, description: &str, base: &Url) -> Endpoint {
    Endpoint::post(
        at(base, &["tokens", "vehicle"]),
        json!({ "vehicle_id": vehicle_id, "description": description }),
    )
}

/// List the account's maps
pub fn list_maps(base: &Url) -> Endpoint {
    Endpoint::get(at(base, &["maps"]))
}

/// List the account's users
pub fn list_users(base: &Url) -> Endpoint {
    Endpoint::get(at(base, &["users"]))
}

/// List feature tiles of a map
pub fn list_feature_tiles(id: &str, base: &Url) -> Endpoint {
    Endpoint::get(at(base, &["maps", id, "feature_tiles"]))
}

/// List issued API access tokens
pub fn list_api_tokens(base: &Url) -> Endpoint {
    Endpoint::get(at(base, &["tokens", "api"]))
}

/// List issued vehicle access tokens
pub fn list_vehicle_tokens(base: &Url) -> Endpoint {
    Endpoint::get(at(base, &["tokens", "vehicle"]))
}

/// List tiles of a map updated inside a release-time window
pub fn list_tiles_diff(
    id: &str,
    base: &Url,
    z: &str,
    format: &str,
    before: Option<&str>,
    after: Option<&str>,
) -> Endpoint {
    let mut url = at(base, &["maps", id, "tiles_diff"]);
    url.query_pairs_mut()
        .append_pair("z", z)
        .append_pair("format", format);
    push_opt(&mut url, "before", before);
    push_opt(&mut url, "after", after);
    Endpoint::get(url)
}

/// Search tiles of a map inside a web mercator bounding box
pub fn search_tiles(params: &TileSearchParams, base: &Url) -> Endpoint {
    let mut url = at(base, &["maps", &params.id, "tiles", "search"]);
    url.query_pairs_mut()
        .append_pair("z", &params.z)
        .append_pair("lat1", &params.lat1)
        .append_pair("lat2", &params.lat2)
        .append_pair("lng1", &params.lng1)
        .append_pair("lng2", &params.lng2)
        .append_pair("format", &params.format);
    push_opt(&mut url, "before", params.before.as_deref());
    push_opt(&mut url, "after", params.after.as_deref());
    Endpoint::get(url)
}

/// Download a feature tile by id
pub fn download_feature_tile(id: &str, base: &Url) -> Endpoint {
    Endpoint::get(at(base, &["feature_tiles", id, "content"]))
}

/// Download a map distribution, optionally pinned to a format and version
pub fn download_distribution(
    id: &str,
    base: &Url,
    format: Option<&str>,
    version: Option<&str>,
) -> Endpoint {
    let mut url = at(base, &["maps", id, "distribution"]);
    push_opt(&mut url, "format", format);
    push_opt(&mut url, "version", version);
    Endpoint::get(url)
}

/// Download one tile of a map at explicit grid coordinates
#[allow(clippy::too_many_arguments)]
pub fn download_tile(
    id: &str,
    base: &Url,
    z: &str,
    x: &str,
    y: &str,
    format: &str,
    before: Option<&str>,
    after: Option<&str>,
) -> Endpoint {
    let mut url = at(base, &["maps", id, "tiles", z, x, y]);
    url.query_pairs_mut().append_pair("format", format);
    push_opt(&mut url, "before", before);
    push_opt(&mut url, "after", after);
    Endpoint::get(url)
}

/// Invite a user to join the account
pub fn invite_user(email: &str, admin: Option<bool>, base: &Url) -> Endpoint {
    let mut payload = json!({ "email": email });
    if let Some(admin) = admin {
        payload["admin"] = json!(admin);
    }
    Endpoint::post(at(base, &["users", "invite"]), payload)
}

/// Get a user description
pub fn get_user(id: &str, base: &Url) -> Endpoint {
    Endpoint::get(at(base, &["users", id]))
}

/// Edit a user's email or admin flag; unset fields are left untouched
pub fn edit_user(id: &str, email: Option<&str>, admin: Option<bool>, base: &Url) -> Endpoint {
    let mut payload = json!({});
    if let Some(email) = email {
        payload["email"] = json!(email);
    }
    if let Some(admin) = admin {
        payload["admin"] = json!(admin);
    }
    Endpoint::post(at(base, &["users", id]), payload)
}

/// Delete a user
pub fn delete_user(id: &str, base: &Url) -> Endpoint {
    Endpoint::delete(at(base, &["users", id]))
}

/// Delete an issued API access token
pub fn delete_api_token(id: &str, base: &Url) -> Endpoint {
    Endpoint::delete(at(base, &["tokens", "api", id]))
}

/// Delete an issued vehicle access token
pub fn delete_vehicle_token(id: &str, base: &Url) -> Endpoint {
    Endpoint::delete(at(base, &["tokens", "vehicle", id]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://maps.example.com").unwrap()
    }

    #[test]
    fn test_session_endpoint_carries_token_payload() {
        let endpoint = create_api_session("tok-1", &base());
        assert_eq!(endpoint.method, Method::POST);
        assert_eq!(endpoint.url.path(), "/api/v1/session/api");
        assert_eq!(endpoint.payload.unwrap()["token"], "tok-1");
    }

    #[test]
    fn test_tile_download_query_includes_window_bounds() {
        let endpoint = download_tile(
            "m1",
            &base(),
            "12",
            "3",
            "5",
            "lmap",
            Some("1700000000000"),
            None,
        );
        assert_eq!(endpoint.url.path(), "/api/v1/maps/m1/tiles/12/3/5");
        let query = endpoint.url.query().unwrap();
        assert!(query.contains("format=lmap"));
        assert!(query.contains("before=1700000000000"));
        assert!(!query.contains("after="));
    }

    #[test]
    fn test_tiles_diff_requires_zoom_and_format() {
        let endpoint = list_tiles_diff("m1", &base(), "10", "geojson", None, Some("5"));
        let query = endpoint.url.query().unwrap();
        assert!(query.contains("z=10"));
        assert!(query.contains("format=geojson"));
        assert!(query.contains("after=5"));
    }

    #[test]
    fn test_invite_payload_tristate_admin() {
        let unset = invite_user("a@b.com", None, &base());
        assert!(unset.payload.unwrap().get("admin").is_none());

        let set_false = invite_user("a@b.com", Some(false), &base());
        assert_eq!(set_false.payload.unwrap()["admin"], false);
    }

    #[test]
    fn test_delete_endpoints_use_delete_method() {
        assert_eq!(delete_user("u1", &base()).method, Method::DELETE);
        assert_eq!(
            delete_vehicle_token("t1", &base()).url.path(),
            "/api/v1/tokens/vehicle/t1"
        );
    }
}

//! Command handlers for the Atlas CLI
//!
//! The dispatcher maps a parsed command path onto exactly one API
//! operation. Discriminator checks come first, then the credential gate,
//! then a single network call; every failure propagates up to `main`,
//! which owns the one fatal print-and-exit site. The composite
//! bounding-box download is the only path that issues more than one call.

use serde_json::Value;
use url::Url;

use crate::api::{destination_path, endpoints, print_json, ApiClient, DownloadTarget, TileCoords};
use crate::api::models::TileSearchParams;
use crate::auth::CredentialStore;
use crate::cli::args::{
    tristate, CreateArgs, CreateSessionTarget, CreateTarget, CreateTokenTarget, DeleteArgs,
    DeleteTarget, DeleteTokenTarget, DownloadArgs, DownloadCommand, EditArgs, EditTarget, GetArgs,
    GetTarget, InviteArgs, ListArgs, ListTarget, ListTokensTarget, LoginArgs, ResetPasswordArgs,
    SearchArgs, SearchTarget,
};
use crate::constants::DEFAULT_BASE_URL;
use crate::errors::{CliError, Result, TransferError};

/// Current unix timestamp, the instant credentials are validated against
fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Resolves the API base URL: explicit flag, then persisted config, then
/// the literal default
pub fn resolve_base_url(explicit: Option<&str>, store: &CredentialStore) -> Result<Url> {
    let raw = explicit
        .map(str::to_string)
        .or_else(|| store.server_url())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    Url::parse(&raw)
        .map_err(|_| TransferError::InvalidUrl { url: raw }.into())
}

fn client_for(explicit_url: Option<&str>, store: &CredentialStore) -> Result<ApiClient> {
    let base = resolve_base_url(explicit_url, store)?;
    Ok(ApiClient::new(base)?)
}

/// Handle the login command
///
/// Exchanges the supplied access token for a session token, stores it, and
/// persists the server URL when one was passed in.
pub async fn handle_login(args: LoginArgs, store: &CredentialStore) -> Result<()> {
    let client = client_for(args.server_url.as_deref(), store)?;
    let endpoint = endpoints::create_api_session(&args.token, client.base_url());
    let body = client.execute_json(&endpoint, Some(args.token.as_str())).await?;

    let token = body
        .get("token")
        .and_then(Value::as_str)
        .ok_or_else(|| TransferError::UnexpectedBody {
            reason: "login response did not include a token".to_string(),
        })?;

    let url_written = store.save(token, args.server_url.as_deref())?;
    if url_written {
        println!("Server url updated.");
    }
    println!("Successfully logged in.");
    Ok(())
}

/// Handle the reset_password command
pub async fn handle_reset_password(args: ResetPasswordArgs, store: &CredentialStore) -> Result<()> {
    let client = client_for(None, store)?;
    let endpoint = endpoints::reset_password(&args.email, client.base_url());
    client.execute_json(&endpoint, None).await?;
    println!("Password reset sent if email exists.");
    Ok(())
}

/// Handle the create command
///
/// Access-token creation authenticates with the stored session token;
/// session-token creation presents the supplied access token instead.
pub async fn handle_create(args: CreateArgs, store: &CredentialStore) -> Result<()> {
    let body = match args.target {
        None
        | Some(CreateTarget::Token { target: None })
        | Some(CreateTarget::Session { target: None }) => {
            return Err(CliError::MissingArgument.into());
        }
        Some(CreateTarget::Token {
            target: Some(target),
        }) => {
            let token = store.active_token(now())?;
            let client = client_for(None, store)?;
            let endpoint = match &target {
                CreateTokenTarget::Api { description } => {
                    endpoints::create_api_token(description, client.base_url())
                }
                CreateTokenTarget::Vehicle {
                    vehicle_id,
                    description,
                } => endpoints::create_vehicle_token(vehicle_id, description, client.base_url()),
            };
            client.execute_json(&endpoint, Some(token.as_str())).await?
        }
        Some(CreateTarget::Session {
            target: Some(target),
        }) => {
            let client = client_for(None, store)?;
            let (endpoint, bearer) = match &target {
                CreateSessionTarget::Api { token } => {
                    (endpoints::create_api_session(token, client.base_url()), token)
                }
                CreateSessionTarget::Vehicle { token } => (
                    endpoints::create_vehicle_session(token, client.base_url()),
                    token,
                ),
            };
            client.execute_json(&endpoint, Some(bearer.as_str())).await?
        }
    };

    print_json(&body);
    Ok(())
}

/// Handle the download command
pub async fn handle_download(args: DownloadArgs, store: &CredentialStore) -> Result<()> {
    let Some(command) = args.target else {
        return Err(CliError::MissingArgument.into());
    };

    let token = store.active_token(now())?;
    let client = client_for(None, store)?;

    let (endpoint, destination) = match &command {
        DownloadCommand::FeatureTile { id, dest_folder } => {
            let target = DownloadTarget {
                id: id.clone(),
                format: None,
                coords: None,
            };
            (
                endpoints::download_feature_tile(id, client.base_url()),
                destination_path(dest_folder.as_deref(), &target),
            )
        }
        DownloadCommand::Distribution {
            id,
            format,
            version,
            dest_folder,
        } => {
            let target = DownloadTarget {
                id: id.clone(),
                format: format.clone(),
                coords: None,
            };
            (
                endpoints::download_distribution(
                    id,
                    client.base_url(),
                    format.as_deref(),
                    version.as_deref(),
                ),
                destination_path(dest_folder.as_deref(), &target),
            )
        }
        DownloadCommand::Tile {
            id,
            z,
            x,
            y,
            format,
            before,
            after,
            dest_folder,
        } => {
            let target = DownloadTarget {
                id: id.clone(),
                format: Some(format.clone()),
                coords: Some(TileCoords {
                    x: x.clone(),
                    y: y.clone(),
                    z: z.clone(),
                }),
            };
            (
                endpoints::download_tile(
                    id,
                    client.base_url(),
                    z,
                    x,
                    y,
                    format,
                    before.as_deref(),
                    after.as_deref(),
                ),
                destination_path(dest_folder.as_deref(), &target),
            )
        }
    };

    client.download(&endpoint, &token, &destination).await?;
    Ok(())
}

/// Download every tile inside a bounding box
///
/// Dispatcher-level composite: not a grammar leaf, but kept callable so
/// scripted callers can fetch a whole area in one run.
pub async fn handle_download_bbox(
    params: TileSearchParams,
    dest_folder: Option<String>,
    store: &CredentialStore,
) -> Result<()> {
    let token = store.active_token(now())?;
    let client = client_for(None, store)?;
    let count = client
        .download_tiles_in_bbox(&token, &params, dest_folder.as_deref())
        .await?;
    println!("Downloaded {count} tiles");
    Ok(())
}

/// Handle the list command
pub async fn handle_list(args: ListArgs, store: &CredentialStore) -> Result<()> {
    // Discriminators are checked before the credential gate
    let target = match args.target {
        None | Some(ListTarget::Tokens { target: None }) => {
            return Err(CliError::MissingArgument.into());
        }
        Some(target) => target,
    };

    let token = store.active_token(now())?;
    let client = client_for(None, store)?;
    let endpoint = match &target {
        ListTarget::Maps => endpoints::list_maps(client.base_url()),
        ListTarget::Users => endpoints::list_users(client.base_url()),
        ListTarget::FeatureTiles { id } => endpoints::list_feature_tiles(id, client.base_url()),
        ListTarget::Tokens {
            target: Some(ListTokensTarget::Api),
        } => endpoints::list_api_tokens(client.base_url()),
        ListTarget::Tokens {
            target: Some(ListTokensTarget::Vehicle),
        } => endpoints::list_vehicle_tokens(client.base_url()),
        ListTarget::Tokens { target: None } => unreachable!(),
        ListTarget::TilesDiff {
            id,
            z,
            format,
            before,
            after,
        } => endpoints::list_tiles_diff(
            id,
            client.base_url(),
            z,
            format,
            before.as_deref(),
            after.as_deref(),
        ),
    };
    let body = client.execute_json(&endpoint, Some(token.as_str())).await?;
    print_json(&body);
    Ok(())
}

/// Handle the search command
pub async fn handle_search(args: SearchArgs, store: &CredentialStore) -> Result<()> {
    let Some(SearchTarget::Tiles {
        id,
        z,
        lat1,
        lat2,
        lng1,
        lng2,
        format,
        before,
        after,
    }) = args.target
    else {
        return Err(CliError::MissingArgument.into());
    };

    let token = store.active_token(now())?;
    let client = client_for(None, store)?;
    let params = TileSearchParams {
        id,
        z,
        lat1,
        lat2,
        lng1,
        lng2,
        format,
        before,
        after,
    };
    let endpoint = endpoints::search_tiles(&params, client.base_url());
    let body = client.execute_json(&endpoint, Some(token.as_str())).await?;
    print_json(&body);
    Ok(())
}

/// Handle the invite command
pub async fn handle_invite(args: InviteArgs, store: &CredentialStore) -> Result<()> {
    let token = store.active_token(now())?;
    let client = client_for(None, store)?;
    let endpoint = endpoints::invite_user(
        &args.email,
        tristate(args.admin.as_deref()),
        client.base_url(),
    );
    let body = client.execute_json(&endpoint, Some(token.as_str())).await?;
    print_json(&body);
    Ok(())
}

/// Handle the get command
pub async fn handle_get(args: GetArgs, store: &CredentialStore) -> Result<()> {
    let Some(GetTarget::User { id }) = args.target else {
        return Err(CliError::MissingArgument.into());
    };

    let token = store.active_token(now())?;
    let client = client_for(None, store)?;
    let endpoint = endpoints::get_user(&id, client.base_url());
    let body = client.execute_json(&endpoint, Some(token.as_str())).await?;
    print_json(&body);
    Ok(())
}

/// Handle the edit command
pub async fn handle_edit(args: EditArgs, store: &CredentialStore) -> Result<()> {
    let Some(EditTarget::User { id, email, admin }) = args.target else {
        return Err(CliError::MissingArgument.into());
    };

    let token = store.active_token(now())?;
    let client = client_for(None, store)?;
    let endpoint = endpoints::edit_user(
        &id,
        email.as_deref(),
        tristate(admin.as_deref()),
        client.base_url(),
    );
    client.execute_json(&endpoint, Some(token.as_str())).await?;
    println!("User edited.");
    Ok(())
}

/// Handle the delete command
pub async fn handle_delete(args: DeleteArgs, store: &CredentialStore) -> Result<()> {
    let (kind, endpoint_id) = match &args.target {
        None | Some(DeleteTarget::Token { target: None }) => {
            return Err(CliError::MissingArgument.into());
        }
        Some(DeleteTarget::User { id }) => ("user", DeleteKind::User(id.clone())),
        Some(DeleteTarget::Token {
            target: Some(DeleteTokenTarget::Api { id }),
        }) => ("token", DeleteKind::ApiToken(id.clone())),
        Some(DeleteTarget::Token {
            target: Some(DeleteTokenTarget::Vehicle { id }),
        }) => ("token", DeleteKind::VehicleToken(id.clone())),
    };

    let token = store.active_token(now())?;
    let client = client_for(None, store)?;
    let endpoint = match &endpoint_id {
        DeleteKind::User(id) => endpoints::delete_user(id, client.base_url()),
        DeleteKind::ApiToken(id) => endpoints::delete_api_token(id, client.base_url()),
        DeleteKind::VehicleToken(id) => endpoints::delete_vehicle_token(id, client.base_url()),
    };
    client.execute_json(&endpoint, Some(token.as_str())).await?;
    println!("{kind} deleted.");
    Ok(())
}

enum DeleteKind {
    User(String),
    ApiToken(String),
    VehicleToken(String),
}

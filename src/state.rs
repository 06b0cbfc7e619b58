//! Shared application state.
//!
//! Built once at startup: the database pool, configuration, the wire/persist
//! transcoder registry, and the authorizer. Everything here is cheap to clone
//! per request (pools and `Arc`s).

use std::env;
use std::sync::Arc;

use sqlx::PgPool;

use crate::client::{RemoteAuthorizer, ServiceTokenProvider, WalkTrackClient};
use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::email::EmailConfig;
use crate::config::jwt::JwtConfig;
use crate::media::{
    json_media_type, CollectionTranscoder, JsonTranscoder, TranscoderRegistry,
};
use crate::middleware::authorize::{Authorizer, LocalAuthorizer};
use crate::modules::auth::model::{
    AuthenticateRequest, AuthenticationResponse, AuthorizeRequest, AuthorizeResponse,
};
use crate::modules::entries::model::{CreateEntryDto, Entry, UpdateEntryDto};
use crate::modules::goals::model::{CreateGoalDto, Goal, UpdateGoalDto};
use crate::modules::roles::model::{
    CreateRoleDto, Permission, RoleWithPermissions, UpdateRoleDto,
};
use crate::modules::users::model::{AssignRoleDto, CreateUserDto, SecureUser, UpdateUserDto, User};
use crate::utils::errors::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub transcoders: Arc<TranscoderRegistry>,
    pub authorizer: Arc<dyn Authorizer>,
}

pub async fn init_app_state() -> AppState {
    let db = init_db_pool().await;
    let jwt_config = JwtConfig::from_env();
    let transcoders = Arc::new(
        build_transcoder_registry().expect("transcoder registrations must not collide"),
    );
    let authorizer = init_authorizer(db.clone(), jwt_config.clone(), Arc::clone(&transcoders));

    AppState {
        db,
        jwt_config,
        email_config: EmailConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        transcoders,
        authorizer,
    }
}

/// Local authorizer by default; `AUTHORIZER_URL` switches to delegating
/// authorization to a peer service, authenticated with the service-account
/// credentials from the environment.
fn init_authorizer(
    db: PgPool,
    jwt_config: JwtConfig,
    transcoders: Arc<TranscoderRegistry>,
) -> Arc<dyn Authorizer> {
    match env::var("AUTHORIZER_URL") {
        Ok(base_url) => {
            let username = env::var("SERVICE_ACCOUNT_EMAIL")
                .expect("SERVICE_ACCOUNT_EMAIL must be set when AUTHORIZER_URL is");
            let password = env::var("SERVICE_ACCOUNT_PASSWORD")
                .expect("SERVICE_ACCOUNT_PASSWORD must be set when AUTHORIZER_URL is");

            let client = Arc::new(WalkTrackClient::new(base_url, transcoders));
            let tokens = ServiceTokenProvider::new(Arc::clone(&client), username, password);
            Arc::new(RemoteAuthorizer::new(client, tokens))
        }
        Err(_) => Arc::new(LocalAuthorizer::new(db, jwt_config)),
    }
}

/// Registers every payload shape the service speaks. Fails if two
/// registrations claim the same (media type, resource type) pair.
pub fn build_transcoder_registry() -> Result<TranscoderRegistry, AppError> {
    let registry = TranscoderRegistry::builder()
        // Users: wire shape omits credentials; the persist shape, used for the
        // stored JSONB document, carries the password hash.
        .wire::<User>(JsonTranscoder::new(json_media_type("WalkTrack.User", 1)))?
        .wire::<CreateUserDto>(JsonTranscoder::new(json_media_type(
            "WalkTrack.CreateUser",
            1,
        )))?
        .wire::<UpdateUserDto>(JsonTranscoder::new(json_media_type(
            "WalkTrack.UpdateUser",
            1,
        )))?
        .wire::<AssignRoleDto>(JsonTranscoder::new(json_media_type(
            "WalkTrack.AssignRole",
            1,
        )))?
        .persist::<SecureUser>(JsonTranscoder::new(json_media_type(
            "WalkTrack.SecureUser",
            1,
        )))?
        // Auth
        .wire::<AuthenticateRequest>(JsonTranscoder::new(json_media_type(
            "WalkTrack.AuthenticationRequest",
            1,
        )))?
        .wire::<AuthenticationResponse>(JsonTranscoder::new(json_media_type(
            "WalkTrack.AuthenticationResponse",
            1,
        )))?
        .wire::<AuthorizeRequest>(JsonTranscoder::new(json_media_type(
            "WalkTrack.AuthorizationRequest",
            1,
        )))?
        .wire::<AuthorizeResponse>(JsonTranscoder::new(json_media_type(
            "WalkTrack.AuthorizationResponse",
            1,
        )))?
        // Entries
        .wire::<Entry>(JsonTranscoder::new(json_media_type("WalkTrack.Entry", 1)))?
        .wire::<Vec<Entry>>(CollectionTranscoder::new(Arc::new(JsonTranscoder::new(
            json_media_type("WalkTrack.Entry", 1),
        ))))?
        .wire::<CreateEntryDto>(JsonTranscoder::new(json_media_type(
            "WalkTrack.CreateEntry",
            1,
        )))?
        .wire::<UpdateEntryDto>(JsonTranscoder::new(json_media_type(
            "WalkTrack.UpdateEntry",
            1,
        )))?
        // Goals
        .wire::<Goal>(JsonTranscoder::new(json_media_type("WalkTrack.Goal", 1)))?
        .wire::<Vec<Goal>>(CollectionTranscoder::new(Arc::new(JsonTranscoder::new(
            json_media_type("WalkTrack.Goal", 1),
        ))))?
        .wire::<CreateGoalDto>(JsonTranscoder::new(json_media_type(
            "WalkTrack.CreateGoal",
            1,
        )))?
        .wire::<UpdateGoalDto>(JsonTranscoder::new(json_media_type(
            "WalkTrack.UpdateGoal",
            1,
        )))?
        // Roles and permissions
        .wire::<RoleWithPermissions>(JsonTranscoder::new(json_media_type("WalkTrack.Role", 1)))?
        .wire::<Vec<RoleWithPermissions>>(CollectionTranscoder::new(Arc::new(
            JsonTranscoder::new(json_media_type("WalkTrack.Role", 1)),
        )))?
        .wire::<CreateRoleDto>(JsonTranscoder::new(json_media_type(
            "WalkTrack.CreateRole",
            1,
        )))?
        .wire::<UpdateRoleDto>(JsonTranscoder::new(json_media_type(
            "WalkTrack.UpdateRole",
            1,
        )))?
        .wire::<Permission>(JsonTranscoder::new(json_media_type(
            "WalkTrack.Permission",
            1,
        )))?
        .wire::<Vec<Permission>>(CollectionTranscoder::new(Arc::new(JsonTranscoder::new(
            json_media_type("WalkTrack.Permission", 1),
        ))))?
        .build();

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::TranscoderRole;
    use crate::modules::users::service::SECURE_USER_MEDIA_TYPE;

    #[test]
    fn test_registry_builds_without_collisions() {
        assert!(build_transcoder_registry().is_ok());
    }

    #[test]
    fn test_secure_user_is_persist_only() {
        let registry = build_transcoder_registry().unwrap();
        let mt = SECURE_USER_MEDIA_TYPE.parse().unwrap();

        assert!(registry.can_encode::<SecureUser>(&mt, TranscoderRole::Persist));
        assert!(!registry.can_encode::<SecureUser>(&mt, TranscoderRole::Wire));
    }

    #[test]
    fn test_user_wire_default_omits_credentials() {
        let registry = build_transcoder_registry().unwrap();
        assert_eq!(
            registry.default_wire_media_type::<User>(),
            Some(&json_media_type("WalkTrack.User", 1))
        );
    }

    #[test]
    fn test_collections_share_the_item_media_type() {
        let registry = build_transcoder_registry().unwrap();
        let mt = json_media_type("WalkTrack.Entry", 1);

        assert!(registry.can_encode::<Entry>(&mt, TranscoderRole::Wire));
        assert!(registry.can_encode::<Vec<Entry>>(&mt, TranscoderRole::Wire));
    }
}

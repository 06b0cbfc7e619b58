use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::model::{
    AuthenticateRequest, AuthenticationResponse, AuthorizeRequest, AuthorizeResponse,
};
use crate::modules::entries::model::{CreateEntryDto, Entry, EntrySearchParams, UpdateEntryDto};
use crate::modules::goals::model::{CreateGoalDto, Goal, UpdateGoalDto};
use crate::modules::roles::model::{
    CreateRoleDto, Permission, Role, RoleWithPermissions, UpdateRoleDto,
};
use crate::modules::users::model::{AssignRoleDto, CreateUserDto, UpdateUserDto, User};
use crate::utils::errors::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::authenticate,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::authorize,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::assign_role,
        crate::modules::users::controller::delete_user,
        crate::modules::entries::controller::create_entry,
        crate::modules::entries::controller::search_entries,
        crate::modules::entries::controller::get_entry,
        crate::modules::entries::controller::update_entry,
        crate::modules::entries::controller::delete_entry,
        crate::modules::goals::controller::create_goal,
        crate::modules::goals::controller::list_goals,
        crate::modules::goals::controller::get_goal,
        crate::modules::goals::controller::update_goal,
        crate::modules::goals::controller::delete_goal,
        crate::modules::roles::controller::list_permissions,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::list_roles,
        crate::modules::roles::controller::get_role,
        crate::modules::roles::controller::update_role,
        crate::modules::roles::controller::delete_role,
    ),
    components(
        schemas(
            AuthenticateRequest,
            AuthenticationResponse,
            AuthorizeRequest,
            AuthorizeResponse,
            User,
            CreateUserDto,
            UpdateUserDto,
            AssignRoleDto,
            Entry,
            CreateEntryDto,
            UpdateEntryDto,
            EntrySearchParams,
            Goal,
            CreateGoalDto,
            UpdateGoalDto,
            Permission,
            Role,
            RoleWithPermissions,
            CreateRoleDto,
            UpdateRoleDto,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication, token refresh, and permission checks"),
        (name = "Users", description = "User account management"),
        (name = "Entries", description = "Walk entry tracking"),
        (name = "Goals", description = "Distance goal tracking"),
        (name = "Roles", description = "Role and permission management")
    ),
    info(
        title = "WalkTrack API",
        version = "0.1.0",
        description = "Walk tracking service with structured media-type negotiation and permission-based authorization.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

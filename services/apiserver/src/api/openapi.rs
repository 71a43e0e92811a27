//! OpenAPI schema aggregation for the Checkvault API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document for docs
//! and client generation.
use crate::api::{
    auth, history, system,
    types::{
        AuthResponse, Banner, CheckListResponse, CreateCheckRequest, CreateUserRequest,
        DeleteResponse, ErrorResponse, HealthStatus, LoginRequest, MeResponse, RegisterRequest,
        UpdateCheckRequest, UpdateUserRequest, UserListResponse, UserProfile,
    },
    users,
};
use crate::model::{CheckRecord, UserStats};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "checkvault-apiserver",
        version = "v1",
        description = "Checkvault check history and user administration API"
    ),
    paths(
        system::banner,
        system::health,
        auth::register,
        auth::login,
        auth::me,
        history::list_checks,
        history::create_check,
        history::get_check,
        history::update_check,
        history::delete_check,
        users::list_users,
        users::user_stats,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user
    ),
    components(schemas(
        ErrorResponse,
        HealthStatus,
        Banner,
        UserProfile,
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        MeResponse,
        CreateUserRequest,
        UpdateUserRequest,
        UserListResponse,
        UserStats,
        CheckRecord,
        CreateCheckRequest,
        UpdateCheckRequest,
        CheckListResponse,
        DeleteResponse
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "system", description = "Health and banner endpoints"),
        (name = "auth", description = "Registration, login and identity"),
        (name = "history", description = "Scanned check records"),
        (name = "users", description = "Account administration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_guarded_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/api/history/{id}", "/api/users/stats/summary", "/api/me"] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}

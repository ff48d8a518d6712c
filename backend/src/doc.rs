//! OpenAPI documentation for the JSON API.
//!
//! Served by Swagger UI at `/docs` in debug builds. HTML pages are not part
//! of the document.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Audit, AuthOutcome, Error, ErrorCode, Performer, PerformerId, Role, RoleId};
use crate::inbound::http::dto::{
    LoginRequest, PerformerList, PerformerRolesUpdated, RoleAssignmentRequest, RoleBody, RoleList,
    RoleSaved,
};
use crate::inbound::http::session::SESSION_COOKIE_NAME;

/// Name of the cookie security scheme.
pub const SESSION_SCHEME: &str = "SessionCookie";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            SESSION_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Encrypted session cookie issued by POST /api/fgw/login.",
            ))),
        );
    }
}

/// OpenAPI document for the JSON API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "FGW administration API",
        description = "Performer role assignment and role catalogue behind a session cookie."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::api::login,
        crate::inbound::http::api::list_performers,
        crate::inbound::http::api::update_performer,
        crate::inbound::http::api::list_roles,
        crate::inbound::http::api::add_role,
        crate::inbound::http::api::update_role,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        AuthOutcome,
        Audit,
        Performer,
        PerformerId,
        Role,
        RoleId,
        LoginRequest,
        PerformerList,
        RoleList,
        RoleAssignmentRequest,
        RoleBody,
        PerformerRolesUpdated,
        RoleSaved,
    )),
    tags(
        (name = "auth", description = "Login"),
        (name = "performers", description = "Performers and their role assignment"),
        (name = "roles", description = "Role catalogue"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn schema(name: &str) -> RefOr<Schema> {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        components
            .schemas
            .into_iter()
            .find(|(key, _)| key == name || key.ends_with(&format!(".{name}")))
            .map(|(_, schema)| schema)
            .unwrap_or_else(|| panic!("schema {name} registered"))
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("Performer", "idRoleAForms")]
    #[case("Performer", "fio")]
    #[case("RoleSaved", "updatedBy")]
    #[case("PerformerRolesUpdated", "performerId")]
    fn schemas_expose_wire_field_names(#[case] name: &str, #[case] field: &str) {
        let value = serde_json::to_value(schema(name)).expect("schema serializes");
        let has_field = |node: &serde_json::Value| node["properties"].get(field).is_some();
        let found = has_field(&value)
            || value["allOf"]
                .as_array()
                .is_some_and(|items| items.iter().any(has_field));
        assert!(found, "{name} lacks {field}: {value}");
    }

    #[rstest]
    #[case("/api/fgw/login")]
    #[case("/api/fgw/performers")]
    #[case("/api/fgw/performers/upd")]
    #[case("/api/fgw/roles")]
    #[case("/api/fgw/roles/add")]
    #[case("/api/fgw/roles/upd")]
    #[case("/health/ready")]
    fn documents_json_paths(#[case] path: &str) {
        assert!(ApiDoc::openapi().paths.paths.contains_key(path));
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(SESSION_SCHEME));
    }
}

//! OpenAPI document assembled from the annotated handlers.

use utoipa::OpenApi;

use super::error::ErrorBody;
use super::handlers;
use super::handlers::{
    MessageResponse,
    auth::{LoginRequest, MeResponse},
    check::{CheckRequest, Disclosure},
    health::Health,
    settings::UpdateSettingsRequest,
    students::ImportSummary,
};
use crate::storage::{GateConfig, NewStudent, Outcome, Student};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login::login,
        handlers::auth::session::logout,
        handlers::auth::session::me,
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::check::check,
        handlers::students::list,
        handlers::students::create,
        handlers::students::update,
        handlers::students::remove,
        handlers::students::import,
        handlers::health::live,
        handlers::health::health,
    ),
    components(schemas(
        ErrorBody,
        MessageResponse,
        LoginRequest,
        MeResponse,
        CheckRequest,
        Disclosure,
        GateConfig,
        UpdateSettingsRequest,
        Student,
        NewStudent,
        Outcome,
        ImportSummary,
        Health,
    )),
    tags(
        (name = "auth", description = "Administrator authentication"),
        (name = "settings", description = "Announcement gate configuration"),
        (name = "check", description = "Public outcome lookup"),
        (name = "students", description = "Roster management"),
        (name = "health", description = "Service health probes"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for route in [
            "/auth/login",
            "/auth/logout",
            "/auth/me",
            "/settings",
            "/check",
            "/admin/settings",
            "/admin/students",
            "/admin/students/{id}",
            "/admin/students/import",
            "/live",
            "/health",
        ] {
            assert!(paths.contains(&route), "missing {route}");
        }
    }

    #[test]
    fn document_serializes() {
        let json = serde_json::to_string(&openapi()).unwrap();
        assert!(json.contains("\"openapi\""));
    }
}

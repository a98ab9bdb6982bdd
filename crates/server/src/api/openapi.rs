//! OpenAPI/Utoipa configuration.

use crate::api::{accounts::ACCOUNTS_TAG, health::MISC_TAG};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let bearer = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some(
                    "Use the token obtained from `/api/auth/token` to authenticate.",
                ))
                .build();
            components.add_security_scheme("Authorization", SecurityScheme::Http(bearer));
        }
    }
}

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Account Gateway API",
        version = "1.0.0",
        description = "Signup and authentication gateway linking an identity provider to \
                       the order service's client registry."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = ACCOUNTS_TAG, description = "Signup and authentication endpoints")
    )
)]
pub struct ApiDoc;

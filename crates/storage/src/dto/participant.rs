use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateParticipantRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub birth_year: Option<i32>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
}

/// Partial update; each field is independently present-or-absent.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateParticipantRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub birth_year: Option<i32>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRegistrationRequest {
    #[validate(length(min = 1, max = 20))]
    pub bib: String,
    #[validate(length(max = 100))]
    pub wave: Option<String>,
}

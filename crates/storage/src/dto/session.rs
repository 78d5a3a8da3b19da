use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct StartSessionRequest {
    #[validate(length(max = 200))]
    pub device_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSessionRequest {
    #[validate(length(max = 200))]
    pub device_id: Option<String>,
    /// JSON document describing the device/session; stored verbatim.
    pub metadata: Option<String>,
}

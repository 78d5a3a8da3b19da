use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCheckpointRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub order_index: i32,
    #[serde(default)]
    pub is_start: bool,
    #[serde(default)]
    pub is_finish: bool,
}

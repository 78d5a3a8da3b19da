use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdjustTimeRequest {
    pub adjustment_ms: i64,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddPenaltyRequest {
    #[validate(range(min = 1))]
    pub penalty_seconds: i64,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DisqualifyRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ReinstateRequest {
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub category: String,
}

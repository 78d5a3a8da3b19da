use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::collections::HashSet;

use crate::error::WebError;

#[derive(Clone)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self { keys }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

pub async fn require_auth(
    State(api_keys): State<ApiKeys>,
    req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if api_keys.is_valid(token) => Ok(next.run(req).await),
        _ => {
            tracing::warn!("Invalid API key attempt");
            Err(WebError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_keys() {
        let keys = ApiKeys::from_comma_separated("alpha, beta ,,gamma");
        assert!(keys.is_valid("alpha"));
        assert!(keys.is_valid("beta"));
        assert!(keys.is_valid("gamma"));
        assert!(!keys.is_valid(""));
        assert!(!keys.is_valid("delta"));
    }
}

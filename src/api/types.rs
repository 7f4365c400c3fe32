//! API request/response types
//!
//! These types are used for JSON serialization in API endpoints.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::protocol::{ButtonConfig, Vec3Data};

/// Server status response
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub buttons: usize,
    pub clients: usize,
}

/// Button config update request
///
/// Transform fields may be omitted; the handler fills in defaults the way
/// the original clients expect (zero vectors, scale 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonConfigRequest {
    #[serde(default)]
    pub id: String,
    pub position: Option<Vec3Data>,
    pub rotation: Option<Vec3Data>,
    pub scale: Option<f32>,
}

impl ButtonConfigRequest {
    /// Complete the request into a full config, defaulting missing fields.
    pub fn into_config(self) -> ButtonConfig {
        ButtonConfig {
            id: self.id,
            position: self.position.unwrap_or_default(),
            rotation: self.rotation.unwrap_or_default(),
            scale: self.scale.unwrap_or(1.0),
        }
    }
}

/// Response wrapper for a single accepted config
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub status: &'static str,
    pub data: ButtonConfig,
}

/// All persisted configs
#[derive(Debug, Clone, Serialize)]
pub struct ConfigListResponse {
    pub status: &'static str,
    pub data: HashMap<String, ButtonConfig>,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub code: u16,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: "Not Found".to_string(),
            message: message.into(),
            code: 404,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: "Bad Request".to_string(),
            message: message.into(),
            code: 400,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: "Internal Server Error".to_string(),
            message: message.into(),
            code: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_transform_fields_get_defaults() {
        let req: ButtonConfigRequest =
            serde_json::from_str(r#"{"id":"exampleButton"}"#).unwrap();
        let config = req.into_config();
        assert_eq!(config.position, Vec3Data::default());
        assert_eq!(config.rotation, Vec3Data::default());
        assert_eq!(config.scale, 1.0);
    }

    #[test]
    fn test_missing_id_deserializes_empty() {
        let req: ButtonConfigRequest = serde_json::from_str(r#"{"scale":2.0}"#).unwrap();
        assert!(req.id.is_empty());
        assert_eq!(req.into_config().scale, 2.0);
    }
}

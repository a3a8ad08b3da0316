//! Reference `application/json` codec.

use arbor_core::{Entity, Error, Processor, Representation, Request, Response, Result, Status};
use async_trait::async_trait;
use serde_json::Value;

/// JSON media type.
pub const APPLICATION_JSON: &str = "application/json";

/// Codec mapping JSON objects to representations and back.
#[derive(Debug, Clone, Default)]
pub struct JsonProcessor {
    pretty: bool,
}

impl JsonProcessor {
    /// Compact output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

#[async_trait]
impl Processor for JsonProcessor {
    fn supported_content_types(&self) -> Vec<String> {
        vec![APPLICATION_JSON.to_string()]
    }

    async fn parse(&self, body: &[u8], content_type: &str) -> Result<Representation> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            tracing::debug!(error = %e, content_type = %content_type, "Rejected JSON body");
            Error::FormatError(e.to_string())
        })?;
        Representation::from_value(value)
    }

    async fn serialize(
        &self,
        _entity: Option<&Entity>,
        representation: &Representation,
        _request: Option<&Request>,
    ) -> Result<Response> {
        let body = if self.pretty {
            serde_json::to_vec_pretty(representation)
        } else {
            serde_json::to_vec(representation)
        }
        .map_err(|e| Error::internal(format!("JSON serialization failed: {}", e)))?;

        Ok(Response::with_body(
            representation.status().unwrap_or(Status::Ok),
            APPLICATION_JSON,
            body,
        ))
    }
}

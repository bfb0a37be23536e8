//! MSA response envelope
//!
//! Every API answer carries a top-level `status` object whose `return-code`
//! and `response` properties describe the outcome of the call.

use crate::error::ApiError;
use crate::xml::Document;

/// Return code of a successful data call
pub const SUCCESS: &str = "0";

/// Parsed response: status fields plus the payload tree
#[derive(Debug, Clone)]
pub struct Envelope {
    return_code: String,
    response: String,
    document: Document,
}

impl Envelope {
    /// Parse a response body and pull out `status/return-code` and
    /// `status/response`.
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let document = Document::parse(body)?;

        let status = document
            .object_named("status")
            .ok_or_else(|| ApiError::Parse("response has no status object".to_string()))?;
        let return_code = status
            .property("return-code")
            .ok_or_else(|| ApiError::Parse("status has no return-code".to_string()))?
            .trim()
            .to_string();
        let response = status
            .property("response")
            .ok_or_else(|| ApiError::Parse("status has no response message".to_string()))?
            .to_string();

        Ok(Self {
            return_code,
            response,
            document,
        })
    }

    pub fn return_code(&self) -> &str {
        &self.return_code
    }

    /// Human readable message, or the session key for a login call
    pub fn message(&self) -> &str {
        &self.response
    }

    pub fn is_success(&self) -> bool {
        self.return_code == SUCCESS
    }

    /// Payload of a successful data call; any other return code is an error.
    pub fn into_payload(self) -> Result<Document, ApiError> {
        if self.is_success() {
            Ok(self.document)
        } else {
            Err(ApiError::Vendor {
                code: self.return_code,
                message: self.response,
            })
        }
    }
}

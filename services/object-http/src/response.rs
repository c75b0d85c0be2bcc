// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use bytes::Bytes;
use http::header;
use http::HeaderMap;
use log::{debug, warn};
use quick_xml::de;
use serde::Deserialize;

use crate::operation::Operation;
use objreq_core::time::{parse_http_date, DateTime};
use objreq_core::{Error, ErrorKind};

/// The normalized result of a request.
///
/// Written once when the request finishes and never changed afterwards.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    /// HTTP status code, 0 if no response was received.
    pub response_code: u16,
    /// Symbolic error code, empty on success.
    pub error_code: String,
    /// Human readable error message, empty on success.
    pub error_message: String,
    /// Raw response body.
    pub result: Bytes,
    /// Response headers.
    pub headers: HeaderMap,
}

impl Outcome {
    /// Build the outcome of a failure that left no usable response.
    ///
    /// The response code is the status received before the failure, 0 if
    /// none arrived.
    pub fn from_error(err: &Error) -> Self {
        Self {
            response_code: err.status().unwrap_or(0),
            error_code: err.code().to_string(),
            error_message: err.message().to_string(),
            ..Default::default()
        }
    }

    /// Whether the request reached its expected status.
    pub fn is_success(&self) -> bool {
        self.response_code != 0 && self.error_code.is_empty()
    }

    /// Whether a head request found no object.
    pub fn is_not_found(&self) -> bool {
        self.response_code == 404 && self.error_code.is_empty()
    }

    /// The response body as a string, invalid utf-8 is replaced.
    pub fn result_string(&self) -> String {
        String::from_utf8_lossy(&self.result).into_owned()
    }

    /// Object metadata carried by the response headers.
    pub fn metadata(&self) -> ObjectMetadata {
        ObjectMetadata::from_headers(&self.headers)
    }
}

/// Metadata of an object as reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Size of the object in bytes.
    pub content_length: Option<u64>,
    /// Media type of the object.
    pub content_type: Option<String>,
    /// Entity tag, quotes kept as sent.
    pub etag: Option<String>,
    /// Last modification time.
    pub last_modified: Option<DateTime>,
}

impl ObjectMetadata {
    /// Extract metadata from response headers, ignoring malformed values.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };

        Self {
            content_length: get(header::CONTENT_LENGTH).and_then(|v| v.parse().ok()),
            content_type: get(header::CONTENT_TYPE),
            etag: get(header::ETAG),
            last_modified: get(header::LAST_MODIFIED).and_then(|v| parse_http_date(&v).ok()),
        }
    }
}

/// S3 style error document: `<Error><Code/><Message/></Error>`.
#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ServiceError {
    code: String,
    message: String,
}

/// Extract `(code, message)` from a service error body.
///
/// Returns `None` when the body is not an error document or carries no code.
pub fn parse_service_error(body: &[u8]) -> Option<(String, String)> {
    let content = std::str::from_utf8(body).ok()?;
    if content.trim().is_empty() {
        return None;
    }

    let err: ServiceError = match de::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            debug!("response body is not a service error document: {e}");
            return None;
        }
    };
    if err.code.is_empty() {
        return None;
    }

    Some((err.code, err.message))
}

/// Map a transport response onto the outcome of `op`.
pub(crate) fn interpret(op: &Operation, resp: http::Response<Bytes>) -> (Outcome, Option<Error>) {
    let (parts, body) = resp.into_parts();
    let code = parts.status.as_u16();

    let mut outcome = Outcome {
        response_code: code,
        headers: parts.headers,
        ..Default::default()
    };

    if code == op.expected || op.absent == Some(code) {
        if op.receives_body {
            outcome.result = body;
        }
        return (outcome, None);
    }

    let mut err = Error::unexpected_response(format!(
        "expected status {} but got {}",
        op.expected, code
    ));
    if let Some((service_code, service_message)) = parse_service_error(&body) {
        err = Error::new(ErrorKind::UnexpectedResponse, service_message).with_code(service_code);
    }
    warn!(
        "{} request got unexpected status {code}: {} {}",
        op.method,
        err.code(),
        err.message()
    );

    outcome.error_code = err.code().to_string();
    outcome.error_message = err.message().to_string();
    outcome.result = body;
    (outcome, Some(err))
}

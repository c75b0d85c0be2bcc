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

use http::Method;
use http::StatusCode;

/// The kind of object operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Caller controlled request.
    Generic,
    /// Upload a byte window of a buffer.
    Upload,
    /// Download a byte range of an object.
    Download,
    /// Fetch object metadata.
    Head,
}

/// Describes how an operation maps onto an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The operation kind.
    pub kind: OperationKind,
    /// HTTP verb.
    pub method: Method,
    /// Whether a request body is attached.
    pub sends_body: bool,
    /// Whether the response body is kept.
    pub receives_body: bool,
    /// Status code that marks success.
    pub expected: u16,
    /// Status code that is a normal negative result, like 404 on head.
    pub absent: Option<u16>,
}

impl Default for Operation {
    fn default() -> Self {
        Self::generic()
    }
}

impl Operation {
    /// A caller driven `POST` expecting 200.
    pub fn generic() -> Self {
        Self {
            kind: OperationKind::Generic,
            method: Method::POST,
            sends_body: true,
            receives_body: true,
            expected: StatusCode::OK.as_u16(),
            absent: None,
        }
    }

    /// `PUT` of a byte window, expecting 200.
    pub fn upload() -> Self {
        Self {
            kind: OperationKind::Upload,
            method: Method::PUT,
            sends_body: true,
            receives_body: false,
            expected: StatusCode::OK.as_u16(),
            absent: None,
        }
    }

    /// `GET` of a byte range.
    ///
    /// The whole object expects 200, any range expects 206.
    pub fn download(offset: u64, size: u64) -> Self {
        let expected = if download_range(offset, size).is_some() {
            StatusCode::PARTIAL_CONTENT
        } else {
            StatusCode::OK
        };

        Self {
            kind: OperationKind::Download,
            method: Method::GET,
            sends_body: false,
            receives_body: true,
            expected: expected.as_u16(),
            absent: None,
        }
    }

    /// `HEAD` expecting 200, with 404 as a normal negative result.
    pub fn head() -> Self {
        Self {
            kind: OperationKind::Head,
            method: Method::HEAD,
            sends_body: false,
            receives_body: false,
            expected: StatusCode::OK.as_u16(),
            absent: Some(StatusCode::NOT_FOUND.as_u16()),
        }
    }
}

/// The `Range` header value for a download, `None` for the whole object.
///
/// A zero size reads from `offset` to the end of the object.
pub fn download_range(offset: u64, size: u64) -> Option<String> {
    match (offset, size) {
        (0, 0) => None,
        (offset, 0) => Some(format!("bytes={offset}-")),
        (offset, size) => Some(format!("bytes={}-{}", offset, offset + size - 1)),
    }
}

/// The `Content-Range` header value for an upload window, `None` when the
/// window covers the whole buffer.
pub fn upload_content_range(offset: u64, size: u64, total: u64) -> Option<String> {
    if offset == 0 && size == total {
        return None;
    }

    Some(format!("bytes {}-{}/{}", offset, offset + size - 1, total))
}

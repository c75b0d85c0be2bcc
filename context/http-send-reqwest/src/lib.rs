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

//! Blocking reqwest transport for objreq.
//!
//! `ReqwestHttpSend` implements `objreq_core::HttpSend` on top of
//! `reqwest::blocking::Client`. Streamed payloads are handed to reqwest as a
//! sized reader, so the payload cursor advances as reqwest pulls bytes.
//!
//! ```no_run
//! use objreq_core::Context;
//! use objreq_http_send_reqwest::ReqwestHttpSend;
//! use std::time::Duration;
//!
//! let client = reqwest::blocking::Client::builder()
//!     .timeout(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));
//! ```

use std::io::Cursor;

use bytes::Bytes;
use objreq_core::{Body, Error, HttpSend, Result};
use reqwest::blocking::Client;

/// `HttpSend` implementation backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl Default for ReqwestHttpSend {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest blocking client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl HttpSend for ReqwestHttpSend {
    fn http_send(&self, req: http::Request<Body>) -> Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();

        let mut builder = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers);
        builder = match body {
            Body::Empty => builder,
            Body::Bytes(bs) => {
                let size = bs.len() as u64;
                builder.body(reqwest::blocking::Body::sized(Cursor::new(bs), size))
            }
            Body::Stream(payload) => {
                let size = payload.len() as u64;
                builder.body(reqwest::blocking::Body::sized(payload, size))
            }
        };

        let resp = builder.send().map_err(transport_error)?;
        log::debug!("transport got response status: {}", resp.status());

        let status = resp.status();
        let version = resp.version();
        let headers = resp.headers().clone();
        let bs = resp
            .bytes()
            .map_err(|e| transport_error(e).with_status(status.as_u16()))?;

        let mut out = http::Response::new(bs);
        *out.status_mut() = status;
        *out.version_mut() = version;
        *out.headers_mut() = headers;
        Ok(out)
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    let reason = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_body() {
        "body transfer failed"
    } else {
        "request failed"
    };

    Error::transport(format!("{reason}: {err}")).with_source(err)
}

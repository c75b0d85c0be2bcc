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

use std::io::Read;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use objreq_core::{Body, Context, Error, HttpSend, Result};

/// A request as seen by the transport.
#[derive(Debug)]
pub struct Seen {
    pub parts: http::request::Parts,
    pub body: Vec<u8>,
}

/// In-memory transport answering every request with a fixed response.
#[derive(Debug, Clone)]
pub struct MockHttpSend {
    status: http::StatusCode,
    headers: Vec<(&'static str, &'static str)>,
    body: Bytes,
    /// Stop pulling the payload after this many bytes and fail the exchange.
    fail_after: Option<usize>,
    /// Answer with the status, then fail while reading the response body.
    broken_body: bool,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockHttpSend {
    pub fn new(status: u16) -> Self {
        Self {
            status: http::StatusCode::from_u16(status).expect("status must be valid"),
            headers: Vec::new(),
            body: Bytes::new(),
            fail_after: None,
            broken_body: false,
            seen: Arc::default(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn with_fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn with_broken_body(mut self) -> Self {
        self.broken_body = true;
        self
    }

    pub fn context(&self) -> Context {
        Context::new().with_http_send(self.clone())
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Take the only request the transport has seen.
    pub fn take_one(&self) -> Seen {
        let mut seen = self.seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "exactly one request expected");
        seen.remove(0)
    }
}

impl HttpSend for MockHttpSend {
    fn http_send(&self, req: http::Request<Body>) -> Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();

        let mut received = Vec::new();
        let mut failed = false;
        match body {
            Body::Empty => {}
            Body::Bytes(bs) => received.extend_from_slice(&bs),
            Body::Stream(mut payload) => {
                let limit = self.fail_after.unwrap_or(usize::MAX);
                let mut buf = [0; 128];
                while received.len() < limit {
                    let want = buf.len().min(limit - received.len());
                    let n = payload.read(&mut buf[..want])?;
                    if n == 0 {
                        break;
                    }
                    received.extend_from_slice(&buf[..n]);
                }
                failed = self.fail_after.is_some();
            }
        }

        self.seen.lock().unwrap().push(Seen {
            parts,
            body: received,
        });
        if failed {
            return Err(Error::transport("connection reset while sending body"));
        }
        if self.broken_body {
            return Err(Error::transport("connection reset while reading body")
                .with_status(self.status.as_u16()));
        }

        let mut resp = http::Response::new(self.body.clone());
        *resp.status_mut() = self.status;
        for (k, v) in &self.headers {
            resp.headers_mut().insert(*k, http::HeaderValue::from_static(v));
        }
        Ok(resp)
    }
}

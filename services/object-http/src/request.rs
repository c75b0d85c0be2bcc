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
use http::HeaderName;
use http::HeaderValue;
use log::debug;

use crate::attributes::AttributeMap;
use crate::constants::OCTET_STREAM;
use crate::credential::Credential;
use crate::host::HostUrl;
use crate::operation::{download_range, upload_content_range, Operation};
use crate::response::{interpret, Outcome};
use crate::sign::Signer;
use objreq_core::time::DateTime;
use objreq_core::{Body, Context, Error, Payload, Result, SigningRequest};

/// Lifecycle of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Host url parsed, ready to send.
    Ready,
    /// Host url failed to parse, every send fails.
    Invalid,
    /// Signature applied, transport not called yet.
    Signed,
    /// Transport returned a response.
    Sent,
    /// The response matched the operation.
    Completed,
    /// The request failed.
    Failed,
}

/// A single-use request against an object storage host.
///
/// The request borrows its credential and owns everything else: its headers
/// and query parameters, the payload cursor of an upload and the final
/// [`Outcome`].
///
/// ```no_run
/// use bytes::Bytes;
/// use objreq_core::Context;
/// use objreq_object_http::{Credential, HttpRequest};
///
/// let ctx = Context::new();
/// let cred = Credential::keyed("access_key_id", "secret_access_key");
/// let mut req = HttpRequest::for_object(&ctx, "https://s3.example.com/bucket", "a.txt", &cred);
///
/// let data = Bytes::from_static(b"hello world");
/// if let Err(err) = req.send_upload(&data, 0, data.len()) {
///     eprintln!("upload failed: {} {}", err.code(), err.message());
/// }
/// println!("sent {} bytes, got {}", req.sent_so_far(), req.response_code());
/// ```
#[derive(Debug)]
pub struct HttpRequest<'a> {
    ctx: Context,
    credential: &'a Credential,
    signer: Signer,

    host_url: String,
    url: Option<HostUrl>,
    expected: Option<u16>,
    headers: AttributeMap,
    query: AttributeMap,

    state: State,
    payload: Option<Payload>,
    signature_time: Option<DateTime>,
    outcome: Outcome,
}

impl<'a> HttpRequest<'a> {
    /// Create a request against the host url itself.
    ///
    /// A malformed url doesn't fail here: the request becomes
    /// [`State::Invalid`] and records `E_INVALID_HOST_URL`.
    pub fn new(ctx: &Context, host_url: &str, credential: &'a Credential) -> Self {
        let parsed = HostUrl::parse(host_url);
        Self::build(ctx, host_url.to_string(), parsed, credential)
    }

    /// Create a request addressing `object` under the host url.
    pub fn for_object(
        ctx: &Context,
        host_url: &str,
        object: &str,
        credential: &'a Credential,
    ) -> Self {
        let raw = format!(
            "{}/{}",
            host_url.trim_end_matches('/'),
            object.trim_start_matches('/')
        );
        let parsed = HostUrl::parse(host_url).map(|v| v.join_object(object));
        Self::build(ctx, raw, parsed, credential)
    }

    fn build(
        ctx: &Context,
        raw: String,
        parsed: Result<HostUrl>,
        credential: &'a Credential,
    ) -> Self {
        let mut req = Self {
            ctx: ctx.clone(),
            credential,
            signer: Signer::default(),

            host_url: raw,
            url: None,
            expected: None,
            headers: AttributeMap::case_insensitive(),
            query: AttributeMap::new(),

            state: State::Ready,
            payload: None,
            signature_time: None,
            outcome: Outcome::default(),
        };

        match parsed {
            Ok(url) => {
                req.host_url = url.to_string();
                req.url = Some(url);
            }
            Err(err) => {
                debug!("request for {} is invalid: {err}", req.host_url);
                req.outcome = Outcome::from_error(&err);
                req.state = State::Invalid;
            }
        }
        req
    }

    /// Use given signer instead of the default one.
    pub fn with_signer(mut self, signer: Signer) -> Self {
        self.signer = signer;
        self
    }

    /// Override the status code that marks success.
    pub fn with_expected_response_code(mut self, code: u16) -> Self {
        self.expected = Some(code);
        self
    }

    /// Add a header sent with the request.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Add a query parameter, raw and unencoded.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key, value);
        self
    }

    /// Mutable access to the headers, keys are case insensitive.
    pub fn headers_mut(&mut self) -> &mut AttributeMap {
        &mut self.headers
    }

    /// Mutable access to the query parameters.
    pub fn query_parameters_mut(&mut self) -> &mut AttributeMap {
        &mut self.query
    }

    /// Send a caller driven request, `POST` expecting 200 unless overridden.
    pub fn send_http_request(&mut self, body: Body) -> Result<()> {
        self.send(Operation::generic(), Vec::new(), body)
    }

    /// Upload `data[offset..offset + size]` with `PUT`.
    ///
    /// The window is streamed through a fresh payload cursor, see
    /// [`HttpRequest::sent_so_far`].
    pub fn send_upload(&mut self, data: &Bytes, offset: u64, size: usize) -> Result<()> {
        self.check_sendable()?;

        let total = data.len();
        let window = usize::try_from(offset)
            .ok()
            .and_then(|start| start.checked_add(size).map(|end| (start, end)));
        let (start, end) = match window {
            _ if size == 0 => {
                return self.fail(Error::request_invalid("upload size must not be zero"));
            }
            Some((start, end)) if end <= total => (start, end),
            _ => {
                return self.fail(Error::request_invalid(format!(
                    "upload window {offset}+{size} exceeds data length {total}"
                )));
            }
        };

        let mut headers = vec![
            (header::CONTENT_TYPE, OCTET_STREAM.to_string()),
            (header::CONTENT_LENGTH, size.to_string()),
        ];
        if let Some(range) = upload_content_range(offset, size as u64, total as u64) {
            headers.push((header::CONTENT_RANGE, range));
        }

        let payload = Payload::new(data.slice(start..end));
        self.send(Operation::upload(), headers, payload.into())
    }

    /// Download `size` bytes starting at `offset` with `GET`.
    ///
    /// `offset == 0 && size == 0` fetches the whole object, a zero size
    /// otherwise reads to the end.
    pub fn send_download(&mut self, offset: u64, size: u64) -> Result<()> {
        self.check_sendable()?;

        if offset.checked_add(size).is_none() {
            return self.fail(Error::request_invalid(format!(
                "download range {offset}+{size} overflows"
            )));
        }

        let headers = download_range(offset, size)
            .map(|range| vec![(header::RANGE, range)])
            .unwrap_or_default();
        self.send(Operation::download(offset, size), headers, Body::Empty)
    }

    /// Fetch object metadata with `HEAD`.
    ///
    /// A missing object is not an error: the call returns `Ok` with response
    /// code 404 and an empty error code.
    pub fn send_head(&mut self) -> Result<()> {
        self.send(Operation::head(), Vec::new(), Body::Empty)
    }

    fn check_sendable(&self) -> Result<()> {
        match self.state {
            State::Ready => Ok(()),
            State::Invalid => Err(Error::invalid_host_url(self.outcome.error_message.clone())),
            state => Err(Error::request_invalid(format!(
                "request is single-use and already {state:?}"
            ))),
        }
    }

    fn fail(&mut self, err: Error) -> Result<()> {
        debug!("request to {} failed: {err}", self.host_url);
        self.outcome = Outcome::from_error(&err);
        self.state = State::Failed;
        Err(err)
    }

    fn send(
        &mut self,
        mut op: Operation,
        extra_headers: Vec<(HeaderName, String)>,
        body: Body,
    ) -> Result<()> {
        self.check_sendable()?;
        if let Some(code) = self.expected {
            op.expected = code;
        }

        let req = match self.build_request(&op, extra_headers, body) {
            Ok(req) => req,
            Err(err) => return self.fail(err),
        };
        self.state = State::Signed;
        debug!("request {} {} signed", op.method, self.host_url);

        let resp = match self.ctx.http_send(req) {
            Ok(resp) => resp,
            Err(err) => return self.fail(err),
        };
        self.state = State::Sent;

        let (outcome, err) = interpret(&op, resp);
        self.outcome = outcome;
        match err {
            None => {
                self.state = State::Completed;
                debug!(
                    "request {} {} completed with {}",
                    op.method, self.host_url, self.outcome.response_code
                );
                Ok(())
            }
            Some(err) => {
                self.state = State::Failed;
                Err(err)
            }
        }
    }

    fn build_request(
        &mut self,
        op: &Operation,
        extra_headers: Vec<(HeaderName, String)>,
        body: Body,
    ) -> Result<http::Request<Body>> {
        let url = self
            .url
            .as_ref()
            .ok_or_else(|| Error::invalid_host_url("host url is not parsed"))?;

        let mut headers = HeaderMap::new();
        for (k, v) in self.headers.iter() {
            let name = HeaderName::from_bytes(k.as_bytes()).map_err(|e| {
                Error::request_invalid(format!("header name {k} is invalid")).with_source(e)
            })?;
            headers.insert(name, header_value(k, v)?);
        }
        for (name, v) in extra_headers {
            let value = header_value(name.as_str(), &v)?;
            headers.insert(name, value);
        }

        let uri = format!("{}://{}{}", url.protocol(), url.authority(), url.path());
        let mut req = http::Request::builder()
            .method(op.method.clone())
            .uri(uri)
            .body(Body::Empty)?;
        *req.headers_mut() = headers;

        let (mut parts, _) = req.into_parts();
        let mut signing = SigningRequest::build(&mut parts)?;
        for (k, v) in self.query.iter() {
            signing.query_push(k, v);
        }

        let now = self.signer.signing_time();
        self.signature_time = Some(now);
        self.signer.sign(&mut signing, self.credential, now)?;
        signing.apply(&mut parts)?;

        let body = if op.sends_body { body } else { Body::Empty };
        if let Body::Stream(payload) = &body {
            self.payload = Some(payload.clone());
        }

        Ok(http::Request::from_parts(parts, body))
    }

    /// HTTP status code, 0 if no response was received.
    pub fn response_code(&self) -> u16 {
        self.outcome.response_code
    }

    /// Symbolic error code, empty on success.
    pub fn error_code(&self) -> &str {
        &self.outcome.error_code
    }

    /// Error message, empty on success.
    pub fn error_message(&self) -> &str {
        &self.outcome.error_message
    }

    /// Raw response body.
    pub fn result(&self) -> &Bytes {
        &self.outcome.result
    }

    /// Response body as string.
    pub fn result_string(&self) -> String {
        self.outcome.result_string()
    }

    /// Response headers.
    pub fn response_headers(&self) -> &HeaderMap {
        &self.outcome.headers
    }

    /// The full outcome.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Lowercased protocol of the host url, empty if it failed to parse.
    pub fn protocol(&self) -> &str {
        self.url.as_ref().map(|v| v.protocol()).unwrap_or_default()
    }

    /// The url this request addresses.
    pub fn host_url(&self) -> &str {
        &self.host_url
    }

    /// Bytes of the upload payload pulled by the transport so far.
    pub fn sent_so_far(&self) -> usize {
        self.payload.as_ref().map(|p| p.sent_so_far()).unwrap_or(0)
    }

    /// The time the signature was computed at.
    pub fn signature_time(&self) -> Option<DateTime> {
        self.signature_time
    }

    /// Whether the credential adds signature material.
    pub fn requires_signature(&self) -> bool {
        self.credential.requires_signature()
    }

    /// Access key id of a keyed credential.
    pub fn access_key(&self) -> Option<&str> {
        self.credential.access_key()
    }

    /// Secret access key of a keyed credential.
    pub fn secret_key(&self) -> Option<&str> {
        self.credential.secret_key()
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| {
        Error::request_invalid(format!("value of header {name} is invalid")).with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use objreq_core::ErrorKind;
    use objreq_core::HttpSend;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    /// Records the request and answers with a fixed status.
    #[derive(Debug, Clone, Default)]
    struct Recorder {
        status: u16,
        seen: Arc<Mutex<Vec<http::request::Parts>>>,
    }

    impl HttpSend for Recorder {
        fn http_send(&self, req: http::Request<Body>) -> Result<http::Response<Bytes>> {
            let (parts, _) = req.into_parts();
            self.seen.lock().unwrap().push(parts);

            let mut resp = http::Response::new(Bytes::new());
            *resp.status_mut() = http::StatusCode::from_u16(self.status).unwrap();
            Ok(resp)
        }
    }

    fn context(status: u16) -> (Context, Recorder) {
        let recorder = Recorder {
            status,
            ..Default::default()
        };
        (Context::new().with_http_send(recorder.clone()), recorder)
    }

    #[test]
    fn test_invalid_host_url_is_recorded() {
        let (ctx, recorder) = context(200);
        let cred = Credential::Anonymous;
        let mut req = HttpRequest::for_object(&ctx, "nourlatall", "obj", &cred);

        assert_eq!(req.state(), State::Invalid);
        assert_eq!(req.error_code(), "E_INVALID_HOST_URL");
        assert_eq!(req.protocol(), "");

        let err = req.send_head().expect_err("invalid host must fail");
        assert_eq!(err.kind(), ErrorKind::InvalidHostUrl);
        assert_eq!(req.state(), State::Invalid);
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_authority_never_reaches_transport() {
        let (ctx, recorder) = context(200);
        let cred = Credential::Anonymous;
        let mut req =
            HttpRequest::for_object(&ctx, "https://host:notaport/bucket", "obj", &cred);

        assert_eq!(req.state(), State::Invalid);
        assert_eq!(req.error_code(), "E_INVALID_HOST_URL");

        let err = req.send_head().expect_err("malformed authority must fail");
        assert_eq!(err.kind(), ErrorKind::InvalidHostUrl);
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_header_keys_differing_in_case_collide() -> Result<()> {
        let (ctx, recorder) = context(200);
        let cred = Credential::Anonymous;
        let mut req = HttpRequest::for_object(&ctx, "https://h/b", "o", &cred)
            .with_header("x-meta", "first")
            .with_header("X-Meta", "last");
        assert_eq!(req.headers_mut().len(), 1);

        req.send_head()?;
        let seen = recorder.seen.lock().unwrap();
        let values = seen[0]
            .headers
            .get_all("x-meta")
            .iter()
            .collect::<Vec<_>>();
        assert_eq!(values, vec!["last"]);
        Ok(())
    }

    #[test]
    fn test_generic_request() -> Result<()> {
        let (ctx, recorder) = context(200);
        let cred = Credential::Anonymous;
        let mut req = HttpRequest::new(&ctx, "https://h/bucket", &cred)
            .with_query("uploads", "")
            .with_header("X-Custom", "yes");

        req.send_http_request(Body::from(Bytes::from_static(b"<xml/>")))?;
        assert_eq!(req.state(), State::Completed);

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].method, http::Method::POST);
        assert_eq!(seen[0].uri.to_string(), "https://h/bucket?uploads");
        assert_eq!(seen[0].headers["x-custom"], "yes");
        Ok(())
    }

    #[test]
    fn test_expected_response_code_override() {
        let (ctx, _) = context(200);
        let cred = Credential::Anonymous;
        let mut req =
            HttpRequest::new(&ctx, "https://h/bucket", &cred).with_expected_response_code(204);

        let err = req
            .send_http_request(Body::Empty)
            .expect_err("200 is not 204");
        assert_eq!(err.code(), "E_HTTP_RESPONSE_NOT_EXPECTED");
        assert_eq!(req.response_code(), 200);
        assert_eq!(req.state(), State::Failed);
    }

    #[test]
    fn test_upload_rejects_bad_window() {
        let (ctx, recorder) = context(200);
        let cred = Credential::Anonymous;
        let data = Bytes::from_static(b"0123456789");

        let mut req = HttpRequest::for_object(&ctx, "https://h/b", "o", &cred);
        let err = req.send_upload(&data, 0, 0).expect_err("zero size");
        assert_eq!(err.code(), "E_INVALID_REQUEST");

        let mut req = HttpRequest::for_object(&ctx, "https://h/b", "o", &cred);
        let err = req.send_upload(&data, 5, 6).expect_err("past the end");
        assert_eq!(err.code(), "E_INVALID_REQUEST");
        assert_eq!(req.error_code(), "E_INVALID_REQUEST");

        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_single_use() -> Result<()> {
        let (ctx, recorder) = context(200);
        let cred = Credential::Anonymous;
        let mut req = HttpRequest::for_object(&ctx, "https://h/b", "o", &cred);

        req.send_head()?;
        let err = req.send_head().expect_err("second send must fail");
        assert_eq!(err.code(), "E_INVALID_REQUEST");
        assert_eq!(req.error_code(), "");
        assert_eq!(req.response_code(), 200);
        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
        Ok(())
    }

    #[test]
    fn test_key_accessors() {
        let (ctx, _) = context(200);

        let cred = Credential::keyed("ak", "sk");
        let req = HttpRequest::new(&ctx, "https://h", &cred);
        assert!(req.requires_signature());
        assert_eq!(req.access_key(), Some("ak"));
        assert_eq!(req.secret_key(), Some("sk"));

        let cred = Credential::Anonymous;
        let req = HttpRequest::new(&ctx, "https://h", &cred);
        assert!(!req.requires_signature());
        assert_eq!(req.access_key(), None);
    }
}

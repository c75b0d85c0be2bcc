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
use chrono::{TimeZone, Utc};
use http::header;
use objreq_core::{Body, ErrorKind, Result};
use objreq_object_http::{Credential, HttpRequest, Signer, State};
use pretty_assertions::assert_eq;
use test_case::test_case;

use super::mock::MockHttpSend;

const HOST: &str = "https://s3.example.com/bucket";

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_upload_whole_buffer() -> Result<()> {
    init();

    let mock = MockHttpSend::new(200);
    let ctx = mock.context();
    let cred = Credential::keyed("access_key_id", "secret_access_key");
    let data = Bytes::from(vec![7u8; 1024]);

    let mut req = HttpRequest::for_object(&ctx, HOST, "dir/file.bin", &cred);
    req.send_upload(&data, 0, 1024)?;

    assert_eq!(req.response_code(), 200);
    assert_eq!(req.error_code(), "");
    assert_eq!(req.sent_so_far(), 1024);
    assert_eq!(req.state(), State::Completed);

    let seen = mock.take_one();
    assert_eq!(seen.parts.method, http::Method::PUT);
    assert_eq!(
        seen.parts.uri.to_string(),
        "https://s3.example.com/bucket/dir/file.bin"
    );
    assert_eq!(seen.parts.headers[header::CONTENT_LENGTH], "1024");
    assert_eq!(seen.parts.headers[header::CONTENT_TYPE], "binary/octet-stream");
    assert!(seen.parts.headers.get(header::CONTENT_RANGE).is_none());
    assert_eq!(seen.parts.headers["x-amz-content-sha256"], "UNSIGNED-PAYLOAD");
    assert!(seen.parts.headers.contains_key(header::AUTHORIZATION));
    assert_eq!(seen.body, data.to_vec());
    Ok(())
}

#[test]
fn test_upload_window() -> Result<()> {
    let mock = MockHttpSend::new(200);
    let ctx = mock.context();
    let cred = Credential::Anonymous;
    let data = Bytes::from_static(b"0123456789abcdef");

    let mut req = HttpRequest::for_object(&ctx, HOST, "part", &cred);
    req.send_upload(&data, 4, 8)?;
    assert_eq!(req.sent_so_far(), 8);

    let seen = mock.take_one();
    assert_eq!(seen.parts.headers[header::CONTENT_LENGTH], "8");
    assert_eq!(seen.parts.headers[header::CONTENT_RANGE], "bytes 4-11/16");
    assert_eq!(seen.body, b"456789ab".to_vec());
    Ok(())
}

#[test]
fn test_partial_upload_keeps_cursor() {
    let mock = MockHttpSend::new(200).with_fail_after(300);
    let ctx = mock.context();
    let cred = Credential::Anonymous;
    let data = Bytes::from(vec![1u8; 1024]);

    let mut req = HttpRequest::for_object(&ctx, HOST, "obj", &cred);
    let err = req.send_upload(&data, 0, 1024).expect_err("transport fails");

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(req.error_code(), "E_TRANSPORT");
    assert_eq!(req.response_code(), 0);
    assert_eq!(req.sent_so_far(), 300);
    assert_eq!(req.state(), State::Failed);
}

#[test]
fn test_download_range() -> Result<()> {
    let mock = MockHttpSend::new(206).with_body(vec![b'x'; 50]);
    let ctx = mock.context();
    let cred = Credential::keyed("access_key_id", "secret_access_key");

    let mut req = HttpRequest::for_object(&ctx, HOST, "obj", &cred);
    req.send_download(100, 50)?;

    assert_eq!(req.response_code(), 206);
    assert_eq!(req.result().len(), 50);
    assert_eq!(req.result_string(), "x".repeat(50));

    let seen = mock.take_one();
    assert_eq!(seen.parts.method, http::Method::GET);
    assert_eq!(seen.parts.headers[header::RANGE], "bytes=100-149");
    assert!(seen.body.is_empty());
    Ok(())
}

#[test_case(0, 0, None, 200; "whole object")]
#[test_case(10, 0, Some("bytes=10-"), 206; "to end")]
fn test_download_variants(offset: u64, size: u64, range: Option<&str>, status: u16) {
    let mock = MockHttpSend::new(status).with_body("content");
    let ctx = mock.context();
    let cred = Credential::Anonymous;

    let mut req = HttpRequest::for_object(&ctx, HOST, "obj", &cred);
    req.send_download(offset, size).expect("download must succeed");
    assert_eq!(req.result_string(), "content");

    let seen = mock.take_one();
    assert_eq!(
        seen.parts
            .headers
            .get(header::RANGE)
            .map(|v| v.to_str().unwrap()),
        range
    );
}

#[test]
fn test_body_failure_keeps_response_code() {
    let mock = MockHttpSend::new(206).with_broken_body();
    let ctx = mock.context();
    let cred = Credential::Anonymous;

    let mut req = HttpRequest::for_object(&ctx, HOST, "obj", &cred);
    let err = req
        .send_download(100, 50)
        .expect_err("body read must fail");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(req.response_code(), 206);
    assert_eq!(req.error_code(), "E_TRANSPORT");
    assert_eq!(req.state(), State::Failed);
    assert!(req.result().is_empty());
}

#[test]
fn test_query_keys_are_sent_in_encoded_order() -> Result<()> {
    let mock = MockHttpSend::new(200);
    let ctx = mock.context();
    let cred = Credential::keyed("access_key_id", "secret_access_key");

    let mut req = HttpRequest::new(&ctx, HOST, &cred)
        .with_query("a-b", "1")
        .with_query("a{b", "2");
    req.send_http_request(Body::Empty)?;

    let seen = mock.take_one();
    assert_eq!(seen.parts.uri.query(), Some("a%7Bb=2&a-b=1"));
    Ok(())
}

#[test]
fn test_download_whole_object_rejects_partial_content() {
    let mock = MockHttpSend::new(206);
    let ctx = mock.context();
    let cred = Credential::Anonymous;

    let mut req = HttpRequest::for_object(&ctx, HOST, "obj", &cred);
    let err = req.send_download(0, 0).expect_err("200 expected");
    assert_eq!(err.code(), "E_HTTP_RESPONSE_NOT_EXPECTED");
    assert_eq!(req.response_code(), 206);
}

#[test]
fn test_head_not_found() -> Result<()> {
    let mock = MockHttpSend::new(404);
    let ctx = mock.context();
    let cred = Credential::keyed("access_key_id", "secret_access_key");

    let mut req = HttpRequest::for_object(&ctx, HOST, "missing", &cred);
    req.send_head()?;

    assert_eq!(req.response_code(), 404);
    assert_eq!(req.error_code(), "");
    assert!(req.outcome().is_not_found());
    assert_eq!(mock.take_one().parts.method, http::Method::HEAD);
    Ok(())
}

#[test]
fn test_head_metadata() -> Result<()> {
    let mock = MockHttpSend::new(200)
        .with_header("content-length", "4096")
        .with_header("etag", "\"9b2cf535f27731c974343645a3985328\"")
        .with_header("last-modified", "Mon, 12 Oct 2009 17:50:00 GMT");
    let ctx = mock.context();
    let cred = Credential::Anonymous;

    let mut req = HttpRequest::for_object(&ctx, HOST, "obj", &cred);
    req.send_head()?;

    let meta = req.outcome().metadata();
    assert_eq!(meta.content_length, Some(4096));
    assert_eq!(
        meta.etag.as_deref(),
        Some("\"9b2cf535f27731c974343645a3985328\"")
    );
    assert_eq!(
        meta.last_modified,
        Some(Utc.with_ymd_and_hms(2009, 10, 12, 17, 50, 0).unwrap())
    );
    assert_eq!(req.response_headers()["content-length"], "4096");
    assert!(req.result().is_empty());
    Ok(())
}

#[test]
fn test_invalid_host_url_never_reaches_transport() {
    let mock = MockHttpSend::new(200);
    let ctx = mock.context();
    let cred = Credential::keyed("access_key_id", "secret_access_key");

    let mut req = HttpRequest::for_object(&ctx, "nourlatall", "obj", &cred);
    assert_eq!(req.error_code(), "E_INVALID_HOST_URL");

    let err = req
        .send_upload(&Bytes::from_static(b"data"), 0, 4)
        .expect_err("upload must fail");
    assert_eq!(err.code(), "E_INVALID_HOST_URL");
    assert!(req.send_download(0, 10).is_err());
    assert!(req.send_head().is_err());

    assert_eq!(req.error_code(), "E_INVALID_HOST_URL");
    assert_eq!(req.response_code(), 0);
    assert_eq!(mock.calls(), 0);
}

#[test_case("https://h/bucket/", "/obj"; "both slashes")]
#[test_case("https://h/bucket", "obj"; "no slashes")]
#[test_case("https://h/bucket/", "obj"; "host slash")]
#[test_case("https://h/bucket", "/obj"; "object slash")]
fn test_url_join(host: &str, object: &str) {
    let mock = MockHttpSend::new(200);
    let ctx = mock.context();
    let cred = Credential::Anonymous;

    let mut req = HttpRequest::for_object(&ctx, host, object, &cred);
    assert_eq!(req.host_url(), "https://h/bucket/obj");
    req.send_head().expect("head must succeed");
    assert_eq!(mock.take_one().parts.uri.to_string(), "https://h/bucket/obj");
}

#[test]
fn test_object_key_is_encoded_once() -> Result<()> {
    let mock = MockHttpSend::new(200);
    let ctx = mock.context();
    let cred = Credential::keyed("access_key_id", "secret_access_key");

    let mut req = HttpRequest::for_object(&ctx, HOST, "a dir/file+1.txt", &cred);
    req.send_head()?;
    assert_eq!(
        mock.take_one().parts.uri.path(),
        "/bucket/a%20dir/file%2B1.txt"
    );
    Ok(())
}

#[test]
fn test_anonymous_sends_no_signature() -> Result<()> {
    let mock = MockHttpSend::new(200);
    let ctx = mock.context();
    let cred = Credential::Anonymous;

    let mut req = HttpRequest::for_object(&ctx, HOST, "obj", &cred);
    req.send_download(0, 0)?;

    let headers = mock.take_one().parts.headers;
    assert!(headers.get(header::AUTHORIZATION).is_none());
    assert!(headers.keys().all(|k| !k.as_str().starts_with("x-amz-")));
    Ok(())
}

#[test]
fn test_bearer_sends_token() -> Result<()> {
    let mock = MockHttpSend::new(200);
    let ctx = mock.context();
    let cred = Credential::bearer("my-token");

    let mut req = HttpRequest::for_object(&ctx, HOST, "obj", &cred);
    req.send_head()?;

    let headers = mock.take_one().parts.headers;
    assert_eq!(headers[header::AUTHORIZATION], "Bearer my-token");
    Ok(())
}

#[test]
fn test_signing_is_deterministic() -> Result<()> {
    let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let cred = Credential::keyed("access_key_id", "secret_access_key");

    let mut signed = Vec::new();
    for _ in 0..2 {
        let mock = MockHttpSend::new(206);
        let ctx = mock.context();
        let mut req = HttpRequest::for_object(&ctx, HOST, "obj", &cred)
            .with_signer(Signer::new("s3", "us-west-2").with_time(time))
            .with_query("versionId", "v 1");
        req.send_download(0, 10)?;
        assert_eq!(req.signature_time(), Some(time));

        let parts = mock.take_one().parts;
        assert_eq!(parts.headers["x-amz-date"], "20240102T030405Z");
        assert_eq!(parts.uri.query(), Some("versionId=v%201"));
        signed.push(parts.headers[header::AUTHORIZATION].clone());
    }

    assert_eq!(signed[0], signed[1]);
    let authorization = signed[0].to_str().unwrap();
    assert!(authorization
        .starts_with("AWS4-HMAC-SHA256 Credential=access_key_id/20240102/us-west-2/s3/aws4_request"));
    Ok(())
}

#[test]
fn test_invalid_credential_fails_before_send() {
    let mock = MockHttpSend::new(200);
    let ctx = mock.context();
    let cred = Credential::keyed("access_key_id", "");

    let mut req = HttpRequest::for_object(&ctx, HOST, "obj", &cred);
    let err = req.send_head().expect_err("secret key is missing");
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    assert_eq!(req.error_code(), "E_INVALID_CREDENTIAL");
    assert_eq!(mock.calls(), 0);
}

#[test]
fn test_server_error_code_is_extracted() {
    let mock = MockHttpSend::new(403).with_body(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>SignatureDoesNotMatch</Code><Message>The request signature we calculated does not match</Message></Error>"#,
    );
    let ctx = mock.context();
    let cred = Credential::keyed("access_key_id", "secret_access_key");

    let mut req = HttpRequest::for_object(&ctx, HOST, "obj", &cred);
    let err = req
        .send_upload(&Bytes::from_static(b"data"), 0, 4)
        .expect_err("403 must fail");

    assert_eq!(err.code(), "SignatureDoesNotMatch");
    assert_eq!(req.response_code(), 403);
    assert_eq!(req.error_code(), "SignatureDoesNotMatch");
    assert_eq!(
        req.error_message(),
        "The request signature we calculated does not match"
    );
}

#[test]
fn test_request_is_single_use() -> Result<()> {
    let mock = MockHttpSend::new(206).with_body("abc");
    let ctx = mock.context();
    let cred = Credential::Anonymous;

    let mut req = HttpRequest::for_object(&ctx, HOST, "obj", &cred);
    req.send_download(0, 3)?;

    let err = req
        .send_upload(&Bytes::from_static(b"data"), 0, 4)
        .expect_err("second send must fail");
    assert_eq!(err.code(), "E_INVALID_REQUEST");
    assert_eq!(req.response_code(), 206);
    assert_eq!(req.result_string(), "abc");
    assert_eq!(mock.calls(), 1);
    Ok(())
}

#[test]
fn test_generic_request_with_bytes_body() -> Result<()> {
    let mock = MockHttpSend::new(200).with_body("<Result/>");
    let ctx = mock.context();
    let cred = Credential::keyed("access_key_id", "secret_access_key");

    let mut req = HttpRequest::new(&ctx, HOST, &cred);
    req.query_parameters_mut().insert("delete", "");
    req.headers_mut().insert("Content-Type", "application/xml");
    req.send_http_request(Body::from(Bytes::from_static(b"<Delete/>")))?;
    assert_eq!(req.result_string(), "<Result/>");
    assert_eq!(req.sent_so_far(), 0);

    let seen = mock.take_one();
    assert_eq!(seen.parts.method, http::Method::POST);
    assert_eq!(seen.parts.uri.to_string(), "https://s3.example.com/bucket?delete");
    assert_eq!(seen.parts.headers[header::CONTENT_TYPE], "application/xml");
    assert_eq!(seen.body, b"<Delete/>".to_vec());
    Ok(())
}

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

use std::env;
use std::sync::Arc;

use bytes::Bytes;
use log::warn;
use objreq_core::{Context, OsEnv, Result};
use objreq_file_read_std::StdFileRead;
use objreq_http_send_reqwest::ReqwestHttpSend;
use objreq_object_http::{Config, Credential, DefaultCredentialProvider, HttpRequest, Signer};

/// Build everything a live test needs, `None` unless `OBJREQ_TEST=on`.
///
/// Reads `OBJREQ_URL` (bucket url) plus the usual credential envs.
fn init_live_test() -> Option<(Context, Credential, Signer, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("OBJREQ_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let ctx = Context::new()
        .with_file_read(StdFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::new().from_env(&ctx);
    let signer = config.signer();
    let cred = DefaultCredentialProvider::new(Arc::new(config))
        .resolve(&ctx)
        .expect("credential must load");
    let url = env::var("OBJREQ_URL").expect("env OBJREQ_URL must set");

    Some((ctx, cred, signer, url))
}

#[test]
fn test_live_upload_head_download() -> Result<()> {
    let Some((ctx, cred, signer, url)) = init_live_test() else {
        warn!("OBJREQ_TEST is not set, skipped");
        return Ok(());
    };

    let object = format!(
        "objreq-live/{}",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let data = Bytes::from((0..=255u8).cycle().take(4096).collect::<Vec<_>>());

    let mut req = HttpRequest::for_object(&ctx, &url, &object, &cred)
        .with_signer(signer.clone());
    req.send_upload(&data, 0, data.len())?;
    assert_eq!(req.sent_so_far(), data.len());

    let mut req = HttpRequest::for_object(&ctx, &url, &object, &cred)
        .with_signer(signer.clone());
    req.send_head()?;
    assert_eq!(req.response_code(), 200);
    assert_eq!(req.outcome().metadata().content_length, Some(4096));

    let mut req = HttpRequest::for_object(&ctx, &url, &object, &cred)
        .with_signer(signer.clone());
    req.send_download(100, 50)?;
    assert_eq!(req.response_code(), 206);
    assert_eq!(req.result().as_ref(), &data[100..150]);

    let mut req = HttpRequest::for_object(&ctx, &url, "objreq-live/not-exist", &cred)
        .with_signer(signer);
    req.send_head()?;
    assert!(req.outcome().is_not_found());

    Ok(())
}

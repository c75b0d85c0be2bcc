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

use std::fmt::Write;

use http::header;
use http::HeaderValue;
use log::debug;
use percent_encoding::{percent_decode_str, utf8_percent_encode};

use crate::constants::*;
use crate::credential::{BearerToken, Credential, KeyedCredential};
use objreq_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use objreq_core::time::{format_date, format_iso8601, now, DateTime};
use objreq_core::{Error, Result, SigningCredential, SigningRequest};

/// Signer that authenticates requests for an object storage service.
///
/// Keyed credentials are signed with
/// [AWS Signature Version 4](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html),
/// bearer tokens are sent in the `Authorization` header and anonymous
/// requests only get their query canonicalized.
#[derive(Debug, Clone)]
pub struct Signer {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl Default for Signer {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE, DEFAULT_REGION)
    }
}

impl Signer {
    /// Create a new signer for given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Service name used in the credential scope.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Region used in the credential scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The time the next signature will carry.
    pub fn signing_time(&self) -> DateTime {
        self.time.unwrap_or_else(now)
    }

    /// Sign the request in place with given credential at `now`.
    ///
    /// Query parameters are sorted and percent encoded for every credential,
    /// so the signed form and the wire form are the same string.
    pub fn sign(&self, req: &mut SigningRequest, cred: &Credential, now: DateTime) -> Result<()> {
        req.query_encode(&QUERY_ENCODE_SET);

        match cred {
            Credential::Anonymous => Ok(()),
            Credential::Bearer(token) => sign_bearer(req, token),
            Credential::Keyed(key) => self.sign_keyed(req, key, now),
        }
    }

    fn sign_keyed(
        &self,
        req: &mut SigningRequest,
        cred: &KeyedCredential,
        now: DateTime,
    ) -> Result<()> {
        if !cred.is_valid() {
            if cred.access_key_id.is_empty() || cred.secret_access_key.is_empty() {
                return Err(Error::credential_invalid(
                    "access key id and secret access key must not be empty",
                ));
            }
            return Err(Error::credential_expired(format!(
                "credential expired at {:?}",
                cred.expires_in
            )));
        }

        canonicalize_header(req, cred, now)?;

        let creq = canonical_request_string(req)?;
        let encoded_req = hex_sha256(creq.as_bytes());

        // Scope: "20220313/<region>/<service>/aws4_request"
        let scope = format!(
            "{}/{}/{}/aws4_request",
            format_date(now),
            self.region,
            self.service
        );
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/<service>/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "AWS4-HMAC-SHA256")?;
            writeln!(f, "{}", format_iso8601(now))?;
            writeln!(f, "{}", &scope)?;
            write!(f, "{}", &encoded_req)?;
            f
        };
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_access_key, now, &self.region, &self.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let mut authorization = HeaderValue::from_str(&format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            cred.access_key_id,
            scope,
            req.header_name_to_vec_sorted().join(";"),
            signature
        ))?;
        authorization.set_sensitive(true);
        req.headers.insert(header::AUTHORIZATION, authorization);

        Ok(())
    }
}

fn sign_bearer(req: &mut SigningRequest, token: &BearerToken) -> Result<()> {
    if !token.is_valid() {
        if token.token.is_empty() {
            return Err(Error::credential_invalid("bearer token must not be empty"));
        }
        return Err(Error::credential_expired(format!(
            "bearer token expired at {:?}",
            token.expires_in
        )));
    }

    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.token)).map_err(|e| {
        Error::credential_invalid("bearer token is not a valid header value").with_source(e)
    })?;
    value.set_sensitive(true);
    req.headers.insert(header::AUTHORIZATION, value);

    Ok(())
}

fn canonical_request_string(req: &SigningRequest) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    // Insert method
    writeln!(f, "{}", req.method)?;
    // Insert encoded path
    let path = percent_decode_str(&req.path)
        .decode_utf8()
        .map_err(|e| Error::request_invalid("request path is not valid utf-8").with_source(e))?;
    writeln!(f, "{}", utf8_percent_encode(&path, &URI_ENCODE_SET))?;
    // Insert query
    writeln!(
        f,
        "{}",
        req.query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    )?;
    // Insert signed headers
    let signed_headers = req.header_name_to_vec_sorted();
    for name in signed_headers.iter() {
        let value = req.headers[*name].to_str()?;
        writeln!(f, "{name}:{value}")?;
    }
    writeln!(f)?;
    writeln!(f, "{}", signed_headers.join(";"))?;

    match req.headers.get(X_AMZ_CONTENT_SHA_256) {
        Some(v) => write!(f, "{}", v.to_str()?)?,
        None => write!(f, "{UNSIGNED_PAYLOAD}")?,
    }

    Ok(f)
}

fn canonicalize_header(
    req: &mut SigningRequest,
    cred: &KeyedCredential,
    now: DateTime,
) -> Result<()> {
    // Header values need to be normalized according to Step 4 of https://docs.aws.amazon.com/general/latest/gr/sigv4-create-canonical-request.html
    for (_, value) in req.headers.iter_mut() {
        SigningRequest::header_value_normalize(value)
    }

    // Insert HOST header if not present.
    if req.headers.get(header::HOST).is_none() {
        let host = HeaderValue::from_str(req.authority.as_str())?;
        req.headers.insert(header::HOST, host);
    }

    // Insert DATE header if not present.
    if req.headers.get(X_AMZ_DATE).is_none() {
        req.headers
            .insert(X_AMZ_DATE, HeaderValue::try_from(format_iso8601(now))?);
    }

    // Insert X_AMZ_CONTENT_SHA_256 header if not present.
    if req.headers.get(X_AMZ_CONTENT_SHA_256).is_none() {
        req.headers.insert(
            X_AMZ_CONTENT_SHA_256,
            HeaderValue::from_static(UNSIGNED_PAYLOAD),
        );
    }

    // Insert X_AMZ_SECURITY_TOKEN header if security token exists.
    if let Some(token) = &cred.session_token {
        let mut value = HeaderValue::from_str(token).map_err(|e| {
            Error::credential_invalid("session token is not a valid header value").with_source(e)
        })?;
        // Set token value sensitive to avoid leaking.
        value.set_sensitive(true);

        req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
    }

    Ok(())
}

fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), "aws4_request".as_bytes())
}

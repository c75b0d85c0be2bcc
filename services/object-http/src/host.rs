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

use std::fmt;
use std::str::FromStr;

use http::uri::{Authority, PathAndQuery};
use percent_encoding::utf8_percent_encode;

use crate::constants::URI_ENCODE_SET;
use objreq_core::{Error, Result};

/// A parsed host URL: `<protocol>://<authority><base_path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostUrl {
    protocol: String,
    authority: String,
    base_path: String,
}

impl HostUrl {
    /// Parse a host URL.
    ///
    /// The protocol must be `http` or `https` (any case) and the authority
    /// must be a non-empty host with an optional numeric port. User info,
    /// query strings and fragments are not accepted.
    pub fn parse(url: &str) -> Result<Self> {
        let protocol = parse_protocol(url)?;

        // parse_protocol has already checked the separator.
        let rest = &url[protocol.len() + 3..];
        let (authority, base_path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };
        if authority.is_empty() {
            return Err(Error::invalid_host_url(format!(
                "host url {url} has no authority"
            )));
        }

        let authority = Authority::from_str(authority).map_err(|e| {
            Error::invalid_host_url(format!("host url {url} has an invalid authority"))
                .with_source(e)
        })?;
        let host = authority.host();
        if host.is_empty() || authority.as_str().contains('@') {
            return Err(Error::invalid_host_url(format!(
                "host url {url} has an invalid host"
            )));
        }
        // Authority accepts any text after the last colon, only a u16 is a port.
        if authority.as_str() != host && authority.port_u16().is_none() {
            return Err(Error::invalid_host_url(format!(
                "host url {url} has an invalid port"
            )));
        }

        if base_path.contains(['?', '#']) {
            return Err(Error::invalid_host_url(format!(
                "host url {url} must not carry a query or fragment"
            )));
        }
        if !base_path.is_empty() {
            PathAndQuery::from_str(base_path).map_err(|e| {
                Error::invalid_host_url(format!("host url {url} has an invalid path"))
                    .with_source(e)
            })?;
        }

        Ok(HostUrl {
            protocol: protocol.to_ascii_lowercase(),
            authority: authority.as_str().to_string(),
            base_path: base_path.trim_end_matches('/').to_string(),
        })
    }

    /// Lowercased protocol, `http` or `https`.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Host and optional port.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Path prefix without trailing slash, may be empty.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Build a new url addressing `object` under this host.
    ///
    /// The object key is raw: it's percent encoded here and joined with
    /// exactly one `/`.
    pub fn join_object(&self, object: &str) -> HostUrl {
        let key = object.trim_start_matches('/');
        let encoded = utf8_percent_encode(key, &URI_ENCODE_SET);

        HostUrl {
            protocol: self.protocol.clone(),
            authority: self.authority.clone(),
            base_path: format!("{}/{}", self.base_path, encoded),
        }
    }

    /// The path used on the wire, `/` when the base path is empty.
    pub fn path(&self) -> &str {
        if self.base_path.is_empty() {
            "/"
        } else {
            &self.base_path
        }
    }
}

impl fmt::Display for HostUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.protocol, self.authority, self.base_path)
    }
}

/// Extract the protocol of a host url.
///
/// Returns the protocol as written, fails with `E_INVALID_HOST_URL` when the
/// url has no `://` separator, an empty or malformed scheme, or a scheme
/// other than http/https.
pub fn parse_protocol(url: &str) -> Result<String> {
    if url.is_empty() {
        return Err(Error::invalid_host_url("host url is empty"));
    }

    let Some(idx) = url.find("://") else {
        return Err(Error::invalid_host_url(format!(
            "host url {url} has no protocol separator"
        )));
    };
    let scheme = &url[..idx];
    if scheme.is_empty() {
        return Err(Error::invalid_host_url(format!(
            "host url {url} has an empty protocol"
        )));
    }

    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return Err(Error::invalid_host_url(format!(
            "host url {url} has an invalid protocol {scheme}"
        )));
    }

    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Err(Error::invalid_host_url(format!(
            "protocol {scheme} is not supported"
        )));
    }

    Ok(scheme.to_string())
}

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

use objreq_core::time::{expires_within, now, DateTime};
use objreq_core::utils::Redact;
use objreq_core::SigningCredential;
use std::fmt::{Debug, Formatter};

/// Credentials closer than this to their expiry are treated as expired.
pub(crate) const EXPIRY_BUFFER_SECS: i64 = 120;

/// Credential used to authenticate a request.
///
/// A request borrows its credential for its whole lifetime, so the same
/// credential can back many requests.
#[derive(Clone, Debug, Default)]
pub enum Credential {
    /// No credential: requests go out unsigned.
    #[default]
    Anonymous,
    /// Access key pair, signed with AWS Signature Version 4.
    Keyed(KeyedCredential),
    /// Opaque bearer token sent in the `Authorization` header.
    Bearer(BearerToken),
}

impl Credential {
    /// Build a keyed credential from an access key pair.
    pub fn keyed(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Credential::Keyed(KeyedCredential {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            ..Default::default()
        })
    }

    /// Build a bearer credential from a token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Credential::Bearer(BearerToken {
            token: token.into(),
            expires_in: None,
        })
    }

    /// Whether requests using this credential carry signature material.
    pub fn requires_signature(&self) -> bool {
        !matches!(self, Credential::Anonymous)
    }

    /// Access key id, only present for keyed credentials.
    pub fn access_key(&self) -> Option<&str> {
        match self {
            Credential::Keyed(k) => Some(&k.access_key_id),
            _ => None,
        }
    }

    /// Secret access key, only present for keyed credentials.
    pub fn secret_key(&self) -> Option<&str> {
        match self {
            Credential::Keyed(k) => Some(&k.secret_access_key),
            _ => None,
        }
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        match self {
            Credential::Anonymous => true,
            Credential::Keyed(k) => k.is_valid(),
            Credential::Bearer(b) => b.is_valid(),
        }
    }
}

impl From<KeyedCredential> for Credential {
    fn from(v: KeyedCredential) -> Self {
        Credential::Keyed(v)
    }
}

impl From<BearerToken> for Credential {
    fn from(v: BearerToken) -> Self {
        Credential::Bearer(v)
    }
}

/// Credential that holds the access_key and secret_key.
#[derive(Default, Clone)]
pub struct KeyedCredential {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
    /// Expiration time for this credential.
    pub expires_in: Option<DateTime>,
}

impl KeyedCredential {
    /// Set the session token.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Set the expiration time.
    pub fn with_expires_in(mut self, expires_in: DateTime) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Whether the credential lapses within the expiry buffer.
    pub fn is_expired(&self) -> bool {
        self.expires_in.is_some_and(|v| {
            expires_within(v, now(), chrono::Duration::seconds(EXPIRY_BUFFER_SECS))
        })
    }
}

impl Debug for KeyedCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedCredential")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl SigningCredential for KeyedCredential {
    fn is_valid(&self) -> bool {
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            return false;
        }

        !self.is_expired()
    }
}

/// Bearer token credential.
#[derive(Default, Clone)]
pub struct BearerToken {
    /// The token sent as `Authorization: Bearer <token>`.
    pub token: String,
    /// Expiration time for this token.
    pub expires_in: Option<DateTime>,
}

impl BearerToken {
    /// Set the expiration time.
    pub fn with_expires_in(mut self, expires_in: DateTime) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Whether the token lapses within the expiry buffer.
    pub fn is_expired(&self) -> bool {
        self.expires_in.is_some_and(|v| {
            expires_within(v, now(), chrono::Duration::seconds(EXPIRY_BUFFER_SECS))
        })
    }
}

impl Debug for BearerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &Redact::from(&self.token))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl SigningCredential for BearerToken {
    fn is_valid(&self) -> bool {
        !self.token.is_empty() && !self.is_expired()
    }
}

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

use crate::credential::{BearerToken, Credential, KeyedCredential};
use objreq_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider always returns the credential it was built with.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider with access key ID and secret access key.
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            credential: Credential::keyed(access_key_id, secret_access_key),
        }
    }

    /// Create a new StaticCredentialProvider with a bearer token.
    pub fn bearer(token: &str) -> Self {
        Self {
            credential: Credential::bearer(token),
        }
    }

    /// Set the session token, only used by keyed credentials.
    pub fn with_session_token(mut self, token: &str) -> Self {
        if let Credential::Keyed(key) = &mut self.credential {
            key.session_token = Some(token.to_string());
        }
        self
    }
}

impl From<KeyedCredential> for StaticCredentialProvider {
    fn from(v: KeyedCredential) -> Self {
        Self {
            credential: v.into(),
        }
    }
}

impl From<BearerToken> for StaticCredentialProvider {
    fn from(v: BearerToken) -> Self {
        Self {
            credential: v.into(),
        }
    }
}

impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}

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

use std::sync::Mutex;

use chrono::Duration;
use log::debug;

use crate::constants::BEARER_TOKEN_FILE;
use crate::credential::{BearerToken, Credential};
use objreq_core::time::{now, DateTime};
use objreq_core::{Context, Error, ProvideCredential, Result};

/// Default interval after which the token file is read again.
const DEFAULT_REFRESH_SECS: i64 = 60;

/// TokenFileCredentialProvider loads a bearer token from a file.
///
/// The path comes from [`TokenFileCredentialProvider::with_path`] or the
/// `BEARER_TOKEN_FILE` env. A leading `~` is expanded and surrounding
/// whitespace is trimmed. The token is cached and the file is read again
/// once the refresh interval has passed, so rotated tokens get picked up.
#[derive(Debug)]
pub struct TokenFileCredentialProvider {
    path: Option<String>,
    refresh_interval: Duration,

    cache: Mutex<Option<(String, BearerToken, DateTime)>>,
}

impl Default for TokenFileCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenFileCredentialProvider {
    /// Create a new TokenFileCredentialProvider reading `BEARER_TOKEN_FILE`.
    pub fn new() -> Self {
        Self {
            path: None,
            refresh_interval: Duration::seconds(DEFAULT_REFRESH_SECS),
            cache: Mutex::new(None),
        }
    }

    /// Read the token from given path instead of the env.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set how long a loaded token is reused before reading the file again.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    fn load(&self, ctx: &Context, path: &str) -> Result<BearerToken> {
        let expanded = ctx.expand_home_dir(path).ok_or_else(|| {
            Error::config_invalid(format!("token file {path} can't be expanded"))
        })?;

        let content = ctx.file_read_as_string(&expanded)?;
        let token = content.trim();
        if token.is_empty() {
            return Err(Error::credential_invalid(format!(
                "token file {expanded} is empty"
            )));
        }
        debug!("loaded bearer token from {expanded}");

        Ok(BearerToken {
            token: token.to_string(),
            expires_in: None,
        })
    }
}

impl ProvideCredential for TokenFileCredentialProvider {
    type Credential = Credential;

    fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(path) = self.path.clone().or_else(|| ctx.env_var(BEARER_TOKEN_FILE)) else {
            return Ok(None);
        };

        let mut cache = self
            .cache
            .lock()
            .map_err(|_| Error::unexpected("token file cache lock is poisoned"))?;
        let now = now();
        if let Some((cached_path, token, loaded_at)) = cache.as_ref() {
            if *cached_path == path && *loaded_at + self.refresh_interval > now {
                return Ok(Some(Credential::Bearer(token.clone())));
            }
        }

        let token = self.load(ctx, &path)?;
        *cache = Some((path, token.clone(), now));
        Ok(Some(Credential::Bearer(token)))
    }
}

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

use std::sync::Arc;

use log::debug;
use objreq_core::{Context, OsEnv, ProvideCredential, Result};
use objreq_file_read_std::StdFileRead;
use objreq_http_send_reqwest::ReqwestHttpSend;
use objreq_object_http::{Config, Credential, DefaultCredentialProvider, Signer};
use once_cell::sync::OnceCell;

static DEFAULT_CONTEXT: OnceCell<Context> = OnceCell::new();

/// Set up the process-wide default context.
///
/// Safe to call any number of times from any thread: only the first call
/// builds the shared HTTP client, later calls do nothing. Call it before
/// issuing requests concurrently. The context lives until the process exits.
pub fn init() {
    let _ = shared();
}

/// Whether [`init`] (or [`default_context`]) has run.
pub fn is_initialized() -> bool {
    DEFAULT_CONTEXT.get().is_some()
}

/// The process-wide context, initializing it on first use.
///
/// Clones share the same transport, file reader and env.
pub fn default_context() -> Context {
    shared().clone()
}

/// Resolve a credential with the default provider chain, reading config
/// from the OS env.
///
/// Returns [`Credential::Anonymous`] when no source yields one.
pub fn default_credential() -> Result<Credential> {
    let ctx = default_context();
    let config = Config::new().from_env(&ctx);
    let provider = DefaultCredentialProvider::new(Arc::new(config));

    Ok(provider.provide_credential(&ctx)?.unwrap_or_default())
}

/// A signer for the service and region configured in the OS env.
pub fn default_signer() -> Signer {
    Config::new().from_env(&default_context()).signer()
}

fn shared() -> &'static Context {
    DEFAULT_CONTEXT.get_or_init(|| {
        debug!("initializing default objreq context");
        Context::new()
            .with_file_read(StdFileRead)
            .with_http_send(ReqwestHttpSend::default())
            .with_env(OsEnv)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_init_is_idempotent() {
        let _ = env_logger::builder().is_test(true).try_init();

        init();
        assert!(is_initialized());
        let first: *const Context = shared();

        let handles: Vec<_> = (0..8).map(|_| thread::spawn(init)).collect();
        for h in handles {
            h.join().expect("init must not panic");
        }
        init();

        assert!(std::ptr::eq(first, shared()));
    }

    #[test]
    fn test_default_signer_has_defaults() {
        let signer = default_signer();
        assert!(!signer.service().is_empty());
        assert!(!signer.region().is_empty());
    }
}

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

//! Signed HTTP requests against object storage.
//!
//! This crate bundles the objreq crates behind one dependency:
//!
//! - everything from `objreq-core` at the crate root,
//! - the object request builder, signer and credential providers under
//!   [`object`],
//! - with the `default-context` feature, a process-wide [`Context`] set up
//!   by [`init`].
//!
//! ## Example
//!
//! ```no_run
//! use objreq::object::{Credential, HttpRequest};
//!
//! objreq::init();
//! let ctx = objreq::default_context();
//! let cred = objreq::default_credential().unwrap_or_default();
//!
//! let mut req = HttpRequest::for_object(&ctx, "https://s3.example.com/bucket", "object", &cred);
//! req.send_head().ok();
//! println!("{} {}", req.response_code(), req.error_code());
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use objreq_core::*;

/// Requests, signing and credentials for object storage.
pub mod object {
    pub use objreq_object_http::*;
}

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::{default_context, default_credential, default_signer, init, is_initialized};

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

//! Core components for signed object storage requests.
//!
//! This crate provides the foundational types and traits shared by the objreq
//! crates. It knows nothing about a particular storage service; it defines the
//! seams that the request builder, the signer and the transport meet at.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for file reading, HTTP sending, and environment access
//! - **Body / Payload**: The request body handed to the transport, including the streamed payload with its delivery cursor
//! - **SigningRequest**: A request decomposed into the pieces a signer needs to see
//! - **ProvideCredential**: The trait credential sources implement
//!
//! ## Example
//!
//! ```
//! use objreq_core::{Context, ProvideCredential, Result, SigningCredential};
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     token: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.token.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyProvider;
//!
//! impl ProvideCredential for MyProvider {
//!     type Credential = MyCredential;
//!
//!     fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential {
//!             token: "my-token".to_string(),
//!         }))
//!     }
//! }
//!
//! let ctx = Context::new();
//! let cred = MyProvider.provide_credential(&ctx).unwrap();
//! assert!(cred.is_some_and(|c| c.is_valid()));
//! ```
//!
//! ## Traits
//!
//! - [`FileRead`]: For reading files such as token files
//! - [`HttpSend`]: For sending HTTP requests, the transport adapter seam
//! - [`Env`]: For environment variable access
//! - [`ProvideCredential`]: For loading credentials from various sources
//! - [`SigningCredential`]: For validating credentials
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::{Context, Env, FileRead, HttpSend};
pub use context::{NoopEnv, NoopFileRead, NoopHttpSend, OsEnv, StaticEnv};

mod body;
pub use body::{Body, Payload};

mod api;
pub use api::{ProvideCredential, ProvideCredentialChain, SigningCredential};

mod request;
pub use request::SigningRequest;

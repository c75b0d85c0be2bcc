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

//! Signed requests against HTTP object storage.
//!
//! This crate turns object operations (upload a byte window, download a
//! byte range, fetch metadata) into authenticated HTTP exchanges and maps
//! the response back into a uniform [`Outcome`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use objreq_core::Context;
//! use objreq_object_http::{Credential, HttpRequest};
//!
//! let ctx = Context::new();
//! let cred = Credential::Anonymous;
//!
//! let mut req = HttpRequest::for_object(&ctx, "https://s3.example.com/bucket", "data.bin", &cred);
//! match req.send_download(0, 1024) {
//!     Ok(()) => println!("got {} bytes", req.result().len()),
//!     Err(err) => eprintln!("{}: {}", err.code(), err.message()),
//! }
//! ```
//!
//! ## Credentials
//!
//! A [`Credential`] is anonymous, a key pair signed with AWS Signature
//! Version 4, or a bearer token. Providers load them from various sources:
//!
//! - [`StaticCredentialProvider`]: fixed credential
//! - [`EnvCredentialProvider`]: `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `BEARER_TOKEN`
//! - [`ConfigCredentialProvider`]: from a [`Config`]
//! - [`TokenFileCredentialProvider`]: bearer token file
//! - [`DefaultCredentialProvider`]: all of the above in order

mod constants;

mod attributes;
pub use attributes::AttributeMap;

mod config;
pub use config::Config;

mod credential;
pub use credential::{BearerToken, Credential, KeyedCredential};

mod host;
pub use host::{parse_protocol, HostUrl};

mod operation;
pub use operation::{Operation, OperationKind};

mod provide_credential;
pub use provide_credential::*;

mod request;
pub use request::{HttpRequest, State};

mod response;
pub use response::{parse_service_error, ObjectMetadata, Outcome};

mod sign;
pub use sign::Signer;

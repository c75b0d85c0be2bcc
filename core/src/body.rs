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

use std::io;
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;

/// Body of a request handed to [`HttpSend`](crate::HttpSend).
#[derive(Debug, Clone, Default)]
pub enum Body {
    /// No body at all.
    #[default]
    Empty,
    /// An in-memory body sent as a whole.
    Bytes(Bytes),
    /// A streamed body pulled through the payload cursor.
    Stream(Payload),
}

impl Body {
    /// Total number of bytes this body will deliver.
    pub fn len(&self) -> usize {
        match self {
            Body::Empty => 0,
            Body::Bytes(bs) => bs.len(),
            Body::Stream(p) => p.len(),
        }
    }

    /// Check if this body delivers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Bytes> for Body {
    fn from(bs: Bytes) -> Self {
        if bs.is_empty() {
            Body::Empty
        } else {
            Body::Bytes(bs)
        }
    }
}

impl From<Payload> for Body {
    fn from(p: Payload) -> Self {
        Body::Stream(p)
    }
}

/// Payload is a streamed upload body: a zero-copy view of caller owned bytes
/// plus a cursor counting how many of them were delivered to the transport.
///
/// The cursor only moves through the [`Read`] implementation, never goes
/// backwards and never exceeds [`Payload::len`]. Clones share the cursor, so
/// the owner of one clone can observe the progress made by a transport that
/// consumed another.
#[derive(Debug, Clone)]
pub struct Payload {
    data: Bytes,
    sent_so_far: Arc<AtomicUsize>,
}

impl Payload {
    /// Create a new payload over `data` with the cursor at zero.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            sent_so_far: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Total number of bytes in this payload.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if this payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bytes already handed to the transport.
    pub fn sent_so_far(&self) -> usize {
        self.sent_so_far.load(Ordering::Acquire)
    }

    /// Number of bytes not yet handed to the transport.
    pub fn remaining(&self) -> usize {
        self.len() - self.sent_so_far()
    }

    /// Check if every byte has been handed to the transport.
    pub fn is_complete(&self) -> bool {
        self.sent_so_far() == self.len()
    }

    /// Copy the next chunk into `buf` and advance the cursor.
    ///
    /// Returns the number of bytes delivered; `0` once the payload is exhausted.
    pub fn read_chunk(&self, buf: &mut [u8]) -> usize {
        let sent = self.sent_so_far();
        let n = buf.len().min(self.len() - sent);
        if n == 0 {
            return 0;
        }

        buf[..n].copy_from_slice(&self.data[sent..sent + n]);
        self.sent_so_far.store(sent + n, Ordering::Release);
        n
    }
}

impl Read for Payload {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_chunk(buf))
    }
}

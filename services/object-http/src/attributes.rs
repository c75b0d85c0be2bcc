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

use std::borrow::Cow;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Ordered string map used for query parameters and headers.
///
/// Keys are unique and the last write wins. A map built with
/// [`AttributeMap::case_insensitive`] stores its keys lowercased, so keys
/// differing only in case collide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: BTreeMap<String, String>,
    fold_case: bool,
}

impl AttributeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map whose keys are compared ignoring ascii case.
    pub fn case_insensitive() -> Self {
        Self {
            entries: BTreeMap::new(),
            fold_case: true,
        }
    }

    fn owned_key(&self, key: String) -> String {
        if self.fold_case {
            key.to_ascii_lowercase()
        } else {
            key
        }
    }

    fn lookup_key<'k>(&self, key: &'k str) -> Cow<'k, str> {
        if self.fold_case {
            Cow::Owned(key.to_ascii_lowercase())
        } else {
            Cow::Borrowed(key)
        }
    }

    /// Insert a pair, returning the replaced value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = self.owned_key(key.into());
        self.entries.insert(key, value.into())
    }

    /// Get the value of key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(self.lookup_key(key).as_ref())
            .map(|v| v.as_str())
    }

    /// Remove key from the map.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let key = self.lookup_key(key);
        self.entries.remove(key.as_ref())
    }

    /// Check whether key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(self.lookup_key(key).as_ref())
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate pairs sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for AttributeMap {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for AttributeMap {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

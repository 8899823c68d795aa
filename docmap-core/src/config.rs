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

/// Default nesting limit of documents and arrays.
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// Configuration for docmap encoding and decoding.
///
/// It is owned by the [`Docmap`](crate::docmap::Docmap) entry point and copied
/// into each `WriteContext`/`ReadContext`, so every call sees the same options.
#[derive(Clone, Debug)]
pub struct Config {
    /// Whether a top-level document writes its identifier before any other field.
    /// Nested class values never move their identifier first.
    pub serialize_id_first: bool,
    /// Maximum nesting depth of class documents and dynamic values within one call.
    pub max_depth: u32,
    /// Initial capacity of the output buffer.
    pub initial_buffer_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            serialize_id_first: true,
            max_depth: DEFAULT_MAX_DEPTH,
            initial_buffer_capacity: 64,
        }
    }
}

impl Config {
    /// Creates a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the identifier is written first at the top level.
    #[inline(always)]
    pub fn is_serialize_id_first(&self) -> bool {
        self.serialize_id_first
    }

    /// Get maximum nesting depth.
    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline(always)]
    pub fn initial_buffer_capacity(&self) -> usize {
        self.initial_buffer_capacity
    }
}

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

//! Byte trie from element names to field indices.
//!
//! The reader feeds name bytes into a [`NameWalk`] while it scans them off the
//! wire, so resolving a name costs one step per byte and never re-reads it.

use crate::error::Error;

#[derive(Debug, Default, Clone)]
struct Node {
    value: Option<usize>,
    // sorted by byte
    children: Vec<(u8, u32)>,
}

impl Node {
    #[inline(always)]
    fn child(&self, byte: u8) -> Option<u32> {
        match self.children.len() {
            0 => None,
            1 => (self.children[0].0 == byte).then_some(self.children[0].1),
            _ => self
                .children
                .binary_search_by_key(&byte, |(b, _)| *b)
                .ok()
                .map(|i| self.children[i].1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NameResolver {
    nodes: Vec<Node>,
    len: usize,
}

impl Default for NameResolver {
    fn default() -> Self {
        NameResolver {
            nodes: vec![Node::default()],
            len: 0,
        }
    }
}

impl NameResolver {
    pub fn new() -> NameResolver {
        NameResolver::default()
    }

    /// Builds a resolver from `(name, index)` pairs. Duplicate names are rejected.
    pub fn from_names<'a, I>(names: I) -> Result<NameResolver, Error>
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        let mut resolver = NameResolver::new();
        for (name, index) in names {
            resolver.insert(name, index)?;
        }
        Ok(resolver)
    }

    pub fn insert(&mut self, name: &str, index: usize) -> Result<(), Error> {
        let mut node = 0usize;
        for &byte in name.as_bytes() {
            node = match self.nodes[node].child(byte) {
                Some(next) => next as usize,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    let children = &mut self.nodes[node].children;
                    let pos = children.partition_point(|(b, _)| *b < byte);
                    children.insert(pos, (byte, next as u32));
                    next
                }
            };
        }
        if self.nodes[node].value.is_some() {
            return Err(Error::invalid_schema(format!(
                "Duplicate element name '{name}'"
            )));
        }
        self.nodes[node].value = Some(index);
        self.len += 1;
        Ok(())
    }

    /// Number of names in the resolver.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn resolve(&self, name: &str) -> Option<usize> {
        let mut walk = self.walk();
        for &byte in name.as_bytes() {
            walk.step(byte);
        }
        walk.finish()
    }

    #[inline(always)]
    pub fn walk(&self) -> NameWalk<'_> {
        NameWalk {
            resolver: self,
            node: Some(0),
        }
    }
}

/// In-progress resolution of one name, advanced a byte at a time.
pub struct NameWalk<'a> {
    resolver: &'a NameResolver,
    node: Option<u32>,
}

impl NameWalk<'_> {
    #[inline(always)]
    pub fn step(&mut self, byte: u8) {
        if let Some(node) = self.node {
            self.node = self.resolver.nodes[node as usize].child(byte);
        }
    }

    #[inline(always)]
    pub fn finish(self) -> Option<usize> {
        self.node
            .and_then(|node| self.resolver.nodes[node as usize].value)
    }
}

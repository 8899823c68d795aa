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

use std::any::Any;

use crate::config::Config;
use crate::error::Error;
use crate::io::{DocumentReader, DocumentWriter};
use crate::resolver::type_resolver::TypeResolver;
use crate::types::TypeKey;

pub struct WriteContext<'se> {
    pub writer: &'se mut DocumentWriter,
    resolver: &'se TypeResolver,
    config: &'se Config,
    current_depth: u32,
}

impl<'se> WriteContext<'se> {
    pub fn new(
        resolver: &'se TypeResolver,
        config: &'se Config,
        writer: &'se mut DocumentWriter,
    ) -> WriteContext<'se> {
        WriteContext {
            writer,
            resolver,
            config,
            current_depth: 0,
        }
    }

    #[inline(always)]
    pub fn get_type_resolver(&self) -> &'se TypeResolver {
        self.resolver
    }

    #[inline(always)]
    pub fn get_config(&self) -> &'se Config {
        self.config
    }

    /// Number of class documents currently open.
    #[inline(always)]
    pub fn depth(&self) -> u32 {
        self.current_depth
    }

    /// Encodes `value` through the codec registered for `nominal`.
    pub fn write_class(&mut self, nominal: TypeKey, value: Option<&dyn Any>) -> Result<(), Error> {
        let codec = self.resolver.codec(nominal)?;
        codec.serialize(self, nominal, value)
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        check_depth(self.current_depth, self.config.max_depth())
    }

    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }
}

pub struct ReadContext<'de, 'bf: 'de> {
    pub reader: DocumentReader<'bf>,
    resolver: &'de TypeResolver,
    config: &'de Config,
    max_depth: u32,
    current_depth: u32,
}

impl<'de, 'bf: 'de> ReadContext<'de, 'bf> {
    pub fn new(
        resolver: &'de TypeResolver,
        config: &'de Config,
        reader: DocumentReader<'bf>,
    ) -> ReadContext<'de, 'bf> {
        ReadContext {
            reader,
            resolver,
            config,
            max_depth: config.max_depth(),
            current_depth: 0,
        }
    }

    #[inline(always)]
    pub fn get_type_resolver(&self) -> &'de TypeResolver {
        self.resolver
    }

    #[inline(always)]
    pub fn get_config(&self) -> &'de Config {
        self.config
    }

    #[inline(always)]
    pub fn depth(&self) -> u32 {
        self.current_depth
    }

    /// Decodes a value of `nominal` through its registered codec; `None` for a null marker.
    pub fn read_class(&mut self, nominal: TypeKey) -> Result<Option<Box<dyn Any>>, Error> {
        let codec = self.resolver.codec(nominal)?;
        codec.deserialize(self, nominal)
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        check_depth(self.current_depth, self.max_depth)
    }

    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }
}

#[inline(always)]
fn check_depth(current: u32, max: u32) -> Result<(), Error> {
    if current > max {
        return Err(Error::depth_exceed(format!(
            "Maximum document nesting depth ({max}) exceeded. Current depth: {current}. \
             This may indicate a cyclic object graph or an overly deep document. \
             Consider increasing max_depth if this is expected."
        )));
    }
    Ok(())
}

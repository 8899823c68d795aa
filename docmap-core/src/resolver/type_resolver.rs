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

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use log::debug;
use parking_lot::RwLock;

use crate::error::Error;
use crate::meta::TypeSchema;
use crate::serializer::struct_::StructCodec;
use crate::types::TypeKey;

#[derive(Default)]
struct Registry {
    schemas: HashMap<TypeId, Arc<TypeSchema>>,
    // base type -> every registered descendant
    derived: HashMap<TypeId, Vec<TypeKey>>,
    discriminators: HashMap<String, Vec<TypeKey>>,
}

impl Registry {
    fn is_descendant(&self, base: TypeKey, candidate: TypeKey) -> bool {
        self.derived
            .get(&base.id())
            .is_some_and(|derived| derived.contains(&candidate))
    }
}

/// Registry of frozen schemas and the codecs built from them.
///
/// Codecs are created on first lookup and kept for the resolver's lifetime.
/// All maps are behind `RwLock`s, so one resolver can be shared by any
/// number of threads.
#[derive(Default)]
pub struct TypeResolver {
    registry: RwLock<Registry>,
    codecs: RwLock<HashMap<TypeId, Arc<StructCodec>>>,
}

impl TypeResolver {
    /// Process-wide resolver.
    pub fn global() -> Arc<TypeResolver> {
        static GLOBAL: OnceLock<Arc<TypeResolver>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(TypeResolver::default()))
            .clone()
    }

    /// Freezes and registers `schema`.
    ///
    /// A declared base type must already be registered.
    pub fn register(&self, mut schema: TypeSchema) -> Result<(), Error> {
        let key = schema.type_key();
        let mut registry = self.registry.write();
        if registry.schemas.contains_key(&key.id()) {
            return Err(Error::type_error(format!(
                "Type {key} is already registered"
            )));
        }

        // nearest base first
        let mut ancestors: Vec<Arc<TypeSchema>> = Vec::new();
        let mut next = schema.base();
        while let Some(base) = next {
            let base_schema = registry.schemas.get(&base.id()).ok_or_else(|| {
                Error::type_error(format!(
                    "Base type {base} of {key} must be registered before it"
                ))
            })?;
            next = base_schema.base();
            ancestors.push(base_schema.clone());
        }

        let has_root_class =
            schema.is_root_class() || ancestors.iter().any(|a| a.is_root_class());
        let mut chain = vec![schema.discriminator().to_string()];
        if has_root_class && !schema.is_root_class() {
            for ancestor in &ancestors {
                chain.push(ancestor.discriminator().to_string());
                if ancestor.is_root_class() {
                    break;
                }
            }
        }
        chain.reverse();
        let inherited = ancestors
            .iter()
            .find_map(|a| a.explicit_convention().cloned());
        schema.freeze(has_root_class, chain, inherited);

        for ancestor in &ancestors {
            registry
                .derived
                .entry(ancestor.type_key().id())
                .or_default()
                .push(key);
        }
        registry
            .discriminators
            .entry(schema.discriminator().to_string())
            .or_default()
            .push(key);
        debug!(
            "registered {key} (discriminator '{}', {} fields, {} creators)",
            schema.discriminator(),
            schema.field_count(),
            schema.creators().len()
        );
        registry.schemas.insert(key.id(), Arc::new(schema));
        Ok(())
    }

    pub fn schema(&self, key: TypeKey) -> Option<Arc<TypeSchema>> {
        self.schema_by_id(key.id())
    }

    pub fn schema_by_id(&self, id: TypeId) -> Option<Arc<TypeSchema>> {
        self.registry.read().schemas.get(&id).cloned()
    }

    pub(crate) fn schema_or_err(&self, key: TypeKey) -> Result<Arc<TypeSchema>, Error> {
        self.schema(key)
            .ok_or_else(|| Error::type_error(format!("Type {key} is not registered")))
    }

    /// Codec for `key`, created on first use.
    pub fn codec(&self, key: TypeKey) -> Result<Arc<StructCodec>, Error> {
        self.codec_by_id(key.id())
            .map_err(|_| Error::type_error(format!("Type {key} is not registered")))
    }

    /// Codec for a runtime type identity, such as `value.type_id()` of an
    /// erased instance.
    pub fn codec_by_id(&self, id: TypeId) -> Result<Arc<StructCodec>, Error> {
        if let Some(codec) = self.codecs.read().get(&id) {
            return Ok(codec.clone());
        }
        let schema = self.schema_by_id(id).ok_or_else(|| {
            Error::type_error(format!("No schema registered for runtime type {id:?}"))
        })?;
        let codec = Arc::new(StructCodec::new(schema));
        Ok(self.codecs.write().entry(id).or_insert(codec).clone())
    }

    /// Whether decoding `nominal` has to look for a discriminator: the type is
    /// abstract or has registered descendants.
    pub fn is_discriminated(&self, nominal: TypeKey) -> bool {
        let registry = self.registry.read();
        let has_derived = registry
            .derived
            .get(&nominal.id())
            .is_some_and(|derived| !derived.is_empty());
        has_derived
            || registry
                .schemas
                .get(&nominal.id())
                .is_some_and(|schema| schema.is_abstract())
    }

    /// Maps a discriminator value to the registered type assignable to `nominal`.
    pub fn lookup_actual_type(&self, nominal: TypeKey, discriminator: &str) -> Result<TypeKey, Error> {
        let registry = self.registry.read();
        let mut matches = registry
            .discriminators
            .get(discriminator)
            .into_iter()
            .flatten()
            .filter(|candidate| **candidate == nominal || registry.is_descendant(nominal, **candidate));
        match (matches.next(), matches.next()) {
            (Some(actual), None) => Ok(*actual),
            (None, _) => Err(Error::unknown_discriminator(
                nominal.short_name(),
                discriminator.to_string(),
            )),
            (Some(first), Some(second)) => Err(Error::type_error(format!(
                "Ambiguous discriminator '{discriminator}' for nominal type {nominal}: \
                 matches both {first} and {second}"
            ))),
        }
    }
}

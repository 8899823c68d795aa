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
use std::sync::Arc;

use crate::config::Config;
use crate::error::Error;
use crate::io::{DocumentReader, DocumentWriter};
use crate::meta::{IdGenerator, TypeSchema};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::TypeResolver;
use crate::serializer::Serializer;
use crate::types::TypeKey;

/// Entry point for encoding instances to documents and back.
///
/// A `Docmap` owns its [`Config`] and shares a [`TypeResolver`] holding the
/// registered schemas. It is `Send + Sync`; every call allocates its own
/// context, so one instance can serve any number of threads.
///
/// ```
/// use docmap_core::meta::{FieldSchema, TypeSchemaBuilder};
/// use docmap_core::Docmap;
///
/// #[derive(Default, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
/// docmap_core::class_serializer!(Point);
///
/// let docmap = Docmap::default();
/// docmap
///     .register(
///         TypeSchemaBuilder::<Point>::new()
///             .new_instance(Point::default)
///             .field(FieldSchema::new("x", |p: &Point| &p.x, |p, v| p.x = v))
///             .field(FieldSchema::new("y", |p: &Point| &p.y, |p, v| p.y = v))
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
///
/// let bytes = docmap.serialize(&Point { x: 1, y: 2 }).unwrap();
/// let point: Point = docmap.deserialize(&bytes).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
pub struct Docmap {
    config: Config,
    type_resolver: Arc<TypeResolver>,
}

impl Default for Docmap {
    fn default() -> Self {
        Docmap {
            config: Config::default(),
            type_resolver: Arc::new(TypeResolver::default()),
        }
    }
}

/// Identifier of an instance, see [`Docmap::document_id`].
pub struct DocumentId<'a> {
    pub id: &'a dyn Any,
    pub id_type: TypeKey,
    pub generator: Option<Arc<dyn IdGenerator>>,
}

/// Wire name and value type of a member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializationInfo {
    pub element_name: String,
    pub value_type: TypeKey,
}

impl Docmap {
    pub fn new(config: Config) -> Self {
        Docmap {
            config,
            type_resolver: Arc::new(TypeResolver::default()),
        }
    }

    /// Uses `type_resolver` instead of a private one, e.g. [`TypeResolver::global`].
    pub fn with_resolver(mut self, type_resolver: Arc<TypeResolver>) -> Self {
        self.type_resolver = type_resolver;
        self
    }

    /// Sets whether top-level documents write their identifier first.
    ///
    /// Default: `true`.
    pub fn serialize_id_first(mut self, serialize_id_first: bool) -> Self {
        self.config.serialize_id_first = serialize_id_first;
        self
    }

    /// Sets the maximum nesting depth of class documents and dynamic values.
    ///
    /// Default: 64.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn initial_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_buffer_capacity = capacity;
        self
    }

    #[inline(always)]
    pub fn get_config(&self) -> &Config {
        &self.config
    }

    #[inline(always)]
    pub fn get_type_resolver(&self) -> &TypeResolver {
        &self.type_resolver
    }

    /// Registers a schema. A declared base type must be registered first.
    pub fn register(&self, schema: TypeSchema) -> Result<(), Error> {
        self.type_resolver.register(schema)
    }

    /// Encodes `record` as a root value.
    pub fn serialize<T: Serializer>(&self, record: &T) -> Result<Vec<u8>, Error> {
        let mut writer = DocumentWriter::with_capacity(self.config.initial_buffer_capacity());
        let mut context = WriteContext::new(&self.type_resolver, &self.config, &mut writer);
        record.write(&mut context)?;
        writer.into_bytes()
    }

    /// Encodes an erased instance whose statically expected type is `nominal`.
    pub fn serialize_dyn(&self, value: Option<&dyn Any>, nominal: TypeKey) -> Result<Vec<u8>, Error> {
        let mut writer = DocumentWriter::with_capacity(self.config.initial_buffer_capacity());
        let mut context = WriteContext::new(&self.type_resolver, &self.config, &mut writer);
        context.write_class(nominal, value)?;
        writer.into_bytes()
    }

    /// Decodes one root value; trailing bytes are an error.
    pub fn deserialize<T: Serializer>(&self, bf: &[u8]) -> Result<T, Error> {
        let mut context = ReadContext::new(&self.type_resolver, &self.config, DocumentReader::new(bf));
        let value = T::read(&mut context)?;
        check_consumed(&context)?;
        Ok(value)
    }

    /// Decodes a root class document as `nominal` or one of its registered
    /// descendants; `None` for a root null.
    pub fn deserialize_dyn(&self, bf: &[u8], nominal: TypeKey) -> Result<Option<Box<dyn Any>>, Error> {
        let mut context = ReadContext::new(&self.type_resolver, &self.config, DocumentReader::new(bf));
        let value = context.read_class(nominal)?;
        check_consumed(&context)?;
        Ok(value)
    }

    fn schema_of(&self, instance: &dyn Any) -> Result<Arc<TypeSchema>, Error> {
        self.type_resolver
            .schema_by_id(instance.type_id())
            .ok_or_else(|| Error::type_error("Instance type is not registered"))
    }

    /// Reads the identifier of a registered instance.
    pub fn document_id<'a>(&self, instance: &'a dyn Any) -> Result<DocumentId<'a>, Error> {
        let schema = self.schema_of(instance)?;
        let field = schema
            .id_field()
            .ok_or_else(|| Error::missing_identifier(schema.type_name()))?;
        Ok(DocumentId {
            id: field.get(instance)?,
            id_type: field.value_type(),
            generator: field.id_generator().cloned(),
        })
    }

    /// Assigns the identifier of a registered instance.
    pub fn set_document_id(&self, instance: &mut dyn Any, id: Box<dyn Any>) -> Result<(), Error> {
        let schema = self.schema_of(&*instance)?;
        if schema.is_value_type() {
            return Err(Error::not_object_shaped(schema.type_name()));
        }
        let field = schema
            .id_field()
            .ok_or_else(|| Error::missing_identifier(schema.type_name()))?;
        field.set(instance, id)
    }

    /// Generates an identifier when the current one is empty.
    ///
    /// Returns whether a new identifier was assigned. Identifier fields
    /// without a generator are left alone.
    pub fn ensure_document_id(&self, instance: &mut dyn Any) -> Result<bool, Error> {
        let schema = self.schema_of(&*instance)?;
        if schema.is_value_type() {
            return Err(Error::not_object_shaped(schema.type_name()));
        }
        let field = schema
            .id_field()
            .ok_or_else(|| Error::missing_identifier(schema.type_name()))?;
        let Some(generator) = field.id_generator() else {
            return Ok(false);
        };
        if !generator.is_empty(field.get(&*instance)?) {
            return Ok(false);
        }
        let id = generator.generate(field.value_type())?;
        field.set(instance, id)?;
        Ok(true)
    }

    /// Wire name and value type of the field bound to `member_name` of `key`.
    pub fn member_serialization_info(
        &self,
        key: TypeKey,
        member_name: &str,
    ) -> Result<Option<SerializationInfo>, Error> {
        let schema = self.type_resolver.schema_or_err(key)?;
        Ok(schema.find_member(member_name).map(|field| SerializationInfo {
            element_name: field.element_name().to_string(),
            value_type: field.value_type(),
        }))
    }
}

fn check_consumed(context: &ReadContext) -> Result<(), Error> {
    if !context.reader.is_at_end() {
        return Err(Error::invalid_data(format!(
            "{} trailing bytes after the root value",
            context.reader.remaining()
        )));
    }
    Ok(())
}

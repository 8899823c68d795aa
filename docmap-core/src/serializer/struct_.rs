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

use log::debug;

use crate::error::Error;
use crate::meta::TypeSchema;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::construct::{ConstructionStrategy, CreatorBased, DirectAssignment};
use crate::serializer::presence::FieldPresence;
use crate::types::{TypeKey, WireType};

/// Codec of one registered class, driven by its frozen schema.
///
/// Created lazily by the [`TypeResolver`](crate::resolver::TypeResolver) and
/// shared by every call; it holds no per-call state.
pub struct StructCodec {
    schema: Arc<TypeSchema>,
}

impl StructCodec {
    pub fn new(schema: Arc<TypeSchema>) -> StructCodec {
        StructCodec { schema }
    }

    #[inline(always)]
    pub fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    /// Class codecs read and write discriminators themselves.
    pub fn is_discriminator_compatible_with_object_serializer(&self) -> bool {
        true
    }

    /// Encodes `value` where `nominal` is the statically expected type.
    ///
    /// A value whose runtime type is not this codec's type is redirected to
    /// the codec registered for its runtime type.
    pub fn serialize(
        &self,
        context: &mut WriteContext,
        nominal: TypeKey,
        value: Option<&dyn Any>,
    ) -> Result<(), Error> {
        let Some(value) = value else {
            return context.writer.write_null();
        };
        let schema = &*self.schema;
        let key = schema.type_key();
        if value.type_id() != key.id() {
            let codec = context.get_type_resolver().codec_by_id(value.type_id())?;
            debug!(
                "encoding {} as {} through the {} codec",
                nominal,
                codec.schema.type_key(),
                key
            );
            return codec.serialize(context, nominal, Some(value));
        }

        let id_first = context.depth() == 0 && context.get_config().is_serialize_id_first();
        context.inc_depth()?;
        context.writer.write_document_start()?;

        let id_index = if id_first { schema.id_index() } else { None };
        if let Some(index) = id_index {
            self.write_field(context, value, index)?;
        }

        let needs_discriminator = nominal != key
            || schema.is_discriminator_required()
            || schema.has_root_class();
        if needs_discriminator && !schema.is_anonymous() {
            let convention = schema.discriminator_convention();
            if let Some(discriminator) =
                convention.discriminator(nominal, key, context.get_type_resolver())?
            {
                context.writer.write_name(convention.element_name())?;
                discriminator.write_to(context.writer)?;
            }
        }

        let extra_position = schema.extra_elements().map(|extra| extra.position());
        for position in 0..=schema.field_count() {
            if extra_position == Some(position) {
                self.write_extra_elements(context, value)?;
            }
            if position < schema.field_count() && id_index != Some(position) {
                self.write_field(context, value, position)?;
            }
        }

        context.writer.write_document_end()?;
        context.dec_depth();
        Ok(())
    }

    fn write_field(
        &self,
        context: &mut WriteContext,
        instance: &dyn Any,
        index: usize,
    ) -> Result<(), Error> {
        let field = &self.schema.fields()[index];
        let value = field.get(instance)?;
        if !field.should_serialize(instance, value) {
            return Ok(());
        }
        context.writer.write_name(field.element_name())?;
        field.write_value(value, context)
    }

    /// Writes the overflow elements inline, as if they were fields.
    fn write_extra_elements(&self, context: &mut WriteContext, instance: &dyn Any) -> Result<(), Error> {
        let Some(extra) = self.schema.extra_elements() else {
            return Ok(());
        };
        if let Some(elements) = extra.get(instance)? {
            for (name, value) in elements {
                context.writer.write_name(name)?;
                value.write_to(context.writer)?;
            }
        }
        Ok(())
    }

    /// Decodes the value the reader is positioned on as `nominal`;
    /// `None` for a null marker.
    pub fn deserialize(
        &self,
        context: &mut ReadContext,
        nominal: TypeKey,
    ) -> Result<Option<Box<dyn Any>>, Error> {
        let schema = &*self.schema;
        if schema.is_value_type() {
            return Err(Error::unsupported_value_type(schema.type_name()));
        }
        if context.reader.read_wire_type()? == WireType::Null {
            context.reader.read_null()?;
            return Ok(None);
        }

        let resolver = context.get_type_resolver();
        let actual = schema
            .discriminator_convention()
            .actual_type(&mut context.reader, nominal, resolver)?;
        if actual != schema.type_key() {
            debug!("decoding {nominal} as {actual}");
            return resolver.codec(actual)?.deserialize(context, actual);
        }

        let found = context.reader.current_wire_type();
        if found != WireType::Document {
            return Err(Error::unexpected_shape(schema.type_name(), found));
        }
        let instance = if schema.has_creators() {
            self.decode_body(context, CreatorBased::new(schema))?
        } else {
            self.decode_body(context, DirectAssignment::new(schema)?)?
        };
        Ok(Some(instance))
    }

    fn decode_body<S: ConstructionStrategy>(
        &self,
        context: &mut ReadContext,
        mut strategy: S,
    ) -> Result<Box<dyn Any>, Error> {
        let schema = &*self.schema;
        let discriminator_element = schema.discriminator_convention().element_name();
        let mut presence = FieldPresence::new(schema.field_count());

        context.inc_depth()?;
        context.reader.read_document_start()?;
        while context.reader.read_wire_type()? != WireType::EndOfDocument {
            let (name, index) = context.reader.read_name_with(schema.name_resolver())?;
            match index {
                Some(index) => {
                    strategy.set_value(context, index)?;
                    presence.mark(index);
                }
                None if name == discriminator_element => context.reader.skip_value()?,
                None if schema.extra_elements().is_some() => {
                    strategy.extra_element(context, name)?
                }
                None if schema.is_ignore_extra_elements() => {
                    debug!("skipping unknown element '{name}' of {}", schema.type_name());
                    context.reader.skip_value()?;
                }
                None => return Err(Error::unknown_field(schema.type_name(), name)),
            }
        }
        context.reader.read_document_end()?;
        context.dec_depth();

        presence.for_each_missing(|index| {
            let field = &schema.fields()[index];
            if field.is_read_only() {
                return Ok(());
            }
            if field.is_required() {
                return Err(Error::required_field_missing(
                    schema.type_name(),
                    field.member_name().to_string(),
                    field.element_name().to_string(),
                ));
            }
            strategy.apply_default(index)
        })?;
        strategy.finish()
    }
}

/// Unboxes a decoded instance as `T`.
pub fn downcast_instance<T: 'static>(instance: Box<dyn Any>) -> Result<T, Error> {
    instance.downcast::<T>().map(|t| *t).map_err(|_| {
        Error::type_error(format!(
            "Decoded instance is not a {}",
            TypeKey::of::<T>()
        ))
    })
}

/// Implements [`Serializer`](crate::serializer::Serializer) for registered
/// classes by delegating to their [`StructCodec`].
///
/// ```ignore
/// docmap_core::class_serializer!(Person, Address);
/// ```
#[macro_export]
macro_rules! class_serializer {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::serializer::Serializer for $ty {
                fn write(
                    &self,
                    context: &mut $crate::resolver::context::WriteContext,
                ) -> ::std::result::Result<(), $crate::error::Error> {
                    context.write_class(
                        $crate::types::TypeKey::of::<$ty>(),
                        Some(self as &dyn ::std::any::Any),
                    )
                }

                fn read(
                    context: &mut $crate::resolver::context::ReadContext,
                ) -> ::std::result::Result<Self, $crate::error::Error> {
                    match context.read_class($crate::types::TypeKey::of::<$ty>())? {
                        Some(instance) => $crate::serializer::struct_::downcast_instance(instance),
                        None => Err($crate::error::Error::invalid_data(format!(
                            "Null where {} was expected; use Option<{}>",
                            $crate::types::TypeKey::of::<$ty>(),
                            $crate::types::TypeKey::of::<$ty>(),
                        ))),
                    }
                }
            }
        )+
    };
}

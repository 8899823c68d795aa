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

use log::trace;

use crate::error::Error;
use crate::io::DocumentReader;
use crate::resolver::type_resolver::TypeResolver;
use crate::types::{TypeKey, WireType, DEFAULT_DISCRIMINATOR_ELEMENT};
use crate::value::Value;

/// Policy that maps between runtime types and the discriminator element.
pub trait DiscriminatorConvention: Send + Sync {
    /// Name of the element that carries the discriminator.
    fn element_name(&self) -> &str;

    /// Resolves the type to decode for the value the reader is positioned on.
    ///
    /// Must leave the reader where it found it.
    fn actual_type(
        &self,
        reader: &mut DocumentReader,
        nominal: TypeKey,
        resolver: &TypeResolver,
    ) -> Result<TypeKey, Error>;

    /// Discriminator value to write for `actual` when encoded as `nominal`.
    fn discriminator(
        &self,
        nominal: TypeKey,
        actual: TypeKey,
        resolver: &TypeResolver,
    ) -> Result<Option<Value>, Error>;
}

pub static DEFAULT_CONVENTION: HierarchicalDiscriminatorConvention =
    HierarchicalDiscriminatorConvention::with_static_name(DEFAULT_DISCRIMINATOR_ELEMENT);

/// Writes the actual type's discriminator as a single string.
#[derive(Debug, Clone)]
pub struct ScalarDiscriminatorConvention {
    element_name: Cow<'static, str>,
}

impl ScalarDiscriminatorConvention {
    pub fn new<S: Into<Cow<'static, str>>>(element_name: S) -> Self {
        ScalarDiscriminatorConvention {
            element_name: element_name.into(),
        }
    }
}

impl Default for ScalarDiscriminatorConvention {
    fn default() -> Self {
        Self::new(DEFAULT_DISCRIMINATOR_ELEMENT)
    }
}

impl DiscriminatorConvention for ScalarDiscriminatorConvention {
    fn element_name(&self) -> &str {
        &self.element_name
    }

    fn actual_type(
        &self,
        reader: &mut DocumentReader,
        nominal: TypeKey,
        resolver: &TypeResolver,
    ) -> Result<TypeKey, Error> {
        look_ahead(reader, &self.element_name, nominal, resolver)
    }

    fn discriminator(
        &self,
        _nominal: TypeKey,
        actual: TypeKey,
        resolver: &TypeResolver,
    ) -> Result<Option<Value>, Error> {
        let schema = resolver.schema_or_err(actual)?;
        Ok(Some(Value::String(schema.discriminator().to_string())))
    }
}

/// Writes the chain of discriminators from the hierarchy root down to the
/// actual type when the type has a root class, and a single string otherwise.
#[derive(Debug, Clone)]
pub struct HierarchicalDiscriminatorConvention {
    element_name: Cow<'static, str>,
}

impl HierarchicalDiscriminatorConvention {
    pub fn new<S: Into<Cow<'static, str>>>(element_name: S) -> Self {
        HierarchicalDiscriminatorConvention {
            element_name: element_name.into(),
        }
    }

    pub const fn with_static_name(element_name: &'static str) -> Self {
        HierarchicalDiscriminatorConvention {
            element_name: Cow::Borrowed(element_name),
        }
    }
}

impl Default for HierarchicalDiscriminatorConvention {
    fn default() -> Self {
        Self::with_static_name(DEFAULT_DISCRIMINATOR_ELEMENT)
    }
}

impl DiscriminatorConvention for HierarchicalDiscriminatorConvention {
    fn element_name(&self) -> &str {
        &self.element_name
    }

    fn actual_type(
        &self,
        reader: &mut DocumentReader,
        nominal: TypeKey,
        resolver: &TypeResolver,
    ) -> Result<TypeKey, Error> {
        look_ahead(reader, &self.element_name, nominal, resolver)
    }

    fn discriminator(
        &self,
        _nominal: TypeKey,
        actual: TypeKey,
        resolver: &TypeResolver,
    ) -> Result<Option<Value>, Error> {
        let schema = resolver.schema_or_err(actual)?;
        if schema.has_root_class() {
            let chain = schema
                .discriminator_chain()
                .iter()
                .map(|d| Value::String(d.clone()))
                .collect();
            Ok(Some(Value::Array(chain)))
        } else {
            Ok(Some(Value::String(schema.discriminator().to_string())))
        }
    }
}

/// Scans the current document for `element_name` and maps its value to a
/// registered type assignable to `nominal`.
fn look_ahead(
    reader: &mut DocumentReader,
    element_name: &str,
    nominal: TypeKey,
    resolver: &TypeResolver,
) -> Result<TypeKey, Error> {
    if reader.read_wire_type()? != WireType::Document || !resolver.is_discriminated(nominal) {
        return Ok(nominal);
    }
    let bookmark = reader.bookmark();
    let found = find_element(reader, element_name);
    reader.return_to_bookmark(bookmark)?;
    let Some(value) = found? else {
        trace!("no '{element_name}' element, decoding as {nominal}");
        return Ok(nominal);
    };
    let discriminator = discriminator_string(&value)?;
    let actual = resolver.lookup_actual_type(nominal, discriminator)?;
    trace!("discriminator '{discriminator}' resolved {nominal} to {actual}");
    Ok(actual)
}

fn find_element(reader: &mut DocumentReader, element_name: &str) -> Result<Option<Value>, Error> {
    reader.read_document_start()?;
    while reader.read_wire_type()? != WireType::EndOfDocument {
        if reader.read_name()? == element_name {
            return Value::read_from(reader).map(Some);
        }
        reader.skip_value()?;
    }
    Ok(None)
}

/// A hierarchical discriminator names the actual type in its last entry.
fn discriminator_string(value: &Value) -> Result<&str, Error> {
    let last = match value {
        Value::Array(values) => values.last(),
        other => Some(other),
    };
    last.and_then(Value::as_str).ok_or_else(|| {
        Error::invalid_data(format!(
            "Discriminator must be a string or an array of strings, found {:?}",
            value.wire_type()
        ))
    })
}

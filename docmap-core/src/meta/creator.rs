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
use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::Error;
use crate::meta::{NameResolver, TypeSchema};
use crate::types::TypeKey;
use crate::value::Document;

pub(crate) type CreatorFn =
    Arc<dyn Fn(&mut CreatorArgs) -> Result<Box<dyn Any>, Error> + Send + Sync>;

/// Constructor-style factory consuming a named subset of fields.
///
/// ```
/// use docmap_core::meta::CreatorSchema;
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let creator = CreatorSchema::new(["x", "y"], |args| {
///     Ok(Point {
///         x: args.take("x")?,
///         y: args.take("y")?,
///     })
/// });
/// ```
pub struct CreatorSchema<T> {
    arguments: Vec<Cow<'static, str>>,
    factory: CreatorFn,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> CreatorSchema<T> {
    pub fn new<I, S, C>(arguments: I, factory: C) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
        C: Fn(&mut CreatorArgs) -> Result<T, Error> + Send + Sync + 'static,
    {
        let factory: CreatorFn =
            Arc::new(move |args: &mut CreatorArgs| Ok(Box::new(factory(args)?) as Box<dyn Any>));
        CreatorSchema {
            arguments: arguments.into_iter().map(Into::into).collect(),
            factory,
            _marker: PhantomData,
        }
    }

    pub(crate) fn erase(self) -> UnresolvedCreator {
        UnresolvedCreator {
            arguments: self.arguments,
            factory: self.factory,
        }
    }
}

/// A creator whose argument names are not yet bound to field indices.
pub(crate) struct UnresolvedCreator {
    arguments: Vec<Cow<'static, str>>,
    factory: CreatorFn,
}

impl UnresolvedCreator {
    /// Binds argument names to field indices.
    pub(crate) fn resolve(
        self,
        names: &NameResolver,
        type_key: TypeKey,
    ) -> Result<CreatorInfo, Error> {
        let mut arguments = Vec::with_capacity(self.arguments.len());
        for name in &self.arguments {
            let index = names.resolve(name).ok_or_else(|| {
                Error::invalid_schema(format!(
                    "Creator argument '{name}' of type {type_key} does not name a field"
                ))
            })?;
            if arguments.contains(&index) {
                return Err(Error::invalid_schema(format!(
                    "Creator argument '{name}' of type {type_key} is listed twice"
                )));
            }
            arguments.push(index);
        }
        Ok(CreatorInfo {
            arguments,
            factory: self.factory,
        })
    }
}

/// Frozen creator descriptor.
pub struct CreatorInfo {
    arguments: Vec<usize>,
    factory: CreatorFn,
}

impl CreatorInfo {
    /// Field indices this creator consumes.
    pub fn arguments(&self) -> &[usize] {
        &self.arguments
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    pub(crate) fn is_satisfied_by(&self, values: &IndexMap<usize, Box<dyn Any>>) -> bool {
        self.arguments.iter().all(|index| values.contains_key(index))
    }

    /// Invokes the factory and drops every argument from `values`, taken or not.
    pub(crate) fn create(
        &self,
        schema: &TypeSchema,
        values: &mut IndexMap<usize, Box<dyn Any>>,
        extra_elements: &mut Option<Document>,
    ) -> Result<Box<dyn Any>, Error> {
        let mut args = CreatorArgs {
            schema,
            values,
            extra_elements,
        };
        let instance = (self.factory)(&mut args)?;
        for index in &self.arguments {
            values.shift_remove(index);
        }
        Ok(instance)
    }
}

/// Buffered values handed to a creator.
pub struct CreatorArgs<'a> {
    schema: &'a TypeSchema,
    values: &'a mut IndexMap<usize, Box<dyn Any>>,
    extra_elements: &'a mut Option<Document>,
}

impl CreatorArgs<'_> {
    /// Removes and returns the value decoded for `element`.
    ///
    /// Falls back to the field's default value when the element was absent.
    pub fn take<V: 'static>(&mut self, element: &str) -> Result<V, Error> {
        let index = self.schema.field_index(element).ok_or_else(|| {
            Error::invalid_data(format!(
                "'{element}' is not a field of type {}",
                self.schema.type_key()
            ))
        })?;
        let value = match self.values.shift_remove(&index) {
            Some(value) => value,
            None => self.schema.fields()[index].default_value().ok_or_else(|| {
                Error::invalid_data(format!("Creator argument '{element}' is missing"))
            })?,
        };
        value.downcast::<V>().map(|v| *v).map_err(|_| {
            Error::type_error(format!(
                "Creator argument '{element}' is a {}, not a {}",
                self.schema.fields()[index].value_type(),
                TypeKey::of::<V>()
            ))
        })
    }

    /// Whether a value was decoded or defaulted for `element`.
    pub fn contains(&self, element: &str) -> bool {
        self.schema
            .field_index(element)
            .map_or(false, |index| self.values.contains_key(&index))
    }

    /// Takes the overflow elements collected so far, if any.
    pub fn take_extra_elements(&mut self) -> Option<Document> {
        self.extra_elements.take()
    }
}

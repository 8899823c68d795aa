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

use indexmap::IndexMap;
use log::debug;

use crate::error::Error;
use crate::meta::{CreatorInfo, ExtraElementsInfo, TypeSchema};
use crate::resolver::context::ReadContext;
use crate::value::{Document, Value};

/// How a decoded document body becomes an instance.
pub(crate) trait ConstructionStrategy {
    /// Decodes the current value into field `index`.
    fn set_value(&mut self, context: &mut ReadContext, index: usize) -> Result<(), Error>;

    /// Decodes the current value as an overflow element called `name`.
    fn extra_element(&mut self, context: &mut ReadContext, name: String) -> Result<(), Error>;

    /// Applies the specified default of an absent field, if it has one.
    fn apply_default(&mut self, index: usize) -> Result<(), Error>;

    fn finish(self) -> Result<Box<dyn Any>, Error>;
}

fn read_extra_value(
    context: &mut ReadContext,
    schema: &TypeSchema,
    extra: &ExtraElementsInfo,
) -> Result<Value, Error> {
    let (depth, max_depth) = (context.depth(), context.get_config().max_depth());
    Value::read_from_depth(&mut context.reader, depth, max_depth).map_err(|e| {
        Error::member_decode_failure(schema.type_name(), extra.member_name.clone(), e)
    })
}

fn overflow_member(schema: &TypeSchema) -> Result<&ExtraElementsInfo, Error> {
    schema
        .extra_elements()
        .ok_or_else(|| Error::type_error(format!("{} has no overflow member", schema.type_name())))
}

/// Populates a live instance as elements arrive.
pub(crate) struct DirectAssignment<'s> {
    schema: &'s TypeSchema,
    instance: Box<dyn Any>,
}

impl<'s> DirectAssignment<'s> {
    pub(crate) fn new(schema: &'s TypeSchema) -> Result<DirectAssignment<'s>, Error> {
        let mut instance = schema.new_instance()?;
        schema.init_hooks().begin(instance.as_mut());
        Ok(DirectAssignment { schema, instance })
    }
}

impl ConstructionStrategy for DirectAssignment<'_> {
    fn set_value(&mut self, context: &mut ReadContext, index: usize) -> Result<(), Error> {
        let field = &self.schema.fields()[index];
        if field.is_read_only() {
            return context.reader.skip_value();
        }
        let value = field.read_value(context, self.schema.type_name())?;
        field.set(self.instance.as_mut(), value)
    }

    fn extra_element(&mut self, context: &mut ReadContext, name: String) -> Result<(), Error> {
        let extra = overflow_member(self.schema)?;
        let value = read_extra_value(context, self.schema, extra)?;
        extra
            .get_mut(self.instance.as_mut())?
            .get_or_insert_with(Document::new)
            .insert(name, value);
        Ok(())
    }

    fn apply_default(&mut self, index: usize) -> Result<(), Error> {
        let field = &self.schema.fields()[index];
        match field.default_value() {
            Some(default) => field.set(self.instance.as_mut(), default),
            None => Ok(()),
        }
    }

    fn finish(mut self) -> Result<Box<dyn Any>, Error> {
        self.schema.init_hooks().end(self.instance.as_mut());
        Ok(self.instance)
    }
}

/// Buffers decoded values until the whole body is read, then constructs the
/// instance through the best matching creator.
pub(crate) struct CreatorBased<'s> {
    schema: &'s TypeSchema,
    values: IndexMap<usize, Box<dyn Any>>,
    extra_elements: Option<Document>,
}

impl<'s> CreatorBased<'s> {
    pub(crate) fn new(schema: &'s TypeSchema) -> CreatorBased<'s> {
        CreatorBased {
            schema,
            values: IndexMap::with_capacity(schema.field_count()),
            extra_elements: None,
        }
    }

    /// The satisfiable creator consuming the most buffered values; the first
    /// declared one wins a tie.
    fn choose_creator(&self) -> Option<&'s CreatorInfo> {
        let mut best: Option<&'s CreatorInfo> = None;
        for creator in self.schema.creators() {
            if !creator.is_satisfied_by(&self.values) {
                continue;
            }
            if best.map_or(true, |b| creator.argument_count() > b.argument_count()) {
                best = Some(creator);
            }
        }
        best
    }
}

impl ConstructionStrategy for CreatorBased<'_> {
    fn set_value(&mut self, context: &mut ReadContext, index: usize) -> Result<(), Error> {
        let value = self.schema.fields()[index].read_value(context, self.schema.type_name())?;
        self.values.insert(index, value);
        Ok(())
    }

    fn extra_element(&mut self, context: &mut ReadContext, name: String) -> Result<(), Error> {
        let extra = overflow_member(self.schema)?;
        let value = read_extra_value(context, self.schema, extra)?;
        self.extra_elements
            .get_or_insert_with(Document::new)
            .insert(name, value);
        Ok(())
    }

    fn apply_default(&mut self, index: usize) -> Result<(), Error> {
        let field = &self.schema.fields()[index];
        if field.is_read_only() {
            return Ok(());
        }
        if let Some(default) = field.default_value() {
            self.values.insert(index, default);
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Box<dyn Any>, Error> {
        let schema = self.schema;
        let creator = self
            .choose_creator()
            .ok_or_else(|| Error::no_matching_creator(schema.type_name()))?;
        debug!(
            "constructing {} through the creator of ({})",
            schema.type_name(),
            creator
                .arguments()
                .iter()
                .map(|i| schema.fields()[*i].element_name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut instance = creator.create(schema, &mut self.values, &mut self.extra_elements)?;

        let hooks = schema.init_hooks();
        hooks.begin(instance.as_mut());
        for (index, value) in self.values {
            let field = &schema.fields()[index];
            if field.is_read_only() {
                continue;
            }
            field.set(instance.as_mut(), value)?;
        }
        if let (Some(extra), Some(elements)) = (schema.extra_elements(), self.extra_elements) {
            *extra.get_mut(instance.as_mut())? = Some(elements);
        }
        hooks.end(instance.as_mut());
        Ok(instance)
    }
}

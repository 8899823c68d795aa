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

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::types::TypeKey;

/// Value codec of one Rust type.
///
/// `write` emits exactly one value at the writer's current position; inside a
/// document the caller has already written the element name. `read` consumes
/// exactly one value.
pub trait Serializer: Sized + 'static {
    fn write(&self, context: &mut WriteContext) -> Result<(), Error>;

    fn read(context: &mut ReadContext) -> Result<Self, Error>;

    /// Whether this value encodes as a null marker.
    #[inline(always)]
    fn is_null(&self) -> bool {
        false
    }
}

/// Upcast helper for trait objects participating in polymorphic encoding.
///
/// Declare it as a supertrait, e.g. `trait Animal: AsAny { .. }`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline(always)]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline(always)]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

type WriteFn = fn(&dyn Any, &mut WriteContext) -> Result<(), Error>;
type ReadFn = fn(&mut ReadContext) -> Result<Box<dyn Any>, Error>;
type IsNullFn = fn(&dyn Any) -> bool;

/// Type-erased [`Serializer`] of one value type, built once per field.
#[derive(Clone, Copy)]
pub struct Harness {
    write_fn: WriteFn,
    read_fn: ReadFn,
    is_null_fn: IsNullFn,
    value_type: TypeKey,
}

impl Harness {
    pub fn new(
        write_fn: WriteFn,
        read_fn: ReadFn,
        is_null_fn: IsNullFn,
        value_type: TypeKey,
    ) -> Harness {
        Harness {
            write_fn,
            read_fn,
            is_null_fn,
            value_type,
        }
    }

    pub fn of<V: Serializer>() -> Harness {
        fn write<V: Serializer>(value: &dyn Any, context: &mut WriteContext) -> Result<(), Error> {
            match value.downcast_ref::<V>() {
                Some(value) => value.write(context),
                None => Err(Error::type_error(format!(
                    "Value is not a {}",
                    TypeKey::of::<V>()
                ))),
            }
        }

        fn read<V: Serializer>(context: &mut ReadContext) -> Result<Box<dyn Any>, Error> {
            Ok(Box::new(V::read(context)?))
        }

        fn is_null<V: Serializer>(value: &dyn Any) -> bool {
            value.downcast_ref::<V>().map_or(false, V::is_null)
        }

        Harness::new(write::<V>, read::<V>, is_null::<V>, TypeKey::of::<V>())
    }

    #[inline(always)]
    pub fn value_type(&self) -> TypeKey {
        self.value_type
    }

    #[inline(always)]
    pub fn write(&self, value: &dyn Any, context: &mut WriteContext) -> Result<(), Error> {
        (self.write_fn)(value, context)
    }

    #[inline(always)]
    pub fn read(&self, context: &mut ReadContext) -> Result<Box<dyn Any>, Error> {
        (self.read_fn)(context)
    }

    #[inline(always)]
    pub fn is_null(&self, value: &dyn Any) -> bool {
        (self.is_null_fn)(value)
    }
}

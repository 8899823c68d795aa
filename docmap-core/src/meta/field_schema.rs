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

use crate::error::Error;
use crate::meta::IdGenerator;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{Harness, Serializer};
use crate::types::TypeKey;
use crate::value::Document;

pub(crate) type DefaultFn = Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>;
type ShouldSerializeFn = Box<dyn Fn(&dyn Any, &dyn Any) -> bool + Send + Sync>;

/// Type-erased getter/setter pair of one member, resolved once at schema build.
pub trait MemberAccessor: Send + Sync {
    fn get<'a>(&self, instance: &'a dyn Any) -> Result<&'a dyn Any, Error>;

    fn set(&self, instance: &mut dyn Any, value: Box<dyn Any>) -> Result<(), Error>;

    fn is_read_only(&self) -> bool;
}

struct Accessor<T, F> {
    getter: fn(&T) -> &F,
    setter: Option<fn(&mut T, F)>,
}

impl<T: 'static, F: 'static> MemberAccessor for Accessor<T, F> {
    #[inline(always)]
    fn get<'a>(&self, instance: &'a dyn Any) -> Result<&'a dyn Any, Error> {
        let instance = instance
            .downcast_ref::<T>()
            .ok_or_else(|| instance_mismatch::<T>())?;
        let value: &dyn Any = (self.getter)(instance);
        Ok(value)
    }

    #[inline(always)]
    fn set(&self, instance: &mut dyn Any, value: Box<dyn Any>) -> Result<(), Error> {
        let setter = self
            .setter
            .ok_or_else(|| Error::unsupported("Cannot assign a read-only member"))?;
        let value = value.downcast::<F>().map_err(|_| {
            Error::type_error(format!(
                "Member value is not a {}",
                TypeKey::of::<F>().short_name()
            ))
        })?;
        let instance = instance
            .downcast_mut::<T>()
            .ok_or_else(|| instance_mismatch::<T>())?;
        setter(instance, *value);
        Ok(())
    }

    fn is_read_only(&self) -> bool {
        self.setter.is_none()
    }
}

#[cold]
fn instance_mismatch<T: 'static>() -> Error {
    Error::type_error(format!(
        "Instance is not a {}",
        TypeKey::of::<T>().short_name()
    ))
}

/// Schema of one member of `T` holding a value of type `F`.
///
/// ```
/// use docmap_core::meta::FieldSchema;
///
/// struct Person {
///     name: String,
///     age: i32,
/// }
///
/// let name = FieldSchema::new("name", |p: &Person| &p.name, |p, v| p.name = v).required();
/// let age = FieldSchema::new("age", |p: &Person| &p.age, |p, v| p.age = v).default_value(0);
/// ```
pub struct FieldSchema<T, F> {
    element_name: Cow<'static, str>,
    member_name: Option<Cow<'static, str>>,
    getter: fn(&T) -> &F,
    setter: Option<fn(&mut T, F)>,
    required: bool,
    default: Option<Arc<dyn Fn() -> F + Send + Sync>>,
    ignore_if_null: bool,
    is_default: Option<fn(&F, Option<&F>) -> bool>,
    should_serialize: Option<Arc<dyn Fn(&T) -> bool + Send + Sync>>,
    id_generator: Option<Arc<dyn IdGenerator>>,
    _marker: PhantomData<fn(T) -> F>,
}

impl<T: 'static, F: Serializer> FieldSchema<T, F> {
    pub fn new<S: Into<Cow<'static, str>>>(
        element_name: S,
        getter: fn(&T) -> &F,
        setter: fn(&mut T, F),
    ) -> Self {
        Self::with_accessors(element_name.into(), getter, Some(setter))
    }

    /// A member that is written but never assigned when decoding.
    pub fn read_only<S: Into<Cow<'static, str>>>(element_name: S, getter: fn(&T) -> &F) -> Self {
        Self::with_accessors(element_name.into(), getter, None)
    }

    fn with_accessors(
        element_name: Cow<'static, str>,
        getter: fn(&T) -> &F,
        setter: Option<fn(&mut T, F)>,
    ) -> Self {
        FieldSchema {
            element_name,
            member_name: None,
            getter,
            setter,
            required: false,
            default: None,
            ignore_if_null: false,
            is_default: None,
            should_serialize: None,
            id_generator: None,
            _marker: PhantomData,
        }
    }

    /// Name of the Rust member, if it differs from the element name.
    pub fn member_name<S: Into<Cow<'static, str>>>(mut self, name: S) -> Self {
        self.member_name = Some(name.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value assigned when the element is absent from a document.
    pub fn default_value(mut self, value: F) -> Self
    where
        F: Clone + Send + Sync,
    {
        self.default = Some(Arc::new(move || value.clone()));
        self
    }

    /// Skip the element on encode when the value is null.
    pub fn ignore_if_null(mut self) -> Self {
        self.ignore_if_null = true;
        self
    }

    /// Skip the element on encode when the value equals the default value, or
    /// `F::default()` when none was given.
    pub fn ignore_if_default(mut self) -> Self
    where
        F: PartialEq + Default,
    {
        fn is_default<F: PartialEq + Default>(value: &F, default: Option<&F>) -> bool {
            match default {
                Some(default) => value == default,
                None => *value == F::default(),
            }
        }
        self.is_default = Some(is_default::<F>);
        self
    }

    pub fn should_serialize<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.should_serialize = Some(Arc::new(predicate));
        self
    }

    pub fn id_generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(generator);
        self
    }

    pub(crate) fn into_info(self) -> FieldInfo {
        let should_serialize = self.erased_should_serialize();
        let member_name = self
            .member_name
            .unwrap_or_else(|| self.element_name.clone());
        let default = self.default.map(|default| -> DefaultFn {
            Arc::new(move || Box::new(default()) as Box<dyn Any>)
        });
        FieldInfo {
            element_name: self.element_name,
            member_name,
            harness: Harness::of::<F>(),
            accessor: Box::new(Accessor {
                getter: self.getter,
                setter: self.setter,
            }),
            required: self.required,
            default,
            ignore_if_null: self.ignore_if_null,
            should_serialize,
            id_generator: self.id_generator,
        }
    }

    fn erased_should_serialize(&self) -> Option<ShouldSerializeFn> {
        let predicate = self.should_serialize.clone();
        let is_default = self.is_default;
        let default = self.default.clone();
        if predicate.is_none() && is_default.is_none() {
            return None;
        }
        Some(Box::new(move |instance: &dyn Any, value: &dyn Any| {
            if let (Some(predicate), Some(instance)) = (&predicate, instance.downcast_ref::<T>()) {
                if !predicate(instance) {
                    return false;
                }
            }
            if let (Some(is_default), Some(value)) = (is_default, value.downcast_ref::<F>()) {
                let default = default.as_ref().map(|default| default());
                if is_default(value, default.as_ref()) {
                    return false;
                }
            }
            true
        }))
    }
}

/// Frozen, type-erased field descriptor.
pub struct FieldInfo {
    element_name: Cow<'static, str>,
    member_name: Cow<'static, str>,
    harness: Harness,
    accessor: Box<dyn MemberAccessor>,
    required: bool,
    default: Option<DefaultFn>,
    ignore_if_null: bool,
    should_serialize: Option<ShouldSerializeFn>,
    id_generator: Option<Arc<dyn IdGenerator>>,
}

impl FieldInfo {
    #[inline(always)]
    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    #[inline(always)]
    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    /// Nominal type of the member's value.
    #[inline(always)]
    pub fn value_type(&self) -> TypeKey {
        self.harness.value_type()
    }

    #[inline(always)]
    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    #[inline(always)]
    pub fn is_read_only(&self) -> bool {
        self.accessor.is_read_only()
    }

    #[inline(always)]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[inline(always)]
    pub fn has_default_value(&self) -> bool {
        self.default.is_some()
    }

    /// A fresh copy of the default value, if one was specified.
    pub fn default_value(&self) -> Option<Box<dyn Any>> {
        self.default.as_ref().map(|default| default())
    }

    pub fn id_generator(&self) -> Option<&Arc<dyn IdGenerator>> {
        self.id_generator.as_ref()
    }

    #[inline(always)]
    pub fn get<'a>(&self, instance: &'a dyn Any) -> Result<&'a dyn Any, Error> {
        self.accessor.get(instance)
    }

    #[inline(always)]
    pub fn set(&self, instance: &mut dyn Any, value: Box<dyn Any>) -> Result<(), Error> {
        self.accessor.set(instance, value)
    }

    pub(crate) fn should_serialize(&self, instance: &dyn Any, value: &dyn Any) -> bool {
        if self.ignore_if_null && self.harness.is_null(value) {
            return false;
        }
        match &self.should_serialize {
            Some(should_serialize) => should_serialize(instance, value),
            None => true,
        }
    }

    #[inline(always)]
    pub(crate) fn write_value(
        &self,
        value: &dyn Any,
        context: &mut WriteContext,
    ) -> Result<(), Error> {
        self.harness.write(value, context)
    }

    /// Decodes the member's value, attributing any failure to this member.
    #[inline(always)]
    pub(crate) fn read_value(
        &self,
        context: &mut ReadContext,
        type_name: &'static str,
    ) -> Result<Box<dyn Any>, Error> {
        self.harness
            .read(context)
            .map_err(|e| Error::member_decode_failure(type_name, self.member_name.clone(), e))
    }
}

/// Access to a type's overflow member.
pub trait ExtraElementsAccessor: Send + Sync {
    fn get<'a>(&self, instance: &'a dyn Any) -> Result<Option<&'a Document>, Error>;

    fn get_mut<'a>(&self, instance: &'a mut dyn Any) -> Result<&'a mut Option<Document>, Error>;
}

pub(crate) struct ExtraAccessor<T> {
    pub(crate) getter: fn(&T) -> &Option<Document>,
    pub(crate) getter_mut: fn(&mut T) -> &mut Option<Document>,
}

impl<T: 'static> ExtraElementsAccessor for ExtraAccessor<T> {
    fn get<'a>(&self, instance: &'a dyn Any) -> Result<Option<&'a Document>, Error> {
        let instance = instance
            .downcast_ref::<T>()
            .ok_or_else(|| instance_mismatch::<T>())?;
        Ok((self.getter)(instance).as_ref())
    }

    fn get_mut<'a>(&self, instance: &'a mut dyn Any) -> Result<&'a mut Option<Document>, Error> {
        let instance = instance
            .downcast_mut::<T>()
            .ok_or_else(|| instance_mismatch::<T>())?;
        Ok((self.getter_mut)(instance))
    }
}

/// The overflow member: absorbs elements that match no field.
pub struct ExtraElementsInfo {
    pub(crate) member_name: Cow<'static, str>,
    /// Number of fields declared before the overflow member; it is encoded at this position.
    pub(crate) position: usize,
    pub(crate) accessor: Box<dyn ExtraElementsAccessor>,
}

impl ExtraElementsInfo {
    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    pub fn position(&self) -> usize {
        self.position
    }

    #[inline(always)]
    pub fn get<'a>(&self, instance: &'a dyn Any) -> Result<Option<&'a Document>, Error> {
        self.accessor.get(instance)
    }

    #[inline(always)]
    pub fn get_mut<'a>(&self, instance: &'a mut dyn Any) -> Result<&'a mut Option<Document>, Error> {
        self.accessor.get_mut(instance)
    }
}

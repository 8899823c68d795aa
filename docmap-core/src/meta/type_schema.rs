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
use crate::meta::creator::UnresolvedCreator;
use crate::meta::field_schema::ExtraAccessor;
use crate::meta::{
    CreatorInfo, CreatorSchema, ExtraElementsInfo, FieldInfo, FieldSchema, NameResolver,
};
use crate::resolver::discriminator::{DiscriminatorConvention, DEFAULT_CONVENTION};
use crate::serializer::Serializer;
use crate::types::TypeKey;
use crate::value::Document;

type InstanceFn = Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>;

/// Optional hooks around the population of a decoded instance.
///
/// Enable them with [`TypeSchemaBuilder::supports_initialize`].
pub trait SupportInitialize {
    fn begin_init(&mut self) {}

    fn end_init(&mut self) {}
}

/// Begin/end initialization hooks, no-ops for types without [`SupportInitialize`].
#[derive(Clone, Copy)]
pub struct InitHooks {
    begin: fn(&mut dyn Any),
    end: fn(&mut dyn Any),
}

fn no_hook(_: &mut dyn Any) {}

fn begin_init<T: SupportInitialize + 'static>(instance: &mut dyn Any) {
    if let Some(instance) = instance.downcast_mut::<T>() {
        instance.begin_init();
    }
}

fn end_init<T: SupportInitialize + 'static>(instance: &mut dyn Any) {
    if let Some(instance) = instance.downcast_mut::<T>() {
        instance.end_init();
    }
}

impl InitHooks {
    pub const NONE: InitHooks = InitHooks {
        begin: no_hook,
        end: no_hook,
    };

    pub fn of<T: SupportInitialize + 'static>() -> InitHooks {
        InitHooks {
            begin: begin_init::<T>,
            end: end_init::<T>,
        }
    }

    #[inline(always)]
    pub fn begin(&self, instance: &mut dyn Any) {
        (self.begin)(instance)
    }

    #[inline(always)]
    pub fn end(&self, instance: &mut dyn Any) {
        (self.end)(instance)
    }
}

/// Frozen schema descriptor of one type.
///
/// Built by [`TypeSchemaBuilder`] and immutable once registered; it is shared
/// by every concurrent encode and decode of its type.
pub struct TypeSchema {
    key: TypeKey,
    discriminator: String,
    fields: Vec<FieldInfo>,
    id_index: Option<usize>,
    extra_elements: Option<ExtraElementsInfo>,
    creators: Vec<CreatorInfo>,
    names: NameResolver,
    ignore_extra_elements: bool,
    discriminator_is_required: bool,
    is_root_class: bool,
    is_anonymous: bool,
    is_value_type: bool,
    base: Option<TypeKey>,
    new_instance: Option<InstanceFn>,
    init: InitHooks,
    convention: Option<Arc<dyn DiscriminatorConvention>>,
    // computed on registration
    has_root_class: bool,
    discriminator_chain: Vec<String>,
}

impl TypeSchema {
    #[inline(always)]
    pub fn type_key(&self) -> TypeKey {
        self.key
    }

    /// Readable type name used in error messages.
    #[inline(always)]
    pub fn type_name(&self) -> &'static str {
        self.key.short_name()
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    /// Discriminators from the root class of the hierarchy down to this type.
    ///
    /// Holds only this type's discriminator when there is no root class.
    pub fn discriminator_chain(&self) -> &[String] {
        &self.discriminator_chain
    }

    #[inline(always)]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    #[inline(always)]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_index(&self, element_name: &str) -> Option<usize> {
        self.names.resolve(element_name)
    }

    /// Field whose Rust member is named `member_name`.
    pub fn find_member(&self, member_name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.member_name() == member_name)
    }

    #[inline(always)]
    pub fn name_resolver(&self) -> &NameResolver {
        &self.names
    }

    #[inline(always)]
    pub fn id_index(&self) -> Option<usize> {
        self.id_index
    }

    pub fn id_field(&self) -> Option<&FieldInfo> {
        self.id_index.map(|index| &self.fields[index])
    }

    #[inline(always)]
    pub fn extra_elements(&self) -> Option<&ExtraElementsInfo> {
        self.extra_elements.as_ref()
    }

    #[inline(always)]
    pub fn creators(&self) -> &[CreatorInfo] {
        &self.creators
    }

    #[inline(always)]
    pub fn has_creators(&self) -> bool {
        !self.creators.is_empty()
    }

    #[inline(always)]
    pub fn is_ignore_extra_elements(&self) -> bool {
        self.ignore_extra_elements
    }

    #[inline(always)]
    pub fn is_discriminator_required(&self) -> bool {
        self.discriminator_is_required
    }

    #[inline(always)]
    pub fn is_root_class(&self) -> bool {
        self.is_root_class
    }

    /// Whether this type or one of its bases is marked as a hierarchy root.
    #[inline(always)]
    pub fn has_root_class(&self) -> bool {
        self.has_root_class
    }

    #[inline(always)]
    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    #[inline(always)]
    pub fn is_value_type(&self) -> bool {
        self.is_value_type
    }

    /// Abstract types have neither an instance factory nor a creator.
    #[inline(always)]
    pub fn is_abstract(&self) -> bool {
        self.new_instance.is_none() && self.creators.is_empty()
    }

    #[inline(always)]
    pub fn base(&self) -> Option<TypeKey> {
        self.base
    }

    #[inline(always)]
    pub fn init_hooks(&self) -> &InitHooks {
        &self.init
    }

    pub fn discriminator_convention(&self) -> &dyn DiscriminatorConvention {
        match &self.convention {
            Some(convention) => convention.as_ref(),
            None => &DEFAULT_CONVENTION,
        }
    }

    pub(crate) fn explicit_convention(&self) -> Option<&Arc<dyn DiscriminatorConvention>> {
        self.convention.as_ref()
    }

    /// Creates an empty instance for direct assignment.
    pub fn new_instance(&self) -> Result<Box<dyn Any>, Error> {
        match &self.new_instance {
            Some(new_instance) => Ok(new_instance()),
            None => Err(Error::unsupported(format!(
                "Cannot create an instance of abstract type {}",
                self.type_name()
            ))),
        }
    }

    /// Finishes the schema once its base chain is known.
    pub(crate) fn freeze(
        &mut self,
        has_root_class: bool,
        discriminator_chain: Vec<String>,
        inherited_convention: Option<Arc<dyn DiscriminatorConvention>>,
    ) {
        self.has_root_class = has_root_class;
        self.discriminator_chain = discriminator_chain;
        if self.convention.is_none() {
            self.convention = inherited_convention;
        }
    }
}

/// Builds a [`TypeSchema`] for `T`.
///
/// `T` may be unsized, such as `dyn Animal`, to describe an abstract
/// polymorphic root that has no fields of its own.
pub struct TypeSchemaBuilder<T: ?Sized + 'static> {
    key: TypeKey,
    discriminator: Option<String>,
    fields: Vec<FieldInfo>,
    id_index: Option<usize>,
    extra_elements: Option<ExtraElementsInfo>,
    creators: Vec<UnresolvedCreator>,
    ignore_extra_elements: bool,
    discriminator_is_required: bool,
    is_root_class: bool,
    is_anonymous: bool,
    is_value_type: bool,
    base: Option<TypeKey>,
    new_instance: Option<InstanceFn>,
    init: InitHooks,
    convention: Option<Arc<dyn DiscriminatorConvention>>,
    error: Option<Cow<'static, str>>,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + 'static> Default for TypeSchemaBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> TypeSchemaBuilder<T> {
    pub fn new() -> Self {
        TypeSchemaBuilder {
            key: TypeKey::of::<T>(),
            discriminator: None,
            fields: Vec::new(),
            id_index: None,
            extra_elements: None,
            creators: Vec::new(),
            ignore_extra_elements: false,
            discriminator_is_required: false,
            is_root_class: false,
            is_anonymous: false,
            is_value_type: false,
            base: None,
            new_instance: None,
            init: InitHooks::NONE,
            convention: None,
            error: None,
            _marker: PhantomData,
        }
    }

    /// Factory for the empty instance used by direct assignment.
    pub fn new_instance<N>(mut self, new_instance: N) -> Self
    where
        T: Sized,
        N: Fn() -> T + Send + Sync + 'static,
    {
        self.new_instance = Some(Arc::new(move || Box::new(new_instance()) as Box<dyn Any>));
        self
    }

    pub fn field<F: Serializer>(mut self, field: FieldSchema<T, F>) -> Self
    where
        T: Sized,
    {
        self.fields.push(field.into_info());
        self
    }

    /// Adds the identifier field.
    pub fn id_field<F: Serializer>(mut self, field: FieldSchema<T, F>) -> Self
    where
        T: Sized,
    {
        if self.id_index.is_some() {
            self.record_error("declares more than one identifier field");
        }
        self.id_index = Some(self.fields.len());
        self.fields.push(field.into_info());
        self
    }

    /// Declares the overflow member that absorbs unmatched elements.
    ///
    /// It is encoded at its declaration position among the fields.
    pub fn extra_elements<S: Into<Cow<'static, str>>>(
        mut self,
        member_name: S,
        getter: fn(&T) -> &Option<Document>,
        getter_mut: fn(&mut T) -> &mut Option<Document>,
    ) -> Self
    where
        T: Sized,
    {
        if self.extra_elements.is_some() {
            self.record_error("declares more than one extra elements member");
        }
        self.extra_elements = Some(ExtraElementsInfo {
            member_name: member_name.into(),
            position: self.fields.len(),
            accessor: Box::new(ExtraAccessor { getter, getter_mut }),
        });
        self
    }

    pub fn creator(mut self, creator: CreatorSchema<T>) -> Self
    where
        T: Sized,
    {
        self.creators.push(creator.erase());
        self
    }

    pub fn ignore_extra_elements(mut self, ignore: bool) -> Self {
        self.ignore_extra_elements = ignore;
        self
    }

    /// Discriminator value of this type; defaults to the short type name.
    pub fn discriminator<S: Into<String>>(mut self, discriminator: S) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    pub fn discriminator_is_required(mut self, required: bool) -> Self {
        self.discriminator_is_required = required;
        self
    }

    /// Marks this type as the root of a polymorphic hierarchy.
    pub fn root_class(mut self) -> Self {
        self.is_root_class = true;
        self
    }

    /// Declares the nominal base type this type can be decoded as.
    pub fn base<B: ?Sized + 'static>(mut self) -> Self {
        self.base = Some(TypeKey::of::<B>());
        self
    }

    /// Anonymous shapes never carry a discriminator.
    pub fn anonymous(mut self) -> Self {
        self.is_anonymous = true;
        self
    }

    /// Value-shaped types can be encoded but never decoded by a struct codec.
    pub fn value_type(mut self) -> Self {
        self.is_value_type = true;
        self
    }

    pub fn supports_initialize(mut self) -> Self
    where
        T: SupportInitialize + Sized,
    {
        self.init = InitHooks::of::<T>();
        self
    }

    pub fn discriminator_convention(mut self, convention: Arc<dyn DiscriminatorConvention>) -> Self {
        self.convention = Some(convention);
        self
    }

    fn record_error(&mut self, message: &str) {
        if self.error.is_none() {
            self.error = Some(format!("Type {} {message}", self.key).into());
        }
    }

    pub fn build(self) -> Result<TypeSchema, Error> {
        if let Some(error) = self.error {
            return Err(Error::invalid_schema(error));
        }
        let names = NameResolver::from_names(
            self.fields
                .iter()
                .enumerate()
                .map(|(index, field)| (field.element_name(), index)),
        )
        .map_err(|e| Error::invalid_schema(format!("Type {}: {e}", self.key)))?;
        let creators = self
            .creators
            .into_iter()
            .map(|creator| creator.resolve(&names, self.key))
            .collect::<Result<Vec<_>, Error>>()?;
        let has_members = !self.fields.is_empty() || self.extra_elements.is_some();
        if has_members && self.new_instance.is_none() && creators.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Type {} has fields but neither an instance factory nor a creator",
                self.key
            )));
        }
        let discriminator = self
            .discriminator
            .unwrap_or_else(|| self.key.short_name().to_string());
        Ok(TypeSchema {
            key: self.key,
            discriminator_chain: vec![discriminator.clone()],
            discriminator,
            fields: self.fields,
            id_index: self.id_index,
            extra_elements: self.extra_elements,
            creators,
            names,
            ignore_extra_elements: self.ignore_extra_elements,
            discriminator_is_required: self.discriminator_is_required,
            is_root_class: self.is_root_class,
            is_anonymous: self.is_anonymous,
            is_value_type: self.is_value_type,
            base: self.base,
            new_instance: self.new_instance,
            init: self.init,
            convention: self.convention,
            has_root_class: self.is_root_class,
        })
    }
}

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

/// Implements [`Serializer`](crate::serializer::Serializer) for `Box<dyn Trait>`.
///
/// The trait must have [`AsAny`](crate::serializer::AsAny) as a supertrait,
/// and `dyn Trait` must be registered as the nominal root of the hierarchy,
/// usually as an abstract schema with no fields. Values are encoded through
/// the codec of their runtime type with a discriminator; decoded instances are
/// downcast to each listed implementation in turn.
///
/// ```ignore
/// trait Animal: AsAny {}
///
/// docmap_core::polymorphic_serializer!(Animal; Dog, Cat);
/// ```
#[macro_export]
macro_rules! polymorphic_serializer {
    ($trait_name:ident; $($impl_type:ty),+ $(,)?) => {
        impl $crate::serializer::Serializer for Box<dyn $trait_name> {
            fn write(
                &self,
                context: &mut $crate::resolver::context::WriteContext,
            ) -> ::std::result::Result<(), $crate::error::Error> {
                let any_ref = $crate::serializer::AsAny::as_any(&**self);
                context.write_class($crate::types::TypeKey::of::<dyn $trait_name>(), Some(any_ref))
            }

            fn read(
                context: &mut $crate::resolver::context::ReadContext,
            ) -> ::std::result::Result<Self, $crate::error::Error> {
                let nominal = $crate::types::TypeKey::of::<dyn $trait_name>();
                let Some(instance) = context.read_class(nominal)? else {
                    return Err($crate::error::Error::invalid_data(format!(
                        "Null where {} was expected; use Option<Box<dyn {}>>",
                        nominal,
                        stringify!($trait_name),
                    )));
                };
                $crate::downcast_trait_object!(instance, $trait_name, $($impl_type),+)
            }
        }
    };
}

/// Downcasts a decoded `Box<dyn Any>` to the first matching implementation.
#[doc(hidden)]
#[macro_export]
macro_rules! downcast_trait_object {
    ($instance:expr, $trait_name:ident, $($impl_type:ty),+) => {{
        let instance: Box<dyn ::std::any::Any> = $instance;
        $(
            let instance = match instance.downcast::<$impl_type>() {
                Ok(concrete) => return Ok(concrete as Box<dyn $trait_name>),
                Err(other) => other,
            };
        )+
        drop(instance);
        Err($crate::error::Error::type_error(format!(
            "Decoded instance is none of the implementations listed for dyn {}",
            stringify!($trait_name),
        )))
    }};
}

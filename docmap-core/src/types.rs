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

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::Error;

/// Tag byte that prefixes every value on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum WireType {
    EndOfDocument = 0x00,
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Boolean = 0x08,
    DateTime = 0x09,
    Null = 0x0A,
    Int32 = 0x10,
    Int64 = 0x12,
}

impl WireType {
    #[inline(always)]
    pub fn from_tag(tag: u8) -> Result<WireType, Error> {
        WireType::try_from(tag)
            .map_err(|_| Error::invalid_data(format!("Invalid wire tag 0x{tag:02x}")))
    }

    /// Whether values of this type are themselves element containers.
    #[inline(always)]
    pub fn is_container(self) -> bool {
        matches!(self, WireType::Document | WireType::Array)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum BinarySubtype {
    Generic = 0x00,
    Function = 0x01,
    Uuid = 0x04,
    Md5 = 0x05,
    Encrypted = 0x06,
    UserDefined = 0x80,
}

impl BinarySubtype {
    #[inline(always)]
    pub fn from_byte(byte: u8) -> Result<BinarySubtype, Error> {
        BinarySubtype::try_from(byte)
            .map_err(|_| Error::invalid_data(format!("Invalid binary subtype 0x{byte:02x}")))
    }
}

/// Element name used by discriminator conventions unless configured otherwise.
pub const DEFAULT_DISCRIMINATOR_ELEMENT: &str = "_t";

/// Identity of a registered type: the Rust `TypeId` plus a readable name for errors.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: std::any::TypeId,
    name: &'static str,
}

impl TypeKey {
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> TypeKey {
        TypeKey {
            id: std::any::TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[inline(always)]
    pub fn id(&self) -> std::any::TypeId {
        self.id
    }

    /// Full path of the type, as reported by `std::any::type_name`.
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, with generics kept.
    pub fn short_name(&self) -> &'static str {
        crate::util::short_type_name(self.name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

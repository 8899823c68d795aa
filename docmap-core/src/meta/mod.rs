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

//! Frozen, per-type schema descriptors and the builders that produce them.

mod creator;
mod field_schema;
mod id_generator;
mod name_resolver;
mod type_schema;

pub use creator::{CreatorArgs, CreatorInfo, CreatorSchema};
pub use field_schema::{
    ExtraElementsAccessor, ExtraElementsInfo, FieldInfo, FieldSchema, MemberAccessor,
};
pub use id_generator::{IdGenerator, UuidStringGenerator};
pub use name_resolver::{NameResolver, NameWalk};
pub use type_schema::{InitHooks, SupportInitialize, TypeSchema, TypeSchemaBuilder};

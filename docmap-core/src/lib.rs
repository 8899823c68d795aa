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

//! # Docmap Core
//!
//! Schema-driven class-map codec between typed Rust instances and a
//! self-describing, BSON-shaped binary document format.
//!
//! ## Architecture
//!
//! - **`docmap`**: the [`Docmap`] entry point (`serialize`/`deserialize`,
//!   document identifiers)
//! - **`meta`**: frozen per-type schemas built with [`TypeSchemaBuilder`]
//! - **`resolver`**: the [`TypeResolver`] registry, discriminator conventions
//!   and the per-call read/write contexts
//! - **`serializer`**: the [`Serializer`] value-codec trait, builtin codecs and
//!   the [`StructCodec`](serializer::StructCodec) that maps classes to documents
//! - **`io`**: token-level reader and writer of the document format
//! - **`buffer`**: little-endian byte buffers
//! - **`value`**: the dynamic [`Value`]/[`Document`] tree used for overflow elements
//! - **`types`**: wire tags and [`TypeKey`]
//! - **`error`**: the crate [`Error`]
//!
//! ## Key Concepts
//!
//! ### Schemas
//!
//! Every class is described once by a [`TypeSchema`]: an ordered list of
//! fields with wire names and accessors, an optional identifier field, an
//! optional overflow member, and optional creators for types that are built
//! through a constructor. Schemas are immutable after registration and are
//! shared by all concurrent calls.
//!
//! ### Construction
//!
//! Types without creators are decoded by assigning each field on a fresh
//! instance as its element arrives. Types with creators buffer every decoded
//! value, pick the satisfiable creator that consumes the most of them, and
//! assign the leftovers through setters.
//!
//! ### Polymorphism
//!
//! A value encoded where a base type is expected carries a discriminator
//! element (`_t` by default). Decoding looks ahead for it and redirects to the
//! codec of the registered descendant it names.
//!
//! ## Usage
//!
//! ```rust
//! use docmap_core::meta::{FieldSchema, TypeSchemaBuilder};
//! use docmap_core::Docmap;
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//! docmap_core::class_serializer!(Person);
//!
//! let docmap = Docmap::default();
//! let schema = TypeSchemaBuilder::<Person>::new()
//!     .new_instance(Person::default)
//!     .field(FieldSchema::new("name", |p: &Person| &p.name, |p, v| p.name = v).required())
//!     .field(FieldSchema::new("age", |p: &Person| &p.age, |p, v| p.age = v).default_value(0))
//!     .build()
//!     .unwrap();
//! docmap.register(schema).unwrap();
//!
//! let ann = Person { name: "Ann".to_string(), age: 41 };
//! let bytes = docmap.serialize(&ann).unwrap();
//! assert_eq!(docmap.deserialize::<Person>(&bytes).unwrap(), ann);
//! ```

pub mod buffer;
pub mod config;
pub mod docmap;
pub mod error;
pub mod io;
pub mod meta;
pub mod resolver;
pub mod serializer;
pub mod types;
pub mod util;
pub mod value;

pub use crate::config::Config;
pub use crate::docmap::{Docmap, DocumentId, SerializationInfo};
pub use crate::error::Error;
pub use crate::meta::{CreatorSchema, FieldSchema, TypeSchema, TypeSchemaBuilder};
pub use crate::resolver::TypeResolver;
pub use crate::serializer::{AsAny, Serializer};
pub use crate::types::{TypeKey, WireType};
pub use crate::value::{Document, Value};

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

//! # Docmap
//!
//! Docmap maps typed Rust instances to self-describing binary documents and
//! back, driven by an explicit per-type schema.
//!
//! ## Key Features
//!
//! - **Order-independent decoding**: elements are matched by name, in any order
//! - **Schema drift**: unknown elements go to an overflow member, are skipped,
//!   or fail the decode, per type
//! - **Validation**: required fields and defaults are checked after each document
//! - **Immutable types**: creators build instances from the decoded values
//! - **Polymorphism**: discriminators select the registered descendant to decode
//!
//! ## Classes
//!
//! ```rust
//! use docmap::{Docmap, Document, Error, FieldSchema, TypeSchemaBuilder, Value};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Person {
//!     id: Option<String>,
//!     name: String,
//!     age: i32,
//!     extra: Option<Document>,
//! }
//! docmap::class_serializer!(Person);
//!
//! # fn main() -> Result<(), Error> {
//! let docmap = Docmap::default();
//! docmap.register(
//!     TypeSchemaBuilder::<Person>::new()
//!         .new_instance(Person::default)
//!         .id_field(FieldSchema::new("_id", |p: &Person| &p.id, |p, v| p.id = v))
//!         .field(FieldSchema::new("name", |p: &Person| &p.name, |p, v| p.name = v).required())
//!         .field(FieldSchema::new("age", |p: &Person| &p.age, |p, v| p.age = v).default_value(0))
//!         .extra_elements("extra", |p: &Person| &p.extra, |p| &mut p.extra)
//!         .build()?,
//! )?;
//!
//! let bytes = Document::new()
//!     .with("name", "Ann")
//!     .with("nickname", "A.")
//!     .to_bytes()?;
//! let ann: Person = docmap.deserialize(&bytes)?;
//! assert_eq!(ann.id, None);
//! assert_eq!(ann.age, 0);
//! assert_eq!(
//!     ann.extra.as_ref().and_then(|e| e.get("nickname")),
//!     Some(&Value::from("A."))
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Polymorphism
//!
//! Register the nominal base first, then every descendant with
//! [`TypeSchemaBuilder::base`]. Trait objects are encoded through
//! [`polymorphic_serializer!`], which uses `dyn Trait` as the nominal type.

pub use docmap_core::{
    class_serializer,
    config::Config,
    docmap::{Docmap, DocumentId, SerializationInfo},
    error::Error,
    meta::{
        CreatorArgs, CreatorSchema, FieldSchema, IdGenerator, SupportInitialize, TypeSchema,
        TypeSchemaBuilder, UuidStringGenerator,
    },
    polymorphic_serializer,
    resolver::{
        DiscriminatorConvention, HierarchicalDiscriminatorConvention,
        ScalarDiscriminatorConvention, TypeResolver,
    },
    serializer::{AsAny, Serializer},
    types::{TypeKey, WireType},
    value::{Document, Value},
};

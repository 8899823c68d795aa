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

//! Models and helpers shared by the integration tests.

use std::fmt::Debug;
use std::sync::Arc;

use docmap::{
    Docmap, Document, FieldSchema, Serializer, TypeSchema, TypeSchemaBuilder,
    UuidStringGenerator,
};

/// Encodes `value` and decodes it back.
pub fn roundtrip<T>(docmap: &Docmap, value: &T) -> T
where
    T: Serializer + Debug,
{
    let bytes = docmap.serialize(value).unwrap();
    docmap.deserialize(&bytes).unwrap()
}

/// Asserts that `value` survives an encode/decode cycle unchanged.
pub fn assert_roundtrip<T>(docmap: &Docmap, value: T)
where
    T: Serializer + PartialEq + Debug,
{
    assert_eq!(roundtrip(docmap, &value), value);
}

/// A `Docmap` with a private resolver holding `schemas`, registered in order.
pub fn docmap_with<I>(schemas: I) -> Docmap
where
    I: IntoIterator<Item = TypeSchema>,
{
    let docmap = Docmap::default();
    for schema in schemas {
        docmap.register(schema).unwrap();
    }
    docmap
}

/// Encodes `doc` as a root document.
pub fn bytes_of(doc: Document) -> Vec<u8> {
    doc.to_bytes().unwrap()
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Person {
    pub id: Option<String>,
    pub name: String,
    pub age: i32,
}

docmap::class_serializer!(Person);

impl Person {
    pub fn new(name: &str, age: i32) -> Person {
        Person {
            id: None,
            name: name.to_string(),
            age,
        }
    }

    /// `{_id: string (identifier), name: string (required), age: int (default 0)}`
    pub fn schema() -> TypeSchema {
        TypeSchemaBuilder::<Person>::new()
            .new_instance(Person::default)
            .id_field(
                FieldSchema::new("_id", |p: &Person| &p.id, |p, v| p.id = v)
                    .member_name("id")
                    .ignore_if_null()
                    .id_generator(Arc::new(UuidStringGenerator)),
            )
            .field(FieldSchema::new("name", |p: &Person| &p.name, |p, v| p.name = v).required())
            .field(FieldSchema::new("age", |p: &Person| &p.age, |p, v| p.age = v).default_value(0))
            .build()
            .unwrap()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
}

docmap::class_serializer!(Address);

impl Address {
    pub fn schema() -> TypeSchema {
        TypeSchemaBuilder::<Address>::new()
            .new_instance(Address::default)
            .field(FieldSchema::new("street", |a: &Address| &a.street, |a, v| a.street = v))
            .field(FieldSchema::new("city", |a: &Address| &a.city, |a, v| a.city = v))
            .build()
            .unwrap()
    }
}

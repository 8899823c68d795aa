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

use std::sync::Arc;

use docmap::{Error, FieldSchema, TypeKey, TypeSchemaBuilder, UuidStringGenerator};
use tests::{docmap_with, Address, Person};

#[derive(Debug, Default, Clone, PartialEq)]
struct Counter {
    id: i64,
    hits: i32,
}

docmap::class_serializer!(Counter);

#[derive(Debug, Default, Clone, PartialEq)]
struct Tag {
    id: String,
}

docmap::class_serializer!(Tag);

fn id_docmap() -> docmap::Docmap {
    docmap_with([
        Person::schema(),
        Address::schema(),
        TypeSchemaBuilder::<Counter>::new()
            .new_instance(Counter::default)
            .id_field(FieldSchema::new("_id", |c: &Counter| &c.id, |c, v| c.id = v))
            .field(FieldSchema::new("hits", |c: &Counter| &c.hits, |c, v| c.hits = v))
            .build()
            .unwrap(),
        TypeSchemaBuilder::<Tag>::new()
            .new_instance(Tag::default)
            .value_type()
            .id_field(
                FieldSchema::new("_id", |t: &Tag| &t.id, |t, v| t.id = v)
                    .id_generator(Arc::new(UuidStringGenerator)),
            )
            .build()
            .unwrap(),
    ])
}

#[test]
fn test_document_id() {
    let docmap = id_docmap();
    let mut person = Person::new("Ann", 30);
    person.id = Some("p-1".to_string());

    let id = docmap.document_id(&person).unwrap();
    assert_eq!(id.id_type, TypeKey::of::<Option<String>>());
    assert_eq!(
        id.id.downcast_ref::<Option<String>>(),
        Some(&Some("p-1".to_string()))
    );
    assert!(id.generator.is_some());

    let counter = Counter { id: 7, hits: 1 };
    let id = docmap.document_id(&counter).unwrap();
    assert_eq!(id.id.downcast_ref::<i64>(), Some(&7));
    assert!(id.generator.is_none());
}

#[test]
fn test_set_document_id() {
    let docmap = id_docmap();
    let mut counter = Counter::default();
    docmap.set_document_id(&mut counter, Box::new(42i64)).unwrap();
    assert_eq!(counter.id, 42);

    let err = docmap
        .set_document_id(&mut counter, Box::new("42".to_string()))
        .unwrap_err();
    assert!(matches!(err, Error::TypeError(_)), "{err:?}");
    assert_eq!(counter.id, 42);
}

#[test]
fn test_ensure_document_id() {
    let docmap = id_docmap();
    let mut person = Person::new("Ann", 30);
    assert!(docmap.ensure_document_id(&mut person).unwrap());
    let generated = person.id.clone().unwrap();
    assert!(uuid::Uuid::parse_str(&generated).is_ok());

    assert!(!docmap.ensure_document_id(&mut person).unwrap());
    assert_eq!(person.id.as_deref(), Some(generated.as_str()));

    person.id = Some(String::new());
    assert!(docmap.ensure_document_id(&mut person).unwrap());
    assert_ne!(person.id.as_deref(), Some(""));
}

#[test]
fn test_ensure_document_id_without_generator() {
    let docmap = id_docmap();
    let mut counter = Counter::default();
    assert!(!docmap.ensure_document_id(&mut counter).unwrap());
    assert_eq!(counter.id, 0);
}

#[test]
fn test_generated_id_is_serialized() {
    let docmap = id_docmap();
    let mut person = Person::new("Ann", 30);
    docmap.ensure_document_id(&mut person).unwrap();
    let decoded: Person = docmap
        .deserialize(&docmap.serialize(&person).unwrap())
        .unwrap();
    assert_eq!(decoded, person);
}

#[test]
fn test_missing_identifier() {
    let docmap = id_docmap();
    let mut address = Address::default();
    assert!(matches!(
        docmap.document_id(&address),
        Err(Error::MissingIdentifier(_))
    ));
    assert!(matches!(
        docmap.set_document_id(&mut address, Box::new(1i64)),
        Err(Error::MissingIdentifier(_))
    ));
    assert!(matches!(
        docmap.ensure_document_id(&mut address),
        Err(Error::MissingIdentifier(_))
    ));
}

#[test]
fn test_value_type_is_not_object_shaped() {
    let docmap = id_docmap();
    let mut tag = Tag::default();
    assert!(matches!(
        docmap.set_document_id(&mut tag, Box::new("x".to_string())),
        Err(Error::NotObjectShaped(_))
    ));
    assert!(matches!(
        docmap.ensure_document_id(&mut tag),
        Err(Error::NotObjectShaped(_))
    ));
    assert!(tag.id.is_empty());
}

#[test]
fn test_unregistered_instance() {
    let docmap = id_docmap();
    let err = docmap.document_id(&3.5f64).err().unwrap();
    assert!(matches!(err, Error::TypeError(_)), "{err:?}");
}

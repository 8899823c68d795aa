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

use chrono::NaiveDate;
use docmap::{CreatorSchema, Document, Error, FieldSchema, TypeSchemaBuilder, Value};
use docmap_core::types::BinarySubtype;
use tests::{assert_roundtrip, bytes_of, docmap_with};

#[derive(Debug, Default, Clone, PartialEq)]
struct Contact {
    name: String,
    extra: Option<Document>,
    email: String,
}

docmap::class_serializer!(Contact);

fn contact_docmap() -> docmap::Docmap {
    docmap_with([TypeSchemaBuilder::<Contact>::new()
        .new_instance(Contact::default)
        .field(FieldSchema::new("name", |c: &Contact| &c.name, |c, v| c.name = v))
        .extra_elements("extra", |c: &Contact| &c.extra, |c| &mut c.extra)
        .field(FieldSchema::new("email", |c: &Contact| &c.email, |c, v| c.email = v))
        .build()
        .unwrap()])
}

#[test]
fn test_unmatched_elements_collected() {
    let docmap = contact_docmap();
    let doc = Document::new()
        .with("phone", "555-0100")
        .with("name", "Hal")
        .with("nested", Document::new().with("a", 1))
        .with("email", "hal@example.com");
    let contact: Contact = docmap.deserialize(&bytes_of(doc)).unwrap();
    assert_eq!(contact.name, "Hal");
    assert_eq!(contact.email, "hal@example.com");
    let extra = contact.extra.unwrap();
    assert_eq!(extra.names().collect::<Vec<_>>(), vec!["phone", "nested"]);
    assert_eq!(extra.get("phone"), Some(&Value::from("555-0100")));
    assert_eq!(
        extra.get("nested"),
        Some(&Value::Document(Document::new().with("a", 1)))
    );
}

#[test]
fn test_no_unmatched_elements() {
    let docmap = contact_docmap();
    let doc = Document::new().with("name", "Ida").with("email", "ida@example.com");
    let contact: Contact = docmap.deserialize(&bytes_of(doc)).unwrap();
    assert_eq!(contact.extra, None);
    assert_roundtrip(&docmap, contact);
}

#[test]
fn test_extra_elements_written_inline_at_position() {
    let docmap = contact_docmap();
    let contact = Contact {
        name: "Jo".to_string(),
        extra: Some(Document::new().with("phone", "1").with("score", 2.5)),
        email: "jo@example.com".to_string(),
    };
    let doc = Document::from_bytes(&docmap.serialize(&contact).unwrap()).unwrap();
    assert_eq!(
        doc.names().collect::<Vec<_>>(),
        vec!["name", "phone", "score", "email"]
    );
    assert!(!doc.contains_key("extra"));
    assert_roundtrip(&docmap, contact);
}

#[test]
fn test_extra_values_keep_their_wire_types() {
    let docmap = contact_docmap();
    let at = NaiveDate::from_ymd_opt(1999, 12, 31)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap();
    let extra = Document::new()
        .with("big", 1i64)
        .with("small", 1i32)
        .with("at", at)
        .with("blob", Value::Binary(BinarySubtype::Md5, vec![1, 2, 3]))
        .with("none", Value::Null)
        .with("list", vec![Value::from(true), Value::from("x")]);
    let contact = Contact {
        name: "Kim".to_string(),
        extra: Some(extra.clone()),
        email: String::new(),
    };
    let decoded: Contact = docmap
        .deserialize(&docmap.serialize(&contact).unwrap())
        .unwrap();
    assert_eq!(decoded.extra, Some(extra));
}

#[test]
fn test_discriminator_element_not_collected() {
    let docmap = contact_docmap();
    let doc = Document::new()
        .with("_t", "Contact")
        .with("name", "Lou")
        .with("email", "");
    let contact: Contact = docmap.deserialize(&bytes_of(doc)).unwrap();
    assert_eq!(contact.extra, None);
}

#[derive(Debug, Clone, PartialEq)]
struct Settings {
    version: i32,
    rest: Option<Document>,
}

docmap::class_serializer!(Settings);

#[test]
fn test_creator_takes_extra_elements() {
    let docmap = docmap_with([TypeSchemaBuilder::<Settings>::new()
        .field(FieldSchema::read_only("version", |s: &Settings| &s.version))
        .extra_elements("rest", |s: &Settings| &s.rest, |s| &mut s.rest)
        .creator(CreatorSchema::new(["version"], |args| {
            Ok(Settings {
                version: args.take("version")?,
                rest: args.take_extra_elements(),
            })
        }))
        .build()
        .unwrap()]);
    let doc = Document::new().with("theme", "dark").with("version", 2);
    let settings: Settings = docmap.deserialize(&bytes_of(doc)).unwrap();
    assert_eq!(settings.version, 2);
    assert_eq!(settings.rest, Some(Document::new().with("theme", "dark")));
    assert_roundtrip(&docmap, settings);
}

#[test]
fn test_extra_elements_assigned_after_creator() {
    let docmap = docmap_with([TypeSchemaBuilder::<Settings>::new()
        .field(FieldSchema::read_only("version", |s: &Settings| &s.version))
        .extra_elements("rest", |s: &Settings| &s.rest, |s| &mut s.rest)
        .creator(CreatorSchema::new(["version"], |args| {
            Ok(Settings {
                version: args.take("version")?,
                rest: None,
            })
        }))
        .build()
        .unwrap()]);
    let doc = Document::new()
        .with("version", 3)
        .with("a", 1)
        .with("b", Value::Null);
    let settings: Settings = docmap.deserialize(&bytes_of(doc)).unwrap();
    assert_eq!(
        settings.rest,
        Some(Document::new().with("a", 1).with("b", Value::Null))
    );
}

/// `{name: "Hal", x: [[..[]..]]}` with `levels` nested arrays under `x`.
fn contact_with_nested_arrays(levels: usize) -> Vec<u8> {
    let mut arrays = Vec::with_capacity(levels * 8);
    for k in (1..levels).rev() {
        arrays.extend_from_slice(&(5 + 8 * k as i32).to_le_bytes());
        arrays.extend_from_slice(&[0x04, b'0', 0]);
    }
    arrays.extend_from_slice(&[5, 0, 0, 0, 0]);
    arrays.resize(arrays.len() + levels - 1, 0);

    let mut body = vec![0x02];
    body.extend_from_slice(b"name\0");
    body.extend_from_slice(&4i32.to_le_bytes());
    body.extend_from_slice(b"Hal\0");
    body.extend_from_slice(&[0x04, b'x', 0]);
    body.extend_from_slice(&arrays);
    body.push(0);

    let mut bytes = ((body.len() + 4) as i32).to_le_bytes().to_vec();
    bytes.extend_from_slice(&body);
    bytes
}

#[test]
fn test_nested_extra_elements_within_depth() {
    let docmap = contact_docmap();
    let contact: Contact = docmap.deserialize(&contact_with_nested_arrays(10)).unwrap();
    assert_eq!(contact.name, "Hal");
    let mut value = contact.extra.unwrap().get("x").cloned().unwrap();
    let mut levels = 1;
    while let Value::Array(mut values) = value {
        match values.pop() {
            Some(inner) => {
                levels += 1;
                value = inner;
            }
            None => break,
        }
    }
    assert_eq!(levels, 10);
}

#[test]
fn test_nested_extra_elements_exceed_max_depth() {
    let docmap = contact_docmap();
    let err = docmap
        .deserialize::<Contact>(&contact_with_nested_arrays(100))
        .unwrap_err();
    match &err {
        Error::MemberDecodeFailure { member, .. } => assert_eq!(member, "extra"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(matches!(err.root_cause(), Error::DepthExceed(_)), "{err:?}");

    let shallow = contact_docmap().max_depth(8);
    let err = shallow
        .deserialize::<Contact>(&contact_with_nested_arrays(10))
        .unwrap_err();
    assert!(matches!(err.root_cause(), Error::DepthExceed(_)), "{err:?}");
}

#[test]
fn test_deeply_nested_input_returns_error() {
    let bytes = contact_with_nested_arrays(200_000);
    let err = contact_docmap().deserialize::<Contact>(&bytes).unwrap_err();
    assert!(matches!(err.root_cause(), Error::DepthExceed(_)), "{err:?}");
    let err = Document::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)), "{err:?}");
}

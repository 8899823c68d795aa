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

use docmap::{Document, Error, FieldSchema, TypeKey, TypeSchemaBuilder, Value};
use tests::{bytes_of, docmap_with, Address, Person};

#[derive(Debug, Default, Clone, PartialEq)]
struct Money {
    cents: i64,
    currency: String,
}

docmap::class_serializer!(Money);

#[derive(Debug, Default, Clone, PartialEq)]
struct Invoice {
    total: Option<Money>,
    billing: Option<Address>,
}

docmap::class_serializer!(Invoice);

fn invoice_docmap() -> docmap::Docmap {
    docmap_with([
        Address::schema(),
        TypeSchemaBuilder::<Money>::new()
            .new_instance(Money::default)
            .value_type()
            .field(FieldSchema::new("cents", |m: &Money| &m.cents, |m, v| m.cents = v))
            .field(FieldSchema::new("currency", |m: &Money| &m.currency, |m, v| m.currency = v))
            .build()
            .unwrap(),
        TypeSchemaBuilder::<Invoice>::new()
            .new_instance(Invoice::default)
            .field(FieldSchema::new("total", |i: &Invoice| &i.total, |i, v| i.total = v))
            .field(FieldSchema::new("billing", |i: &Invoice| &i.billing, |i, v| i.billing = v))
            .build()
            .unwrap(),
    ])
}

#[test]
fn test_null_root() {
    let docmap = docmap_with([Person::schema()]);
    let bytes = docmap.serialize(&None::<Person>).unwrap();
    assert_eq!(bytes, vec![0x0A]);
    assert_eq!(docmap.deserialize::<Option<Person>>(&bytes).unwrap(), None);

    let bytes = docmap.serialize_dyn(None, TypeKey::of::<Person>()).unwrap();
    assert_eq!(bytes, vec![0x0A]);
    assert!(docmap
        .deserialize_dyn(&bytes, TypeKey::of::<Person>())
        .unwrap()
        .is_none());
}

#[test]
fn test_null_for_required_instance() {
    let docmap = docmap_with([Person::schema()]);
    let bytes = docmap.serialize(&None::<Person>).unwrap();
    let err = docmap.deserialize::<Person>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err:?}");
}

#[test]
fn test_null_members() {
    let docmap = invoice_docmap();
    let bytes = docmap.serialize(&Invoice::default()).unwrap();
    let doc = Document::from_bytes(&bytes).unwrap();
    assert_eq!(doc.get("total"), Some(&Value::Null));
    assert_eq!(doc.get("billing"), Some(&Value::Null));
    assert_eq!(docmap.deserialize::<Invoice>(&bytes).unwrap(), Invoice::default());
}

#[test]
fn test_value_type_encodes() {
    let docmap = invoice_docmap();
    let invoice = Invoice {
        total: Some(Money {
            cents: 1250,
            currency: "EUR".to_string(),
        }),
        billing: None,
    };
    let doc = Document::from_bytes(&docmap.serialize(&invoice).unwrap()).unwrap();
    let total = doc.get("total").and_then(Value::as_document).unwrap();
    assert_eq!(total.get("cents"), Some(&Value::Int64(1250)));
    assert_eq!(total.get("currency"), Some(&Value::from("EUR")));
}

#[test]
fn test_value_type_cannot_be_decoded() {
    let docmap = invoice_docmap();
    let money = Money {
        cents: 5,
        currency: "USD".to_string(),
    };
    let bytes = docmap.serialize(&money).unwrap();
    let err = docmap.deserialize::<Money>(&bytes).unwrap_err();
    assert!(matches!(err, Error::UnsupportedValueType(_)), "{err:?}");

    let bytes = docmap.serialize_dyn(None, TypeKey::of::<Money>()).unwrap();
    let err = docmap
        .deserialize_dyn(&bytes, TypeKey::of::<Money>())
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedValueType(_)), "{err:?}");

    let doc = Document::new()
        .with("total", Document::new().with("cents", 1i64).with("currency", "USD"))
        .with("billing", Value::Null);
    let err = docmap.deserialize::<Invoice>(&bytes_of(doc)).unwrap_err();
    assert!(
        matches!(err.root_cause(), Error::UnsupportedValueType(_)),
        "{err:?}"
    );
}

#[test]
fn test_null_value_type_member_is_none() {
    let docmap = invoice_docmap();
    let doc = Document::new()
        .with("total", Value::Null)
        .with("billing", Document::new().with("street", "Main").with("city", "Oslo"));
    let invoice: Invoice = docmap.deserialize(&bytes_of(doc)).unwrap();
    assert_eq!(invoice.total, None);
    assert_eq!(invoice.billing.unwrap().city, "Oslo");
}

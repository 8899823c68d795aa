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

use docmap::{Document, Error, FieldSchema, TypeSchema, TypeSchemaBuilder, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tests::{bytes_of, docmap_with};

macro_rules! wide {
    ($($field:ident),+ $(,)?) => {
        #[derive(Debug, Default, Clone, PartialEq)]
        struct Wide {
            $($field: i32),+
        }

        docmap::class_serializer!(Wide);

        const FIELDS: &[&str] = &[$(stringify!($field)),+];

        /// Every field defaults to -1; `required` names fields without a default.
        fn wide_schema(required: &[&str]) -> TypeSchema {
            TypeSchemaBuilder::<Wide>::new()
                .new_instance(Wide::default)
                $(.field({
                    let field = FieldSchema::new(
                        stringify!($field),
                        |w: &Wide| &w.$field,
                        |w, v| w.$field = v,
                    );
                    if required.contains(&stringify!($field)) {
                        field.required()
                    } else {
                        field.default_value(-1)
                    }
                }))+
                .build()
                .unwrap()
        }
    };
}

wide!(
    f0, f1, f2, f3, f4, f5, f6, f7, f8, f9, f10, f11, f12, f13, f14, f15, f16, f17, f18, f19,
    f20, f21, f22, f23, f24, f25, f26, f27, f28, f29, f30, f31, f32, f33, f34, f35, f36, f37,
    f38, f39, f40, f41, f42, f43, f44, f45, f46, f47, f48, f49, f50, f51, f52, f53, f54, f55,
    f56, f57, f58, f59, f60, f61, f62, f63, f64, f65, f66, f67, f68, f69,
);

fn encode_back(docmap: &docmap::Docmap, wide: &Wide) -> Document {
    Document::from_bytes(&docmap.serialize(wide).unwrap()).unwrap()
}

#[test]
fn test_random_subsets_get_defaults() {
    let docmap = docmap_with([wide_schema(&[])]);
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..50 {
        let present: Vec<bool> = FIELDS.iter().map(|_| rng.gen_bool(0.5)).collect();
        let mut doc = Document::new();
        for (index, name) in FIELDS.iter().enumerate() {
            if present[index] {
                doc.insert(*name, index as i32);
            }
        }
        let wide: Wide = docmap.deserialize(&bytes_of(doc)).unwrap();
        let back = encode_back(&docmap, &wide);
        for (index, name) in FIELDS.iter().enumerate() {
            let expected = if present[index] { index as i32 } else { -1 };
            assert_eq!(back.get(name), Some(&Value::Int32(expected)), "field {name}");
        }
    }
}

#[test]
fn test_shuffled_elements() {
    let docmap = docmap_with([wide_schema(&[])]);
    let mut rng = StdRng::seed_from_u64(17);
    let mut order: Vec<usize> = (0..FIELDS.len()).collect();
    for i in (1..order.len()).rev() {
        order.swap(i, rng.gen_range(0..=i));
    }
    let mut doc = Document::new();
    for index in order {
        doc.insert(FIELDS[index], index as i32 * 10);
    }
    let wide: Wide = docmap.deserialize(&bytes_of(doc)).unwrap();
    assert_eq!(wide.f0, 0);
    assert_eq!(wide.f31, 310);
    assert_eq!(wide.f32, 320);
    assert_eq!(wide.f69, 690);
}

#[test]
fn test_missing_required_past_word_boundary() {
    let docmap = docmap_with([wide_schema(&["f33", "f64"])]);
    let mut doc = Document::new();
    for name in FIELDS.iter().filter(|name| **name != "f64") {
        doc.insert(*name, 1);
    }
    let err = docmap.deserialize::<Wide>(&bytes_of(doc)).unwrap_err();
    assert!(
        matches!(&err, Error::RequiredFieldMissing { element, .. } if element == "f64"),
        "{err:?}"
    );
}

#[test]
fn test_first_missing_required_is_reported() {
    let docmap = docmap_with([wide_schema(&["f5", "f40", "f69"])]);
    let doc = Document::new().with("f0", 1);
    let err = docmap.deserialize::<Wide>(&bytes_of(doc)).unwrap_err();
    assert!(
        matches!(&err, Error::RequiredFieldMissing { element, .. } if element == "f5"),
        "{err:?}"
    );
}

#[test]
fn test_all_present() {
    let docmap = docmap_with([wide_schema(FIELDS)]);
    let mut doc = Document::new();
    for (index, name) in FIELDS.iter().enumerate() {
        doc.insert(*name, -(index as i32));
    }
    let wide: Wide = docmap.deserialize(&bytes_of(doc)).unwrap();
    assert_eq!(wide.f63, -63);
    assert_eq!(wide.f64, -64);
}

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

use std::fmt::Debug;
use std::sync::Arc;

use docmap::{
    AsAny, Docmap, Document, Error, FieldSchema, ScalarDiscriminatorConvention, TypeKey,
    TypeSchemaBuilder, Value,
};
use tests::{bytes_of, docmap_with};

trait Animal: AsAny + Debug {
    fn name(&self) -> &str;
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Dog {
    name: String,
    good: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Cat {
    name: String,
    lives: i32,
}

impl Animal for Dog {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Animal for Cat {
    fn name(&self) -> &str {
        &self.name
    }
}

docmap::class_serializer!(Dog, Cat);
docmap::polymorphic_serializer!(Animal; Dog, Cat);

#[derive(Debug, Default)]
struct Zoo {
    animals: Vec<Box<dyn Animal>>,
    star: Option<Box<dyn Animal>>,
}

docmap::class_serializer!(Zoo);

fn zoo_docmap() -> Docmap {
    docmap_with([
        TypeSchemaBuilder::<dyn Animal>::new()
            .discriminator("Animal")
            .build()
            .unwrap(),
        TypeSchemaBuilder::<Dog>::new()
            .new_instance(Dog::default)
            .base::<dyn Animal>()
            .field(FieldSchema::new("name", |d: &Dog| &d.name, |d, v| d.name = v))
            .field(FieldSchema::new("good", |d: &Dog| &d.good, |d, v| d.good = v))
            .build()
            .unwrap(),
        TypeSchemaBuilder::<Cat>::new()
            .new_instance(Cat::default)
            .base::<dyn Animal>()
            .field(FieldSchema::new("name", |c: &Cat| &c.name, |c, v| c.name = v))
            .field(FieldSchema::new("lives", |c: &Cat| &c.lives, |c, v| c.lives = v))
            .build()
            .unwrap(),
        TypeSchemaBuilder::<Zoo>::new()
            .new_instance(Zoo::default)
            .field(FieldSchema::new("animals", |z: &Zoo| &z.animals, |z, v| z.animals = v))
            .field(
                FieldSchema::new("star", |z: &Zoo| &z.star, |z, v| z.star = v).ignore_if_null(),
            )
            .build()
            .unwrap(),
    ])
}

fn rex() -> Dog {
    Dog {
        name: "Rex".to_string(),
        good: true,
    }
}

fn tom() -> Cat {
    Cat {
        name: "Tom".to_string(),
        lives: 9,
    }
}

#[test]
fn test_trait_object_roundtrip() {
    let docmap = zoo_docmap();
    let animal: Box<dyn Animal> = Box::new(rex());
    let bytes = docmap.serialize(&animal).unwrap();

    let doc = Document::from_bytes(&bytes).unwrap();
    assert_eq!(doc.names().collect::<Vec<_>>(), vec!["_t", "name", "good"]);
    assert_eq!(doc.get("_t"), Some(&Value::from("Dog")));

    let decoded: Box<dyn Animal> = docmap.deserialize(&bytes).unwrap();
    assert_eq!(decoded.name(), "Rex");
    assert_eq!(decoded.as_any().downcast_ref::<Dog>(), Some(&rex()));
}

#[test]
fn test_concrete_nominal_has_no_discriminator() {
    let docmap = zoo_docmap();
    let doc = Document::from_bytes(&docmap.serialize(&tom()).unwrap()).unwrap();
    assert!(!doc.contains_key("_t"));
}

#[test]
fn test_nested_trait_objects() {
    let docmap = zoo_docmap();
    let zoo = Zoo {
        animals: vec![Box::new(rex()), Box::new(tom())],
        star: Some(Box::new(tom())),
    };
    let decoded: Zoo = docmap
        .deserialize(&docmap.serialize(&zoo).unwrap())
        .unwrap();
    assert_eq!(decoded.animals.len(), 2);
    assert_eq!(decoded.animals[0].as_any().downcast_ref::<Dog>(), Some(&rex()));
    assert_eq!(decoded.animals[1].as_any().downcast_ref::<Cat>(), Some(&tom()));
    assert_eq!(
        decoded.star.as_ref().and_then(|s| s.as_any().downcast_ref::<Cat>()),
        Some(&tom())
    );

    let empty: Zoo = docmap
        .deserialize(&docmap.serialize(&Zoo::default()).unwrap())
        .unwrap();
    assert!(empty.animals.is_empty());
    assert!(empty.star.is_none());
}

#[test]
fn test_discriminator_anywhere_in_document() {
    let docmap = zoo_docmap();
    let doc = Document::new()
        .with("lives", 3)
        .with("name", "Kit")
        .with("_t", "Cat");
    let decoded: Box<dyn Animal> = docmap.deserialize(&bytes_of(doc)).unwrap();
    assert_eq!(
        decoded.as_any().downcast_ref::<Cat>(),
        Some(&Cat {
            name: "Kit".to_string(),
            lives: 3
        })
    );
}

#[test]
fn test_missing_discriminator_for_abstract_nominal() {
    let docmap = zoo_docmap();
    let doc = Document::new().with("name", "Rex");
    let err = docmap
        .deserialize::<Box<dyn Animal>>(&bytes_of(doc))
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)), "{err:?}");
}

#[test]
fn test_unknown_discriminator() {
    let docmap = zoo_docmap();
    let doc = Document::new().with("_t", "Parrot").with("name", "Polly");
    let err = docmap
        .deserialize::<Box<dyn Animal>>(&bytes_of(doc))
        .unwrap_err();
    assert!(
        matches!(&err, Error::UnknownDiscriminator { discriminator, .. } if discriminator == "Parrot"),
        "{err:?}"
    );
}

#[test]
fn test_ambiguous_discriminator() {
    #[derive(Debug, Default)]
    struct Wolf {
        name: String,
    }
    impl Animal for Wolf {
        fn name(&self) -> &str {
            &self.name
        }
    }

    let docmap = zoo_docmap();
    docmap
        .register(
            TypeSchemaBuilder::<Wolf>::new()
                .new_instance(Wolf::default)
                .base::<dyn Animal>()
                .discriminator("Dog")
                .field(FieldSchema::new("name", |w: &Wolf| &w.name, |w, v| w.name = v))
                .build()
                .unwrap(),
        )
        .unwrap();
    let doc = Document::new().with("_t", "Dog").with("name", "Rex");
    let err = docmap
        .deserialize::<Box<dyn Animal>>(&bytes_of(doc))
        .unwrap_err();
    assert!(matches!(err, Error::TypeError(_)), "{err:?}");
}

#[test]
fn test_unregistered_runtime_type() {
    #[derive(Debug)]
    struct Fish;
    impl Animal for Fish {
        fn name(&self) -> &str {
            "fish"
        }
    }

    let docmap = zoo_docmap();
    let animal: Box<dyn Animal> = Box::new(Fish);
    let err = docmap.serialize(&animal).unwrap_err();
    assert!(matches!(err, Error::TypeError(_)), "{err:?}");
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Shape {
    color: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Circle {
    color: String,
    radius: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Ring {
    color: String,
    radius: f64,
    inner: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Square {
    color: String,
    side: f64,
}

docmap::class_serializer!(Shape, Circle, Ring, Square);

fn shape_schemas(root: TypeSchemaBuilder<Shape>) -> Vec<docmap::TypeSchema> {
    vec![
        root.new_instance(Shape::default)
            .root_class()
            .field(FieldSchema::new("color", |s: &Shape| &s.color, |s, v| s.color = v))
            .build()
            .unwrap(),
        TypeSchemaBuilder::<Circle>::new()
            .new_instance(Circle::default)
            .base::<Shape>()
            .field(FieldSchema::new("color", |c: &Circle| &c.color, |c, v| c.color = v))
            .field(FieldSchema::new("radius", |c: &Circle| &c.radius, |c, v| c.radius = v))
            .build()
            .unwrap(),
        TypeSchemaBuilder::<Ring>::new()
            .new_instance(Ring::default)
            .base::<Circle>()
            .field(FieldSchema::new("color", |r: &Ring| &r.color, |r, v| r.color = v))
            .field(FieldSchema::new("radius", |r: &Ring| &r.radius, |r, v| r.radius = v))
            .field(FieldSchema::new("inner", |r: &Ring| &r.inner, |r, v| r.inner = v))
            .build()
            .unwrap(),
        TypeSchemaBuilder::<Square>::new()
            .new_instance(Square::default)
            .base::<Shape>()
            .field(FieldSchema::new("color", |s: &Square| &s.color, |s, v| s.color = v))
            .field(FieldSchema::new("side", |s: &Square| &s.side, |s, v| s.side = v))
            .build()
            .unwrap(),
    ]
}

fn ring() -> Ring {
    Ring {
        color: "red".to_string(),
        radius: 2.0,
        inner: 1.5,
    }
}

fn strings(values: &[&str]) -> Value {
    Value::Array(values.iter().map(|v| Value::from(*v)).collect())
}

#[test]
fn test_hierarchical_discriminator() {
    let docmap = docmap_with(shape_schemas(TypeSchemaBuilder::new()));
    let bytes = docmap
        .serialize_dyn(Some(&ring()), TypeKey::of::<Shape>())
        .unwrap();
    let doc = Document::from_bytes(&bytes).unwrap();
    assert_eq!(doc.get("_t"), Some(&strings(&["Shape", "Circle", "Ring"])));

    let decoded = docmap
        .deserialize_dyn(&bytes, TypeKey::of::<Shape>())
        .unwrap()
        .unwrap();
    assert_eq!(decoded.downcast_ref::<Ring>(), Some(&ring()));

    let decoded = docmap
        .deserialize_dyn(&bytes, TypeKey::of::<Circle>())
        .unwrap()
        .unwrap();
    assert_eq!(decoded.downcast_ref::<Ring>(), Some(&ring()));
}

#[test]
fn test_root_hierarchy_always_discriminated() {
    let docmap = docmap_with(shape_schemas(TypeSchemaBuilder::new()));
    let shape = Shape {
        color: "blue".to_string(),
    };
    let doc = Document::from_bytes(&docmap.serialize(&shape).unwrap()).unwrap();
    assert_eq!(doc.get("_t"), Some(&strings(&["Shape"])));
    let doc = Document::from_bytes(&docmap.serialize(&ring()).unwrap()).unwrap();
    assert_eq!(doc.get("_t"), Some(&strings(&["Shape", "Circle", "Ring"])));
    assert_eq!(docmap.deserialize::<Ring>(&bytes_of(doc)).unwrap(), ring());
}

#[test]
fn test_discriminator_outside_nominal_hierarchy() {
    let docmap = docmap_with(shape_schemas(TypeSchemaBuilder::new()));
    let square = Square {
        color: "green".to_string(),
        side: 1.0,
    };
    let bytes = docmap
        .serialize_dyn(Some(&square), TypeKey::of::<Shape>())
        .unwrap();
    let err = docmap
        .deserialize_dyn(&bytes, TypeKey::of::<Circle>())
        .unwrap_err();
    assert!(matches!(err, Error::UnknownDiscriminator { .. }), "{err:?}");
}

#[test]
fn test_inherited_scalar_convention() {
    let root = TypeSchemaBuilder::<Shape>::new()
        .discriminator_convention(Arc::new(ScalarDiscriminatorConvention::new("kind")));
    let docmap = docmap_with(shape_schemas(root));
    let bytes = docmap
        .serialize_dyn(Some(&ring()), TypeKey::of::<Shape>())
        .unwrap();
    let doc = Document::from_bytes(&bytes).unwrap();
    assert_eq!(doc.get("kind"), Some(&Value::from("Ring")));
    assert!(!doc.contains_key("_t"));
    let decoded = docmap
        .deserialize_dyn(&bytes, TypeKey::of::<Shape>())
        .unwrap()
        .unwrap();
    assert_eq!(decoded.downcast_ref::<Ring>(), Some(&ring()));
}

#[test]
fn test_required_and_anonymous_discriminators() {
    #[derive(Debug, Default, PartialEq)]
    struct Tagged {
        v: i32,
    }
    #[derive(Debug, Default, PartialEq)]
    struct Shapeless {
        v: i32,
    }
    docmap::class_serializer!(Tagged, Shapeless);

    let docmap = docmap_with([
        TypeSchemaBuilder::<Tagged>::new()
            .new_instance(Tagged::default)
            .discriminator("tagged")
            .discriminator_is_required(true)
            .field(FieldSchema::new("v", |t: &Tagged| &t.v, |t, v| t.v = v))
            .build()
            .unwrap(),
        TypeSchemaBuilder::<Shapeless>::new()
            .new_instance(Shapeless::default)
            .anonymous()
            .discriminator_is_required(true)
            .field(FieldSchema::new("v", |s: &Shapeless| &s.v, |s, v| s.v = v))
            .build()
            .unwrap(),
    ]);
    let bytes = docmap.serialize(&Tagged { v: 1 }).unwrap();
    let doc = Document::from_bytes(&bytes).unwrap();
    assert_eq!(doc.get("_t"), Some(&Value::from("tagged")));
    assert_eq!(docmap.deserialize::<Tagged>(&bytes).unwrap(), Tagged { v: 1 });

    let doc = Document::from_bytes(&docmap.serialize(&Shapeless { v: 2 }).unwrap()).unwrap();
    assert_eq!(doc.names().collect::<Vec<_>>(), vec!["v"]);
}

#[test]
fn test_codec_handles_discriminators() {
    let docmap = zoo_docmap();
    let codec = docmap
        .get_type_resolver()
        .codec(TypeKey::of::<Dog>())
        .unwrap();
    assert!(codec.is_discriminator_compatible_with_object_serializer());
    assert!(docmap.get_type_resolver().is_discriminated(TypeKey::of::<dyn Animal>()));
    assert!(!docmap.get_type_resolver().is_discriminated(TypeKey::of::<Dog>()));
}

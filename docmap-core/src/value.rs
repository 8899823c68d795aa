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

//! Dynamic value tree.
//!
//! [`Value`] mirrors every wire type one to one, so a value read with
//! [`Value::read_from`] writes back to identical bytes. It is the storage of
//! overflow members and the fallback for fields of unknown shape.

use chrono::NaiveDateTime;
use indexmap::IndexMap;

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::Error;
use crate::io::{DocumentReader, DocumentWriter};
use crate::types::{BinarySubtype, WireType};

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    DateTime(NaiveDateTime),
    Binary(BinarySubtype, Vec<u8>),
    Array(Vec<Value>),
    Document(Document),
}

impl Value {
    pub fn wire_type(&self) -> WireType {
        match self {
            Value::Null => WireType::Null,
            Value::Boolean(_) => WireType::Boolean,
            Value::Int32(_) => WireType::Int32,
            Value::Int64(_) => WireType::Int64,
            Value::Double(_) => WireType::Double,
            Value::String(_) => WireType::String,
            Value::DateTime(_) => WireType::DateTime,
            Value::Binary(..) => WireType::Binary,
            Value::Array(_) => WireType::Array,
            Value::Document(_) => WireType::Document,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer content of an `Int32` or `Int64` value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Writes this value at the writer's current position.
    pub fn write_to(&self, writer: &mut DocumentWriter) -> Result<(), Error> {
        match self {
            Value::Null => writer.write_null(),
            Value::Boolean(v) => writer.write_bool(*v),
            Value::Int32(v) => writer.write_i32(*v),
            Value::Int64(v) => writer.write_i64(*v),
            Value::Double(v) => writer.write_f64(*v),
            Value::String(v) => writer.write_string(v),
            Value::DateTime(v) => writer.write_datetime(v),
            Value::Binary(subtype, bytes) => writer.write_binary(*subtype, bytes),
            Value::Array(values) => {
                writer.write_array_start()?;
                for value in values {
                    value.write_to(writer)?;
                }
                writer.write_array_end()
            }
            Value::Document(doc) => doc.write_to(writer),
        }
    }

    /// Reads the value the reader is positioned on.
    pub fn read_from(reader: &mut DocumentReader) -> Result<Value, Error> {
        Value::read_from_depth(reader, 0, DEFAULT_MAX_DEPTH)
    }

    /// Like [`Value::read_from`], with `depth` containers already open and
    /// at most `max_depth` allowed.
    pub fn read_from_depth(
        reader: &mut DocumentReader,
        depth: u32,
        max_depth: u32,
    ) -> Result<Value, Error> {
        let value = match reader.read_wire_type()? {
            WireType::Null => {
                reader.read_null()?;
                Value::Null
            }
            WireType::Boolean => Value::Boolean(reader.read_bool()?),
            WireType::Int32 => Value::Int32(reader.read_i32()?),
            WireType::Int64 => Value::Int64(reader.read_i64()?),
            WireType::Double => Value::Double(reader.read_f64()?),
            WireType::String => Value::String(reader.read_string()?),
            WireType::DateTime => Value::DateTime(reader.read_datetime()?),
            WireType::Binary => {
                let (subtype, bytes) = reader.read_binary()?;
                Value::Binary(subtype, bytes)
            }
            WireType::Array => {
                let depth = enter_container(depth, max_depth)?;
                reader.read_array_start()?;
                let mut values = Vec::new();
                while reader.read_wire_type()? != WireType::EndOfDocument {
                    values.push(Value::read_from_depth(reader, depth, max_depth)?);
                }
                reader.read_array_end()?;
                Value::Array(values)
            }
            WireType::Document => {
                Value::Document(Document::read_from_depth(reader, depth, max_depth)?)
            }
            WireType::EndOfDocument => {
                return Err(Error::invalid_data("Expected a value, found end of document"))
            }
        };
        Ok(value)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut writer = DocumentWriter::new();
        self.write_to(&mut writer)?;
        writer.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Value, Error> {
        let mut reader = DocumentReader::new(bytes);
        let value = Value::read_from(&mut reader)?;
        if !reader.is_at_end() {
            return Err(Error::invalid_data(format!(
                "{} trailing bytes after the root value",
                reader.remaining()
            )));
        }
        Ok(value)
    }
}

fn enter_container(depth: u32, max_depth: u32) -> Result<u32, Error> {
    let depth = depth + 1;
    if depth > max_depth {
        return Err(Error::depth_exceed(format!(
            "Maximum value nesting depth ({max_depth}) exceeded"
        )));
    }
    Ok(depth)
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Value {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from!(
    bool => Boolean,
    i32 => Int32,
    i64 => Int64,
    f64 => Double,
    String => String,
    &str => String,
    NaiveDateTime => DateTime,
    Vec<Value> => Array,
    Document => Document,
);

/// Insertion-ordered element map.
///
/// Inserting an existing name replaces its value and keeps its position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    elements: IndexMap<String, Value>,
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    /// Chained insert, handy for building literals.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Document {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.elements.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.elements.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.elements.get_mut(name)
    }

    /// Removes `name`, keeping the order of the remaining elements.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.elements.shift_remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.elements.iter()
    }

    pub fn write_to(&self, writer: &mut DocumentWriter) -> Result<(), Error> {
        writer.write_document_start()?;
        for (name, value) in &self.elements {
            writer.write_name(name)?;
            value.write_to(writer)?;
        }
        writer.write_document_end()
    }

    pub fn read_from(reader: &mut DocumentReader) -> Result<Document, Error> {
        Document::read_from_depth(reader, 0, DEFAULT_MAX_DEPTH)
    }

    pub fn read_from_depth(
        reader: &mut DocumentReader,
        depth: u32,
        max_depth: u32,
    ) -> Result<Document, Error> {
        let depth = enter_container(depth, max_depth)?;
        reader.read_document_start()?;
        let mut doc = Document::new();
        while reader.read_wire_type()? != WireType::EndOfDocument {
            let name = reader.read_name()?;
            let value = Value::read_from_depth(reader, depth, max_depth)?;
            doc.elements.insert(name, value);
        }
        reader.read_document_end()?;
        Ok(doc)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut writer = DocumentWriter::new();
        self.write_to(&mut writer)?;
        writer.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Document, Error> {
        match Value::from_bytes(bytes)? {
            Value::Document(doc) => Ok(doc),
            other => Err(Error::wire_type_mismatch(
                WireType::Document,
                other.wire_type(),
            )),
        }
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (name, value) in iter {
            doc.insert(name, value);
        }
        doc
    }
}

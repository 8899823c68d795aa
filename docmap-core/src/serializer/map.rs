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

use std::collections::{BTreeMap, HashMap};

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::Serializer;
use crate::types::WireType;

// string-keyed maps encode as sub-documents, one element per entry

fn write_entries<'a, T, I>(entries: I, context: &mut WriteContext) -> Result<(), Error>
where
    T: Serializer,
    I: Iterator<Item = (&'a String, &'a T)>,
{
    context.writer.write_document_start()?;
    for (key, value) in entries {
        context.writer.write_name(key)?;
        value.write(context)?;
    }
    context.writer.write_document_end()
}

fn read_entries<T, F>(context: &mut ReadContext, mut insert: F) -> Result<(), Error>
where
    T: Serializer,
    F: FnMut(String, T),
{
    context.reader.read_document_start()?;
    while context.reader.read_wire_type()? != WireType::EndOfDocument {
        let key = context.reader.read_name()?;
        let value = T::read(context)?;
        insert(key, value);
    }
    context.reader.read_document_end()
}

impl<T: Serializer> Serializer for HashMap<String, T> {
    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_entries(self.iter(), context)
    }

    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        let mut map = HashMap::new();
        read_entries(context, |k, v: T| {
            map.insert(k, v);
        })?;
        Ok(map)
    }
}

impl<T: Serializer> Serializer for BTreeMap<String, T> {
    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_entries(self.iter(), context)
    }

    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        let mut map = BTreeMap::new();
        read_entries(context, |k, v: T| {
            map.insert(k, v);
        })?;
        Ok(map)
    }
}

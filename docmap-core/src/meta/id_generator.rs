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

use std::any::Any;

use crate::error::Error;
use crate::types::TypeKey;

/// Produces identifier values and decides when an identifier is unset.
pub trait IdGenerator: Send + Sync {
    /// Generates a new identifier for a member of type `id_type`.
    fn generate(&self, id_type: TypeKey) -> Result<Box<dyn Any>, Error>;

    /// Whether `id` counts as not yet assigned.
    fn is_empty(&self, id: &dyn Any) -> bool;
}

/// Random v4 UUIDs in their hyphenated string form.
///
/// Works for `String` and `Option<String>` identifier members.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidStringGenerator;

impl IdGenerator for UuidStringGenerator {
    fn generate(&self, id_type: TypeKey) -> Result<Box<dyn Any>, Error> {
        let id = uuid::Uuid::new_v4().hyphenated().to_string();
        if id_type == TypeKey::of::<String>() {
            Ok(Box::new(id))
        } else if id_type == TypeKey::of::<Option<String>>() {
            Ok(Box::new(Some(id)))
        } else {
            Err(Error::type_error(format!(
                "UuidStringGenerator cannot generate identifiers of type {id_type}"
            )))
        }
    }

    fn is_empty(&self, id: &dyn Any) -> bool {
        if let Some(s) = id.downcast_ref::<String>() {
            s.is_empty()
        } else if let Some(s) = id.downcast_ref::<Option<String>>() {
            s.as_deref().map_or(true, str::is_empty)
        } else {
            false
        }
    }
}

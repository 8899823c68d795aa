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

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::Serializer;
use crate::types::WireType;

impl<T: Serializer> Serializer for Option<T> {
    #[inline(always)]
    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        match self {
            Some(v) => v.write(context),
            None => context.writer.write_null(),
        }
    }

    #[inline(always)]
    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        if context.reader.read_wire_type()? == WireType::Null {
            context.reader.read_null()?;
            Ok(None)
        } else {
            Ok(Some(T::read(context)?))
        }
    }

    #[inline(always)]
    fn is_null(&self) -> bool {
        self.is_none()
    }
}

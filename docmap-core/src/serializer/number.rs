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

/// Reads either integer width, failing when the value does not fit `T`.
#[inline(always)]
fn read_integer<T>(context: &mut ReadContext) -> Result<T, Error>
where
    T: TryFrom<i64>,
{
    let value = match context.reader.read_wire_type()? {
        WireType::Int32 => context.reader.read_i32()? as i64,
        WireType::Int64 => context.reader.read_i64()?,
        found => return Err(Error::wire_type_mismatch(WireType::Int32, found)),
    };
    T::try_from(value).map_err(|_| {
        Error::invalid_data(format!(
            "Integer {value} is out of range for {}",
            std::any::type_name::<T>()
        ))
    })
}

impl Serializer for i32 {
    #[inline(always)]
    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_i32(*self)
    }

    #[inline(always)]
    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        read_integer(context)
    }
}

impl Serializer for i64 {
    #[inline(always)]
    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_i64(*self)
    }

    #[inline(always)]
    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        read_integer(context)
    }
}

// no unsigned wire type; u32 always fits an Int64
impl Serializer for u32 {
    #[inline(always)]
    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_i64(*self as i64)
    }

    #[inline(always)]
    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        read_integer(context)
    }
}

impl Serializer for f64 {
    #[inline(always)]
    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_f64(*self)
    }

    #[inline(always)]
    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        context.reader.read_f64()
    }
}

impl Serializer for f32 {
    #[inline(always)]
    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_f64(*self as f64)
    }

    #[inline(always)]
    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(context.reader.read_f64()? as f32)
    }
}

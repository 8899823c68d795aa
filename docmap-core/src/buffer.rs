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

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::Error;

/// Growable little-endian byte sink.
#[derive(Default)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Writer {
        Writer {
            bf: Vec::with_capacity(capacity),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    /// Overwrites already-written bytes, used to back-patch length prefixes.
    pub fn set_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), Error> {
        let len = self.bf.len();
        self.bf
            .get_mut(offset..offset + data.len())
            .ok_or_else(|| Error::buffer_out_of_bound(offset, data.len(), len))?
            .copy_from_slice(data);
        Ok(())
    }

    pub fn write_bytes(&mut self, v: &[u8]) -> usize {
        self.bf.extend_from_slice(v);
        v.len()
    }

    #[inline(always)]
    pub fn write_u8(&mut self, value: u8) {
        self.bf.push(value);
    }

    #[inline(always)]
    pub fn write_i32(&mut self, value: i32) {
        // Writing into a Vec cannot fail.
        let _ = self.bf.write_i32::<LittleEndian>(value);
    }

    #[inline(always)]
    pub fn write_i64(&mut self, value: i64) {
        let _ = self.bf.write_i64::<LittleEndian>(value);
    }

    #[inline(always)]
    pub fn write_f64(&mut self, value: f64) {
        let _ = self.bf.write_f64::<LittleEndian>(value);
    }

    /// Writes `s` followed by a NUL byte.
    pub fn write_cstring(&mut self, s: &str) {
        self.bf.extend_from_slice(s.as_bytes());
        self.bf.push(0);
    }
}

/// Bounds-checked cursor over a borrowed byte slice.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    bf: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8]) -> Reader<'a> {
        Reader { bf, cursor: 0 }
    }

    #[inline(always)]
    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    #[inline(always)]
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bf.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.bf.len().saturating_sub(self.cursor)
    }

    fn slice_after_cursor(&self) -> &'a [u8] {
        self.bf.get(self.cursor..).unwrap_or(&[])
    }

    /// Bytes in `start..end` of the underlying slice, independent of the cursor.
    pub fn range(&self, start: usize, end: usize) -> Result<&'a [u8], Error> {
        self.bf
            .get(start..end)
            .ok_or_else(|| Error::buffer_out_of_bound(start, end.saturating_sub(start), self.bf.len()))
    }

    #[inline(always)]
    fn check_bound(&self, n: usize) -> Result<(), Error> {
        if self.cursor + n > self.bf.len() {
            Err(Error::buffer_out_of_bound(self.cursor, n, self.bf.len()))
        } else {
            Ok(())
        }
    }

    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.check_bound(1)?;
        let result = self.bf[self.cursor];
        self.cursor += 1;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.check_bound(4)?;
        let result = LittleEndian::read_i32(&self.bf[self.cursor..]);
        self.cursor += 4;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_i64(&mut self) -> Result<i64, Error> {
        self.check_bound(8)?;
        let result = LittleEndian::read_i64(&self.bf[self.cursor..]);
        self.cursor += 8;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_f64(&mut self) -> Result<f64, Error> {
        self.check_bound(8)?;
        let result = LittleEndian::read_f64(&self.bf[self.cursor..]);
        self.cursor += 8;
        Ok(result)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        self.check_bound(len)?;
        let result = &self.bf[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(result)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.check_bound(len)?;
        self.cursor += len;
        Ok(())
    }

    /// Reads bytes up to the next NUL and consumes the terminator.
    pub fn read_cstring_bytes(&mut self) -> Result<&'a [u8], Error> {
        let rest = self.slice_after_cursor();
        let end = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| Error::buffer_out_of_bound(self.cursor, rest.len() + 1, self.bf.len()))?;
        let result = &rest[..end];
        self.cursor += end + 1;
        Ok(result)
    }
}

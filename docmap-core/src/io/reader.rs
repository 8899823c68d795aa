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

use chrono::NaiveDateTime;

use crate::buffer::Reader;
use crate::error::Error;
use crate::meta::NameResolver;
use crate::types::{BinarySubtype, WireType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Nothing read yet; the next call reads the root tag.
    Initial,
    /// Positioned before the next element tag.
    Type,
    /// An element tag has been read; its name is next.
    Name,
    /// Positioned on a value of `current`.
    Value,
    /// The terminator of the innermost container was consumed.
    EndOfContainer,
    /// The root value has been fully read.
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameKind {
    Document,
    Array,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    kind: FrameKind,
    end: usize,
}

/// Saved reader position, see [`DocumentReader::bookmark`].
#[derive(Clone, Debug)]
pub struct Bookmark {
    cursor: usize,
    state: State,
    current: WireType,
    depth: usize,
    top: Option<Frame>,
}

/// Token-stream reader over one root value.
pub struct DocumentReader<'a> {
    reader: Reader<'a>,
    state: State,
    current: WireType,
    stack: Vec<Frame>,
}

impl<'a> DocumentReader<'a> {
    pub fn new(bytes: &'a [u8]) -> DocumentReader<'a> {
        DocumentReader {
            reader: Reader::new(bytes),
            state: State::Initial,
            current: WireType::EndOfDocument,
            stack: Vec::new(),
        }
    }

    /// Advances to the next value and returns its tag.
    ///
    /// Returns [`WireType::EndOfDocument`] when the innermost container's
    /// terminator is reached. Inside arrays the element name is skipped.
    pub fn read_wire_type(&mut self) -> Result<WireType, Error> {
        match self.state {
            State::Initial => {
                self.current = WireType::from_tag(self.reader.read_u8()?)?;
                self.state = State::Value;
            }
            State::Type => {
                let frame = self.top_frame()?;
                if self.reader.get_cursor() >= frame.end {
                    return Err(Error::invalid_data(
                        "Element runs past the end of its container",
                    ));
                }
                let tag = self.reader.read_u8()?;
                if tag == 0 {
                    self.current = WireType::EndOfDocument;
                    self.state = State::EndOfContainer;
                } else {
                    self.current = WireType::from_tag(tag)?;
                    if frame.kind == FrameKind::Array {
                        self.reader.read_cstring_bytes()?;
                        self.state = State::Value;
                    } else {
                        self.state = State::Name;
                    }
                }
            }
            State::Value | State::EndOfContainer => return Ok(self.current),
            state => {
                return Err(Error::invalid_data(format!(
                    "read_wire_type called in state {state:?}"
                )))
            }
        }
        Ok(self.current)
    }

    /// Tag of the value the reader is positioned on.
    #[inline(always)]
    pub fn current_wire_type(&self) -> WireType {
        self.current
    }

    /// Whether the root value has been completely consumed.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Whether every input byte has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.reader.remaining() == 0
    }

    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    pub fn read_name(&mut self) -> Result<String, Error> {
        self.expect_state(State::Name, "read_name")?;
        let bytes = self.reader.read_cstring_bytes()?;
        self.state = State::Value;
        into_string(bytes)
    }

    /// Reads the element name while walking it through `resolver`.
    pub fn read_name_with(
        &mut self,
        resolver: &NameResolver,
    ) -> Result<(String, Option<usize>), Error> {
        self.expect_state(State::Name, "read_name_with")?;
        let mut walk = resolver.walk();
        let start = self.reader.get_cursor();
        loop {
            let byte = self.reader.read_u8()?;
            if byte == 0 {
                break;
            }
            walk.step(byte);
        }
        let end = self.reader.get_cursor() - 1;
        let name = into_string(self.reader.range(start, end)?)?;
        self.state = State::Value;
        Ok((name, walk.finish()))
    }

    pub fn skip_name(&mut self) -> Result<(), Error> {
        self.expect_state(State::Name, "skip_name")?;
        self.reader.read_cstring_bytes()?;
        self.state = State::Value;
        Ok(())
    }

    /// Skips the current value, including any nested containers.
    pub fn skip_value(&mut self) -> Result<(), Error> {
        self.expect_state(State::Value, "skip_value")?;
        match self.current {
            WireType::Double | WireType::DateTime | WireType::Int64 => self.reader.skip(8)?,
            WireType::Int32 => self.reader.skip(4)?,
            WireType::Boolean => self.reader.skip(1)?,
            WireType::Null => {}
            WireType::String => {
                let len = self.read_length(1)?;
                self.reader.skip(len)?;
            }
            WireType::Binary => {
                let len = self.read_length(0)?;
                self.reader.skip(len + 1)?;
            }
            WireType::Document | WireType::Array => {
                let start = self.reader.get_cursor();
                let len = self.read_length(5)?;
                self.reader.set_cursor(start);
                self.reader.skip(len)?;
            }
            WireType::EndOfDocument => {
                return Err(Error::invalid_data("Cannot skip the end of a document"))
            }
        }
        self.end_value();
        Ok(())
    }

    pub fn read_document_start(&mut self) -> Result<(), Error> {
        self.begin_value(WireType::Document)?;
        self.push_frame(FrameKind::Document)
    }

    pub fn read_document_end(&mut self) -> Result<(), Error> {
        self.pop_frame(FrameKind::Document)
    }

    pub fn read_array_start(&mut self) -> Result<(), Error> {
        self.begin_value(WireType::Array)?;
        self.push_frame(FrameKind::Array)
    }

    pub fn read_array_end(&mut self) -> Result<(), Error> {
        self.pop_frame(FrameKind::Array)
    }

    pub fn read_null(&mut self) -> Result<(), Error> {
        self.begin_value(WireType::Null)?;
        self.end_value();
        Ok(())
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        self.begin_value(WireType::Boolean)?;
        let value = match self.reader.read_u8()? {
            0 => false,
            1 => true,
            other => {
                return Err(Error::invalid_data(format!(
                    "Invalid boolean byte 0x{other:02x}"
                )))
            }
        };
        self.end_value();
        Ok(value)
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.begin_value(WireType::Int32)?;
        let value = self.reader.read_i32()?;
        self.end_value();
        Ok(value)
    }

    pub fn read_i64(&mut self) -> Result<i64, Error> {
        self.begin_value(WireType::Int64)?;
        let value = self.reader.read_i64()?;
        self.end_value();
        Ok(value)
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        self.begin_value(WireType::Double)?;
        let value = self.reader.read_f64()?;
        self.end_value();
        Ok(value)
    }

    pub fn read_string(&mut self) -> Result<String, Error> {
        self.begin_value(WireType::String)?;
        let len = self.read_length(1)?;
        let bytes = self.reader.read_bytes(len)?;
        if bytes[len - 1] != 0 {
            return Err(Error::invalid_data("String is not NUL-terminated"));
        }
        let value = into_string(&bytes[..len - 1])?;
        self.end_value();
        Ok(value)
    }

    pub fn read_datetime(&mut self) -> Result<NaiveDateTime, Error> {
        self.begin_value(WireType::DateTime)?;
        let millis = self.reader.read_i64()?;
        let value = chrono::DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| {
                Error::invalid_data(format!("DateTime {millis}ms is out of range"))
            })?;
        self.end_value();
        Ok(value)
    }

    pub fn read_binary(&mut self) -> Result<(BinarySubtype, Vec<u8>), Error> {
        self.begin_value(WireType::Binary)?;
        let len = self.read_length(0)?;
        let subtype = BinarySubtype::from_byte(self.reader.read_u8()?)?;
        let bytes = self.reader.read_bytes(len)?.to_vec();
        self.end_value();
        Ok((subtype, bytes))
    }

    /// Saves the current position so that a look-ahead can be undone.
    pub fn bookmark(&self) -> Bookmark {
        Bookmark {
            cursor: self.reader.get_cursor(),
            state: self.state,
            current: self.current,
            depth: self.stack.len(),
            top: self.stack.last().copied(),
        }
    }

    /// Restores a position saved by [`bookmark`](Self::bookmark).
    ///
    /// The bookmark must have been taken at the same or a shallower nesting
    /// depth than the current one.
    pub fn return_to_bookmark(&mut self, bookmark: Bookmark) -> Result<(), Error> {
        if bookmark.depth > self.stack.len() {
            return Err(Error::invalid_data(
                "Bookmark was taken inside a container that has been closed",
            ));
        }
        self.stack.truncate(bookmark.depth);
        if let (Some(top), Some(saved)) = (self.stack.last_mut(), bookmark.top) {
            *top = saved;
        }
        self.reader.set_cursor(bookmark.cursor);
        self.state = bookmark.state;
        self.current = bookmark.current;
        Ok(())
    }

    #[inline(always)]
    fn top_frame(&self) -> Result<Frame, Error> {
        self.stack
            .last()
            .copied()
            .ok_or_else(|| Error::invalid_data("No open container"))
    }

    #[inline(always)]
    fn expect_state(&self, expected: State, op: &'static str) -> Result<(), Error> {
        if self.state != expected {
            return Err(Error::invalid_data(format!(
                "{op} called in state {:?}, expected {expected:?}",
                self.state
            )));
        }
        Ok(())
    }

    #[inline(always)]
    fn begin_value(&mut self, expected: WireType) -> Result<(), Error> {
        if self.state == State::Initial {
            self.read_wire_type()?;
        }
        self.expect_state(State::Value, "read")?;
        if self.current != expected {
            return Err(Error::wire_type_mismatch(expected, self.current));
        }
        Ok(())
    }

    #[inline(always)]
    fn end_value(&mut self) {
        self.state = if self.stack.is_empty() {
            State::Done
        } else {
            State::Type
        };
    }

    /// Reads an `i32` length prefix that must be at least `min`.
    fn read_length(&mut self, min: i32) -> Result<usize, Error> {
        let len = self.reader.read_i32()?;
        if len < min {
            return Err(Error::invalid_data(format!("Invalid length prefix {len}")));
        }
        Ok(len as usize)
    }

    fn push_frame(&mut self, kind: FrameKind) -> Result<(), Error> {
        let start = self.reader.get_cursor();
        let len = self.read_length(5)?;
        let end = start + len;
        if end > self.reader.len() {
            return Err(Error::buffer_out_of_bound(start, len, self.reader.len()));
        }
        if let Some(parent) = self.stack.last() {
            if end > parent.end {
                return Err(Error::invalid_data(
                    "Nested container overruns its parent",
                ));
            }
        }
        self.stack.push(Frame { kind, end });
        self.state = State::Type;
        Ok(())
    }

    fn pop_frame(&mut self, kind: FrameKind) -> Result<(), Error> {
        if self.state == State::Type {
            // allow closing straight after the last element
            self.read_wire_type()?;
        }
        if self.state != State::EndOfContainer {
            return Err(Error::invalid_data(format!(
                "Cannot close {kind:?} before its terminator"
            )));
        }
        let frame = self.top_frame()?;
        if frame.kind != kind {
            return Err(Error::invalid_data(format!(
                "Cannot close {kind:?}: the innermost open container is {:?}",
                frame.kind
            )));
        }
        if self.reader.get_cursor() != frame.end {
            return Err(Error::invalid_data(format!(
                "{kind:?} length disagrees with its content: declared end {}, actual end {}",
                frame.end,
                self.reader.get_cursor()
            )));
        }
        self.stack.pop();
        self.end_value();
        Ok(())
    }
}

#[inline(always)]
fn into_string(bytes: &[u8]) -> Result<String, Error> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| Error::invalid_data(format!("Invalid UTF-8: {e}")))
}

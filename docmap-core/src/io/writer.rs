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

use crate::buffer::Writer;
use crate::ensure;
use crate::error::Error;
use crate::types::{BinarySubtype, WireType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameKind {
    Document,
    Array,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    start: usize,
    next_index: u32,
}

/// Token-stream writer producing one root value.
///
/// Inside a document every value must be preceded by [`write_name`](Self::write_name);
/// array elements are named `"0"`, `"1"`, ... automatically.
pub struct DocumentWriter {
    writer: Writer,
    stack: Vec<Frame>,
    pending_name: Option<String>,
    root_written: bool,
}

impl Default for DocumentWriter {
    fn default() -> Self {
        DocumentWriter::with_capacity(64)
    }
}

impl DocumentWriter {
    pub fn new() -> DocumentWriter {
        DocumentWriter::default()
    }

    pub fn with_capacity(capacity: usize) -> DocumentWriter {
        DocumentWriter {
            writer: Writer::with_capacity(capacity),
            stack: Vec::new(),
            pending_name: None,
            root_written: false,
        }
    }

    /// Current nesting of open documents and arrays.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether a name has been written and awaits its value.
    pub fn has_pending_name(&self) -> bool {
        self.pending_name.is_some()
    }

    pub fn write_name(&mut self, name: &str) -> Result<(), Error> {
        ensure!(
            matches!(self.stack.last(), Some(frame) if frame.kind == FrameKind::Document),
            "write_name can only be called inside a document"
        );
        ensure!(
            self.pending_name.is_none(),
            "Name '{}' written while another name is pending",
            name
        );
        ensure!(
            !name.as_bytes().contains(&0),
            "Element name '{}' contains a NUL byte",
            name.escape_debug()
        );
        self.pending_name = Some(name.to_owned());
        Ok(())
    }

    fn begin_value(&mut self, wire_type: WireType) -> Result<(), Error> {
        match self.stack.last_mut() {
            None => {
                ensure!(!self.root_written, "Root value has already been written");
                self.root_written = true;
                self.writer.write_u8(wire_type.into());
            }
            Some(frame) if frame.kind == FrameKind::Array => {
                let index = frame.next_index;
                frame.next_index += 1;
                self.writer.write_u8(wire_type.into());
                self.writer.write_cstring(&index.to_string());
            }
            Some(_) => {
                let name = self.pending_name.take().ok_or_else(|| {
                    Error::invalid_data(format!(
                        "Value of type {wire_type:?} written in a document without a name"
                    ))
                })?;
                self.writer.write_u8(wire_type.into());
                self.writer.write_cstring(&name);
            }
        }
        Ok(())
    }

    fn push_frame(&mut self, kind: FrameKind) {
        self.stack.push(Frame {
            kind,
            start: self.writer.len(),
            next_index: 0,
        });
        // length placeholder, patched when the frame closes
        self.writer.write_i32(0);
    }

    fn pop_frame(&mut self, kind: FrameKind) -> Result<(), Error> {
        ensure!(
            self.pending_name.is_none(),
            "Container closed while a name is pending"
        );
        let frame = match self.stack.pop() {
            Some(frame) if frame.kind == kind => frame,
            Some(frame) => {
                return Err(Error::invalid_data(format!(
                    "Cannot close {kind:?}: the innermost open container is {:?}",
                    frame.kind
                )))
            }
            None => {
                return Err(Error::invalid_data(format!(
                    "Cannot close {kind:?}: nothing is open"
                )))
            }
        };
        self.writer.write_u8(0);
        let len = container_length(self.writer.len() - frame.start)?;
        self.writer.set_bytes(frame.start, &len.to_le_bytes())
    }

    pub fn write_document_start(&mut self) -> Result<(), Error> {
        self.begin_value(WireType::Document)?;
        self.push_frame(FrameKind::Document);
        Ok(())
    }

    pub fn write_document_end(&mut self) -> Result<(), Error> {
        self.pop_frame(FrameKind::Document)
    }

    pub fn write_array_start(&mut self) -> Result<(), Error> {
        self.begin_value(WireType::Array)?;
        self.push_frame(FrameKind::Array);
        Ok(())
    }

    pub fn write_array_end(&mut self) -> Result<(), Error> {
        self.pop_frame(FrameKind::Array)
    }

    pub fn write_null(&mut self) -> Result<(), Error> {
        self.begin_value(WireType::Null)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), Error> {
        self.begin_value(WireType::Boolean)?;
        self.writer.write_u8(value as u8);
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), Error> {
        self.begin_value(WireType::Int32)?;
        self.writer.write_i32(value);
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<(), Error> {
        self.begin_value(WireType::Int64)?;
        self.writer.write_i64(value);
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<(), Error> {
        self.begin_value(WireType::Double)?;
        self.writer.write_f64(value);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), Error> {
        ensure!(
            value.len() < i32::MAX as usize,
            "String of {} bytes is too long",
            value.len()
        );
        self.begin_value(WireType::String)?;
        self.writer.write_i32(value.len() as i32 + 1);
        self.writer.write_cstring(value);
        Ok(())
    }

    /// Writes milliseconds since the Unix epoch; sub-millisecond precision is dropped.
    pub fn write_datetime(&mut self, value: &NaiveDateTime) -> Result<(), Error> {
        self.begin_value(WireType::DateTime)?;
        self.writer.write_i64(value.and_utc().timestamp_millis());
        Ok(())
    }

    pub fn write_binary(&mut self, subtype: BinarySubtype, bytes: &[u8]) -> Result<(), Error> {
        ensure!(
            bytes.len() <= i32::MAX as usize,
            "Binary of {} bytes is too long",
            bytes.len()
        );
        self.begin_value(WireType::Binary)?;
        self.writer.write_i32(bytes.len() as i32);
        self.writer.write_u8(subtype.into());
        self.writer.write_bytes(bytes);
        Ok(())
    }

    /// Finishes the stream. Fails if a container is still open or nothing was written.
    pub fn into_bytes(self) -> Result<Vec<u8>, Error> {
        ensure!(
            self.stack.is_empty(),
            "{} container(s) still open",
            self.stack.len()
        );
        ensure!(self.root_written, "No value has been written");
        Ok(self.writer.into_bytes())
    }
}

/// Length prefix of a container spanning `len` bytes.
pub(super) fn container_length(len: usize) -> Result<i32, Error> {
    i32::try_from(len)
        .map_err(|_| Error::invalid_data(format!("Container of {len} bytes is too long")))
}

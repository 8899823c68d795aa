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
use crate::value::{Document, Value};

impl Serializer for Value {
    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.write_to(context.writer)
    }

    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        let (depth, max_depth) = (context.depth(), context.get_config().max_depth());
        Value::read_from_depth(&mut context.reader, depth, max_depth)
    }

    fn is_null(&self) -> bool {
        Value::is_null(self)
    }
}

impl Serializer for Document {
    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.write_to(context.writer)
    }

    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        let (depth, max_depth) = (context.depth(), context.get_config().max_depth());
        Document::read_from_depth(&mut context.reader, depth, max_depth)
    }
}

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

const WORD_BITS: usize = 32;

/// One bit per declared field, set when the field's element was seen.
///
/// Bits past the field count are preset so that a complete document leaves
/// every word at `u32::MAX`, and the missing-field sweep visits only clear bits.
#[derive(Debug, Clone)]
pub struct FieldPresence {
    words: Vec<u32>,
}

impl FieldPresence {
    pub fn new(field_count: usize) -> FieldPresence {
        let word_count = field_count.div_ceil(WORD_BITS);
        let mut words = vec![0u32; word_count];
        let used = field_count % WORD_BITS;
        if used != 0 {
            if let Some(last) = words.last_mut() {
                *last = !0u32 << used;
            }
        }
        FieldPresence { words }
    }

    #[inline(always)]
    pub fn mark(&mut self, index: usize) {
        self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
    }

    #[inline(always)]
    pub fn is_present(&self, index: usize) -> bool {
        self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }

    /// Whether every field was seen.
    pub fn is_complete(&self) -> bool {
        self.words.iter().all(|w| *w == u32::MAX)
    }

    /// Calls `f` with the index of every missing field, in ascending order.
    pub fn for_each_missing<F>(&self, mut f: F) -> Result<(), Error>
    where
        F: FnMut(usize) -> Result<(), Error>,
    {
        for (word_index, word) in self.words.iter().enumerate() {
            let mut missing = !*word;
            while missing != 0 {
                let bit = missing.trailing_zeros() as usize;
                f(word_index * WORD_BITS + bit)?;
                missing &= missing - 1;
            }
        }
        Ok(())
    }
}

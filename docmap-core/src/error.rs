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

//! # PERFORMANCE CRITICAL MODULE
//!
//! Error constructors are reachable from every field read on the decode hot
//! path. They are marked `#[cold]` so that LLVM keeps the successful paths
//! tight; changing the attributes below can measurably slow down decoding.

use std::borrow::Cow;

use thiserror::Error;

use crate::types::WireType;

/// Set `DOCMAP_PANIC_ON_ERROR=1` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("DOCMAP_PANIC_ON_ERROR").is_some();

#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for docmap encoding and decoding.
///
/// # Always Use Static Constructor Functions
///
/// Do not build variants with enum syntax. Use the constructor functions
/// (`Error::unknown_field`, `Error::required_field_missing`, ...) so that the
/// `DOCMAP_PANIC_ON_ERROR` debugging switch sees every error.
///
/// ```rust
/// use docmap_core::error::Error;
///
/// let err = Error::required_field_missing("Person", "name", "name");
/// assert_eq!(err.to_string(), "Required element 'name' for field 'name' of type Person is missing");
/// ```
///
/// ## Debug Mode: DOCMAP_PANIC_ON_ERROR
///
/// ```bash
/// RUST_BACKTRACE=1 DOCMAP_PANIC_ON_ERROR=1 cargo test
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Decoding into a value-shaped type that cannot be null-constructed.
    #[error("Value type {0} cannot be deserialized by a struct codec")]
    UnsupportedValueType(Cow<'static, str>),

    /// The wire value is not a document where one was required.
    #[error("Expected a nested document representing the serialized form of a {type_name} value, but found a value of type {found:?} instead")]
    UnexpectedShape {
        type_name: Cow<'static, str>,
        found: WireType,
    },

    /// Wire field with no schema match, no overflow member and unknown fields not ignored.
    #[error("Element '{element}' does not match any field of type {type_name}")]
    UnknownField {
        type_name: Cow<'static, str>,
        element: String,
    },

    /// A required field never appeared in the document.
    #[error("Required element '{element}' for field '{member}' of type {type_name} is missing")]
    RequiredFieldMissing {
        type_name: Cow<'static, str>,
        member: Cow<'static, str>,
        element: Cow<'static, str>,
    },

    /// Buffered values satisfy no registered creator.
    #[error("No matching creator found for type {0}")]
    NoMatchingCreator(Cow<'static, str>),

    /// A field's own value codec failed.
    #[error("An error occurred while deserializing the {member} field of type {type_name}: {source}")]
    MemberDecodeFailure {
        type_name: Cow<'static, str>,
        member: Cow<'static, str>,
        #[source]
        source: Box<Error>,
    },

    /// Identifier get/set on a type without an identifier field.
    #[error("Type {0} has no identifier field")]
    MissingIdentifier(Cow<'static, str>),

    /// Identifier set on a value-shaped type.
    #[error("Setting the identifier is not supported for value type {0}")]
    NotObjectShaped(Cow<'static, str>),

    /// Bounds violation while reading bytes.
    #[error("Buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// The reader met a tag other than the one the caller asked for.
    #[error("Wire type mismatch: expected {expected:?}, found {found:?}")]
    WireTypeMismatch { expected: WireType, found: WireType },

    /// Corrupted or malformed bytes, or a writer misuse.
    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    /// A schema failed validation while being built or registered.
    #[error("{0}")]
    InvalidSchema(Cow<'static, str>),

    /// Unregistered types, downcast failures and similar type-level errors.
    #[error("{0}")]
    TypeError(Cow<'static, str>),

    /// A discriminator value with no registered type assignable to the nominal type.
    #[error("Unknown discriminator value '{discriminator}' for nominal type {nominal}")]
    UnknownDiscriminator {
        nominal: Cow<'static, str>,
        discriminator: String,
    },

    /// Maximum document nesting depth exceeded.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    /// Unsupported operation, such as instantiating an abstract type.
    #[error("{0}")]
    Unsupported(Cow<'static, str>),
}

macro_rules! panic_or_return {
    ($err:expr) => {{
        let err = $err;
        if PANIC_ON_ERROR {
            panic!("DOCMAP_PANIC_ON_ERROR: {}", err);
        }
        err
    }};
}

impl Error {
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unsupported_value_type<S: Into<Cow<'static, str>>>(type_name: S) -> Self {
        panic_or_return!(Error::UnsupportedValueType(type_name.into()))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unexpected_shape<S: Into<Cow<'static, str>>>(type_name: S, found: WireType) -> Self {
        panic_or_return!(Error::UnexpectedShape {
            type_name: type_name.into(),
            found,
        })
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown_field<S: Into<Cow<'static, str>>>(type_name: S, element: String) -> Self {
        panic_or_return!(Error::UnknownField {
            type_name: type_name.into(),
            element,
        })
    }

    /// Creates a new [`Error::RequiredFieldMissing`].
    ///
    /// # Example
    /// ```
    /// use docmap_core::error::Error;
    ///
    /// let err = Error::required_field_missing("Person", "name", "n");
    /// assert!(matches!(err, Error::RequiredFieldMissing { .. }));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn required_field_missing<S, M, E>(type_name: S, member: M, element: E) -> Self
    where
        S: Into<Cow<'static, str>>,
        M: Into<Cow<'static, str>>,
        E: Into<Cow<'static, str>>,
    {
        panic_or_return!(Error::RequiredFieldMissing {
            type_name: type_name.into(),
            member: member.into(),
            element: element.into(),
        })
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn no_matching_creator<S: Into<Cow<'static, str>>>(type_name: S) -> Self {
        panic_or_return!(Error::NoMatchingCreator(type_name.into()))
    }

    /// Wraps a field codec failure with the owning type and member.
    ///
    /// Not subject to `DOCMAP_PANIC_ON_ERROR`: the cause has already gone through it.
    #[inline(never)]
    #[cold]
    pub fn member_decode_failure<S, M>(type_name: S, member: M, source: Error) -> Self
    where
        S: Into<Cow<'static, str>>,
        M: Into<Cow<'static, str>>,
    {
        Error::MemberDecodeFailure {
            type_name: type_name.into(),
            member: member.into(),
            source: Box::new(source),
        }
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn missing_identifier<S: Into<Cow<'static, str>>>(type_name: S) -> Self {
        panic_or_return!(Error::MissingIdentifier(type_name.into()))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn not_object_shaped<S: Into<Cow<'static, str>>>(type_name: S) -> Self {
        panic_or_return!(Error::NotObjectShaped(type_name.into()))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        panic_or_return!(Error::BufferOutOfBound(offset, length, capacity))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn wire_type_mismatch(expected: WireType, found: WireType) -> Self {
        panic_or_return!(Error::WireTypeMismatch { expected, found })
    }

    /// Creates a new [`Error::InvalidData`] from a string or static message.
    ///
    /// # Example
    /// ```
    /// use docmap_core::error::Error;
    ///
    /// let err = Error::invalid_data("Invalid data format");
    /// let err = Error::invalid_data(format!("Invalid tag {}", 42));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        panic_or_return!(Error::InvalidData(s.into()))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_schema<S: Into<Cow<'static, str>>>(s: S) -> Self {
        panic_or_return!(Error::InvalidSchema(s.into()))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        panic_or_return!(Error::TypeError(s.into()))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown_discriminator<S: Into<Cow<'static, str>>>(
        nominal: S,
        discriminator: String,
    ) -> Self {
        panic_or_return!(Error::UnknownDiscriminator {
            nominal: nominal.into(),
            discriminator,
        })
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        panic_or_return!(Error::DepthExceed(s.into()))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unsupported<S: Into<Cow<'static, str>>>(s: S) -> Self {
        panic_or_return!(Error::Unsupported(s.into()))
    }

    /// Strips [`Error::MemberDecodeFailure`] layers and returns the innermost cause.
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::MemberDecodeFailure { source, .. } = current {
            current = &**source;
        }
        current
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// # Examples
/// ```
/// use docmap_core::ensure;
/// use docmap_core::error::Error;
///
/// fn check_value(n: i32) -> Result<(), Error> {
///     ensure!(n > 0, "value must be positive");
///     ensure!(n < 10, "value {} too large", n);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::invalid_data($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::invalid_data(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with an [`Error::InvalidData`].
///
/// # Examples
/// ```
/// use docmap_core::bail;
/// use docmap_core::error::Error;
///
/// fn fail_fast() -> Result<(), Error> {
///     bail!("something went wrong");
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::invalid_data($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::invalid_data(format!($fmt, $($arg)*)))
    };
}

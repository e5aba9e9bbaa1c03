// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Error types

use std::error::Error as StdError;
use std::fmt;

use num_bigint::BigUint;

use crate::parsers;


/// Register file construction error type
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A configuration value could not be parsed
    Parse(String),
    /// A value does not fit the signal it is matched against
    AddressRange(BigUint, usize),
    /// A carry propagated out of the topmost masked bit during addition
    AddressOverflow,
    /// A borrow propagated out of the topmost masked bit during addition
    AddressUnderflow,
    /// An address summand was too large for the masked bits
    SummandRange,
    /// Two addresses with overlapping masks were combined
    MaskOverlap,
    /// Two mappings can match the same internal address
    AddressConflict(Box<Conflict>),
    /// Any other condition which makes the input invalid
    Validation(String),
}

impl From<Conflict> for Error {
    fn from(conflict: Conflict) -> Self {
        Self::AddressConflict(conflict.into())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Self::Validation(err)
    }
}

impl StdError for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err)                => fmt::Display::fmt(err, f),
            Self::AddressRange(value, bits) => write!(
                f,
                "address 0x{:X} is out of range for {} bits",
                value,
                bits,
            ),
            Self::AddressOverflow           => write!(f, "overflow during address addition"),
            Self::AddressUnderflow          => write!(f, "underflow during address addition"),
            Self::SummandRange              => write!(f, "address summand out of range"),
            Self::MaskOverlap               => write!(
                f,
                "combining overlapping addresses is probably not what you want",
            ),
            Self::AddressConflict(conflict) => fmt::Display::fmt(conflict, f),
            Self::Validation(err)           => fmt::Display::fmt(err, f),
        }
    }
}


/// Details of a conflict between two address map entries
///
/// A conflict arises if the address of a new map entry can match an address
/// some older entry also matches. The offending entries are reported via their
/// display names, alongside human-readable representations of their addresses
/// and of an example address matched by both.
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    /// Name of the entry which could not be mapped
    pub new: String,
    /// Address representation of that entry, if distinct from the common one
    pub new_repr: Option<String>,
    /// Name of the previously mapped entry
    pub old: String,
    /// Address representation of that entry, if distinct from the common one
    pub old_repr: Option<String>,
    /// Representation of an address matched by both entries
    pub at: String,
    /// Whether the conflict is in the write rather than the read map
    pub write: bool,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.write { "write" } else { "read" };
        match (self.new_repr.as_ref(), self.old_repr.as_ref()) {
            (Some(new_repr), Some(old_repr)) => write!(
                f,
                "address conflict between {} ({}) and {} ({}) at {} in {} mode",
                self.new, new_repr, self.old, old_repr, self.at, mode,
            ),
            _ => write!(
                f,
                "address conflict between {} and {} at {} in {} mode",
                self.new, self.old, self.at, mode,
            ),
        }
    }
}


/// Convert a `nom::Err` into an `Error`
pub(crate) fn convert_error(input: &str, err: nom::Err<parsers::Error>) -> Error {
    use nom::error::convert_error;

    match err {
        nom::Err::Incomplete(_) => Error::Parse("unexpected end of input".to_string()),
        nom::Err::Error(e) | nom::Err::Failure(e) => Error::Parse(convert_error(input, e)),
    }
}

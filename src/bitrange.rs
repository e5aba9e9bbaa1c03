// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Bit ranges

pub(crate) mod parsers;

#[cfg(test)]
mod tests;

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::error::Error;


/// An inclusive range of bit indices within a logical register
///
/// A field occupying a single bit of an `std_logic` nature is represented by
/// a range with identical high and low indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitRange {
    low: usize,
    high: usize,
}

impl BitRange {
    /// Create a new bit range from two bit indices
    ///
    /// The order of the indices does not matter.
    pub fn new(a: usize, b: usize) -> Self {
        Self {low: a.min(b), high: a.max(b)}
    }

    /// Create a new single-bit range
    pub fn scalar(bit: usize) -> Self {
        Self {low: bit, high: bit}
    }

    /// Create a new range covering an entire bus word of the given width
    pub fn word(width: usize) -> Self {
        Self {low: 0, high: width.saturating_sub(1)}
    }

    /// Retrieve the low bit index
    pub fn low(&self) -> usize {
        self.low
    }

    /// Retrieve the high bit index
    pub fn high(&self) -> usize {
        self.high
    }

    /// Retrieve the width of the range in bits
    pub fn width(&self) -> usize {
        self.high - self.low + 1
    }

    /// Check whether this range covers a single bit
    pub fn is_scalar(&self) -> bool {
        self.high == self.low
    }

    /// Shift the range by the given number of bits
    ///
    /// Negative offsets shift towards the LSB. An offset which would place the
    /// low index below zero is an error.
    pub fn shifted(&self, offset: i64) -> Result<Self, Error> {
        let low = self.low as i64 + offset;
        let high = self.high as i64 + offset;
        if low < 0 {
            return Err(Error::Validation("negative bit index".to_string()))
        }
        Ok(Self {low: low as usize, high: high as usize})
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scalar() {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}..{}", self.high, self.low)
        }
    }
}

#[cfg(test)]
impl Arbitrary for BitRange {
    fn arbitrary(g: &mut Gen) -> Self {
        let low = u8::arbitrary(g) as usize;
        let width = u8::arbitrary(g) as usize;
        Self {low, high: low + width}
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let res = (self.low, self.high - self.low)
            .shrink()
            .map(|(low, width)| Self {low, high: low + width});
        Box::new(res)
    }
}

// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Masked addresses

pub(crate) mod parsers;

#[cfg(test)]
mod tests;

use std::ops;

use num_bigint::BigUint;
use num_traits::Zero;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::error::{self, Error};


/// An address with a mask that addresses can be matched against
///
/// Only bits set in the mask take part in a match; all other bits are "don't
/// care". Both the value and the mask are of arbitrary width, since internal
/// addresses may concatenate the bus address with any number of additional
/// match conditions. The value is normalized: bits not set in the mask are
/// never set in the value.
///
/// The default masked address has an empty mask and thus matches every
/// address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaskedAddress {
    value: BigUint,
    mask: BigUint,
}

impl MaskedAddress {
    /// Create a new masked address from a value and a mask
    pub fn new(value: BigUint, mask: BigUint) -> Self {
        let value = value & &mask;
        Self {value, mask}
    }

    /// Parse an address specification string
    ///
    /// The specification consists of an address part, optionally followed by a
    /// mask part. The address part may be a plain integer literal or a
    /// hexadecimal or binary literal with don't care bits. In hexadecimal
    /// literals, a dash marks an entire nibble as don't care and a four-bit
    /// binary group enclosed in square brackets, e.g. `[10-1]`, selects
    /// individual bits. The mask part is either `/<size>`, ignoring the given
    /// number of LSBs, `|<ignore>`, ignoring the bits set in the given
    /// integer, or `&<mask>`, ignoring the bits not set in the given integer.
    ///
    /// Without an explicit mask part, the lowest `ignore_lsbs` bits are
    /// ignored. Values not representable in `signal_width` bits are an error.
    pub fn parse_config(spec: &str, ignore_lsbs: usize, signal_width: usize) -> Result<Self, Error> {
        use nom::combinator::all_consuming;

        let (_, (value, suffix)) = all_consuming(parsers::spec)(spec)
            .map_err(|e| error::convert_error(spec, e))?;

        let full_mask = ones(signal_width);

        let (value, parsed_mask) = match value {
            parsers::Value::Ternary{value, mask, width} =>
                (value, Some((ones(signal_width) << width) | mask)),
            parsers::Value::Plain(value) => (value, None),
        };

        let mask = match suffix {
            parsers::Suffix::Size(size)     => mask_above(signal_width, size),
            parsers::Suffix::Ignore(ignore) => &full_mask ^ (ignore & &full_mask),
            parsers::Suffix::Care(care)     => care,
            parsers::Suffix::None           => mask_above(signal_width, ignore_lsbs),
        };
        let mask = match parsed_mask {
            Some(parsed) => mask & parsed,
            None => mask,
        };

        if value.bits() > signal_width as u64 {
            return Err(Error::AddressRange(value, signal_width))
        }

        Ok(Self::new(value, mask & full_mask))
    }

    /// Retrieve the address value
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Retrieve the mask
    pub fn mask(&self) -> &BigUint {
        &self.mask
    }

    /// Check whether the given address is matched by this masked address
    pub fn contains(&self, address: &BigUint) -> bool {
        (address & &self.mask) == self.value
    }

    /// Check whether this masked address matches all addresses
    pub fn contains_all(&self) -> bool {
        self.mask.is_zero()
    }

    /// Find an address matched by both this and the given masked address
    ///
    /// If the two masked addresses cannot both match any single address, this
    /// function returns `None`. Otherwise, it returns an example of such an
    /// address. Any bit neither address cares about is reported as zero.
    pub fn common(&self, other: &Self) -> Option<BigUint> {
        if !(&self.mask & &other.mask & (&self.value ^ &other.value)).is_zero() {
            return None
        }
        Some(&self.value | &other.value)
    }

    /// Remove the match conditions for the bits not set in the given mask
    pub fn mask_and(&self, bits: &BigUint) -> Self {
        Self {
            value: &self.value & bits,
            mask: &self.mask & bits,
        }
    }

    /// Add a number to the don't-care-compacted representation
    ///
    /// The summand is added to the masked bits only, as if the don't care bits
    /// were squeezed out of the address before the addition and re-inserted
    /// afterwards. A carry out of the topmost masked bit is an overflow, a
    /// borrow which is not absorbed is an underflow.
    pub fn add(&self, summand: i128) -> Result<Self, Error> {
        let mut value = self.value.clone();
        let mut summand = summand;
        let mut carry = 0;
        for bit in 0..self.mask.bits() {
            if !self.mask.bit(bit) {
                continue
            }
            let sum = (summand & 1) as u8 + carry + self.value.bit(bit) as u8;
            summand >>= 1;
            value.set_bit(bit, sum & 1 == 1);
            carry = sum >> 1;
        }
        match summand {
            0  if carry != 0 => Err(Error::AddressOverflow),
            -1 if carry == 0 => Err(Error::AddressUnderflow),
            0 | -1 => Ok(Self {value, mask: self.mask.clone()}),
            _ => Err(Error::SummandRange),
        }
    }

    /// Combine this masked address with another one with a disjoint mask
    ///
    /// The result matches iff both inputs match. Combining addresses with
    /// overlapping masks is an error.
    pub fn combine(&self, other: &Self) -> Result<Self, Error> {
        if !(&self.mask & &other.mask).is_zero() {
            return Err(Error::MaskOverlap)
        }
        Ok(Self {
            value: &self.value | &other.value,
            mask: &self.mask | &other.mask,
        })
    }

    /// Represent this masked address for documentation purposes
    ///
    /// The function tries to find the most human-readable representation: a
    /// single dash if all bits are ignored, a plain integer for single-bit
    /// signals, a hexadecimal literal if all bits are cared about, the
    /// `<hex>/<size>` notation if the ignored bits form a contiguous LSB run
    /// and a binary literal with dashes for the ignored bits otherwise.
    pub fn doc_represent(&self, width: usize) -> String {
        let width_mask = ones(width);
        let value = &self.value & &width_mask;
        let mask = &self.mask & &width_mask;
        let inv_mask = &width_mask ^ &mask;

        if mask.is_zero() {
            return "-".to_string()
        }

        let hex_digits = (width + 3) / 4;
        let format_int = |value: &BigUint| if width <= 1 {
            format!("{}", value)
        } else {
            format!("0x{:0width$X}", value, width = hex_digits)
        };

        if mask == width_mask {
            return format_int(&value)
        }

        let lsbs_ignored = inv_mask.bits() as usize;
        if inv_mask == ones(lsbs_ignored) {
            return format!("{}/{}", format_int(&value), lsbs_ignored)
        }

        let mut res = "0b".to_string();
        for idx in (0..width as u64).rev() {
            res.push(if !mask.bit(idx) {
                '-'
            } else if value.bit(idx) {
                '1'
            } else {
                '0'
            });
        }
        res
    }
}

impl ops::Shl<usize> for &MaskedAddress {
    type Output = MaskedAddress;

    /// Shift left, shifting in don't care bits
    fn shl(self, shamt: usize) -> Self::Output {
        MaskedAddress {
            value: &self.value << shamt,
            mask: &self.mask << shamt,
        }
    }
}

impl ops::Shl<usize> for MaskedAddress {
    type Output = MaskedAddress;

    fn shl(self, shamt: usize) -> Self::Output {
        &self << shamt
    }
}

impl ops::Shr<usize> for &MaskedAddress {
    type Output = MaskedAddress;

    /// Shift right, shifting in don't care bits
    fn shr(self, shamt: usize) -> Self::Output {
        MaskedAddress {
            value: &self.value >> shamt,
            mask: &self.mask >> shamt,
        }
    }
}

impl ops::Shr<usize> for MaskedAddress {
    type Output = MaskedAddress;

    fn shr(self, shamt: usize) -> Self::Output {
        &self >> shamt
    }
}

#[cfg(test)]
impl Arbitrary for MaskedAddress {
    fn arbitrary(g: &mut Gen) -> Self {
        let value: u128 = Arbitrary::arbitrary(g);
        let mask: u128 = Arbitrary::arbitrary(g);
        Self::new(value.into(), mask.into())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        use num_traits::ToPrimitive;

        match (self.value.to_u128(), self.mask.to_u128()) {
            (Some(value), Some(mask)) => Box::new(
                (value, mask).shrink().map(|(v, m)| Self::new(v.into(), m.into()))
            ),
            _ => Box::new(std::iter::empty()),
        }
    }
}


/// Construct a mask with the given number of LSBs set
pub(crate) fn ones(width: usize) -> BigUint {
    (BigUint::from(1u8) << width) - 1u8
}


/// Construct a mask of the given width with the lowest `low` bits cleared
fn mask_above(width: usize, low: usize) -> BigUint {
    if low >= width {
        BigUint::zero()
    } else {
        ones(width - low) << low
    }
}

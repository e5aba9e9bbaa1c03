// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Parsers for masked address specifications

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char as chr;
use nom::combinator::{map, success, value};
use nom::error::context;
use nom::multi::fold_many1;
use nom::sequence::{delimited, preceded, tuple};

use num_bigint::BigUint;

use crate::parsers::{self, IResult};


/// Address part of a masked address specification
#[derive(Clone, Debug)]
pub enum Value {
    /// A hexadecimal or binary literal which may contain don't care bits
    ///
    /// `width` is the number of bits actually written. Bits above those are
    /// implicitly cared about.
    Ternary{value: BigUint, mask: BigUint, width: usize},
    /// A plain integer literal
    Plain(BigUint),
}


/// Mask part of a masked address specification
#[derive(Clone, Debug)]
pub enum Suffix {
    /// `/<size>`: ignore the given number of LSBs
    Size(usize),
    /// `|<ignore>`: ignore the bits set in the given value
    Ignore(BigUint),
    /// `&<mask>`: ignore the bits not set in the given value
    Care(BigUint),
    /// No mask part
    None,
}


/// Parse a full masked address specification
pub fn spec(input: &str) -> IResult<(Value, Suffix)> {
    tuple((spec_value, spec_suffix))(input)
}


/// Parse the address part of a masked address specification
fn spec_value(input: &str) -> IResult<Value> {
    context(
        "expected address",
        alt((
            map(preceded(alt((tag("0x"), tag("0X"))), pieces(hex_piece)), Value::from),
            map(preceded(alt((tag("0b"), tag("0B"))), pieces(bin_piece)), Value::from),
            map(parsers::unsigned, Value::Plain),
        )),
    )(input)
}


/// Parse the mask part of a masked address specification
fn spec_suffix(input: &str) -> IResult<Suffix> {
    alt((
        map(preceded(chr('/'), parsers::decimal), Suffix::Size),
        map(preceded(chr('|'), parsers::unsigned), Suffix::Ignore),
        map(preceded(chr('&'), parsers::unsigned), Suffix::Care),
        success(Suffix::None),
    ))(input)
}


/// A run of value bits with their mask: `(value, mask, bit count)`
type Piece = (u32, u32, usize);


/// Construct a parser folding a sequence of pieces into a ternary value
fn pieces<'i>(
    piece: impl FnMut(&'i str) -> IResult<'i, Piece>,
) -> impl FnMut(&'i str) -> IResult<'i, (BigUint, BigUint, usize)> {
    fold_many1(
        piece,
        || (BigUint::default(), BigUint::default(), 0),
        |(value, mask, width), (piece_value, piece_mask, piece_width)| (
            (value << piece_width) | BigUint::from(piece_value),
            (mask << piece_width) | BigUint::from(piece_mask),
            width + piece_width,
        ),
    )
}


/// Parse a single element of a ternary hex literal
fn hex_piece(input: &str) -> IResult<Piece> {
    use nom::character::complete::satisfy;

    alt((
        map(
            satisfy(|c| c.is_digit(16)),
            |c| (c.to_digit(16).unwrap_or(0), 0xF, 4),
        ),
        value((0, 0, 4), chr('-')),
        map(
            delimited(
                chr('['),
                tuple((ternary_bit, ternary_bit, ternary_bit, ternary_bit)),
                chr(']'),
            ),
            |(a, b, c, d)| [a, b, c, d].iter().fold(
                (0, 0, 0),
                |(value, mask, width), (v, m, w)| (value << 1 | v, mask << 1 | m, width + w),
            ),
        ),
        value((0, 0, 0), chr('_')),
    ))(input)
}


/// Parse a single element of a ternary binary literal
fn bin_piece(input: &str) -> IResult<Piece> {
    alt((
        ternary_bit,
        value((0, 0, 0), chr('_')),
    ))(input)
}


/// Parse a single bit of a ternary literal
fn ternary_bit(input: &str) -> IResult<Piece> {
    alt((
        value((1, 1, 1), chr('1')),
        value((0, 1, 1), chr('0')),
        value((0, 0, 1), chr('-')),
    ))(input)
}


impl From<(BigUint, BigUint, usize)> for Value {
    fn from((value, mask, width): (BigUint, BigUint, usize)) -> Self {
        Self::Ternary{value, mask, width}
    }
}

// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Parsers for field locations and internal signal references

use nom::character::complete::char as chr;
use nom::combinator::{opt, recognize};
use nom::sequence::{pair, preceded};

use crate::address;
use crate::bitrange::{self, BitRange};
use crate::parsers::{self, IResult};


/// Parse a field location
///
/// A location is a masked address specification, optionally followed by a
/// colon and a bit range. The address specification is yielded unparsed, as
/// its interpretation depends on the bus parameters.
pub fn location(input: &str) -> IResult<(&str, Option<BitRange>)> {
    pair(
        recognize(address::parsers::spec),
        opt(preceded(chr(':'), bitrange::parsers::bitrange)),
    )(input)
}


/// Parse an internal signal reference: a name with an optional vector width
pub fn internal(input: &str) -> IResult<(&str, Option<usize>)> {
    pair(
        parsers::identifier,
        opt(preceded(chr(':'), parsers::decimal)),
    )(input)
}

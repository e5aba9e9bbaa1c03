// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Parsers for bit ranges

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::map;
use nom::error::context;
use nom::sequence::separated_pair;

use crate::parsers::{decimal, IResult};

use super::BitRange;


/// Parse a bit range
///
/// A bit range is either a single bit index or two bit indices separated by
/// `..`.
pub fn bitrange(input: &str) -> IResult<BitRange> {
    context(
        "expected bit range",
        alt((
            map(separated_pair(decimal, tag(".."), decimal), |(a, b)| BitRange::new(a, b)),
            map(decimal, BitRange::scalar),
        )),
    )(input)
}

// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Parser utilities


use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{satisfy, space0};
use nom::combinator::{not, peek, value};
use nom::error::context;
use nom::sequence::{preceded, tuple};

use num_bigint::BigUint;


/// Result type for our (sub)parsers
pub type IResult<'i, O> = nom::IResult<&'i str, O, Error<'i>>;


/// Error type for our (sub)parsers
pub type Error<'i> = nom::error::VerboseError<&'i str>;


/// Parse an identifier
///
/// The parser will consume the longest sequence of alphanumeric characters and
/// '_'. However, the parser will return an error if the first character is a
/// numeric character.
///
/// The returned parser will consume any spaces and tabs preceding the identifier.
pub fn identifier(input: &str) -> IResult<&str> {
    context(
        "expected identifier",
        nom::combinator::map(
            tuple((space0, peek(not(satisfy(char::is_numeric))), take_while1(is_identifier_char))),
            |(_, _, s)| s
        )
    )(input)
}


/// Parse a decimal numeral
///
/// The returned parser will consume any spaces preceding the decimal.
pub fn decimal<O>(input: &str) -> IResult<O>
    where O: std::str::FromStr
{
    use nom::combinator::{recognize, success};
    use nom::branch::alt;

    let sign = alt((value((), tag("+")), value((), tag("-")), success(())));

    context(
        "expected decimal numeral",
        nom::combinator::map_res(
            preceded(space0, recognize(tuple((sign, take_while1(char::is_numeric))))),
            str::parse
        )
    )(input)
}


/// Parse an unsigned integer literal of arbitrary width
///
/// The parser accepts decimal numerals as well as hexadecimal, octal and
/// binary ones introduced by `0x`, `0o` and `0b` prefixes. Underscores between
/// digits are ignored.
///
/// The returned parser will consume any spaces preceding the literal.
pub fn unsigned(input: &str) -> IResult<BigUint> {
    use nom::branch::alt;

    context(
        "expected integer literal",
        preceded(space0, alt((
            preceded(alt((tag("0x"), tag("0X"))), digits(16)),
            preceded(alt((tag("0o"), tag("0O"))), digits(8)),
            preceded(alt((tag("0b"), tag("0B"))), digits(2)),
            digits(10),
        ))),
    )(input)
}


/// Construct a parser for a sequence of digits with the given radix
///
/// Underscores interspersed with the digits are skipped. At least one real
/// digit must be present.
pub fn digits<'i>(radix: u32) -> impl FnMut(&'i str) -> IResult<'i, BigUint> {
    use nom::combinator::map_opt;

    map_opt(
        take_while(move |c: char| c == '_' || c.is_digit(radix)),
        move |s: &str| {
            let mut res: Option<BigUint> = None;
            for digit in s.chars().filter_map(|c| c.to_digit(radix)) {
                res = Some(res.unwrap_or_default() * radix + digit);
            }
            res
        },
    )
}


/// Check whether the character is allowed in identifiers
fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

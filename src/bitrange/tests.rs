// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Tests related to bit ranges

use nom::combinator::all_consuming;
use nom::Finish;

use quickcheck::TestResult;

use crate::tests::Equivalence;

use super::{BitRange, parsers};


#[quickcheck]
fn parse_bitrange(original: BitRange) -> Result<Equivalence<BitRange>, String> {
    let s = original.to_string();
    let res = all_consuming(parsers::bitrange)(&s)
        .finish()
        .map(|(_, parsed)| Equivalence::of(original, parsed))
        .map_err(|e| e.to_string());
    res
}


#[quickcheck]
fn shift_round_trip(original: BitRange, offset: i16) -> Result<TestResult, String> {
    let shifted = match original.shifted(offset as i64) {
        Ok(shifted) => shifted,
        Err(_) => return Ok(TestResult::discard()),
    };
    shifted.shifted(-(offset as i64))
        .map(|back| TestResult::from_bool(back == original))
        .map_err(|e| e.to_string())
}


#[quickcheck]
fn shift_below_zero(original: BitRange) -> bool {
    original.shifted(-(original.low() as i64) - 1).is_err()
}


#[test]
fn ordering() {
    assert!(BitRange::new(7, 0) < BitRange::new(15, 8));
    assert!(BitRange::scalar(3) < BitRange::new(6, 4));
    assert!(BitRange::new(3, 0) < BitRange::new(7, 0));
}

// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Tests related to masked addresses

use num_bigint::BigUint;

use quickcheck::{Gen, TestResult, Testable};

use crate::error::Error;
use crate::tests::Equivalence;

use super::{MaskedAddress, ones};


#[quickcheck]
fn add_inverse(original: MaskedAddress, summand: i64) -> Result<TestResult, String> {
    let added = match original.add(summand as i128) {
        Ok(added) => added,
        Err(_) => return Ok(TestResult::discard()),
    };
    added.add(-(summand as i128))
        .map(|back| Equivalence::of(original, back).result(&mut Gen::new(0)))
        .map_err(|e| e.to_string())
}


#[quickcheck]
fn common_symmetric(a: MaskedAddress, b: MaskedAddress) -> bool {
    a.common(&b) == b.common(&a)
}


#[quickcheck]
fn common_sound(a: MaskedAddress, b: MaskedAddress) -> TestResult {
    match a.common(&b) {
        Some(common) => TestResult::from_bool(a.contains(&common) && b.contains(&common)),
        None => TestResult::discard(),
    }
}


#[quickcheck]
fn combine_split(original: MaskedAddress, bits: u128) -> Result<Equivalence<MaskedAddress>, String> {
    let left = original.mask_and(&bits.into());
    let right = original.mask_and(&(!bits).into());
    left.combine(&right)
        .map(|combined| Equivalence::of(original, combined))
        .map_err(|e| e.to_string())
}


#[quickcheck]
fn combine_overlapping(original: MaskedAddress) -> TestResult {
    if original.contains_all() {
        return TestResult::discard()
    }
    TestResult::from_bool(original.combine(&original) == Err(Error::MaskOverlap))
}


#[quickcheck]
fn shift_round_trip(original: MaskedAddress, shamt: u8) -> Equivalence<MaskedAddress> {
    let shamt = shamt as usize;
    Equivalence::of(original.clone(), (&original << shamt) >> shamt)
}


#[quickcheck]
fn doc_parse_round_trip(original: MaskedAddress) -> Result<TestResult, String> {
    let original = original.mask_and(&ones(32));
    if original.contains_all() {
        return Ok(TestResult::discard())
    }
    let s = original.doc_represent(32);
    MaskedAddress::parse_config(&s, 0, 32)
        .map(|parsed| Equivalence::of(original, parsed).result(&mut Gen::new(0)))
        .map_err(|e| e.to_string())
}


#[test]
fn add_fixed_vector() {
    let base = MaskedAddress::parse_config("0b0-1--0--11--0-10", 0, 16)
        .expect("failed to parse address");
    let res = base.add(0b0110_1100).expect("addition failed");
    assert_eq!(res.doc_represent(16), "0b1-1--0--00--1-10");
}


#[test]
fn add_out_of_range() {
    let addr = MaskedAddress::new(1u8.into(), 1u8.into());
    assert_eq!(addr.add(1), Err(Error::AddressOverflow));
    assert_eq!(addr.add(-2), Err(Error::AddressUnderflow));
    assert_eq!(addr.add(2), Err(Error::SummandRange));
}


#[test]
fn parse_plain() {
    assert_eq!(
        MaskedAddress::parse_config("0x10", 2, 32),
        Ok(MaskedAddress::new(0x10u8.into(), 0xFFFF_FFFCu32.into())),
    );
    assert_eq!(
        MaskedAddress::parse_config("123", 2, 32),
        Ok(MaskedAddress::new(120u8.into(), 0xFFFF_FFFCu32.into())),
    );
}


#[test]
fn parse_suffixes() {
    assert_eq!(
        MaskedAddress::parse_config("0x10/4", 2, 32),
        Ok(MaskedAddress::new(0x10u8.into(), 0xFFFF_FFF0u32.into())),
    );
    assert_eq!(
        MaskedAddress::parse_config("0x10|0xFF", 0, 32),
        Ok(MaskedAddress::new(0u8.into(), 0xFFFF_FF00u32.into())),
    );
    assert_eq!(
        MaskedAddress::parse_config("0x10&0xFF", 0, 32),
        Ok(MaskedAddress::new(0x10u8.into(), 0xFFu8.into())),
    );
}


#[test]
fn parse_ternary() {
    assert_eq!(
        MaskedAddress::parse_config("0x1[10-1]", 0, 32),
        Ok(MaskedAddress::new(0x19u8.into(), 0xFFFF_FFFDu32.into())),
    );
    assert_eq!(
        MaskedAddress::parse_config("0b1-1", 0, 32),
        Ok(MaskedAddress::new(5u8.into(), 0xFFFF_FFFDu32.into())),
    );
}


#[test]
fn parse_out_of_range() {
    assert_eq!(
        MaskedAddress::parse_config("0x100000000", 0, 32),
        Err(Error::AddressRange(BigUint::from(0x1_0000_0000u64), 32)),
    );
    assert_eq!(
        Error::AddressRange(BigUint::from(0x1_0000_0000u64), 32).to_string(),
        "address 0x100000000 is out of range for 32 bits",
    );
}


#[test]
fn doc_representations() {
    assert_eq!(MaskedAddress::default().doc_represent(32), "-");
    assert_eq!(MaskedAddress::new(1u8.into(), 1u8.into()).doc_represent(1), "1");
    assert_eq!(
        MaskedAddress::new(0x12u8.into(), 0xFFFF_FFFFu32.into()).doc_represent(32),
        "0x00000012",
    );
    assert_eq!(
        MaskedAddress::new(0x40u8.into(), 0xFFFF_FFFCu32.into()).doc_represent(32),
        "0x00000040/2",
    );
    assert_eq!(
        MaskedAddress::new(0b100u8.into(), 0b101u8.into()).doc_represent(3),
        "0b1-0",
    );
}

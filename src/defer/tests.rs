// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Tests related to deferral tags

use std::collections::HashSet;

use quickcheck::TestResult;

use super::DeferTagManager;


#[test]
fn sequential_tags() {
    let mut manager = DeferTagManager::new();
    assert!(manager.is_empty());
    for index in 0..5 {
        assert_eq!(manager.next_tag().index(), index);
    }
    assert_eq!(manager.count(), 5);
    assert!(!manager.is_empty());
}


#[test]
fn tag_width() {
    let widths = [
        (0, 1), (1, 1), (2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4),
    ];
    let mut manager = DeferTagManager::new();
    for &(count, width) in widths.iter() {
        while manager.count() < count {
            manager.next_tag();
        }
        assert_eq!(manager.width(), width, "width for {} tags", count);
    }
}


#[test]
fn tag_literals() {
    let mut manager = DeferTagManager::new();
    let tags: Vec<_> = (0..5).map(|_| manager.next_tag()).collect();
    assert_eq!(manager.literal(tags[0]), "\"000\"");
    assert_eq!(manager.literal(tags[2]), "\"010\"");
    assert_eq!(manager.literal(tags[4]), "\"100\"");
}


#[quickcheck]
fn distinct_literals(count: u8) -> TestResult {
    let mut manager = DeferTagManager::new();
    let tags: Vec<_> = (0..count).map(|_| manager.next_tag()).collect();
    let literals: HashSet<_> = tags.iter().map(|&tag| manager.literal(tag)).collect();
    TestResult::from_bool(
        literals.len() == count as usize
            && literals.iter().all(|l| l.len() == manager.width() + 2),
    )
}

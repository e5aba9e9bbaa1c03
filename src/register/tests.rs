// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Tests related to logical registers and blocks

use quickcheck::TestResult;

use crate::access::{AccessMode, Behavior};
use crate::address::MaskedAddress;
use crate::addressing::AddressSignalMap;
use crate::error::Error;
use crate::field::{Field, FieldConfig, FieldDescriptor};
use crate::metadata::MetadataConfig;
use crate::named::Named;

use super::{construct_registers, Endianness, LogicalRegister};


fn field(location: &str, name: &str, behavior: Behavior) -> Field {
    field_with(location, name, behavior, |_| ())
}


fn field_with(
    location: &str,
    name: &str,
    behavior: Behavior,
    tweak: impl FnOnce(&mut FieldConfig),
) -> Field {
    let mut config = FieldConfig::new(location, MetadataConfig::named(name), behavior);
    tweak(&mut config);
    FieldDescriptor::new(&config, 32)
        .expect("Could not expand descriptor")
        .into_fields()
        .remove(0)
}


fn registers(fields: Vec<Field>) -> Result<Vec<LogicalRegister>, Error> {
    registers_with(fields, Endianness::Little)
}


fn registers_with(
    fields: Vec<Field>,
    endianness: Endianness,
) -> Result<Vec<LogicalRegister>, Error> {
    let signals = AddressSignalMap::new();
    let internal = fields[0].address().clone();
    construct_registers(fields, internal, 32, endianness, &signals)
}


fn address(spec: &str) -> MaskedAddress {
    MaskedAddress::parse_config(spec, 2, 32).expect("Could not parse address")
}


#[test]
fn single_field_register() {
    let regs = registers(vec![field("0x0:7..0", "data", Behavior::Control)])
        .expect("Could not construct registers");
    assert_eq!(regs.len(), 1);
    let reg = &regs[0];
    assert_eq!(reg.mode(), AccessMode::ReadWrite);
    assert_eq!(reg.name(), "data_reg");
    assert_eq!(reg.mnemonic(), "DATA");
    assert_eq!(reg.meta().brief(), "register for field `DATA`.");

    assert_eq!(reg.blocks().len(), 1);
    let block = &reg.blocks()[0];
    assert_eq!(block.name(), "data_reg");
    assert_eq!(block.mnemonic(), "DATA");
    assert_eq!(block.meta().brief(), "block containing bits 31..0 of register `data_reg` (`DATA`).");
    assert_eq!(block.address(), &address("0x0"));

    assert_eq!(block.row_headers(), ["R/W"]);
    assert_eq!(block.mappings().len(), 1);
    let mapping = &block.mappings()[0];
    assert_eq!(mapping.field(), 0);
    assert_eq!(mapping.bits(), Some((7, 0)));
    assert_eq!(mapping.offset(), 0);
    assert!(mapping.read() && mapping.write());
    assert_eq!((mapping.col_index(), mapping.col_span()), (24, 8));
    assert_eq!((mapping.row_index(), mapping.row_span()), (0, 1));
}


#[test]
fn generated_metadata() {
    let regs = registers(vec![
        field("0x0:7..0", "sts", Behavior::Status),
        field("0x0:15..8", "ctl", Behavior::Strobe),
    ]).expect("Could not construct registers");
    assert_eq!(regs.len(), 1);
    let reg = &regs[0];
    assert_eq!(reg.mode(), AccessMode::ReadWrite);
    assert_eq!(reg.name(), "sts_reg");
    assert_eq!(reg.meta().brief(), "register for fields `STS` and `CTL`.");

    // The read-only and write-only fields keep the two table rows distinct.
    let block = &reg.blocks()[0];
    assert_eq!(block.row_headers(), ["R", "W"]);
    assert_eq!(block.mappings().len(), 2);
    let sts = &block.mappings()[0];
    assert_eq!(sts.field(), 0);
    assert!(sts.read() && !sts.write());
    assert_eq!((sts.row_index(), sts.row_span()), (0, 1));
    let ctl = &block.mappings()[1];
    assert_eq!(ctl.field(), 1);
    assert!(!ctl.read() && ctl.write());
    assert_eq!((ctl.row_index(), ctl.row_span()), (1, 1));
}


#[test]
fn split_metadata() {
    let regs = registers(vec![
        field("0x0:7..0", "mix", Behavior::Control),
        field_with("0x0:15..8", "sts", Behavior::Status, |cfg| {
            cfg.register_metadata = Some(MetadataConfig::named("rd_reg"));
        }),
        field_with("0x0:23..16", "ctl", Behavior::Strobe, |cfg| {
            cfg.register_metadata = Some(MetadataConfig::named("wr_reg"));
        }),
    ]).expect("Could not construct registers");
    assert_eq!(regs.len(), 2);

    let read = &regs[0];
    assert_eq!(read.mode(), AccessMode::ReadOnly);
    assert_eq!(read.name(), "rd_reg");
    let names: Vec<_> = read.fields().iter().map(|f| f.name().to_string()).collect();
    assert_eq!(names, vec!["mix", "sts"]);

    let write = &regs[1];
    assert_eq!(write.mode(), AccessMode::WriteOnly);
    assert_eq!(write.name(), "wr_reg");
    let names: Vec<_> = write.fields().iter().map(|f| f.name().to_string()).collect();
    assert_eq!(names, vec!["mix", "ctl"]);
}


#[test]
fn copied_metadata() {
    // Metadata given for one access direction only applies to both.
    let regs = registers(vec![
        field("0x0:7..0", "sts", Behavior::Status),
        field_with("0x0:15..8", "ctl", Behavior::Strobe, |cfg| {
            cfg.register_metadata = Some(MetadataConfig::named("shared"));
        }),
    ]).expect("Could not construct registers");
    assert_eq!(regs.len(), 1);
    assert_eq!(regs[0].name(), "shared");
    assert_eq!(regs[0].mode(), AccessMode::ReadWrite);
}


#[test]
fn multi_block_little_endian() {
    let regs = registers(vec![field("0x0:47..0", "wide", Behavior::Control)])
        .expect("Could not construct registers");
    let reg = &regs[0];
    assert_eq!(reg.endianness(), Endianness::Little);
    assert_eq!(reg.blocks().len(), 2);

    let low = &reg.blocks()[0];
    assert_eq!(low.mnemonic(), "WIDEL");
    assert_eq!(low.name(), "wide_reg_low");
    assert_eq!(low.offset(), 0);
    assert_eq!(low.address(), &address("0x0"));
    assert_eq!(low.meta().brief(), "block containing bits 31..0 of register `wide_reg` (`WIDE`).");
    assert_eq!(low.mappings()[0].bits(), Some((31, 0)));
    assert_eq!(low.mappings()[0].offset(), 0);

    let high = &reg.blocks()[1];
    assert_eq!(high.mnemonic(), "WIDEH");
    assert_eq!(high.name(), "wide_reg_high");
    assert_eq!(high.offset(), 32);
    assert_eq!(high.address(), &address("0x4"));
    assert_eq!(high.meta().brief(), "block containing bits 63..32 of register `wide_reg` (`WIDE`).");
    assert_eq!(high.mappings()[0].bits(), Some((47, 32)));
    assert_eq!(high.mappings()[0].offset(), 0);
    assert_eq!((high.mappings()[0].col_index(), high.mappings()[0].col_span()), (16, 16));
}


#[test]
fn multi_block_big_endian() {
    let regs = registers_with(
        vec![field("0x0:47..0", "wide", Behavior::Control)],
        Endianness::Big,
    ).expect("Could not construct registers");
    let reg = &regs[0];
    assert_eq!(reg.endianness(), Endianness::Big);

    // The first block holds the most significant word.
    let high = &reg.blocks()[0];
    assert_eq!(high.mnemonic(), "WIDEH");
    assert_eq!(high.name(), "wide_reg_high");
    assert_eq!(high.offset(), 32);
    assert_eq!(high.address(), &address("0x0"));

    let low = &reg.blocks()[1];
    assert_eq!(low.mnemonic(), "WIDEL");
    assert_eq!(low.offset(), 0);
    assert_eq!(low.address(), &address("0x4"));
}


#[test]
fn lettered_blocks() {
    let regs = registers(vec![field("0x0:95..0", "wide", Behavior::Control)])
        .expect("Could not construct registers");
    let names: Vec<_> = regs[0].blocks().iter().map(|b| b.name().to_string()).collect();
    assert_eq!(names, vec!["wide_reg_a", "wide_reg_b", "wide_reg_c"]);
    assert_eq!(regs[0].blocks()[2].mnemonic(), "WIDEC");
}


#[test]
fn too_many_blocks() {
    let err = registers(vec![field("0x0:863..0", "wide", Behavior::Control)])
        .expect_err("Construction did not fail");
    assert_eq!(err.to_string(), "cannot have more than 26 blocks per register");
}


#[test]
fn behavior_conflicts() {
    let err = registers(vec![
        field("0x0:7..0", "vf", Behavior::VolatileFlag),
        field("0x0:15..8", "mem", Behavior::Memory(AccessMode::ReadOnly)),
    ]).expect_err("Construction did not fail");
    assert_eq!(
        err.to_string(),
        "cannot have both volatile fields (`VF`) and blocking fields (`MEM`) in a single register",
    );

    let err = registers(vec![
        field("0x0:7..0", "mema", Behavior::Memory(AccessMode::ReadOnly)),
        field("0x0:15..8", "memb", Behavior::Memory(AccessMode::ReadOnly)),
    ]).expect_err("Construction did not fail");
    assert_eq!(
        err.to_string(),
        "cannot have more than one blocking field in a single register (`MEMA` and `MEMB`)",
    );

    let err = registers(vec![
        field("0x0:7..0", "axi", Behavior::Axi(AccessMode::ReadWrite)),
        field("0x0:15..8", "ctl", Behavior::Control),
    ]).expect_err("Construction did not fail");
    assert_eq!(
        err.to_string(),
        "deferring fields cannot share a register with other fields (`AXI`)",
    );
}


#[test]
fn conflicting_endianness() {
    let err = registers(vec![
        field_with("0x0:7..0", "a", Behavior::Control, |cfg| {
            cfg.endianness = Some(Endianness::Little);
        }),
        field_with("0x0:15..8", "b", Behavior::Control, |cfg| {
            cfg.endianness = Some(Endianness::Big);
        }),
    ]).expect_err("Construction did not fail");
    assert_eq!(err.to_string(), "conflicting endianness specification");
}


#[test]
fn intersecting_fields() {
    let err = registers(vec![
        field("0x0:7..0", "a", Behavior::Control),
        field("0x0:3", "b", Behavior::Control),
    ]).expect_err("Construction did not fail");
    assert_eq!(err.to_string(), "fields `b` and `a` intersect at bit 3");
}


#[quickcheck]
fn block_count(msb: u16) -> Result<TestResult, String> {
    let msb = msb as usize % 1024;
    let location = format!("0x0:{}..0", msb);
    let expected = msb / 32 + 1;

    let res = registers(vec![field(&location, "wide", Behavior::Control)]);
    if expected > 26 {
        return Ok(TestResult::from_bool(res.is_err()))
    }
    let regs = res.map_err(|e| e.to_string())?;
    let reg = &regs[0];
    let consecutive = reg
        .blocks()
        .iter()
        .enumerate()
        .all(|(index, block)| {
            reg.internal_address()
                .add(index as i128)
                .map(|a| &a == block.internal_address())
                .unwrap_or(false)
        });
    Ok(TestResult::from_bool(reg.blocks().len() == expected && consecutive))
}

// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Logical registers grouping fields which share an internal address

pub(crate) mod block;

#[cfg(test)]
mod tests;

use std::fmt;

use crate::access::{AccessCapabilities, AccessMode};
use crate::address::MaskedAddress;
use crate::addressing::{AccessDir, AddressSignalMap};
use crate::display::Enumerated;
use crate::error::Error;
use crate::field::Field;
use crate::metadata::{ExpandedMetadata, Metadata, MetadataConfig};
use crate::named::Named;

pub use block::{Block, FieldMapping};


/// Byte order of a multi-block logical register
///
/// In little-endian registers the first block holds the least significant
/// bus word, in big-endian registers the most significant one. The default
/// is little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Check whether this is the big-endian byte order
    pub fn is_big(self) -> bool {
        self == Self::Big
    }
}

impl Default for Endianness {
    fn default() -> Self {
        Self::Little
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Little => fmt::Display::fmt("little", f),
            Self::Big    => fmt::Display::fmt("big", f),
        }
    }
}


/// Construct the logical registers for a group of fields
///
/// All fields must share the given internal address. Without explicit
/// register metadata, metadata is generated from the fields. If the read
/// and the write side end up with the same name and mnemonic, a single
/// register owning all fields results. Otherwise, a read-only and a
/// write-only register are constructed, with fields supporting both
/// directions becoming part of both.
pub(crate) fn construct_registers(
    fields: Vec<Field>,
    internal_address: MaskedAddress,
    bus_width: usize,
    default_endianness: Endianness,
    signals: &AddressSignalMap,
) -> Result<Vec<LogicalRegister>, Error> {
    let has_read = fields.iter().any(|f| f.behavior().read().is_some());
    let has_write = fields.iter().any(|f| f.behavior().write().is_some());
    let mode = match AccessMode::from_directions(has_read, has_write) {
        Some(mode) => mode,
        None => return Ok(Vec::new()),
    };

    let mut sorted: Vec<&Field> = fields.iter().collect();
    sorted.sort_by_key(|f| f.bitrange());

    let find_meta = |dir: AccessDir| sorted
        .iter()
        .filter(|f| f.behavior().capabilities(dir).is_some())
        .find_map(|f| f.register_metadata())
        .cloned();
    let (read_meta, write_meta) = match (find_meta(AccessDir::Read), find_meta(AccessDir::Write)) {
        (Some(read), Some(write)) => (read, write),
        (Some(meta), None) | (None, Some(meta)) => (meta.clone(), meta),
        (None, None) => {
            let meta = synthesized_metadata(&sorted);
            (meta.clone(), meta)
        },
    };

    let new = |meta: &MetadataConfig, mode, fields| LogicalRegister::new(
        meta, mode, fields, internal_address.clone(), bus_width, default_endianness, signals,
    );

    if read_meta.name == write_meta.name && read_meta.mnemonic == write_meta.mnemonic {
        return Ok(vec![new(&read_meta, mode, fields)?])
    }

    let mut registers = Vec::new();
    if has_read {
        let readable = fields
            .iter()
            .filter(|f| f.behavior().read().is_some())
            .cloned()
            .collect();
        registers.push(new(&read_meta, AccessMode::ReadOnly, readable)?);
    }
    if has_write {
        let writable = fields
            .into_iter()
            .filter(|f| f.behavior().write().is_some())
            .collect();
        registers.push(new(&write_meta, AccessMode::WriteOnly, writable)?);
    }
    Ok(registers)
}


/// Generate register metadata from the fields making up the register
///
/// The name and mnemonic come from the field with the lowest bit range,
/// preferring readable fields. The fields are expected in bit range order.
fn synthesized_metadata(fields: &[&Field]) -> MetadataConfig {
    let primary = fields
        .iter()
        .find(|f| f.behavior().read().is_some())
        .or_else(|| fields.iter().find(|f| f.behavior().write().is_some()))
        .unwrap_or(&fields[0]);
    let mnemonics: Vec<_> = fields.iter().map(|f| f.meta().markdown_mnemonic()).collect();
    MetadataConfig {
        mnemonic: Some(primary.mnemonic().to_string()),
        name: Some(format!("{}_reg", primary.name())),
        brief: Some(format!(
            "register for field{} {}.",
            if fields.len() != 1 { "s" } else { "" },
            Enumerated::from(&mnemonics),
        )),
        doc: None,
    }
}


/// A logical register: one or more blocks accessed as a single unit
///
/// A logical register is the collection of all fields sharing one internal
/// address. If a field's bit range reaches beyond the bus width, the
/// register spans multiple consecutively addressed blocks, which must be
/// accessed in sequence to perform one logical access.
#[derive(Clone, Debug)]
pub struct LogicalRegister {
    meta: ExpandedMetadata,
    mode: AccessMode,
    endianness: Endianness,
    internal_address: MaskedAddress,
    fields: Vec<Field>,
    blocks: Vec<Block>,
}

impl LogicalRegister {
    /// Validate the register and lay out its blocks
    fn new(
        metadata: &MetadataConfig,
        mode: AccessMode,
        mut fields: Vec<Field>,
        internal_address: MaskedAddress,
        bus_width: usize,
        default_endianness: Endianness,
        signals: &AddressSignalMap,
    ) -> Result<Self, Error> {
        fields.sort_by_key(Field::bitrange);
        let meta = Metadata::new(None, metadata)?.expand(None)?;

        check_behavior(mode, &fields)?;
        let endianness = determine_endianness(&fields, default_endianness)?;

        let msb = fields.iter().map(|f| f.bitrange().high()).max().unwrap_or(0);
        let count = (msb + bus_width) / bus_width;
        let ctx = block::BlockContext {
            meta: &meta,
            mode,
            endianness,
            internal_address: &internal_address,
            fields: &fields,
            count,
            bus_width,
            signals,
        };
        let blocks = (0..count)
            .map(|index| Block::new(&ctx, index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {meta, mode, endianness, internal_address, fields, blocks})
    }

    /// Retrieve the register's metadata
    pub fn meta(&self) -> &ExpandedMetadata {
        &self.meta
    }

    /// Retrieve the register's access mode
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Retrieve the register's endianness
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Retrieve the fields of the register, in LSB to MSB order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Retrieve the blocks of the register, in address order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Retrieve the blocks of the register for mutation
    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// Retrieve the bus address of the register's first block
    pub fn address(&self) -> &MaskedAddress {
        self.blocks[0].address()
    }

    /// Retrieve the internal address of the register's first block
    pub fn internal_address(&self) -> &MaskedAddress {
        &self.internal_address
    }

    /// Retrieve the combined read capabilities of the register's fields
    pub fn read_caps(&self) -> Option<AccessCapabilities> {
        if !self.mode.can_read() {
            return None
        }
        AccessCapabilities::union(self.fields.iter().filter_map(|f| f.behavior().read()))
    }

    /// Retrieve the combined write capabilities of the register's fields
    pub fn write_caps(&self) -> Option<AccessCapabilities> {
        if !self.mode.can_write() {
            return None
        }
        AccessCapabilities::union(self.fields.iter().filter_map(|f| f.behavior().write()))
    }
}

impl Named for LogicalRegister {
    fn name(&self) -> &str {
        self.meta.name()
    }

    fn mnemonic(&self) -> &str {
        self.meta.mnemonic()
    }
}


/// Check the fields of a register for behavioral conflicts
fn check_behavior(mode: AccessMode, fields: &[Field]) -> Result<(), Error> {
    for &dir in &[AccessDir::Read, AccessDir::Write] {
        let covered = if dir.is_write() { mode.can_write() } else { mode.can_read() };
        if !covered {
            continue
        }

        let capable: Vec<_> = fields
            .iter()
            .filter_map(|f| f.behavior().capabilities(dir).map(|caps| (f, caps)))
            .collect();
        let mnemonics = |flag: fn(&AccessCapabilities) -> bool| -> Vec<String> {
            capable
                .iter()
                .filter(|(_, caps)| flag(caps))
                .map(|(f, _)| f.meta().markdown_mnemonic())
                .collect()
        };

        let volatile = mnemonics(|caps| caps.volatile);
        let blocking_only = mnemonics(|caps| caps.blocking && !caps.volatile);
        if !volatile.is_empty() && !blocking_only.is_empty() {
            return Err(Error::Validation(format!(
                "cannot have both volatile fields ({}) and blocking fields ({}) in a single register",
                Enumerated::from(&volatile),
                Enumerated::from(&blocking_only),
            )))
        }

        let blocking = mnemonics(|caps| caps.blocking);
        if blocking.len() > 1 {
            return Err(Error::Validation(format!(
                "cannot have more than one blocking field in a single register ({})",
                Enumerated::from(&blocking),
            )))
        }

        let deferring = mnemonics(|caps| caps.deferring);
        if !deferring.is_empty() && capable.len() > 1 {
            return Err(Error::Validation(format!(
                "deferring fields cannot share a register with other fields ({})",
                Enumerated::from(&deferring),
            )))
        }
    }
    Ok(())
}


/// Determine the endianness of a register from its fields
///
/// All fields requesting an explicit endianness must agree. If no field
/// requests one, the register file default applies.
fn determine_endianness(fields: &[Field], default: Endianness) -> Result<Endianness, Error> {
    let mut res = None;
    for field in fields {
        if let Some(endianness) = field.endianness() {
            if res.map_or(false, |e| e != endianness) {
                return Err(Error::Validation("conflicting endianness specification".to_string()))
            }
            res = Some(endianness);
        }
    }
    Ok(res.unwrap_or(default))
}

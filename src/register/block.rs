// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Blocks: the bus-word-sized pieces of a logical register

use crate::access::AccessMode;
use crate::address::MaskedAddress;
use crate::addressing::AddressSignalMap;
use crate::defer::DeferTag;
use crate::error::Error;
use crate::field::Field;
use crate::metadata::{ExpandedMetadata, Metadata, MetadataConfig};
use crate::named::Named;

use super::Endianness;


/// Parameters shared by all blocks of one logical register
pub(crate) struct BlockContext<'a> {
    pub meta: &'a ExpandedMetadata,
    pub mode: AccessMode,
    pub endianness: Endianness,
    pub internal_address: &'a MaskedAddress,
    pub fields: &'a [Field],
    pub count: usize,
    pub bus_width: usize,
    pub signals: &'a AddressSignalMap,
}


/// The mapping of a field onto the bits of one block
///
/// The mapping doubles as a cell of the block's documentation table, which
/// has one column per bus word bit in MSB first order and one row per access
/// mode row header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMapping {
    field: usize,
    bits: Option<(usize, usize)>,
    offset: usize,
    read: bool,
    write: bool,
    col_index: usize,
    col_span: usize,
    row_index: usize,
    row_span: usize,
}

impl FieldMapping {
    /// Retrieve the index of the mapped field within the register's fields
    pub fn field(&self) -> usize {
        self.field
    }

    /// Retrieve the mapped field-relative bit indices as `(high, low)`
    ///
    /// `None` is returned for single bit fields.
    pub fn bits(&self) -> Option<(usize, usize)> {
        self.bits
    }

    /// Retrieve the offset of the mapping's low bit in the bus word
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Check whether the mapping is used for read accesses
    pub fn read(&self) -> bool {
        self.read
    }

    /// Check whether the mapping is used for write accesses
    pub fn write(&self) -> bool {
        self.write
    }

    /// Retrieve the index of the mapping's first table column
    pub fn col_index(&self) -> usize {
        self.col_index
    }

    /// Retrieve the number of table columns occupied by the mapping
    pub fn col_span(&self) -> usize {
        self.col_span
    }

    /// Retrieve the index of the mapping's first table row
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// Retrieve the number of table rows occupied by the mapping
    pub fn row_span(&self) -> usize {
        self.row_span
    }
}


/// A block: a piece of address space covered by a single masked address
///
/// Blocks are equivalent to physical registers when only the sub-word LSBs
/// of the address are masked out. One or more blocks form a logical
/// register; multi-block registers carry a suffix on their block names so
/// that generated code can refer to each block individually.
#[derive(Clone, Debug)]
pub struct Block {
    meta: ExpandedMetadata,
    mode: AccessMode,
    index: usize,
    offset: usize,
    address: MaskedAddress,
    internal_address: MaskedAddress,
    row_headers: Vec<&'static str>,
    mappings: Vec<FieldMapping>,
    read_tag: Option<DeferTag>,
    write_tag: Option<DeferTag>,
}

impl Block {
    /// Lay out the block with the given index within its register
    pub(crate) fn new(ctx: &BlockContext, index: usize) -> Result<Self, Error> {
        let (mnem_suffix, name_suffix) = match ctx.count {
            1 => (String::new(), String::new()),
            2 => if (index == 0) != ctx.endianness.is_big() {
                ("L".to_string(), "_low".to_string())
            } else {
                ("H".to_string(), "_high".to_string())
            },
            3..=26 => {
                let letter = (b'A' + index as u8) as char;
                (letter.to_string(), format!("_{}", letter.to_ascii_lowercase()))
            },
            _ => return Err(Error::Validation(
                "cannot have more than 26 blocks per register".to_string(),
            )),
        };

        let offset = if ctx.endianness.is_big() {
            (ctx.count - index - 1) * ctx.bus_width
        } else {
            index * ctx.bus_width
        };

        let metadata = MetadataConfig {
            mnemonic: Some(format!("{}{}", ctx.meta.mnemonic(), mnem_suffix)),
            name: Some(format!("{}{}", ctx.meta.name(), name_suffix)),
            brief: Some(format!(
                "block containing bits {}..{} of register `{}` (`{}`).",
                offset + ctx.bus_width - 1,
                offset,
                ctx.meta.name(),
                ctx.meta.mnemonic(),
            )),
            doc: None,
        };
        let meta = Metadata::new(None, &metadata)?.expand(None)?;

        let internal_address = ctx.internal_address.add(index as i128)?;
        let address = ctx.signals
            .split_address(&internal_address)
            .swap_remove(AddressSignalMap::BUS);

        let mut row_headers: Vec<&'static str> = if ctx.mode.can_read() && ctx.mode.can_write() {
            vec!["R", "W"]
        } else if ctx.mode.can_write() {
            vec!["W/O"]
        } else {
            vec!["R/O"]
        };
        let row_count = row_headers.len();

        // Lay the fields out in the documentation table, which doubles as
        // the detector for intersecting bit ranges. Columns are the bus word
        // bits in MSB first order.
        let mut mappings: Vec<FieldMapping> = Vec::new();
        let mut table: Vec<Vec<Option<usize>>> = vec![vec![None; ctx.bus_width]; row_count];
        for (field_index, field) in ctx.fields.iter().enumerate() {
            let bitrange = field.bitrange();
            let (bits, map_offset) = if bitrange.is_scalar() {
                let pos = bitrange.low() as i64 - offset as i64;
                if pos < 0 || pos >= ctx.bus_width as i64 {
                    continue
                }
                (None, pos as usize)
            } else {
                let low = (bitrange.low() as i64 - offset as i64).max(0);
                let high = (bitrange.high() as i64 - offset as i64).min(ctx.bus_width as i64 - 1);
                if high < 0 || low >= ctx.bus_width as i64 {
                    continue
                }
                let shift = offset as i64 - bitrange.low() as i64;
                (Some(((high + shift) as usize, (low + shift) as usize)), low as usize)
            };

            let read = field.behavior().read().is_some() && ctx.mode.can_read();
            let write = field.behavior().write().is_some() && ctx.mode.can_write();
            let col_span = bits.map(|(high, low)| high - low + 1).unwrap_or(1);
            let col_index = ctx.bus_width - map_offset - col_span;
            let row_span = if read && write { row_count } else { 1 };
            let row_index = if !read && row_count > 1 { 1 } else { 0 };

            let mapping = mappings.len();
            for row in row_index..row_index + row_span {
                for col in col_index..col_index + col_span {
                    if let Some(old) = table[row][col] {
                        let bit = ctx.bus_width - col - 1 + offset;
                        return Err(Error::Validation(format!(
                            "fields `{}` and `{}` intersect at bit {}",
                            field.name(),
                            ctx.fields[mappings[old].field].name(),
                            bit,
                        )))
                    }
                    table[row][col] = Some(mapping);
                }
            }
            mappings.push(FieldMapping {
                field: field_index,
                bits,
                offset: map_offset,
                read,
                write,
                col_index,
                col_span,
                row_index,
                row_span,
            });
        }

        // If the two rows of a R/W block are identical, merge them into one.
        if table.len() == 2 && table[0] == table[1] {
            table.truncate(1);
            row_headers = vec!["R/W"];
        }
        let row_count = row_headers.len();
        for mapping in mappings.iter_mut() {
            mapping.row_span = if mapping.read && mapping.write { row_count } else { 1 };
            mapping.row_index = if !mapping.read && row_count > 1 { 1 } else { 0 };
        }
        mappings.sort_by_key(|mapping| (mapping.row_index, mapping.col_index));

        Ok(Self {
            meta,
            mode: ctx.mode,
            index,
            offset,
            address,
            internal_address,
            row_headers,
            mappings,
            read_tag: None,
            write_tag: None,
        })
    }

    /// Retrieve the block's metadata
    pub fn meta(&self) -> &ExpandedMetadata {
        &self.meta
    }

    /// Retrieve the block's access mode
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Retrieve the block's index within its register
    pub fn index(&self) -> usize {
        self.index
    }

    /// Retrieve the register bit index corresponding to bus word bit zero
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Retrieve the block's bus address
    pub fn address(&self) -> &MaskedAddress {
        &self.address
    }

    /// Retrieve the block's internal address, including match conditions
    pub fn internal_address(&self) -> &MaskedAddress {
        &self.internal_address
    }

    /// Retrieve the row headers of the block's documentation table
    pub fn row_headers(&self) -> &[&'static str] {
        &self.row_headers
    }

    /// Retrieve the field mappings, in table order
    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    /// Retrieve the deferral tag for read accesses, if any
    pub fn read_tag(&self) -> Option<DeferTag> {
        self.read_tag
    }

    /// Retrieve the deferral tag for write accesses, if any
    pub fn write_tag(&self) -> Option<DeferTag> {
        self.write_tag
    }

    /// Set the deferral tag for read accesses
    pub(crate) fn set_read_tag(&mut self, tag: DeferTag) {
        self.read_tag = Some(tag);
    }

    /// Set the deferral tag for write accesses
    pub(crate) fn set_write_tag(&mut self, tag: DeferTag) {
        self.write_tag = Some(tag);
    }
}

impl Named for Block {
    fn name(&self) -> &str {
        self.meta.name()
    }

    fn mnemonic(&self) -> &str {
        self.meta.mnemonic()
    }
}

// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Field descriptors and the fields they expand to

pub(crate) mod parsers;


use crate::access::Behavior;
use crate::address::MaskedAddress;
use crate::addressing::AddressSignalMap;
use crate::bitrange::BitRange;
use crate::error::{self, Error};
use crate::metadata::{ExpandedMetadata, Metadata, MetadataConfig};
use crate::named::Named;
use crate::register::Endianness;


/// User-supplied description of a field or an array of fields
///
/// The location combines the byte address of the field's register with the
/// bit range the field occupies, separated by a colon. A missing bit range
/// makes the field span an entire bus word. With `repeat`, the description
/// expands to an array of fields: `field_repeat` of them are packed into a
/// single register before the address advances by `stride` bytes, with the
/// bit range advancing by `field_stride` bits within a register. All three
/// default to dense packing.
#[derive(Clone, Debug)]
pub struct FieldConfig {
    pub address: String,
    pub repeat: Option<usize>,
    pub field_repeat: Option<usize>,
    pub stride: Option<i128>,
    pub field_stride: Option<i64>,
    pub metadata: MetadataConfig,
    pub register_metadata: Option<MetadataConfig>,
    pub behavior: Behavior,
    pub endianness: Option<Endianness>,
    pub conditions: Vec<ConditionConfig>,
}

impl FieldConfig {
    /// Create a config with all optional parts left at their defaults
    pub fn new(address: impl Into<String>, metadata: MetadataConfig, behavior: Behavior) -> Self {
        Self {
            address: address.into(),
            repeat: None,
            field_repeat: None,
            stride: None,
            field_stride: None,
            metadata,
            register_metadata: None,
            behavior,
            endianness: None,
            conditions: Vec::new(),
        }
    }
}


/// Additional match condition for all fields of a descriptor
///
/// The named internal signal must match the given masked address
/// specification for the fields' registers to be addressed. The internal is
/// specified as `<name>` for a scalar or `<name>:<width>` for a vector.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionConfig {
    pub internal: String,
    pub value: String,
}


/// A field descriptor, expanded into the fields it describes
///
/// The descriptor's own metadata is the unexpanded metadata shared by all
/// fields of the array. The behavior and the match conditions are likewise
/// shared.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    meta: Metadata,
    behavior: Behavior,
    conditions: Vec<ConditionConfig>,
    fields: Vec<Field>,
}

impl FieldDescriptor {
    /// Validate a field config and expand it into its fields
    pub fn new(config: &FieldConfig, bus_width: usize) -> Result<Self, Error> {
        if config.behavior.read().is_none() && config.behavior.write().is_none() {
            return Err(Error::Validation(
                "read_caps and write_caps cannot both be None".to_string(),
            ))
        }
        if config.repeat == Some(0) {
            return Err(Error::Validation("repeat must be positive".to_string()))
        }

        let meta = Metadata::new(config.repeat, &config.metadata)?;
        let (base_address, base_bitrange) = parse_location(&config.address, bus_width)?;

        let count = config.repeat.unwrap_or(1);
        let field_repeat = config.field_repeat.unwrap_or(count);
        if field_repeat == 0 {
            return Err(Error::Validation("field-repeat must be positive".to_string()))
        }

        // The stride is given in bytes, but addresses advance in units of the
        // block selected by the don't care LSBs of the base address.
        let block_bits = base_address
            .mask()
            .trailing_zeros()
            .map(|bits| bits as usize)
            .unwrap_or(AddressSignalMap::BUS_WIDTH);
        let block_size = 1i128 << block_bits;
        let stride = config.stride.unwrap_or(block_size);
        if stride.abs() < block_size {
            return Err(Error::Validation("stride is smaller than the block size".to_string()))
        }
        if stride & (block_size - 1) != 0 {
            return Err(Error::Validation("stride is not aligned to the block size".to_string()))
        }
        let stride = stride >> block_bits;

        let width = base_bitrange.width() as i64;
        let field_stride = config.field_stride.unwrap_or(width);
        if field_stride.abs() < width {
            return Err(Error::Validation(
                "field-stride is smaller than the width of a single field".to_string(),
            ))
        }

        let mut fields = Vec::with_capacity(count);
        for index in 0..count {
            let meta_index = config.repeat.map(|_| index);
            fields.push(Field {
                meta: meta.expand(meta_index)?,
                index: meta_index,
                address: base_address.add((index / field_repeat) as i128 * stride)?,
                bitrange: base_bitrange.shifted((index % field_repeat) as i64 * field_stride)?,
                behavior: config.behavior.clone(),
                register_metadata: config.register_metadata.clone(),
                endianness: config.endianness,
            });
        }

        Ok(Self {
            meta,
            behavior: config.behavior.clone(),
            conditions: config.conditions.clone(),
            fields,
        })
    }

    /// Retrieve the unexpanded metadata shared by all fields
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    /// Retrieve the behavior shared by all fields
    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Retrieve the match conditions shared by all fields
    pub fn conditions(&self) -> &[ConditionConfig] {
        &self.conditions
    }

    /// Retrieve the expanded fields
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Extract the expanded fields
    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }
}

impl Named for FieldDescriptor {
    fn name(&self) -> &str {
        self.meta.name()
    }

    fn mnemonic(&self) -> &str {
        self.meta.mnemonic()
    }
}


/// A single field, carved out of a field descriptor
///
/// The address is the bus address of the register the field resides in,
/// without any match conditions applied. The bit range is relative to that
/// register's least significant bit and may reach beyond the bus width, in
/// which case the logical register grows to multiple blocks.
#[derive(Clone, Debug)]
pub struct Field {
    meta: ExpandedMetadata,
    index: Option<usize>,
    address: MaskedAddress,
    bitrange: BitRange,
    behavior: Behavior,
    register_metadata: Option<MetadataConfig>,
    endianness: Option<Endianness>,
}

impl Field {
    /// Retrieve the field's expanded metadata
    pub fn meta(&self) -> &ExpandedMetadata {
        &self.meta
    }

    /// Retrieve the field's index within its descriptor, if repeated
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Retrieve the bus address of the field's register
    pub fn address(&self) -> &MaskedAddress {
        &self.address
    }

    /// Retrieve the bit range the field occupies within its register
    pub fn bitrange(&self) -> BitRange {
        self.bitrange
    }

    /// Retrieve the field's behavior
    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Retrieve the metadata requested for the field's register, if any
    pub fn register_metadata(&self) -> Option<&MetadataConfig> {
        self.register_metadata.as_ref()
    }

    /// Retrieve the endianness requested for the field's register, if any
    pub fn endianness(&self) -> Option<Endianness> {
        self.endianness
    }
}

impl Named for Field {
    fn name(&self) -> &str {
        self.meta.name()
    }

    fn mnemonic(&self) -> &str {
        self.meta.mnemonic()
    }
}


/// Parse a field location into the register address and the bit range
fn parse_location(location: &str, bus_width: usize) -> Result<(MaskedAddress, BitRange), Error> {
    use nom::combinator::all_consuming;

    let (_, (address, bitrange)) = all_consuming(parsers::location)(location)
        .map_err(|e| error::convert_error(location, e))?;
    let ignore_lsbs = (bus_width / 8).trailing_zeros() as usize;
    let address = MaskedAddress::parse_config(address, ignore_lsbs, AddressSignalMap::BUS_WIDTH)?;
    Ok((address, bitrange.unwrap_or_else(|| BitRange::word(bus_width))))
}

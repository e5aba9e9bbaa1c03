// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Register file assembly


use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::address::{MaskedAddress, ones};
use crate::addressing::{AccessDir, AddressManager, AddressSignal, AddressSignalMap};
use crate::decoder::AddressDecoder;
use crate::defer::DeferTagManager;
use crate::error::{self, Error};
use crate::field::{self, FieldConfig, FieldDescriptor};
use crate::metadata::{ExpandedMetadata, Metadata, MetadataConfig, Namespace};
use crate::named::Named;
use crate::register::{construct_registers, Block, Endianness, LogicalRegister};


/// User-supplied description of a register file
///
/// The bus width is the width of a single data word in bits and must be 32
/// or 64. The endianness applies to all multi-block registers which do not
/// request an explicit byte order themselves.
#[derive(Clone, Debug)]
pub struct RegisterFileConfig {
    pub metadata: MetadataConfig,
    pub bus_width: usize,
    pub endianness: Endianness,
}

impl RegisterFileConfig {
    /// Create a config with a 32 bit bus and little-endian byte order
    pub fn new(metadata: MetadataConfig) -> Self {
        Self {metadata, bus_width: 32, endianness: Default::default()}
    }
}


/// Builder accumulating the field descriptions of a register file
///
/// The builder only stores the user-supplied configs. All validation and
/// construction happens in `build()`, which consumes the builder and yields
/// the immutable compilation result.
#[derive(Clone, Debug)]
pub struct RegisterFileBuilder {
    config: RegisterFileConfig,
    fields: Vec<FieldConfig>,
}

impl RegisterFileBuilder {
    /// Create a builder for a register file with the given config
    pub fn new(config: RegisterFileConfig) -> Self {
        Self {config, fields: Vec::new()}
    }

    /// Add a field descriptor config to the register file
    pub fn add_field(&mut self, field: FieldConfig) -> &mut Self {
        self.fields.push(field);
        self
    }

    /// Compile the register file
    pub fn build(self) -> Result<RegisterFile, Error> {
        let Self {config, fields} = self;

        let bus_width = config.bus_width;
        if bus_width != 32 && bus_width != 64 {
            return Err(Error::Validation("bus-width must be 32 or 64".to_string()))
        }
        let meta = Metadata::new(None, &config.metadata)?.expand(None)?;

        let mut internals = InternalManager::default();
        let mut addresses: AddressManager<BlockHandle> = AddressManager::new();
        let mut descriptor_namespace = Namespace::new(format!("{}::fields", meta.name()));
        let mut register_namespace = Namespace::new(meta.name().to_string());

        // Expand the descriptors and resolve their match conditions into
        // address signals. New signals are appended in name order, so the
        // internal address layout does not depend on the condition order
        // within a descriptor.
        let mut expanded = Vec::with_capacity(fields.len());
        for field_config in &fields {
            let descriptor = FieldDescriptor::new(field_config, bus_width)?;
            descriptor_namespace.add(&descriptor)?;

            let mut conditions = Vec::with_capacity(descriptor.conditions().len());
            for condition in descriptor.conditions() {
                let internal = internals.use_signal("address matching", &condition.internal)?.clone();
                let value = MaskedAddress::parse_config(&condition.value, 0, internal.width())?;
                conditions.push((internal, value));
            }
            conditions.sort_by(|(a, _), (b, _)| a.name().cmp(b.name()));
            let conditions: Vec<_> = conditions
                .into_iter()
                .map(|(internal, value)| {
                    let signal = AddressSignal::new(internal.name(), internal.width());
                    (addresses.signals_mut().append(signal), value)
                })
                .collect();
            expanded.push((descriptor, conditions));
        }

        // Group the fields by their internal address, in order of appearance.
        // Fields only form a logical register together if their address and
        // conditions agree exactly.
        let mut groups: Vec<(MaskedAddress, Vec<field::Field>)> = Vec::new();
        for (descriptor, conditions) in expanded {
            for field in descriptor.into_fields() {
                let mut pairs = vec![(AddressSignalMap::BUS, field.address().clone())];
                pairs.extend_from_slice(&conditions);
                let address = addresses.signals().construct_address(&pairs)?;
                match groups.iter().position(|(a, _)| a == &address) {
                    Some(pos) => groups[pos].1.push(field),
                    None      => groups.push((address, vec![field])),
                }
            }
        }

        let mut registers = Vec::new();
        for (address, group) in groups {
            for field in &group {
                register_namespace.add_name(field)?;
            }
            registers.extend(construct_registers(
                group, address, bus_width, config.endianness, addresses.signals(),
            )?);
        }
        registers.sort_by_cached_key(|register| {
            addresses.signals().split_address(register.internal_address())
        });

        // With the final register order known, claim the names and map each
        // block. Conflicting masked addresses surface here.
        for (index, register) in registers.iter().enumerate() {
            register_namespace.add(register)?;
            for field in register.fields() {
                register_namespace.add_child(register, field)?;
            }

            let multi = register.blocks().len() > 1;
            for block in register.blocks() {
                if multi {
                    register_namespace.add(block)?;
                }
                let handle = BlockHandle::new(index, block.index(), block.meta().name());
                if block.mode().can_read() {
                    addresses.insert(AccessDir::Read, block.internal_address(), handle.clone())?;
                }
                if block.mode().can_write() {
                    addresses.insert(AccessDir::Write, block.internal_address(), handle)?;
                }
            }
        }

        // Deferring registers get one tag per direction. Reads defer when the
        // first block is accessed, so every block carries the tag for the
        // logic reading it back. Writes perform the access at the last block.
        let mut read_tags = DeferTagManager::new();
        let mut write_tags = DeferTagManager::new();
        for register in registers.iter_mut() {
            if register.read_caps().map_or(false, |caps| caps.deferring) {
                let tag = read_tags.next_tag();
                for block in register.blocks_mut() {
                    block.set_read_tag(tag);
                }
            }
            if register.write_caps().map_or(false, |caps| caps.deferring) {
                let tag = write_tags.next_tag();
                if let Some(block) = register.blocks_mut().last_mut() {
                    block.set_write_tag(tag);
                }
            }
        }

        // Condition bits may be don't-care for one register and matched by
        // another, which the synthesis handles by splitting the template. The
        // manager already rejected genuinely conflicting addresses.
        let signal_width = addresses.signals().width();
        let mut read_decoder = AddressDecoder::new("r_addr", signal_width, false, true, false);
        for address in addresses.map(AccessDir::Read).addresses() {
            read_decoder.add(address)?;
        }
        let mut write_decoder = AddressDecoder::new("w_addr", signal_width, false, true, false);
        for address in addresses.map(AccessDir::Write).addresses() {
            write_decoder.add(address)?;
        }

        let mut read_tag_decoder = AddressDecoder::new("r_rtag", read_tags.width(), false, false, false);
        let mut write_tag_decoder = AddressDecoder::new("w_rtag", write_tags.width(), false, false, false);
        for register in &registers {
            if let Some(tag) = register.blocks().first().and_then(Block::read_tag) {
                let address = MaskedAddress::new(tag.index().into(), ones(read_tags.width()));
                read_tag_decoder.add(&address)?;
            }
            if let Some(tag) = register.blocks().last().and_then(Block::write_tag) {
                let address = MaskedAddress::new(tag.index().into(), ones(write_tags.width()));
                write_tag_decoder.add(&address)?;
            }
        }

        Ok(RegisterFile {
            meta,
            bus_width,
            endianness: config.endianness,
            registers,
            addresses,
            read_tags,
            write_tags,
            read_decoder,
            write_decoder,
            read_tag_decoder,
            write_tag_decoder,
        })
    }
}


/// A compiled register file
///
/// The compilation result is immutable: registers, blocks, address maps and
/// the synthesized decoders are fixed once `build()` returns. Registers are
/// held in natural address order, with the bus address major to any
/// condition signals.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    meta: ExpandedMetadata,
    bus_width: usize,
    endianness: Endianness,
    registers: Vec<LogicalRegister>,
    addresses: AddressManager<BlockHandle>,
    read_tags: DeferTagManager,
    write_tags: DeferTagManager,
    read_decoder: AddressDecoder,
    write_decoder: AddressDecoder,
    read_tag_decoder: AddressDecoder,
    write_tag_decoder: AddressDecoder,
}

impl RegisterFile {
    /// Retrieve the register file's metadata
    pub fn meta(&self) -> &ExpandedMetadata {
        &self.meta
    }

    /// Retrieve the width of a data word in bits
    pub fn bus_width(&self) -> usize {
        self.bus_width
    }

    /// Retrieve the default endianness for multi-block registers
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Retrieve the registers, in natural address order
    pub fn registers(&self) -> &[LogicalRegister] {
        &self.registers
    }

    /// Retrieve the register a block handle points into
    pub fn register(&self, handle: &BlockHandle) -> &LogicalRegister {
        &self.registers[handle.register()]
    }

    /// Retrieve the block a block handle points to
    pub fn block(&self, handle: &BlockHandle) -> &Block {
        &self.register(handle).blocks()[handle.block()]
    }

    /// Retrieve the address manager holding the block address maps
    pub fn addresses(&self) -> &AddressManager<BlockHandle> {
        &self.addresses
    }

    /// Iterate over all mapped addresses for documentation output
    ///
    /// Yields the representation of each mapped internal address along with
    /// the handles of the blocks read and written there, either of which may
    /// be absent.
    pub fn doc_iter(&self) -> Vec<(String, Option<&BlockHandle>, Option<&BlockHandle>)> {
        self.addresses.doc_iter()
    }

    /// Retrieve the read deferral tags handed out to registers
    pub fn read_tags(&self) -> &DeferTagManager {
        &self.read_tags
    }

    /// Retrieve the write deferral tags handed out to registers
    pub fn write_tags(&self) -> &DeferTagManager {
        &self.write_tags
    }

    /// Retrieve the read address decoder
    pub fn read_decoder(&self) -> &AddressDecoder {
        &self.read_decoder
    }

    /// Retrieve the write address decoder
    pub fn write_decoder(&self) -> &AddressDecoder {
        &self.write_decoder
    }

    /// Retrieve the decoder for deferred read tags
    pub fn read_tag_decoder(&self) -> &AddressDecoder {
        &self.read_tag_decoder
    }

    /// Retrieve the decoder for deferred write tags
    pub fn write_tag_decoder(&self) -> &AddressDecoder {
        &self.write_tag_decoder
    }
}

impl Named for RegisterFile {
    fn name(&self) -> &str {
        self.meta.name()
    }

    fn mnemonic(&self) -> &str {
        self.meta.mnemonic()
    }
}


/// Handle identifying one block of one compiled register
///
/// Handles are stored in the address maps and resolve against the register
/// file they came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHandle {
    register: usize,
    block: usize,
    name: Arc<str>,
}

impl BlockHandle {
    /// Create a new handle
    fn new(register: usize, block: usize, name: impl Into<Arc<str>>) -> Self {
        Self {register, block, name: name.into()}
    }

    /// Retrieve the index of the register within the register file
    pub fn register(&self) -> usize {
        self.register
    }

    /// Retrieve the index of the block within the register
    pub fn block(&self) -> usize {
        self.block
    }

    /// Retrieve the name of the block
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }
}

impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {}", self.name)
    }
}


/// An internal signal referenced by match conditions
///
/// Internals are declared implicitly by their first use. All uses must agree
/// on the shape, which is scalar or vector of a fixed width.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Internal {
    name: Arc<str>,
    shape: Option<usize>,
}

impl Internal {
    /// Retrieve the name of the signal
    fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Retrieve the width of the signal, which is one for scalars
    fn width(&self) -> usize {
        self.shape.unwrap_or(1)
    }

    /// Describe a shape for use in error messages
    fn describe_shape(shape: Option<usize>) -> String {
        match shape {
            Some(size) => format!("a vector of size {}", size),
            None       => "a scalar".to_string(),
        }
    }
}


/// Registry of the internal signals of one register file
///
/// Signal names are case-insensitive. The registry only covers use sites;
/// whether anything drives a signal is outside the compiled model.
#[derive(Clone, Debug, Default)]
struct InternalManager {
    internals: HashMap<String, Internal>,
}

impl InternalManager {
    /// Register a use of an internal signal, creating it if necessary
    ///
    /// The reference is `<name>` for a scalar or `<name>:<width>` for a
    /// vector. `user` describes the using entity in shape mismatch errors.
    fn use_signal(&mut self, user: &str, reference: &str) -> Result<&Internal, Error> {
        use nom::combinator::all_consuming;

        let (_, (name, shape)) = all_consuming(field::parsers::internal)(reference)
            .map_err(|e| error::convert_error(reference, e))?;

        let internal = self
            .internals
            .entry(name.to_lowercase())
            .or_insert_with(|| Internal {name: name.into(), shape});
        if internal.shape != shape {
            return Err(Error::Validation(format!(
                "{} expects internal signal {} to be {}, but it is {}",
                user,
                internal.name,
                Internal::describe_shape(shape),
                Internal::describe_shape(internal.shape),
            )))
        }
        Ok(internal)
    }
}

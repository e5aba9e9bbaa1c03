// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! MMIO register file model
//!
//! This library provides data structures describing memory-mapped register
//! files and utilities for assembling them from individual field
//! descriptors, including the generation of matching VHDL address decoders.

#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod access;
mod address;
mod addressing;
mod bitrange;
mod decoder;
mod defer;
mod display;
mod error;
mod field;
mod indentation;
mod metadata;
mod named;
mod parsers;
mod regfile;
mod register;

#[cfg(test)]
mod tests;

pub use access::{AccessCapabilities, AccessMode, Behavior};
pub use address::MaskedAddress;
pub use addressing::{AccessDir, AddressManager, AddressMap, AddressSignal, AddressSignalMap};
pub use bitrange::BitRange;
pub use decoder::{AddressDecoder, DecisionTree, match_template};
pub use defer::{DeferTag, DeferTagManager};
pub use error::{Conflict, Error};
pub use field::{ConditionConfig, Field, FieldConfig, FieldDescriptor};
pub use indentation::{DisplayIndented, Indentation, LockedIndentation};
pub use metadata::{ExpandedMetadata, Metadata, MetadataConfig, Namespace};
pub use named::Named;
pub use regfile::{BlockHandle, RegisterFile, RegisterFileBuilder, RegisterFileConfig};
pub use register::{Block, Endianness, FieldMapping, LogicalRegister};

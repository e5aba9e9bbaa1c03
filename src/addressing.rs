// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Internal address construction and conflict-checked address maps


use std::fmt;
use std::sync::Arc;

use crate::address::{MaskedAddress, ones};
use crate::error::{Conflict, Error};


/// Access direction of a bus operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessDir {
    Read,
    Write,
}

impl AccessDir {
    /// Check whether this is the write direction
    pub fn is_write(self) -> bool {
        self == Self::Write
    }
}

impl fmt::Display for AccessDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read  => fmt::Display::fmt("read", f),
            Self::Write => fmt::Display::fmt("write", f),
        }
    }
}


/// A named signal contributing to the internal address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressSignal {
    name: Arc<str>,
    width: usize,
}

impl AddressSignal {
    /// Create a new address signal
    pub fn new(name: impl Into<Arc<str>>, width: usize) -> Self {
        Self {name: name.into(), width}
    }

    /// Retrieve the name of the signal
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Retrieve the width of the signal in bits
    pub fn width(&self) -> usize {
        self.width
    }
}


/// Mapping of signals to their bit positions within the internal address
///
/// The internal address against which registers are matched is the
/// concatenation of the incoming bus address and any number of additional
/// condition signals, admitted for paging and the likes. The incoming bus
/// address is always the first signal, residing at offset zero.
#[derive(Clone, Debug)]
pub struct AddressSignalMap {
    signals: Vec<(AddressSignal, usize)>,
    width: usize,
}

impl AddressSignalMap {
    /// Index of the incoming bus address within any address signal map
    pub const BUS: usize = 0;

    /// Width of the incoming bus address
    pub(crate) const BUS_WIDTH: usize = 32;

    /// Create a new signal map holding only the bus address
    pub fn new() -> Self {
        let bus = AddressSignal::new("address", Self::BUS_WIDTH);
        Self {signals: vec![(bus, 0)], width: Self::BUS_WIDTH}
    }

    /// Retrieve the total width of the internal address
    pub fn width(&self) -> usize {
        self.width
    }

    /// Iterate over the signals and their offsets, LSB to MSB
    pub fn signals(&self) -> impl Iterator<Item = (&AddressSignal, usize)> {
        self.signals.iter().map(|(signal, offset)| (signal, *offset))
    }

    /// Append a signal to the internal address
    ///
    /// The signal is assigned the next free offset. If a signal with the same
    /// name and width is already part of the internal address, this is a no-op.
    /// In either case, the index of the signal is returned.
    pub fn append(&mut self, signal: AddressSignal) -> usize {
        if let Some(index) = self.signals.iter().position(|(s, _)| *s == signal) {
            return index
        }
        let offset = self.width;
        self.width += signal.width();
        self.signals.push((signal, offset));
        self.signals.len() - 1
    }

    /// Construct an internal address from per-signal requirements
    ///
    /// Each pair holds a signal index and the masked address the signal must
    /// match. Signals not mentioned in any pair match everything. Mentioning
    /// a signal more than once is an error.
    pub fn construct_address(&self, pairs: &[(usize, MaskedAddress)]) -> Result<MaskedAddress, Error> {
        let mut address = MaskedAddress::default();
        for (index, sub_address) in pairs {
            let (signal, offset) = &self.signals[*index];
            address = address.combine(&(sub_address.mask_and(&ones(signal.width())) << *offset))?;
        }
        Ok(address)
    }

    /// Split an internal address into its per-signal components
    ///
    /// This is the inverse of `construct_address()`. The components are
    /// returned in signal order, including components which match everything.
    pub fn split_address(&self, address: &MaskedAddress) -> Vec<MaskedAddress> {
        self.signals
            .iter()
            .map(|(signal, offset)| (address >> *offset).mask_and(&ones(signal.width())))
            .collect()
    }

    /// Represent an internal address for documentation purposes
    ///
    /// The bus address component is always included. Other components are
    /// included as `` `name`=value `` if they do not match everything.
    pub fn describe_address(&self, address: &MaskedAddress) -> String {
        let mut components = Vec::new();
        for (index, (sub_address, (signal, _))) in self
            .split_address(address)
            .into_iter()
            .zip(self.signals.iter())
            .enumerate()
        {
            let value = sub_address.doc_represent(signal.width());
            if index == Self::BUS {
                components.push(value);
            } else if value != "-" {
                components.push(format!("`{}`={}", signal.name(), value));
            }
        }
        components.join(", ")
    }
}

impl Default for AddressSignalMap {
    fn default() -> Self {
        Self::new()
    }
}


/// Conflict between a new masked address and an already mapped one
#[derive(Clone, Debug, PartialEq)]
pub struct AddressConflict {
    pub new: MaskedAddress,
    pub old: MaskedAddress,
}


/// Mapping from masked addresses to owning objects
///
/// The map ensures that no two entries can match the same concrete address.
/// Checking this is rather costly: in the worst case, every existing entry
/// needs to be consulted when a new address is inserted. Register files are
/// small enough for this not to matter.
#[derive(Clone, Debug, Default)]
pub struct AddressMap<T> {
    entries: Vec<(MaskedAddress, T)>,
}

impl<T> AddressMap<T> {
    /// Create a new, empty address map
    pub fn new() -> Self {
        Self {entries: Vec::new()}
    }

    /// Insert an address or update the value of an existing entry
    ///
    /// If the exact address is already mapped, its value is replaced.
    /// Otherwise, the address is checked against all existing entries and
    /// inserted, yielding the position of the entry.
    pub fn insert(&mut self, address: MaskedAddress, value: T) -> Result<usize, AddressConflict> {
        if let Some(pos) = self.position(&address) {
            self.entries[pos].1 = value;
            return Ok(pos)
        }
        for (other, _) in &self.entries {
            if address.common(other).is_some() {
                return Err(AddressConflict {new: address, old: other.clone()})
            }
        }
        self.entries.push((address, value));
        Ok(self.entries.len() - 1)
    }

    /// Retrieve the value mapped for the exact given address
    pub fn get(&self, address: &MaskedAddress) -> Option<&T> {
        self.position(address).map(|pos| &self.entries[pos].1)
    }

    /// Iterate over the entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&MaskedAddress, &T)> {
        self.entries.iter().map(|(address, value)| (address, value))
    }

    /// Iterate over the mapped addresses in insertion order
    pub fn addresses(&self) -> impl Iterator<Item = &MaskedAddress> {
        self.entries.iter().map(|(address, _)| address)
    }

    /// Retrieve the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the position of the entry with the exact given address
    fn position(&self, address: &MaskedAddress) -> Option<usize> {
        self.entries.iter().position(|(a, _)| a == address)
    }

    /// Retrieve the value at the given entry position
    fn value_at(&self, pos: usize) -> &T {
        &self.entries[pos].1
    }
}


/// Manager for an address signal map and the read and write address maps
///
/// The two address maps are independent: a read-only and a write-only object
/// may well be mapped at the same address.
#[derive(Clone, Debug, Default)]
pub struct AddressManager<T> {
    signals: AddressSignalMap,
    read: AddressMap<T>,
    write: AddressMap<T>,
}

impl<T: fmt::Display> AddressManager<T> {
    /// Create a new address manager
    pub fn new() -> Self {
        Self {
            signals: AddressSignalMap::new(),
            read: AddressMap::new(),
            write: AddressMap::new(),
        }
    }

    /// Retrieve the managed signal map
    pub fn signals(&self) -> &AddressSignalMap {
        &self.signals
    }

    /// Retrieve the managed signal map for mutation
    pub fn signals_mut(&mut self) -> &mut AddressSignalMap {
        &mut self.signals
    }

    /// Retrieve the address map for the given access direction
    pub fn map(&self, dir: AccessDir) -> &AddressMap<T> {
        match dir {
            AccessDir::Read  => &self.read,
            AccessDir::Write => &self.write,
        }
    }

    /// Retrieve the mapping for the given address, constructing it if absent
    ///
    /// If the exact address is already mapped in the given direction, the
    /// existing value is returned and `with` is never called. Otherwise a new
    /// value is constructed and inserted, which fails if the new address can
    /// match an address some existing entry also matches.
    pub fn get_or_insert(
        &mut self,
        dir: AccessDir,
        address: &MaskedAddress,
        with: impl FnOnce() -> T,
    ) -> Result<&T, Error> {
        let pos = match self.map(dir).position(address) {
            Some(pos) => pos,
            None => {
                let value = with();
                let name = value.to_string();
                match self.map_mut(dir).insert(address.clone(), value) {
                    Ok(pos) => pos,
                    Err(conflict) => return Err(self.map_conflict(dir, conflict, name)),
                }
            },
        };
        Ok(self.map(dir).value_at(pos))
    }

    /// Insert a mapping for the given address
    ///
    /// Unlike `get_or_insert()`, an entry with the exact same address is an
    /// error rather than an update.
    pub fn insert(
        &mut self,
        dir: AccessDir,
        address: &MaskedAddress,
        value: T,
    ) -> Result<(), Error> {
        if let Some(old) = self.map(dir).get(address) {
            return Err(Conflict {
                new: value.to_string(),
                new_repr: None,
                old: old.to_string(),
                old_repr: None,
                at: self.signals.describe_address(address),
                write: dir.is_write(),
            }.into())
        }
        self.get_or_insert(dir, address, || value).map(|_| ())
    }

    /// Iterate over all mapped addresses in natural order
    ///
    /// The natural order sorts by the per-signal address components, with the
    /// bus address being the major criterion. Addresses mapped in both
    /// directions are yielded only once.
    pub fn addresses(&self) -> Vec<MaskedAddress> {
        let mut addresses: Vec<_> = self
            .read
            .addresses()
            .chain(self.write.addresses())
            .map(|address| (self.signals.split_address(address), address.clone()))
            .collect();
        addresses.sort();
        addresses.dedup();
        addresses.into_iter().map(|(_, address)| address).collect()
    }

    /// Iterate over all mappings in natural order, for documentation output
    ///
    /// Yields the representation of each address along with the read and
    /// write mappings at that address, either of which may be absent.
    pub fn doc_iter(&self) -> Vec<(String, Option<&T>, Option<&T>)> {
        self.addresses()
            .into_iter()
            .map(|address| (
                self.signals.describe_address(&address),
                self.read.get(&address),
                self.write.get(&address),
            ))
            .collect()
    }

    /// Retrieve the address map for the given access direction for mutation
    fn map_mut(&mut self, dir: AccessDir) -> &mut AddressMap<T> {
        match dir {
            AccessDir::Read  => &mut self.read,
            AccessDir::Write => &mut self.write,
        }
    }

    /// Construct the error for a masked address conflict
    fn map_conflict(&self, dir: AccessDir, conflict: AddressConflict, new_name: String) -> Error {
        let old_name = self
            .map(dir)
            .get(&conflict.old)
            .map(T::to_string)
            .unwrap_or_default();
        let common = conflict.new.common(&conflict.old).unwrap_or_default();
        let common = MaskedAddress::new(common, ones(self.signals.width()));
        Conflict {
            new: new_name,
            new_repr: Some(self.signals.describe_address(&conflict.new)),
            old: old_name,
            old_repr: Some(self.signals.describe_address(&conflict.old)),
            at: self.signals.describe_address(&common),
            write: dir.is_write(),
        }.into()
    }
}

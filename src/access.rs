// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Access modes, capabilities and field behaviors


use std::fmt;

use crate::addressing::AccessDir;


/// Supported bus access directions of a field or register
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    /// Determine the mode from the supported directions
    ///
    /// Returns `None` if neither direction is supported.
    pub fn from_directions(read: bool, write: bool) -> Option<Self> {
        match (read, write) {
            (true,  true)  => Some(Self::ReadWrite),
            (true,  false) => Some(Self::ReadOnly),
            (false, true)  => Some(Self::WriteOnly),
            (false, false) => None,
        }
    }

    /// Check whether read accesses are supported
    pub fn can_read(self) -> bool {
        self != Self::WriteOnly
    }

    /// Check whether write accesses are supported
    pub fn can_write(self) -> bool {
        self != Self::ReadOnly
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly  => fmt::Display::fmt("R/O", f),
            Self::WriteOnly => fmt::Display::fmt("W/O", f),
            Self::ReadWrite => fmt::Display::fmt("R/W", f),
        }
    }
}


/// Capabilities of a field for one access direction
///
/// A volatile field behaves differently when the same operation is performed
/// on it once or twice. A blocking field can stall the bus. A deferring field
/// can accept multiple outstanding requests, responding out of band. These
/// flags restrict which fields can share a logical register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessCapabilities {
    pub volatile: bool,
    pub blocking: bool,
    pub deferring: bool,
}

impl AccessCapabilities {
    /// Combine the capabilities of any number of fields
    ///
    /// Each flag is set if any of the inputs has it set. Returns `None` for
    /// an empty input.
    pub fn union(caps: impl IntoIterator<Item = Self>) -> Option<Self> {
        caps.into_iter().fold(None, |res, caps| match res {
            Some(res) => Some(Self {
                volatile:  res.volatile  || caps.volatile,
                blocking:  res.blocking  || caps.blocking,
                deferring: res.deferring || caps.deferring,
            }),
            None => Some(caps),
        })
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for AccessCapabilities {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        Self {
            volatile: quickcheck::Arbitrary::arbitrary(g),
            blocking: quickcheck::Arbitrary::arbitrary(g),
            deferring: quickcheck::Arbitrary::arbitrary(g),
        }
    }
}


/// Behavior of a field
///
/// The behavior defines what a field does when it is accessed, and with it
/// the field's capabilities for either access direction. Only the bus-facing
/// side is modelled here, not the hardware-facing side.
#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    /// Field which always reads as the same constant value
    Constant,
    /// Field which always reads as the same value, configured via a generic
    Config,
    /// Field which reflects the current state of an incoming signal
    Status,
    /// Field which reflects the current state of an internal signal
    InternalStatus,
    /// Status field updated by hardware only while a write-enable flag is set
    Latching,
    /// Basic control field, written by software and read by hardware
    Control,
    /// Control field driving an internal signal
    InternalControl,
    /// One flag per bit, set by hardware and cleared by writing a one
    Flag,
    /// Flag which is implicitly cleared on read
    VolatileFlag,
    /// Flag set by an internal signal
    InternalFlag,
    /// Flag set by an internal signal and implicitly cleared on read
    VolatileInternalFlag,
    /// Event counter, cleared by subtracting the written value
    Counter,
    /// Event counter which is implicitly cleared on read
    VolatileCounter,
    /// Event counter for an internal signal
    InternalCounter,
    /// Event counter for an internal signal, implicitly cleared on read
    VolatileInternalCounter,
    /// One strobe per bit, pulsed by writing a one
    Strobe,
    /// Strobe pulsing an internal signal
    InternalStrobe,
    /// Strobe which stays asserted until acknowledged by hardware
    Request,
    /// Request queue, counting up by the written amount
    MultiRequest,
    /// Field which pops data from an incoming stream
    StreamToMmio,
    /// Field which pushes data into an outgoing stream
    MmioToStream,
    /// Field backed by a local memory
    Memory(AccessMode),
    /// Field passing accesses through to an AXI4-lite master port
    Axi(AccessMode),
    /// Field with explicitly specified capabilities
    Custom {
        read: Option<AccessCapabilities>,
        write: Option<AccessCapabilities>,
    },
}

impl Behavior {
    /// Retrieve the read capabilities, if reads are supported
    pub fn read(&self) -> Option<AccessCapabilities> {
        match self {
            Self::Constant |
            Self::Config |
            Self::Status |
            Self::InternalStatus |
            Self::Latching |
            Self::Control |
            Self::InternalControl |
            Self::Flag |
            Self::InternalFlag |
            Self::Counter |
            Self::InternalCounter |
            Self::Request |
            Self::MultiRequest       => Some(Default::default()),
            Self::VolatileFlag |
            Self::VolatileInternalFlag |
            Self::VolatileCounter |
            Self::VolatileInternalCounter |
            Self::StreamToMmio       => Some(AccessCapabilities {volatile: true, ..Default::default()}),
            Self::Strobe |
            Self::InternalStrobe |
            Self::MmioToStream       => None,
            Self::Memory(mode)       => mode
                .can_read()
                .then(|| AccessCapabilities {blocking: true, ..Default::default()}),
            Self::Axi(mode)          => mode
                .can_read()
                .then(|| AccessCapabilities {volatile: true, blocking: true, deferring: true}),
            Self::Custom {read, ..}  => *read,
        }
    }

    /// Retrieve the write capabilities, if writes are supported
    pub fn write(&self) -> Option<AccessCapabilities> {
        match self {
            Self::Constant |
            Self::Config |
            Self::Status |
            Self::InternalStatus |
            Self::Latching |
            Self::VolatileFlag |
            Self::VolatileInternalFlag |
            Self::VolatileCounter |
            Self::VolatileInternalCounter |
            Self::StreamToMmio       => None,
            Self::Control |
            Self::InternalControl |
            Self::Flag |
            Self::InternalFlag |
            Self::Request            => Some(Default::default()),
            Self::Counter |
            Self::InternalCounter |
            Self::MultiRequest |
            Self::Strobe |
            Self::InternalStrobe |
            Self::MmioToStream       => Some(AccessCapabilities {volatile: true, ..Default::default()}),
            Self::Memory(mode)       => mode
                .can_write()
                .then(|| AccessCapabilities {blocking: true, ..Default::default()}),
            Self::Axi(mode)          => mode
                .can_write()
                .then(|| AccessCapabilities {volatile: true, blocking: true, deferring: true}),
            Self::Custom {write, ..} => *write,
        }
    }

    /// Retrieve the capabilities for the given direction
    pub fn capabilities(&self, dir: AccessDir) -> Option<AccessCapabilities> {
        if dir.is_write() {
            self.write()
        } else {
            self.read()
        }
    }
}

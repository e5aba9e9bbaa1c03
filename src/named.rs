// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Common utility for named items

/// Named item
///
/// Every documented entity in a register file carries a lowercase name for
/// use in generated code and an uppercase mnemonic. This trait allows
/// namespaces and error messages to refer to either without caring about the
/// concrete item.
pub trait Named {
    /// Retrieve the item's name
    fn name(&self) -> &str;

    /// Retrieve the item's mnemonic
    fn mnemonic(&self) -> &str;
}

impl<N: Named> Named for &N {
    fn name(&self) -> &str {
        (*self).name()
    }

    fn mnemonic(&self) -> &str {
        (*self).mnemonic()
    }
}

// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Deferral tags for registers with multiple outstanding accesses

#[cfg(test)]
mod tests;


/// Tag identifying one deferring register in one access direction
///
/// When a deferring register acknowledges a bus request without responding
/// right away, its tag is pushed into a FIFO. The tag at the front of the
/// FIFO selects the register which must provide the next response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeferTag(usize);

impl DeferTag {
    /// Retrieve the index of this tag
    pub fn index(self) -> usize {
        self.0
    }
}


/// Issuer of the deferral tags for one access direction
#[derive(Clone, Debug, Default)]
pub struct DeferTagManager {
    count: usize,
}

impl DeferTagManager {
    /// Create a new manager with no tags handed out
    pub fn new() -> Self {
        Default::default()
    }

    /// Hand out the next available tag
    pub fn next_tag(&mut self) -> DeferTag {
        let tag = DeferTag(self.count);
        self.count += 1;
        tag
    }

    /// Retrieve the number of tags handed out
    pub fn count(&self) -> usize {
        self.count
    }

    /// Check whether no tags were handed out
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Retrieve the number of bits needed to represent the tags
    ///
    /// Tags are represented by at least one bit, even if no tags or only a
    /// single tag were handed out.
    pub fn width(&self) -> usize {
        let mut width = 0;
        let mut max = self.count.saturating_sub(1);
        while max > 0 {
            width += 1;
            max >>= 1;
        }
        width.max(1)
    }

    /// Format a tag as a VHDL bit vector literal
    pub fn literal(&self, tag: DeferTag) -> String {
        format!("\"{:0width$b}\"", tag.index(), width = self.width())
    }
}

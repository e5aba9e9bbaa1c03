// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Address decoder synthesis


use std::fmt;
use std::sync::Arc;

use num_bigint::BigUint;

use crate::address::MaskedAddress;
use crate::error::Error;
use crate::indentation::{DisplayIndented, Indentation};


/// Generate a match template for a set of masked addresses
///
/// This function generates a VHDL case/switch template for a vector of the
/// given number of bits and the given addresses. If `optimize` is set, the
/// action for any address not in the address list is assumed to be don't
/// care. The resulting template uses `$address$` for the to-be-matched
/// address and block markers of the form `$ADDR_0x%X` for the to-be-inserted
/// blocks.
pub fn match_template(
    num_bits: usize,
    addresses: &[MaskedAddress],
    optimize: bool,
) -> Result<String, Error> {
    if addresses.is_empty() {
        return Ok(Default::default())
    }

    let synthesis = Synthesis{num_bits, optimize, allow_overlap: false, markers: MarkerStyle::Hex};
    let patterns = addresses.iter().map(|a| pattern(a, num_bits)).collect();
    let tree = synthesis.tree(Default::default(), Default::default(), patterns)?;

    let mut res: String = Default::default();
    tree.fmt(&mut Indentation::root(), &mut res).map_err(|e| e.to_string())?;
    Ok(res)
}


/// Address decoder decision tree
///
/// A decision tree discriminates between a set of masked addresses, i.e.
/// ternary patterns over `{0, 1, -}` where `-` denotes a bit which is not to
/// be used for matching. Printing a tree via [DisplayIndented] yields a
/// conditional/case construct with two-space indentation steps, referring to
/// the matched signal as `$address$`. For every fully matched address, the
/// printed tree carries a marker line consisting of a `$` at the first
/// column, padding and the marker key. A downstream code generator is
/// expected to replace each marker line with the payload associated with the
/// key, indented to the column at which the key starts.
#[derive(Clone, Debug, PartialEq)]
pub enum DecisionTree {
    /// Payload marker for a fully matched address
    Leaf{pattern: String, key: String},
    /// Equality check of a bit slice against a literal run
    Equality{high: usize, low: usize, bits: String, tree: Box<DecisionTree>},
    /// Two-way branch on a single bit
    Branch{bit: usize, zero: Box<DecisionTree>, one: Box<DecisionTree>},
    /// Case statement over a bit slice, with one arm per literal value
    Case{high: usize, low: usize, arms: Vec<(String, DecisionTree)>, optimize: bool},
    /// Concatenation of independent sub-trees, printed blank-line-separated
    Sequence(Vec<DecisionTree>),
}

impl DecisionTree {
    /// Retrieve all payload markers appearing in this tree
    ///
    /// The returned iterator yields, for every fully matched address in the
    /// tree, the address' ternary pattern alongside the marker key emitted
    /// for it.
    pub fn markers(&self) -> impl Iterator<Item = (&str, &str)> {
        use transiter::AutoTransIter;

        self.trans_iter().filter_map(|t| if let Self::Leaf{pattern, key} = t {
            Some((pattern.as_ref(), key.as_ref()))
        } else {
            None
        })
    }

    /// Print the tree, with the first line's indentation already written
    fn fmt_continued<W: fmt::Write>(&self, indentation: &mut Indentation, f: &mut W) -> fmt::Result {
        match self {
            Self::Leaf{pattern, key}                => {
                writeln!(f, "-- $address$ = {}", pattern)?;
                let indent = usize::from(indentation.lock());
                f.write_char('$')?;
                (1..indent).try_for_each(|_| f.write_char(' '))?;
                writeln!(f, "{}", key)
            },
            Self::Equality{high, low, bits, tree}   => {
                writeln!(f, "if $address$({} downto {}) = \"{}\" then", high, low, bits)?;
                tree.fmt(&mut indentation.sub(), f)?;
                writeln!(f, "{}end if;", indentation.lock())
            },
            Self::Branch{bit, zero, one}            => if one.opens_with_if() {
                writeln!(f, "if $address$({}) = '0' then", bit)?;
                zero.fmt(&mut indentation.sub(), f)?;
                write!(f, "{}els", indentation.lock())?;
                one.fmt_continued(indentation, f)
            } else if zero.opens_with_if() {
                writeln!(f, "if $address$({}) = '1' then", bit)?;
                one.fmt(&mut indentation.sub(), f)?;
                write!(f, "{}els", indentation.lock())?;
                zero.fmt_continued(indentation, f)
            } else {
                writeln!(f, "if $address$({}) = '0' then", bit)?;
                zero.fmt(&mut indentation.sub(), f)?;
                writeln!(f, "{}else", indentation.lock())?;
                one.fmt(&mut indentation.sub(), f)?;
                writeln!(f, "{}end if;", indentation.lock())
            },
            Self::Case{high, low, arms, optimize}   => {
                writeln!(f, "case $address$({} downto {}) is", high, low)?;
                let mut arm_indent = indentation.sub();
                for (index, (option, tree)) in arms.iter().enumerate() {
                    if *optimize && index == arms.len() - 1 {
                        writeln!(f, "{}when others => -- \"{}\"", arm_indent.lock(), option)?;
                    } else {
                        writeln!(f, "{}when \"{}\" =>", arm_indent.lock(), option)?;
                    }
                    tree.fmt(&mut arm_indent.sub(), f)?;
                }
                if !optimize {
                    writeln!(f, "{}when others =>", arm_indent.lock())?;
                    writeln!(f, "{}null;", arm_indent.sub().lock())?;
                }
                writeln!(f, "{}end case;", indentation.lock())
            },
            Self::Sequence(trees)                   => {
                let mut trees = trees.iter();
                trees.next().map(|t| t.fmt_continued(indentation, f)).unwrap_or(Ok(()))?;
                trees.try_for_each(|t| writeln!(f).and_then(|_| t.fmt(indentation, f)))
            },
        }
    }

    /// Check whether the printed tree will open with an `if` line
    ///
    /// Trees opening with an `if` may continue an `els` keyword, folding
    /// nested branches into `elsif` chains.
    fn opens_with_if(&self) -> bool {
        match self {
            Self::Equality{..} | Self::Branch{..} => true,
            Self::Sequence(trees) => trees.first().map(Self::opens_with_if).unwrap_or(false),
            _ => false,
        }
    }
}

impl DisplayIndented for DecisionTree {
    fn fmt<W: fmt::Write>(&self, indentation: &mut Indentation, f: &mut W) -> fmt::Result {
        write!(f, "{}", indentation.lock())?;
        self.fmt_continued(indentation, f)
    }
}

impl<'a> transiter::AutoTransIter<&'a DecisionTree> for &'a DecisionTree {
    type RecIter = Vec<Self>;

    fn recurse(item: &Self) -> Self::RecIter {
        match item {
            DecisionTree::Leaf{..}                  => Default::default(),
            DecisionTree::Equality{tree, ..}        => vec![tree.as_ref()],
            DecisionTree::Branch{zero, one, ..}     => vec![zero.as_ref(), one.as_ref()],
            DecisionTree::Case{arms, ..}            => arms.iter().map(|(_, t)| t).collect(),
            DecisionTree::Sequence(trees)           => trees.iter().collect(),
        }
    }
}


/// Generator for address decoders
///
/// An address decoder executes one of a number of payload blocks based on the
/// value of an address signal or variable. This is much like a `case-when`
/// statement, but more powerful, because the generator has full support for
/// don't cares and uses if statements where appropriate to keep the decoder
/// human-readable. The decoder matches the signal or variable named by
/// `name`, which must be `num_bits` wide.
///
/// If `optimize` is set, the action for any address for which no payload is
/// registered is interpreted as don't care, versus the default no-operation
/// behavior. If `allow_overlap` is set, addresses that partially or fully
/// overlap each other due to don't cares (for instance `1--1` and `11--`) do
/// not result in an error at synthesis time. Similarly, if `allow_duplicate`
/// is set, registering the same address more than once does not result in an
/// error; the payload marker is shared between the registrations instead.
#[derive(Clone, Debug)]
pub struct AddressDecoder {
    name: Arc<str>,
    num_bits: usize,
    optimize: bool,
    allow_overlap: bool,
    allow_duplicate: bool,
    patterns: Vec<String>,
}

impl AddressDecoder {
    /// Create a new, empty address decoder
    pub fn new(
        name: impl Into<Arc<str>>,
        num_bits: usize,
        optimize: bool,
        allow_overlap: bool,
        allow_duplicate: bool,
    ) -> Self {
        Self{
            name: name.into(),
            num_bits,
            optimize,
            allow_overlap,
            allow_duplicate,
            patterns: Default::default(),
        }
    }

    /// Retrieve the name of the signal matched by the decoder
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Retrieve the width of the signal matched by the decoder
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Check whether any addresses were registered
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Register an address with the decoder
    ///
    /// This function returns the marker key under which the payload for the
    /// given address is to be registered with the downstream code generator.
    pub fn add(&mut self, address: &MaskedAddress) -> Result<String, Error> {
        let pattern = pattern(address, self.num_bits);
        if self.patterns.iter().any(|p| *p == pattern) {
            if !self.allow_duplicate {
                return Err(Error::Validation(format!("duplicate address 0b{}", pattern)))
            }
        } else {
            self.patterns.push(pattern.clone());
        }
        Ok(MarkerStyle::Pattern.key(&pattern))
    }

    /// Synthesize the decision tree for the registered addresses
    ///
    /// Returns `None` if no addresses were registered.
    pub fn decision_tree(&self) -> Result<Option<DecisionTree>, Error> {
        if self.patterns.is_empty() {
            return Ok(None)
        }

        let synthesis = Synthesis{
            num_bits: self.num_bits,
            optimize: self.optimize,
            allow_overlap: self.allow_overlap,
            markers: MarkerStyle::Pattern,
        };
        synthesis.tree(Default::default(), Default::default(), self.patterns.clone()).map(Some)
    }

    /// Generate the decoder
    ///
    /// Returns `None` if no addresses were registered. The generated text
    /// refers to the matched signal by name, with payload marker lines left
    /// in place for the downstream code generator.
    pub fn generate(&self) -> Result<Option<String>, Error> {
        let tree = match self.decision_tree()? {
            Some(tree) => tree,
            None => return Ok(None),
        };

        let mut res: String = Default::default();
        tree.fmt(&mut Indentation::root(), &mut res).map_err(|e| e.to_string())?;
        Ok(Some(res.replace("$address$", self.name.as_ref())))
    }
}


/// Parameters of a single decision tree synthesis
#[derive(Copy, Clone, Debug)]
struct Synthesis {
    num_bits: usize,
    optimize: bool,
    allow_overlap: bool,
    markers: MarkerStyle,
}

impl Synthesis {
    /// Synthesize the decision tree for the given set of patterns
    ///
    /// `prefix` and `suffix` hold the already-discriminated parts of the
    /// address on the MSB and LSB side. The patterns cover the bits between
    /// the two, i.e. each has a length of `num_bits` minus the combined
    /// length of `prefix` and `suffix`. The set must not be empty.
    ///
    /// The function recursively looks for discriminating patterns on both
    /// the MSB and the LSB side and chooses an appropriate construct for
    /// them. It can only handle one such pattern at a time, so it calls
    /// itself with a simplified set of patterns for the sub-trees.
    fn tree(&self, prefix: String, suffix: String, patterns: Vec<String>) -> Result<DecisionTree, Error> {
        let width = self.num_bits - prefix.len() - suffix.len();

        // All bits discriminated. Exactly one (empty) pattern may remain.
        if width == 0 {
            let pattern = prefix + &suffix;
            if patterns.len() > 1 {
                return Err(Error::Validation(format!("duplicate address {}", pattern)))
            }
            let key = self.markers.key(&pattern);
            return Ok(DecisionTree::Leaf{pattern, key})
        }

        let high = self.num_bits - prefix.len() - 1;
        let low = suffix.len();

        // A common prefix of don't cares needs no discrimination at all. A
        // common literal prefix needs a single equality check, or none if
        // unmatched addresses are don't care anyway.
        let common = common_prefix(&patterns).to_string();
        if !common.is_empty() {
            let dont_care = common.chars().take_while(|c| *c == '-').count();
            if dont_care > 0 {
                let rest = patterns.iter().map(|a| a[dont_care..].to_string()).collect();
                return self.tree(prefix + &common[..dont_care], suffix, rest)
            }

            let fixed = common.chars().take_while(|c| *c != '-').count();
            let bits = common[..fixed].to_string();
            let rest = patterns.iter().map(|a| a[fixed..].to_string()).collect();
            let tree = self.tree(prefix + &bits, suffix, rest)?;
            if self.optimize {
                return Ok(tree)
            }
            return Ok(DecisionTree::Equality{high, low: high + 1 - fixed, bits, tree: tree.into()})
        }

        // Same for common suffixes.
        let common = common_suffix(&patterns).to_string();
        if !common.is_empty() {
            let dont_care = common.chars().rev().take_while(|c| *c == '-').count();
            if dont_care > 0 {
                let tail = common[common.len() - dont_care..].to_string();
                let rest = patterns.iter().map(|a| a[..a.len() - dont_care].to_string()).collect();
                return self.tree(prefix, tail + &suffix, rest)
            }

            let fixed = common.chars().rev().take_while(|c| *c != '-').count();
            let bits = common[common.len() - fixed..].to_string();
            let rest = patterns.iter().map(|a| a[..a.len() - fixed].to_string()).collect();
            let tree = self.tree(prefix, bits.clone() + &suffix, rest)?;
            if self.optimize {
                return Ok(tree)
            }
            return Ok(DecisionTree::Equality{high: low + fixed - 1, low, bits, tree: tree.into()})
        }

        // Find the longest leading run in which every pattern carries a
        // literal. Such a run discriminates between the patterns: a single
        // bit via a branch, multiple bits via a case statement.
        let zeroed: Vec<_> = patterns.iter().map(|a| a.replace('1', "0")).collect();
        let fixed = common_prefix(&zeroed).chars().take_while(|c| *c != '-').count();
        if fixed == 1 {
            let zero = patterns.iter()
                .filter(|a| a.starts_with('0'))
                .map(|a| a[1..].to_string())
                .collect();
            let one = patterns.iter()
                .filter(|a| a.starts_with('1'))
                .map(|a| a[1..].to_string())
                .collect();
            let zero = self.tree(prefix.clone() + "0", suffix.clone(), zero)?;
            let one = self.tree(prefix + "1", suffix, one)?;
            return Ok(DecisionTree::Branch{bit: high, zero: zero.into(), one: one.into()})
        }
        if fixed > 1 {
            let mut options: Vec<_> = patterns.iter().map(|a| a[..fixed].to_string()).collect();
            options.sort();
            options.dedup();

            let mut arms = Vec::new();
            for option in options {
                let rest = patterns.iter()
                    .filter(|a| a.starts_with(option.as_str()))
                    .map(|a| a[fixed..].to_string())
                    .collect();
                let tree = self.tree(prefix.clone() + &option, suffix.clone(), rest)?;
                arms.push((option, tree));
            }
            return Ok(DecisionTree::Case{high, low: high + 1 - fixed, arms, optimize: self.optimize})
        }

        // No discriminating bit remains: the patterns overlap. If permitted,
        // patterns which carry a literal at the current bit are split from
        // those which don't and both groups form independent sub-trees.
        if !self.allow_overlap {
            let gap = "#".repeat(high - low);
            return Err(Error::Validation(format!(
                "addresses overlap at bit {0}: found both {1}-{2}{3} and {1}0{2}{3} and/or {1}1{2}{3}",
                high, prefix, gap, suffix,
            )))
        }

        let literal = patterns.iter().filter(|a| !a.starts_with('-')).cloned().collect();
        let dont_care = patterns.into_iter().filter(|a| a.starts_with('-')).collect();
        let parts = vec![
            self.tree(prefix.clone(), suffix.clone(), literal)?,
            self.tree(prefix, suffix, dont_care)?,
        ];
        Ok(DecisionTree::Sequence(parts))
    }
}


/// Style of the payload marker keys in a decision tree
#[derive(Copy, Clone, Debug, PartialEq)]
enum MarkerStyle {
    /// Hexadecimal value of the pattern, with don't cares taken as zero
    Hex,
    /// Verbatim pattern, with don't cares rendered as underscores
    Pattern,
}

impl MarkerStyle {
    /// Construct the marker key for the given address pattern
    fn key(self, pattern: &str) -> String {
        match self {
            Self::Hex => {
                let value = pattern
                    .chars()
                    .fold(BigUint::default(), |v, c| (v << 1usize) + if c == '1' {1u8} else {0u8});
                format!("ADDR_0x{:X}", value)
            },
            Self::Pattern => format!("ADDR_{}", pattern.replace('-', "_")),
        }
    }
}


/// Convert a masked address into a ternary pattern of the given width
fn pattern(address: &MaskedAddress, num_bits: usize) -> String {
    (0..num_bits)
        .rev()
        .map(|i| match (address.mask().bit(i as u64), address.value().bit(i as u64)) {
            (false, _)  => '-',
            (_, true)   => '1',
            (_, false)  => '0',
        })
        .collect()
}


/// Determine the prefix common to all given patterns
fn common_prefix(patterns: &[String]) -> &str {
    let mut items = patterns.iter();
    let mut common: &str = items.next().map(String::as_str).unwrap_or_default();
    for item in items {
        while !item.starts_with(common) {
            common = &common[..common.len() - 1];
        }
    }
    common
}


/// Determine the suffix common to all given patterns
fn common_suffix(patterns: &[String]) -> &str {
    let mut items = patterns.iter();
    let mut common: &str = items.next().map(String::as_str).unwrap_or_default();
    for item in items {
        while !item.ends_with(common) {
            common = &common[1..];
        }
    }
    common
}

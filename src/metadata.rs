// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Documentation metadata for register files, registers and fields


use std::collections::HashSet;

use crate::error::Error;
use crate::named::Named;


/// User-supplied metadata, before validation
///
/// Either the name or the mnemonic may be omitted, in which case it is
/// derived from the other by case conversion. A missing brief is derived
/// from the name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataConfig {
    pub mnemonic: Option<String>,
    pub name: Option<String>,
    pub brief: Option<String>,
    pub doc: Option<String>,
}

impl MetadataConfig {
    /// Create a config with only the name set
    pub fn named(name: impl Into<String>) -> Self {
        Self {name: Some(name.into()), ..Default::default()}
    }
}


/// Validated metadata of a possibly repeated object
///
/// The mnemonic is uppercase and may only contain digits and underscores
/// after the first character. The name is a regular identifier. For repeated
/// objects, neither may end in a digit, since expansion appends the decimal
/// index. The brief is a single line of markdown; the occurrence `{index}`
/// in the brief and doc is substituted with the index on expansion.
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    count: Option<usize>,
    mnemonic: String,
    name: String,
    brief: String,
    doc: String,
}

impl Metadata {
    /// Validate the given config, deriving any omitted parts
    ///
    /// `count` is the number of times the described object is repeated, or
    /// `None` if it is a scalar.
    pub fn new(count: Option<usize>, config: &MetadataConfig) -> Result<Self, Error> {
        if count == Some(0) {
            return Err(Error::Validation("count must be positive".to_string()))
        }

        let mnemonic = config
            .mnemonic
            .clone()
            .or_else(|| config.name.as_ref().map(|n| n.to_uppercase()))
            .ok_or_else(|| Error::Validation(
                "either name or mnemonic must be specified".to_string(),
            ))?;
        if !is_valid_mnemonic(&mnemonic) {
            return Err(Error::Validation(format!(
                "name {:?} is not a valid mnemonic", mnemonic,
            )))
        }
        if count.is_some() && mnemonic.ends_with(|c: char| c.is_ascii_digit()) {
            return Err(Error::Validation(
                "mnemonic cannot end in a digit when repetition is used".to_string(),
            ))
        }

        let name = config
            .name
            .clone()
            .unwrap_or_else(|| mnemonic.to_lowercase());
        if !is_valid_name(&name) {
            return Err(Error::Validation(format!(
                "name {:?} is not a valid identifier", name,
            )))
        }
        if count.is_some() && name.ends_with(|c: char| c.is_ascii_digit()) {
            return Err(Error::Validation(
                "name cannot end in a digit when repetition is used".to_string(),
            ))
        }

        let brief = match &config.brief {
            Some(brief) => brief.clone(),
            None        => derive_brief(&name),
        };
        if brief.contains('\n') {
            return Err(Error::Validation(
                "brief documentation contains one or more newlines".to_string(),
            ))
        }

        let doc = config.doc.clone().unwrap_or_default();
        Ok(Self {count, mnemonic, name, brief, doc})
    }

    /// Retrieve the repetition count, or `None` for a scalar object
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    /// Retrieve the brief documentation
    pub fn brief(&self) -> &str {
        &self.brief
    }

    /// Retrieve the long documentation
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Expand the metadata for a specific index
    ///
    /// For repeated objects, the index is appended to the name and mnemonic
    /// and substituted for `{index}` in the brief and doc. For scalar
    /// objects, no index may be given.
    pub fn expand(&self, index: Option<usize>) -> Result<ExpandedMetadata, Error> {
        match (self.count, index) {
            (None, None) => Ok(ExpandedMetadata {
                mnemonic: self.mnemonic.clone(),
                name: self.name.clone(),
                brief: self.brief.replace("{index}", ""),
                doc: self.doc.replace("{index}", ""),
            }),
            (Some(count), Some(index)) if index < count => {
                let ident = index.to_string();
                Ok(ExpandedMetadata {
                    mnemonic: format!("{}{}", self.mnemonic, ident),
                    name: format!("{}{}", self.name, ident),
                    brief: self.brief.replace("{index}", &ident),
                    doc: self.doc.replace("{index}", &ident),
                })
            },
            _ => Err(Error::Validation("index out of range".to_string())),
        }
    }
}

impl Named for Metadata {
    fn name(&self) -> &str {
        &self.name
    }

    fn mnemonic(&self) -> &str {
        &self.mnemonic
    }
}


/// Metadata expanded for a specific index within a repeated object
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExpandedMetadata {
    mnemonic: String,
    name: String,
    brief: String,
    doc: String,
}

impl ExpandedMetadata {
    /// Retrieve the brief documentation
    pub fn brief(&self) -> &str {
        &self.brief
    }

    /// Retrieve the long documentation
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Retrieve the mnemonic formatted for use in documentation
    pub fn markdown_mnemonic(&self) -> String {
        format!("`{}`", self.mnemonic)
    }

    /// Retrieve the name formatted for use in documentation
    pub fn markdown_name(&self) -> String {
        format!("`{}`", self.name)
    }
}

impl Named for ExpandedMetadata {
    fn name(&self) -> &str {
        &self.name
    }

    fn mnemonic(&self) -> &str {
        &self.mnemonic
    }
}


/// Tracker for names and mnemonics, detecting conflicts
///
/// Names must be unique within the whole namespace, case-insensitively, even
/// for items nested in different enclosing objects. Mnemonics of nested items
/// only need to be unique among siblings, which is enforced through the
/// concatenation of the parent and child mnemonics: generated code flattens
/// them that way, so the flattened mnemonic must be unique at the top level.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    name: String,
    used_mnemonics: HashSet<String>,
    used_names: HashSet<String>,
}

impl Namespace {
    /// Create a new, empty namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {name: name.into(), ..Default::default()}
    }

    /// Retrieve the name of the namespace, as used in error messages
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a top-level item
    pub fn add(&mut self, item: &impl Named) -> Result<(), Error> {
        self.use_mnemonic(item.mnemonic())?;
        self.use_name(item.name())
    }

    /// Register the name of an item, without claiming a mnemonic
    ///
    /// An item which ends up nested in more than one enclosing item registers
    /// its name once through this fn and its mnemonic once per enclosing item
    /// through `add_child()`.
    pub fn add_name(&mut self, item: &impl Named) -> Result<(), Error> {
        self.use_name(item.name())
    }

    /// Register the mnemonic of an item contained in another item
    ///
    /// The child's name is not registered, only the flattened mnemonic.
    pub fn add_child(&mut self, parent: &impl Named, child: &impl Named) -> Result<(), Error> {
        self.use_mnemonic(&format!("{}_{}", parent.mnemonic(), child.mnemonic()))
    }

    fn use_mnemonic(&mut self, mnemonic: &str) -> Result<(), Error> {
        if !self.used_mnemonics.insert(mnemonic.to_string()) {
            return Err(Error::Validation(format!(
                "mnemonic {} is used more than once in namespace {}", mnemonic, self.name,
            )))
        }
        Ok(())
    }

    fn use_name(&mut self, name: &str) -> Result<(), Error> {
        let name = name.to_lowercase();
        if !self.used_names.insert(name.clone()) {
            return Err(Error::Validation(format!(
                "name {} is used more than once in namespace {}", name, self.name,
            )))
        }
        Ok(())
    }
}


fn is_valid_mnemonic(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().map(|c| c.is_ascii_uppercase()).unwrap_or(false)
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false)
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Derive a brief documentation string from a name
///
/// Underscores separate words, as do transitions between digits and letters.
/// The first letter is capitalized and the result is closed like a sentence.
fn derive_brief(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in name.chars() {
        let boundary = c == '_' || current
            .chars()
            .next_back()
            .map(|p| p.is_ascii_digit() != c.is_ascii_digit())
            .unwrap_or(false);
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        if c != '_' {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    let brief = words.join(" ");
    let mut chars = brief.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_ascii_uppercase(), chars.as_str()),
        None        => ".".to_string(),
    }
}

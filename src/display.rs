// Copyright (c) 2021 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! General display utilities

use std::fmt;


/// Utility for formatting natural English enumerations
///
/// Items are joined with commas, except for the last pair which is joined
/// with "and". An empty enumeration is rendered as `<null>`.
pub struct Enumerated<I, E>
where I: IntoIterator<Item = E> + Clone,
      E: fmt::Display,
{
    inner: I,
}

impl<I, E> From<I> for Enumerated<I, E>
where I: IntoIterator<Item = E> + Clone,
      E: fmt::Display,
{
    fn from(inner: I) -> Self {
        Self{inner}
    }
}

impl<I, E> fmt::Display for Enumerated<I, E>
where I: IntoIterator<Item = E> + Clone,
      E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items = self.inner.clone().into_iter().peekable();
        let mut first = true;
        while let Some(item) = items.next() {
            if first {
                first = false;
            } else if items.peek().is_some() {
                f.write_str(", ")?;
            } else {
                f.write_str(" and ")?;
            }
            item.fmt(f)?;
        }
        if first {
            f.write_str("<null>")?;
        }
        Ok(())
    }
}

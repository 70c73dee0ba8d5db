//! Banner token derivation and template rendering.
//!
//! The banner token compresses "who is online" into the set of occupied
//! slots: sorted ascending, de-duplicated, joined with `_`, or `empty`.
//! It depends only on the set of identities, never on iteration order.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::roster::IdentityToken;
use crate::slots::SlotTable;

/// Token rendered when no mapped identity is present.
pub const EMPTY_TOKEN: &str = "empty";

/// Separator between slot numbers.
pub const SLOT_SEPARATOR: &str = "_";

/// Derived representation of the occupied slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannerToken {
    Empty,
    /// Strictly ascending, non-empty.
    Slots(Vec<u32>),
}

impl BannerToken {
    /// Derive the token for a set of present identities.
    pub fn derive<'a, I>(table: &SlotTable, identities: I) -> Self
    where
        I: IntoIterator<Item = &'a IdentityToken>,
    {
        let slots: BTreeSet<u32> = identities
            .into_iter()
            .filter_map(|token| table.slot(token))
            .collect();

        if slots.is_empty() {
            Self::Empty
        } else {
            Self::Slots(slots.into_iter().collect())
        }
    }
}

impl fmt::Display for BannerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str(EMPTY_TOKEN),
            Self::Slots(slots) => {
                for (i, slot) in slots.iter().enumerate() {
                    if i > 0 {
                        f.write_str(SLOT_SEPARATOR)?;
                    }
                    write!(f, "{}", slot)?;
                }
                Ok(())
            }
        }
    }
}

/// Template errors, reported during config validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("banner template needs exactly one %s placeholder, found {0}")]
    PlaceholderCount(usize),
    #[error("unsupported format verb %{0} in banner template")]
    UnsupportedVerb(char),
    #[error("banner template ends with a lone %")]
    TrailingPercent,
}

/// A printf-style template with exactly one `%s`. `%%` renders a literal `%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerTemplate {
    prefix: String,
    suffix: String,
}

impl BannerTemplate {
    /// Parse a template. An empty string means the banner feature is off and
    /// yields `Ok(None)`.
    pub fn parse(template: &str) -> Result<Option<Self>, TemplateError> {
        if template.is_empty() {
            return Ok(None);
        }

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut placeholders = 0;
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            let out = if placeholders == 0 { &mut prefix } else { &mut suffix };
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('%') => out.push('%'),
                Some('s') => placeholders += 1,
                Some(verb) => return Err(TemplateError::UnsupportedVerb(verb)),
                None => return Err(TemplateError::TrailingPercent),
            }
        }

        if placeholders != 1 {
            return Err(TemplateError::PlaceholderCount(placeholders));
        }
        Ok(Some(Self { prefix, suffix }))
    }

    pub fn render(&self, token: &BannerToken) -> String {
        format!("{}{}{}", self.prefix, token, self.suffix)
    }
}

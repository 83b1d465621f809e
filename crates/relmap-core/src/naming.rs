//! Deterministic names for generated indexes and constraints
//!
//! Names are derived from CRC-32 digests of the table and column names, so
//! the same table and columns always produce the same identifier and the
//! output of a synthesis run is reproducible byte for byte.


use std::fmt;

use crate::DialectAdapter;

/// Kind of generated identifier; selects the name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    Index,
    UniqueIndex,
    ForeignKey,
}

impl IdentifierKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdentifierKind::Index => "IDX",
            IdentifierKind::UniqueIndex => "UNIQ",
            IdentifierKind::ForeignKey => "FK",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Width of the `_XXXXXXXX` suffix appended to truncated names
const SUFFIX_LEN: usize = 9;

/// Smallest ceiling a namer accepts: the longest kind prefix, two digest
/// characters and the truncation suffix
pub const MIN_IDENTIFIER_LENGTH: usize = 16;

/// Produces index and constraint names within a length ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierNamer {
    max_length: usize,
}

impl IdentifierNamer {
    /// Namer bounded by `max_length`, raised to `MIN_IDENTIFIER_LENGTH` when
    /// lower
    pub fn new(max_length: usize) -> Self {
        if max_length < MIN_IDENTIFIER_LENGTH {
            tracing::warn!(
                requested = max_length,
                minimum = MIN_IDENTIFIER_LENGTH,
                "identifier length ceiling below minimum, using minimum"
            );
        }
        Self {
            max_length: max_length.max(MIN_IDENTIFIER_LENGTH),
        }
    }

    /// Namer bounded by the dialect's identifier length
    pub fn for_dialect(dialect: &dyn DialectAdapter) -> Self {
        Self::new(dialect.max_identifier_length())
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Name for an identifier of `kind` over `columns` of `table`.
    ///
    /// The name is the kind prefix, an underscore, then the hex CRC-32 of the
    /// table followed by that of each column, upper-cased. A name over the
    /// ceiling keeps its head and ends in `_` plus the zero-padded CRC-32 of
    /// the full input, so distinct inputs stay distinct after truncation.
    pub fn name<S: AsRef<str>>(&self, kind: IdentifierKind, table: &str, columns: &[S]) -> String {
        let mut digest = format!("{:x}", crc32fast::hash(table.as_bytes()));
        for column in columns {
            digest.push_str(&format!("{:x}", crc32fast::hash(column.as_ref().as_bytes())));
        }
        let name = format!("{}_{}", kind.prefix(), digest).to_uppercase();

        if name.len() <= self.max_length {
            return name;
        }

        let keep = self.max_length - SUFFIX_LEN;
        let suffix = crc32fast::hash(canonical_input(kind, table, columns).as_bytes());
        let truncated = format!("{}_{:08X}", &name[..keep], suffix);

        tracing::trace!(
            table = %table,
            kind = %kind,
            name = %truncated,
            "truncated generated identifier"
        );

        truncated
    }
}

/// NUL-separated rendering of everything that identifies a name request
fn canonical_input<S: AsRef<str>>(kind: IdentifierKind, table: &str, columns: &[S]) -> String {
    let mut canonical = format!("{}\0{}", kind.prefix(), table);
    for column in columns {
        canonical.push('\0');
        canonical.push_str(column.as_ref());
    }
    canonical
}

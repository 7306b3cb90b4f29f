//! Stable codes identifying each kind of diagnostic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The pipeline stage a code belongs to; decides the code's prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Reading and scanning DUT sources (`S`).
    Source,
    /// Checking interface port maps (`P`).
    PortMap,
    /// Finding and rendering templates (`T`).
    Template,
    /// Writing generated files (`O`).
    Output,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Source => 'S',
            Category::PortMap => 'P',
            Category::Template => 'T',
            Category::Output => 'O',
        }
    }
}

/// A category prefix plus a number, displayed as e.g. `T101`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The stage that raised the diagnostic.
    pub category: Category,
    /// Number within the category; hundreds group related codes.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }

    /// A DUT source file could not be read.
    pub const SOURCE_UNREADABLE: Self = Self::new(Category::Source, 101);
    /// No port declaration supplied a width; a fallback value is used.
    pub const WIDTH_NOT_INFERRED: Self = Self::new(Category::Source, 102);
    /// A port-map key does not appear in any DUT source file.
    pub const PORT_NOT_IN_SOURCE: Self = Self::new(Category::PortMap, 101);
    /// A port-map value is not a canonical signal of the protocol.
    pub const NON_CANONICAL_SIGNAL: Self = Self::new(Category::PortMap, 102);
    /// An interface declares no port map at all.
    pub const EMPTY_PORT_MAP: Self = Self::new(Category::PortMap, 103);
    /// An artifact template or component tree is absent.
    pub const TEMPLATE_MISSING: Self = Self::new(Category::Template, 101);
    /// A template failed to parse or render.
    pub const RENDER_FAILED: Self = Self::new(Category::Template, 201);
    /// A rendered artifact could not be written.
    pub const WRITE_FAILED: Self = Self::new(Category::Output, 101);
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

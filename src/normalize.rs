//! Categorical re-labelling of encoded columns.
//!
//! Source files may carry categorical columns as integer codes. Every numeric
//! cell in such a column is treated as a code and replaced by its label; text
//! cells are labels already and pass through untouched. What happens to codes
//! outside the mapping is decided by the remap's [`Fallback`]. Missing cells
//! of a column holding no text take the fallback's string form too, and a
//! remap with a missing label casts every missing cell to it.

use log::debug;

use crate::{
    data::{Cell, format_number},
    dataset::Table,
    schema::{BINARY_FLAG_COLUMNS, GENDER, LEARNING_STYLE},
};

pub const UNKNOWN_LABEL: &str = "Unknown";

/// String form of a missing value once a column is cast to text.
pub const MISSING_TEXT: &str = "nan";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Unmapped codes keep their literal string form, missing cells of a
    /// column holding no text become [`MISSING_TEXT`].
    KeepOriginal,
    /// Unmapped codes become the given label, as do missing cells of a column
    /// holding no text.
    Literal(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct CategoricalRemap {
    mapping: &'static [(i64, &'static str)],
    fallback: Fallback,
    missing_label: Option<&'static str>,
}

pub const GENDER_REMAP: CategoricalRemap =
    CategoricalRemap::new(&[(0, "Male"), (1, "Female")], Fallback::KeepOriginal);

pub const LEARNING_STYLE_REMAP: CategoricalRemap = CategoricalRemap::new(
    &[
        (0, "Visual"),
        (1, "Auditory"),
        (2, "Kinesthetic"),
        (3, "Reading/Writing"),
    ],
    Fallback::KeepOriginal,
)
.with_missing_label(MISSING_TEXT);

pub const BINARY_FLAG_REMAP: CategoricalRemap =
    CategoricalRemap::new(&[(1, "Yes"), (0, "No")], Fallback::Literal(UNKNOWN_LABEL));

impl CategoricalRemap {
    pub const fn new(mapping: &'static [(i64, &'static str)], fallback: Fallback) -> Self {
        Self {
            mapping,
            fallback,
            missing_label: None,
        }
    }

    /// Casts every missing cell to `label`, whatever else the column holds.
    pub const fn with_missing_label(self, label: &'static str) -> Self {
        Self {
            missing_label: Some(label),
            ..self
        }
    }

    pub fn label(&self, code: i64) -> Option<&'static str> {
        self.mapping
            .iter()
            .find(|(candidate, _)| *candidate == code)
            .map(|(_, label)| *label)
    }

    /// Remaps a single cell. `column_has_text` tells whether any cell of the
    /// column already holds a label.
    pub fn remap_cell(&self, cell: &Cell, column_has_text: bool) -> Option<Cell> {
        match cell {
            Cell::Text(_) => None,
            Cell::Number(value) => {
                let mapped = cell.as_code().and_then(|code| self.label(code));
                Some(match (mapped, self.fallback) {
                    (Some(label), _) => Cell::text(label),
                    (None, Fallback::KeepOriginal) => Cell::text(format_number(*value)),
                    (None, Fallback::Literal(label)) => Cell::text(label),
                })
            }
            Cell::Missing => match (self.missing_label, self.fallback) {
                (Some(label), _) => Some(Cell::text(label)),
                (None, _) if column_has_text => None,
                (None, Fallback::KeepOriginal) => Some(Cell::text(MISSING_TEXT)),
                (None, Fallback::Literal(label)) => Some(Cell::text(label)),
            },
        }
    }

    /// Applies the remap to one column in place and returns the number of
    /// cells rewritten.
    pub fn apply(&self, table: &mut Table, column: usize) -> usize {
        let column_has_text = table.column(column).any(|cell| cell.as_text().is_some());
        let mut rewritten = 0;
        for cell in table.column_mut(column) {
            if let Some(replacement) = self.remap_cell(cell, column_has_text) {
                *cell = replacement;
                rewritten += 1;
            }
        }
        rewritten
    }
}

/// Maps encoded `Gender`, `LearningStyle` and binary flag columns to their
/// labels. Applying it to an already normalized table changes nothing.
pub fn normalize(mut table: Table) -> Table {
    let targets = [(GENDER, GENDER_REMAP), (LEARNING_STYLE, LEARNING_STYLE_REMAP)]
        .into_iter()
        .chain(
            BINARY_FLAG_COLUMNS
                .iter()
                .map(|column| (*column, BINARY_FLAG_REMAP)),
        );
    for (name, remap) in targets {
        let Some(column) = table.column_index(name) else {
            continue;
        };
        let rewritten = remap.apply(&mut table, column);
        if rewritten > 0 {
            debug!("Relabelled {rewritten} cell(s) in column '{name}'");
        }
    }
    table
}

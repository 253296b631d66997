// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Column-aligned tables for text output.

use std::io::Write;

use crate::color;

pub enum Align {
    Left,
    Right,
}

pub enum CellStyle {
    Plain,
    Muted,
    Status,
}

pub struct Column {
    pub name: &'static str,
    pub align: Align,
    pub style: CellStyle,
}

impl Column {
    pub fn left(name: &'static str) -> Self {
        Self {
            name,
            align: Align::Left,
            style: CellStyle::Plain,
        }
    }

    pub fn right(name: &'static str) -> Self {
        Self {
            name,
            align: Align::Right,
            style: CellStyle::Plain,
        }
    }

    pub fn muted(name: &'static str) -> Self {
        Self {
            style: CellStyle::Muted,
            ..Self::left(name)
        }
    }

    pub fn status(name: &'static str) -> Self {
        Self {
            style: CellStyle::Status,
            ..Self::left(name)
        }
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    colorize: bool,
}

const SEP: &str = "  ";

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            colorize: color::should_colorize(),
        }
    }

    /// A table that never emits color codes.
    #[cfg(test)]
    pub fn plain(columns: Vec<Column>) -> Self {
        Self {
            colorize: false,
            ..Self::new(columns)
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header plus rows. The last left-aligned column is never padded, and
    /// color goes on after padding so escapes don't skew widths.
    pub fn render(&self, out: &mut impl Write) {
        if self.rows.is_empty() {
            return;
        }
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .map(|row| row.get(i).map_or(0, |c| c.chars().count()))
                    .fold(col.name.len(), usize::max)
            })
            .collect();

        let last = self.columns.len().saturating_sub(1);
        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let cell = pad(col.name, widths[i], &col.align, i == last);
                if self.colorize {
                    color::apply_header(&cell)
                } else {
                    cell
                }
            })
            .collect();
        let _ = writeln!(out, "{}", header.join(SEP));

        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let raw = row.get(i).map_or("", String::as_str);
                    let cell = pad(raw, widths[i], &col.align, i == last);
                    match (&col.style, self.colorize) {
                        (CellStyle::Muted, true) => color::apply_muted(&cell),
                        (CellStyle::Status, true) => color::apply_status(&cell),
                        _ => cell,
                    }
                })
                .collect();
            let _ = writeln!(out, "{}", cells.join(SEP));
        }
    }

    /// Render to stdout.
    pub fn print(&self) {
        self.render(&mut std::io::stdout().lock());
    }
}

fn pad(text: &str, width: usize, align: &Align, last: bool) -> String {
    match align {
        Align::Left if last => text.to_string(),
        Align::Left => format!("{:<width$}", text),
        Align::Right => format!("{:>width$}", text),
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;

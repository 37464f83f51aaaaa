// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, marker::PhantomData};

use colored::{Color, Colorize};
use unicode_width::UnicodeWidthStr;

pub struct Table<'a, T, C: Column<T>> {
    pub columns: &'a [C],
    pub separator: &'a str,
    pub padding: bool,
    pub data: &'a [T],
}

impl<T, C: Column<T>> fmt::Display for Table<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table: Vec<Vec<String>> = self
            .data
            .iter()
            .map(|row| self.columns.iter().map(|col| col.format(row)).collect())
            .collect();

        let columns = self.compute_columns(&table);
        for (cells, row) in table.into_iter().zip(self.data) {
            for (j, (col, cell)) in columns.iter().zip(cells).enumerate() {
                write!(f, "{}", col.stylize_cell(row, cell))?;
                if j + 1 < columns.len() {
                    f.write_str(self.separator)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<'a, T, C: Column<T>> Table<'a, T, C> {
    fn compute_columns(&self, table: &[Vec<String>]) -> Vec<ColumnStylizer<'a, T, C>> {
        let max_widths = self.padding.then(|| column_max_width(table, self.columns.len()));

        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let direction = col.padding_direction();
                let last_left = i + 1 == self.columns.len() && direction == PaddingDirection::Left;
                let padding = match &max_widths {
                    Some(widths) if !last_left => widths.get(i).map(|w| (*w, direction)),
                    _ => None,
                };
                ColumnStylizer {
                    config: col,
                    padding,
                    _marker: PhantomData,
                }
            })
            .collect()
    }
}

pub trait Column<T> {
    fn format(&self, data: &T) -> String;
    fn padding_direction(&self) -> PaddingDirection;
    fn get_color(&self, data: &T) -> Option<Color>;
}

struct ColumnStylizer<'a, T, C: Column<T>> {
    config: &'a C,
    /// padding width and direction
    padding: Option<(usize, PaddingDirection)>,
    _marker: PhantomData<T>,
}

impl<T, C: Column<T>> ColumnStylizer<'_, T, C> {
    fn stylize_cell(&self, data: &T, cell: String) -> String {
        // Pad by display width so wide characters keep columns aligned.
        let cell = match self.padding {
            Some((width, direction)) => {
                let fill = " ".repeat(width.saturating_sub(cell.width()));
                match direction {
                    PaddingDirection::Left => cell + &fill,
                    PaddingDirection::Right => fill + &cell,
                }
            }
            None => cell,
        };

        match self.config.get_color(data) {
            Some(color) => cell.color(color).to_string(),
            None => cell,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingDirection {
    Left,
    Right,
}

fn column_max_width(table: &[Vec<String>], columns: usize) -> Vec<usize> {
    let mut max_width = vec![0; columns];
    for row in table {
        for (max, cell) in max_width.iter_mut().zip(row) {
            *max = (*max).max(cell.width());
        }
    }
    max_width
}

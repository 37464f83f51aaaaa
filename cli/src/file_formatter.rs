// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use colored::Color;
use davkit_webdav::FileInfo;

use crate::table::{Column, PaddingDirection, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileColumn {
    Kind,
    Size,
    Modified,
    Name,
}

impl FileColumn {
    pub const LISTING: [Self; 4] = [Self::Kind, Self::Size, Self::Modified, Self::Name];
}

impl Column<FileInfo> for FileColumn {
    fn format(&self, data: &FileInfo) -> String {
        match self {
            Self::Kind => if data.is_dir { "d" } else { "-" }.to_string(),
            Self::Size => data.size.to_string(),
            Self::Modified => data.modified.strftime("%Y-%m-%d %H:%M").to_string(),
            Self::Name if data.is_dir => format!("{}/", data.name),
            Self::Name => data.name.clone(),
        }
    }

    fn padding_direction(&self) -> PaddingDirection {
        match self {
            Self::Size => PaddingDirection::Right,
            _ => PaddingDirection::Left,
        }
    }

    fn get_color(&self, data: &FileInfo) -> Option<Color> {
        match self {
            Self::Name if data.is_dir => Some(Color::Blue),
            Self::Modified => Some(Color::BrightBlack),
            _ => None,
        }
    }
}

/// Renders a directory listing, one entry per line.
pub struct FileFormatter {
    columns: Vec<FileColumn>,
}

impl FileFormatter {
    pub fn new(columns: Vec<FileColumn>) -> Self {
        Self { columns }
    }

    pub fn format<'a>(&'a self, files: &'a [FileInfo]) -> impl fmt::Display + 'a {
        Table {
            columns: &self.columns,
            separator: "  ",
            padding: true,
            data: files,
        }
    }
}

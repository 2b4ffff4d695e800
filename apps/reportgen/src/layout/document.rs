//! Laid-out report: metadata, pages and placed lines.

use serde::{Deserialize, Serialize};

/// Institutional header data printed on every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub university: String,
    pub college: String,
    pub department: String,
    pub title: String,
}

impl Metadata {
    /// The institution line shown above the title: `university – college – department`.
    pub fn header_line(&self) -> String {
        format!("{} – {} – {}", self.university, self.college, self.department)
    }
}

/// A body line: tokens joined by single spaces, placed at `y` (top edge, raster units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    pub y: f32,
}

impl Line {
    #[cfg(test)]
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text.split(' ')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based, contiguous within a document.
    pub number: u32,
    pub lines: Vec<Line>,
}

impl Page {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            lines: Vec::new(),
        }
    }
}

/// A whole report. Built per request and dropped once rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub metadata: Metadata,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    /// All lines in reading order across pages.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.pages.iter().flat_map(|p| p.lines.iter())
    }

    /// All tokens in reading order across lines and pages.
    #[cfg(test)]
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.lines().flat_map(Line::tokens)
    }
}

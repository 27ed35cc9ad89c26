//! Backend-independent page description.
//!
//! Coordinates are millimeters on an A4 page with the origin at the top-left
//! corner. Text positions are baselines; rectangles and images are placed by
//! their top-left corner.

use super::ReportError;

/// A4 width in millimeters.
pub const PAGE_WIDTH_MM: f32 = 210.0;

/// A4 height in millimeters.
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
}

/// A single drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        /// Font size in points
        size: f32,
        color: Rgb,
    },
    /// Outlined (unfilled) rectangle
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        stroke: Rgb,
        /// Stroke width in millimeters
        line_width: f32,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        stroke: Rgb,
        /// Stroke width in millimeters
        line_width: f32,
    },
    /// Serialized image (data URL) stretched to the given box
    Image {
        data: String,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// All text on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A titled sequence of pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}

impl Document {
    /// A document with one empty page.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: vec![Page::default()],
        }
    }

    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
    }

    /// Append to the last page.
    pub fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.add_page();
        }
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// All text in the document, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(Page::texts)
    }
}

/// Turns a [`Document`] into file bytes.
pub trait DocumentRenderer {
    fn render(&self, document: &Document) -> Result<Vec<u8>, ReportError>;
}

/// Destination for rendered files.
pub trait ReportSink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ReportError>;
}

/// Writes files into a directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirectorySink {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ReportSink for DirectorySink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ReportError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes)?;
        log::info!("Saved report to {:?}", path);
        Ok(())
    }
}

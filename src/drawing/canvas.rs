//! Freehand annotation canvas.
//!
//! Pointer input is rasterized with tiny-skia onto a white pixmap. Every
//! finished stroke is encoded and committed to the [`DrawingHistory`];
//! undo and redo repaint the canvas from the stored snapshots.

use tiny_skia::{
    BlendMode, Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use super::codec::{CodecError, ImageCodec, PngDataUrlCodec};
use super::history::{DrawingHistory, HistoryConfig, HistoryStep};
use super::tool::{Tool, ToolState};
use crate::state::Action;

/// A position in page (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientPoint {
    pub x: f32,
    pub y: f32,
}

impl ClientPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Mouse or touch input, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Button pressed or touch started
    Down(ClientPoint),
    /// Pointer moved or touch dragged
    Move(ClientPoint),
    /// Button released or touch ended
    Up,
    /// Pointer left the canvas
    Leave,
}

/// How the current drawing changed after a canvas operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawingChange {
    /// Nothing to report
    Unchanged,
    /// The canvas now shows this serialized image
    Set(String),
    /// The canvas is blank and there is no drawing
    Cleared,
}

impl DrawingChange {
    /// The store action reporting this change, if any.
    pub fn into_action(self) -> Option<Action> {
        match self {
            DrawingChange::Unchanged => None,
            DrawingChange::Set(image) => Some(Action::SetDrawing(Some(image))),
            DrawingChange::Cleared => Some(Action::SetDrawing(None)),
        }
    }
}

/// Errors raised by canvas operations.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// Width or height is zero or too large
    #[error("Invalid canvas size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// Snapshot encode or decode failure
    #[error("Snapshot error: {0}")]
    Codec(#[from] CodecError),
}

/// Raster canvas with stroke input and snapshot history.
#[derive(Debug)]
pub struct AnnotationCanvas<C: ImageCodec = PngDataUrlCodec> {
    pixmap: Pixmap,
    /// Top-left corner of the canvas in page coordinates
    origin: ClientPoint,
    history: DrawingHistory<String>,
    tools: ToolState,
    /// Last stroke point while a stroke is in progress
    last_point: Option<(f32, f32)>,
    codec: C,
}

impl AnnotationCanvas {
    /// Create a blank canvas using PNG data URL snapshots.
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        Self::with_codec(width, height, PngDataUrlCodec)
    }
}

impl<C: ImageCodec> AnnotationCanvas<C> {
    pub fn with_codec(width: u32, height: u32, codec: C) -> Result<Self, CanvasError> {
        Ok(Self {
            pixmap: blank_pixmap(width, height)?,
            origin: ClientPoint::new(0.0, 0.0),
            history: DrawingHistory::new(),
            tools: ToolState::default(),
            last_point: None,
            codec,
        })
    }

    /// Replace the history with an empty one using `config`.
    pub fn set_history_config(&mut self, config: HistoryConfig) {
        self.history = DrawingHistory::with_config(config);
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn history(&self) -> &DrawingHistory<String> {
        &self.history
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolState {
        &mut self.tools
    }

    pub fn is_drawing(&self) -> bool {
        self.last_point.is_some()
    }

    /// Record where the canvas' bounding box starts on the page.
    pub fn set_origin(&mut self, origin: ClientPoint) {
        self.origin = origin;
    }

    /// Feed one pointer event. A stroke is committed when it ends.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<DrawingChange, CanvasError> {
        match event {
            PointerEvent::Down(point) => {
                self.last_point = Some(self.to_local(point));
                Ok(DrawingChange::Unchanged)
            }
            PointerEvent::Move(point) => {
                if let Some(from) = self.last_point {
                    let to = self.to_local(point);
                    self.stroke_segment(from, to);
                    self.last_point = Some(to);
                }
                Ok(DrawingChange::Unchanged)
            }
            PointerEvent::Up | PointerEvent::Leave => {
                if self.last_point.take().is_some() {
                    self.commit()
                } else {
                    Ok(DrawingChange::Unchanged)
                }
            }
        }
    }

    /// Step back one snapshot; at the first snapshot, or with an empty
    /// history, the canvas is cleared.
    pub fn undo(&mut self) -> Result<DrawingChange, CanvasError> {
        let step = self.history.undo();
        self.apply_step(step)
    }

    /// Step forward one snapshot, if possible.
    pub fn redo(&mut self) -> Result<DrawingChange, CanvasError> {
        let step = self.history.redo();
        self.apply_step(step)
    }

    /// Blank the canvas and drop the history.
    pub fn clear(&mut self) -> DrawingChange {
        self.last_point = None;
        self.history.clear();
        self.pixmap.fill(Color::WHITE);
        log::debug!("🧹 Canvas cleared");
        DrawingChange::Cleared
    }

    /// Show an existing drawing (e.g. when editing a piece) as the only
    /// history entry, or blank the canvas for `None` or an empty string.
    pub fn load_drawing(&mut self, drawing: Option<&str>) -> Result<(), CanvasError> {
        match drawing.filter(|d| !d.is_empty()) {
            Some(image) => {
                self.last_point = None;
                self.paint_snapshot(image)?;
                self.history.reset_to(image.to_string());
                log::debug!("🖼️ Canvas loaded existing drawing");
            }
            None => {
                self.clear();
            }
        }
        Ok(())
    }

    /// Change the canvas size, keeping the current snapshot.
    /// Pixels outside the new bounds are lost.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), CanvasError> {
        self.pixmap = blank_pixmap(width, height)?;
        if let Some(current) = self.history.current().cloned() {
            self.paint_snapshot(&current)?;
        }
        log::debug!("📐 Canvas resized to {}x{}", width, height);
        Ok(())
    }

    /// Encode the canvas as it currently looks.
    pub fn snapshot(&self) -> Result<String, CanvasError> {
        Ok(self.codec.encode(&self.pixmap)?)
    }

    fn to_local(&self, point: ClientPoint) -> (f32, f32) {
        (point.x - self.origin.x, point.y - self.origin.y)
    }

    fn commit(&mut self) -> Result<DrawingChange, CanvasError> {
        let image = self.snapshot()?;
        self.history.commit(image.clone());
        log::debug!("✏️ Stroke committed");
        Ok(DrawingChange::Set(image))
    }

    fn apply_step(&mut self, step: HistoryStep<String>) -> Result<DrawingChange, CanvasError> {
        match step {
            HistoryStep::Restore(image) => {
                self.paint_snapshot(&image)?;
                Ok(DrawingChange::Set(image))
            }
            HistoryStep::Cleared => Ok(self.clear()),
            HistoryStep::Unchanged => Ok(DrawingChange::Unchanged),
        }
    }

    /// White fill, then the snapshot at the top-left corner.
    fn paint_snapshot(&mut self, image: &str) -> Result<(), CanvasError> {
        let snapshot = self.codec.decode(image)?;
        self.pixmap.fill(Color::WHITE);
        self.pixmap.draw_pixmap(
            0,
            0,
            snapshot.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        Ok(())
    }

    fn stroke_segment(&mut self, from: (f32, f32), to: (f32, f32)) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(self.tools.color.to_skia());
        if self.tools.tool == Tool::Eraser {
            paint.blend_mode = BlendMode::DestinationOut;
        }

        let stroke = Stroke {
            width: self.tools.effective_width(),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

fn blank_pixmap(width: u32, height: u32) -> Result<Pixmap, CanvasError> {
    let mut pixmap = Pixmap::new(width, height).ok_or(CanvasError::InvalidSize { width, height })?;
    pixmap.fill(Color::WHITE);
    Ok(pixmap)
}

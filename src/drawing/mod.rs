//! Annotation drawing: tools, snapshot history, rasterization and
//! image serialization.

mod canvas;
mod codec;
mod history;
mod tool;

pub use canvas::{AnnotationCanvas, CanvasError, ClientPoint, DrawingChange, PointerEvent};
pub use codec::{
    CodecError, ImageCodec, PNG_DATA_URL_PREFIX, PngDataUrlCodec, decode_data_url,
    flatten_on_white,
};
pub use history::{DrawingHistory, HistoryConfig, HistoryStep};
pub use tool::{LineWidth, StrokeColor, Tool, ToolState};

// Comic layout: page packing, bubble text fitting, and edit-driven re-pagination.
// Everything here is pure and synchronous; callers on the async path run the
// raster work that consumes these layouts inside spawn_blocking.

pub mod editing;
pub mod font_metrics;
pub mod pagination;
pub mod text_fit;

pub use font_metrics::{BitmapFont, TextMeasure};
pub use pagination::paginate;
pub use text_fit::{fit_text, TextBox, TextLayout};

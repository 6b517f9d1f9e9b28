// Render layer: one projection, several surfaces (JSON preview, HTML, plain text).

pub mod html;
pub mod projection;
pub mod text;

pub use html::{render_surface, RenderSurface};
pub use projection::{project, Projection};

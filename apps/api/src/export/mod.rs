//! PDF export: projection → HTML surface → raster image → A4 document → sink.
//!
//! Rasterizing and PDF assembly are delegated to an external service behind
//! `Rasterizer`; the finished file goes to an `ExportSink`.

pub mod handlers;
pub mod rasterizer;
pub mod sink;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::render::html::render_surface;
use crate::render::{Projection, RenderSurface};

pub use rasterizer::HttpRasterizer;
pub use sink::{FsExportSink, S3ExportSink};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Rasterizer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rasterizer returned {status}: {message}")]
    Rasterizer { status: u16, message: String },

    #[error("Rasterizer response is missing header '{0}'")]
    MissingHeader(&'static str),

    #[error("Rasterizer produced an empty image")]
    EmptyImage,

    #[error("Failed to store export: {0}")]
    Sink(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A rendered PNG plus its pixel dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub png: Bytes,
    pub width_px: u32,
    pub height_px: u32,
}

impl RasterImage {
    /// Height once the image is scaled to `width_mm` wide.
    pub fn height_mm(&self, width_mm: f64) -> f64 {
        if self.width_px == 0 {
            return 0.0;
        }
        f64::from(self.height_px) * width_mm / f64::from(self.width_px)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };
}

#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn render(&self, surface: &RenderSurface) -> Result<RasterImage, ExportError>;

    /// Assembles a paginated PDF from full-height page images.
    async fn build_document(&self, images: &[RasterImage], page: PageSize) -> Result<Bytes, ExportError>;
}

#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Stores the finished file and returns where it landed.
    async fn save(&self, pdf: Bytes, filename: &str) -> Result<String, ExportError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Geometry and naming
// ────────────────────────────────────────────────────────────────────────────

const PAGE_EPSILON_MM: f64 = 1e-6;

/// Vertical offsets (in mm, zero or negative) at which a tall image is placed
/// on successive pages so each page shows the next `page_height_mm` slice.
/// An image that fills pages exactly produces no trailing blank page.
pub fn page_offsets(image_height_mm: f64, page_height_mm: f64) -> Vec<f64> {
    let mut offsets = vec![0.0];
    if !image_height_mm.is_finite() || !page_height_mm.is_finite() || page_height_mm <= 0.0 {
        return offsets;
    }
    let mut remaining = image_height_mm - page_height_mm;
    while remaining > PAGE_EPSILON_MM {
        offsets.push(remaining - image_height_mm);
        remaining -= page_height_mm;
    }
    offsets
}

/// `{name}_Resume_{YYYY-MM-DD}.pdf` with whitespace runs collapsed to `_`.
/// Path separators and reserved characters also become `_`.
pub fn export_filename(name: &str, date: NaiveDate) -> String {
    let sanitized: String = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = if sanitized.is_empty() { "Resume" } else { &sanitized };
    format!("{stem}_Resume_{}.pdf", date.format("%Y-%m-%d"))
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub filename: String,
    pub location: String,
    pub pages: usize,
    pub size_bytes: usize,
}

#[derive(Clone)]
pub struct ExportPipeline {
    rasterizer: Arc<dyn Rasterizer>,
    sink: Arc<dyn ExportSink>,
}

impl ExportPipeline {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, sink: Arc<dyn ExportSink>) -> Self {
        Self { rasterizer, sink }
    }

    /// Runs one export. No retry happens at this level; a failure at any
    /// stage leaves nothing in the sink.
    pub async fn export(
        &self,
        projection: &Projection,
        name: &str,
        date: NaiveDate,
    ) -> Result<ExportOutcome, ExportError> {
        let surface = render_surface(projection);
        let image = self.rasterizer.render(&surface).await?;
        if image.width_px == 0 || image.height_px == 0 || image.png.is_empty() {
            return Err(ExportError::EmptyImage);
        }

        let page = PageSize::A4;
        let pages = page_offsets(image.height_mm(page.width_mm), page.height_mm).len();
        let pdf = self
            .rasterizer
            .build_document(std::slice::from_ref(&image), page)
            .await?;

        let filename = export_filename(name, date);
        let size_bytes = pdf.len();
        let location = self.sink.save(pdf, &filename).await?;
        info!("Exported {filename} ({pages} page(s), {size_bytes} bytes) to {location}");

        Ok(ExportOutcome {
            filename,
            location,
            pages,
            size_bytes,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::models::customization::Customization;
    use crate::models::resume::empty_document;
    use crate::render::project;

    /// Rasterizer double that returns a fixed-size image and a fake PDF.
    pub(crate) struct FakeRasterizer {
        pub height_px: u32,
        pub fail: bool,
        pub seen_html: Mutex<Vec<String>>,
    }

    impl FakeRasterizer {
        pub fn new(height_px: u32) -> Self {
            Self {
                height_px,
                fail: false,
                seen_html: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(100)
            }
        }
    }

    #[async_trait]
    impl Rasterizer for FakeRasterizer {
        async fn render(&self, surface: &RenderSurface) -> Result<RasterImage, ExportError> {
            if self.fail {
                return Err(ExportError::Rasterizer {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            self.seen_html.lock().unwrap().push(surface.html.clone());
            Ok(RasterImage {
                png: Bytes::from_static(b"\x89PNG"),
                width_px: 210,
                height_px: self.height_px,
            })
        }

        async fn build_document(&self, images: &[RasterImage], _page: PageSize) -> Result<Bytes, ExportError> {
            Ok(Bytes::from(format!("%PDF-1.4 images={}", images.len())))
        }
    }

    #[derive(Default)]
    pub(crate) struct MemorySink {
        pub files: Mutex<Vec<(String, Bytes)>>,
    }

    #[async_trait]
    impl ExportSink for MemorySink {
        async fn save(&self, pdf: Bytes, filename: &str) -> Result<String, ExportError> {
            self.files.lock().unwrap().push((filename.to_string(), pdf));
            Ok(format!("memory://{filename}"))
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_export_filename_sanitizes_whitespace() {
        assert_eq!(
            export_filename("Ada  King\tLovelace ", date()),
            "Ada_King_Lovelace_Resume_2024-03-09.pdf"
        );
    }

    #[test]
    fn test_export_filename_empty_name() {
        assert_eq!(export_filename("   ", date()), "Resume_Resume_2024-03-09.pdf");
    }

    #[test]
    fn test_export_filename_strips_separators() {
        assert_eq!(export_filename("../etc/passwd", date()), ".._etc_passwd_Resume_2024-03-09.pdf");
    }

    #[test]
    fn test_page_offsets_single_page() {
        assert_eq!(page_offsets(120.0, 297.0), vec![0.0]);
    }

    #[test]
    fn test_page_offsets_exact_multiple_has_no_blank_page() {
        assert_eq!(page_offsets(594.0, 297.0), vec![0.0, -297.0]);
    }

    #[test]
    fn test_page_offsets_partial_last_page() {
        assert_eq!(page_offsets(600.0, 297.0), vec![0.0, -297.0, -594.0]);
    }

    #[test]
    fn test_page_offsets_degenerate_page() {
        assert_eq!(page_offsets(600.0, 0.0), vec![0.0]);
    }

    #[test]
    fn test_raster_height_mm() {
        let image = RasterImage {
            png: Bytes::new(),
            width_px: 630,
            height_px: 1782,
        };
        assert!((image.height_mm(210.0) - 594.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_pipeline_writes_pdf_to_sink() {
        let rasterizer = Arc::new(FakeRasterizer::new(600));
        let sink = Arc::new(MemorySink::default());
        let pipeline = ExportPipeline::new(rasterizer.clone(), sink.clone());

        let mut doc = empty_document();
        doc.personal_info.name = "Ada Lovelace".into();
        let projection = project(&doc, &Customization::default());

        let outcome = pipeline.export(&projection, "Ada Lovelace", date()).await.unwrap();
        assert_eq!(outcome.filename, "Ada_Lovelace_Resume_2024-03-09.pdf");
        assert_eq!(outcome.location, "memory://Ada_Lovelace_Resume_2024-03-09.pdf");
        assert_eq!(outcome.pages, 3);
        assert!(rasterizer.seen_html.lock().unwrap()[0].contains("Ada Lovelace"));
        assert_eq!(sink.files.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_failure_leaves_sink_empty() {
        let sink = Arc::new(MemorySink::default());
        let pipeline = ExportPipeline::new(Arc::new(FakeRasterizer::failing()), sink.clone());
        let projection = project(&empty_document(), &Customization::default());

        let err = pipeline.export(&projection, "Ada", date()).await.unwrap_err();
        assert!(matches!(err, ExportError::Rasterizer { status: 503, .. }));
        assert!(sink.files.lock().unwrap().is_empty());
    }
}

//! HTTP client for the external rasterizer service.
//!
//! `POST {base}/render` takes the HTML surface and answers with PNG bytes,
//! reporting pixel size in `x-image-width` / `x-image-height`.
//! `POST {base}/documents` takes the page images as multipart and answers
//! with the assembled PDF.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, warn};

use crate::export::{page_offsets, ExportError, PageSize, RasterImage, Rasterizer};
use crate::render::RenderSurface;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Device pixel ratio requested from the rasterizer.
const RENDER_SCALE: u32 = 3;

const WIDTH_HEADER: &str = "x-image-width";
const HEIGHT_HEADER: &str = "x-image-height";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequest<'a> {
    html: &'a str,
    width_mm: u32,
    scale: u32,
    background: &'a str,
}

#[derive(Clone)]
pub struct HttpRasterizer {
    client: Client,
    base_url: String,
    backoff_base: Duration,
}

impl HttpRasterizer {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ExportError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            backoff_base: Duration::from_secs(1),
        })
    }

    /// Overrides the first retry delay; later delays double from it.
    #[cfg(test)]
    pub fn with_backoff(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends the request built by `build`, retrying on 429, 5xx and transport
    /// errors with exponential backoff.
    async fn send_with_retry<F>(&self, what: &str, build: F) -> Result<Response, ExportError>
    where
        F: Fn() -> Result<RequestBuilder, ExportError> + Send + Sync,
    {
        let mut last_error: Option<ExportError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.backoff_base * (1 << (attempt - 1));
                warn!(
                    "Rasterizer {what} attempt {attempt} failed, retrying after {}ms...",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build()?.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ExportError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Rasterizer {what} returned {status}: {body}");
                last_error = Some(ExportError::Rasterizer {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(ExportError::Rasterizer {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(ExportError::Rasterizer {
            status: 503,
            message: format!("{what} failed after {MAX_RETRIES} attempts"),
        }))
    }
}

fn header_u32(response: &Response, name: &'static str) -> Result<u32, ExportError> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .ok_or(ExportError::MissingHeader(name))
}

#[async_trait]
impl Rasterizer for HttpRasterizer {
    async fn render(&self, surface: &RenderSurface) -> Result<RasterImage, ExportError> {
        let body = RenderRequest {
            html: &surface.html,
            width_mm: surface.width_mm,
            scale: RENDER_SCALE,
            background: "#ffffff",
        };
        let url = self.url("render");
        let response = self
            .send_with_retry("render", || Ok(self.client.post(&url).json(&body)))
            .await?;

        let width_px = header_u32(&response, WIDTH_HEADER)?;
        let height_px = header_u32(&response, HEIGHT_HEADER)?;
        let png = response.bytes().await?;
        debug!("Rasterized surface to {width_px}x{height_px}px ({} bytes)", png.len());

        Ok(RasterImage {
            png,
            width_px,
            height_px,
        })
    }

    async fn build_document(&self, images: &[RasterImage], page: PageSize) -> Result<Bytes, ExportError> {
        let offsets: Vec<Vec<f64>> = images
            .iter()
            .map(|image| page_offsets(image.height_mm(page.width_mm), page.height_mm))
            .collect();
        let offsets_json = serde_json::to_string(&offsets).map_err(|e| ExportError::Rasterizer {
            status: 0,
            message: format!("failed to encode page offsets: {e}"),
        })?;

        let url = self.url("documents");
        let response = self
            .send_with_retry("documents", || {
                let mut form = Form::new()
                    .text("pageWidthMm", page.width_mm.to_string())
                    .text("pageHeightMm", page.height_mm.to_string())
                    .text("offsets", offsets_json.clone());
                for (i, image) in images.iter().enumerate() {
                    let part = Part::bytes(image.png.to_vec())
                        .file_name(format!("page-{i}.png"))
                        .mime_str("image/png")?;
                    form = form.part("images", part);
                }
                Ok(self.client.post(&url).multipart(form))
            })
            .await?;

        let pdf = response.bytes().await?;
        debug!("Rasterizer assembled PDF ({} bytes)", pdf.len());
        Ok(pdf)
    }
}

//! # Page Rasterizer Module
//!
//! Contract of the external collaborator that turns paginated documents into
//! text or pixels. Only the first page is ever requested.

use image::DynamicImage;

use crate::extraction_errors::PipelineError;

/// External page rasterizer for paginated documents
pub trait PageRasterizer: Send + Sync {
    /// Text embedded in the first page, `None` when the page has no text layer
    fn extract_embedded_text(&self, bytes: &[u8]) -> Result<Option<String>, PipelineError>;

    /// Render the first page at the given scale
    fn rasterize_first_page(&self, bytes: &[u8], scale: f32)
        -> Result<DynamicImage, PipelineError>;
}

/// Rasterizer used when no backend is configured; every call fails
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRasterizer;

impl PageRasterizer for UnavailableRasterizer {
    fn extract_embedded_text(&self, _bytes: &[u8]) -> Result<Option<String>, PipelineError> {
        Err(PipelineError::RasterizationFailed(
            "no page rasterizer configured".to_string(),
        ))
    }

    fn rasterize_first_page(
        &self,
        _bytes: &[u8],
        _scale: f32,
    ) -> Result<DynamicImage, PipelineError> {
        Err(PipelineError::RasterizationFailed(
            "no page rasterizer configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_rasterizer_always_fails() {
        let rasterizer = UnavailableRasterizer;
        assert!(matches!(
            rasterizer.extract_embedded_text(b"%PDF"),
            Err(PipelineError::RasterizationFailed(_))
        ));
        assert!(rasterizer.rasterize_first_page(b"%PDF", 2.0).is_err());
    }
}

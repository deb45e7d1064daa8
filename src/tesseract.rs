//! # Tesseract Recognition Engine
//!
//! [`RecognitionEngine`] backed by the system libtesseract through `leptess`.
//! Tesseract instances are expensive to initialise (~100-500ms), so they are
//! pooled per language and tessdata combination and reused across calls.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use leptess::LepTess;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::extraction_errors::PipelineError;
use crate::pipeline_config::RecognitionConfig;
use crate::recognition::{RawRecognition, RecognitionEngine};

/// Common tessdata installation paths, probed in order
const TESSDATA_CANDIDATES: &[&str] = &[
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
];

/// Thread-safe pool of Tesseract instances keyed by configuration
#[derive(Default)]
pub struct TesseractInstanceManager {
    instances: Mutex<HashMap<String, Arc<Mutex<LepTess>>>>,
}

impl TesseractInstanceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the instance for a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when Tesseract cannot be initialised (missing
    /// language data, invalid variables).
    pub fn get_instance(&self, config: &RecognitionConfig) -> anyhow::Result<Arc<Mutex<LepTess>>> {
        let tessdata = resolve_tessdata_dir(config);
        let key = format!(
            "{}:{}:{}",
            config.languages,
            tessdata.as_deref().unwrap_or("default"),
            config.psm_mode.as_str()
        );

        if let Some(instance) = self.instances.lock().get(&key) {
            return Ok(Arc::clone(instance));
        }

        info!(
            languages = %config.languages,
            tessdata = ?tessdata,
            "Creating new Tesseract instance"
        );

        let mut tess = LepTess::new(tessdata.as_deref(), &config.languages)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Tesseract instance: {}", e))?;
        tess.set_variable(
            leptess::Variable::TesseditPagesegMode,
            config.psm_mode.as_str(),
        )
        .map_err(|e| anyhow::anyhow!("Failed to set page segmentation mode: {}", e))?;

        if let Some(whitelist) = &config.character_whitelist {
            tess.set_variable(leptess::Variable::TesseditCharWhitelist, whitelist)
                .map_err(|e| anyhow::anyhow!("Failed to set character whitelist: {}", e))?;
            debug!(chars = whitelist.len(), "Configured character whitelist");
        }

        let instance = Arc::new(Mutex::new(tess));
        self.instances
            .lock()
            .entry(key)
            .or_insert_with(|| Arc::clone(&instance));
        Ok(instance)
    }

    /// Number of pooled instances
    pub fn instance_count(&self) -> usize {
        self.instances.lock().len()
    }

    /// Drop every pooled instance
    pub fn clear(&self) {
        let mut instances = self.instances.lock();
        let count = instances.len();
        instances.clear();
        if count > 0 {
            info!("Cleared {count} Tesseract instances");
        }
    }
}

/// Explicit tessdata directory, or the first installed one found
pub fn resolve_tessdata_dir(config: &RecognitionConfig) -> Option<String> {
    if let Some(dir) = &config.tessdata_dir {
        return Some(dir.clone());
    }
    TESSDATA_CANDIDATES
        .iter()
        .find(|path| std::path::Path::new(path).exists())
        .map(|path| path.to_string())
}

/// Recognition engine running Tesseract on the blocking thread pool
pub struct TesseractEngine {
    config: RecognitionConfig,
    manager: Arc<TesseractInstanceManager>,
}

impl TesseractEngine {
    /// Create an engine and initialise its Tesseract instance eagerly, so a
    /// missing installation is reported at startup.
    pub fn new(config: RecognitionConfig) -> anyhow::Result<Self> {
        let manager = Arc::new(TesseractInstanceManager::new());
        manager.get_instance(&config)?;
        Ok(Self { config, manager })
    }
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, PipelineError> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| PipelineError::RecognitionUnavailable(format!("PNG encoding failed: {e}")))?;
    Ok(buffer)
}

#[async_trait]
impl RecognitionEngine for TesseractEngine {
    async fn recognize(&self, image: &DynamicImage) -> Result<RawRecognition, PipelineError> {
        let png = encode_png(image)?;
        let instance = self.manager.get_instance(&self.config)?;

        tokio::task::spawn_blocking(move || {
            let mut tess = instance.lock();
            tess.set_image_from_mem(&png).map_err(|e| {
                PipelineError::RecognitionUnavailable(format!("Failed to load image: {e}"))
            })?;
            let text = tess.get_utf8_text().map_err(|e| {
                PipelineError::RecognitionUnavailable(format!("Failed to extract text: {e}"))
            })?;
            let confidence = tess.mean_text_conf() as f32;
            Ok(RawRecognition { text, confidence })
        })
        .await
        .map_err(|e| PipelineError::RecognitionUnavailable(format!("Recognition task failed: {e}")))?
    }
}

impl std::fmt::Debug for TesseractEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TesseractEngine")
            .field("config", &self.config)
            .field("instances", &self.manager.instance_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_tessdata_dir_wins() {
        let config = RecognitionConfig {
            tessdata_dir: Some("/custom/tessdata".to_string()),
            ..RecognitionConfig::default()
        };
        assert_eq!(
            resolve_tessdata_dir(&config).as_deref(),
            Some("/custom/tessdata")
        );
    }

    #[test]
    fn test_empty_manager() {
        let manager = TesseractInstanceManager::new();
        assert_eq!(manager.instance_count(), 0);
        manager.clear();
        assert_eq!(manager.instance_count(), 0);
    }

    #[test]
    fn test_encode_png_signature() {
        let image = DynamicImage::ImageLuma8(image::GrayImage::new(4, 4));
        let png = encode_png(&image).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
    }
}

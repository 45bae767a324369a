//! User-facing operations: convert, count, diagnose.
//!
//! `convert_images` counts the images, then runs the whole conversion
//! inside one undoable host operation. An empty model aborts the operation
//! and tells the user there is nothing to do. On success the
//! operation is committed, on failure it is aborted so the model is left as
//! it was. Either way the host ends at the model root with an empty status
//! line.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use validator::Validate;

use imgconv_core::traits::host::SceneHost;

use crate::config::ConverterConfig;
use crate::context;
use crate::error::ConversionError;
use crate::metrics::{MetricsSnapshot, WalkMetrics};
use crate::models::{ConversionReport, DiagnosticReport};
use crate::progress::{NoopProgress, ProgressObserver};
use crate::walker::SceneWalker;

/// Runs walks against a host and reports the results to the user.
#[derive(Debug)]
pub struct ImageConverter {
    config: ConverterConfig,
    metrics: Arc<WalkMetrics>,
}

impl ImageConverter {
    /// Create a converter. Fails if `config` does not validate.
    pub fn new(config: ConverterConfig) -> Result<Self, ConversionError> {
        config.validate()?;
        Ok(Self {
            config,
            metrics: Arc::new(WalkMetrics::new()),
        })
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn walker(&self) -> SceneWalker {
        SceneWalker::new(self.config.clone(), Arc::clone(&self.metrics))
    }

    /// Convert every image in the model as one undoable operation.
    pub fn convert_images<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
    ) -> Result<ConversionReport, ConversionError> {
        self.convert_images_with(host, &mut NoopProgress)
    }

    /// [`ImageConverter::convert_images`], reporting progress to `observer`.
    pub fn convert_images_with<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        observer: &mut dyn ProgressObserver,
    ) -> Result<ConversionReport, ConversionError> {
        let result = self.run_conversion(host, observer);

        if let Err(e) = context::close_to_root(host) {
            error!(error = %e, "Failed to return to the model root");
        }
        if self.config.status_updates {
            host.set_status_text("");
        }
        result
    }

    fn run_conversion<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        observer: &mut dyn ProgressObserver,
    ) -> Result<ConversionReport, ConversionError> {
        let started_at = Utc::now();
        let mut walker = self.walker();
        let total = match walker.count_images(&*host) {
            Ok(total) => total,
            Err(e) => {
                error!(error = %e, "Failed to count images");
                host.messagebox(&format!("Error during conversion: {e}"));
                return Err(e);
            }
        };

        if let Err(e) = host.start_operation(&self.config.operation_name) {
            let err = ConversionError::from(e);
            error!(error = %err, "Failed to start conversion operation");
            host.messagebox(&format!("Error during conversion: {err}"));
            return Err(err);
        }
        info!(
            operation = %self.config.operation_name,
            host = host.name(),
            total,
            "Started conversion"
        );

        if total == 0 {
            if let Err(e) = host.abort_operation() {
                warn!(error = %e, "Failed to abort empty conversion operation");
            }
            host.messagebox("No Image entities found to convert.");
            info!("No images to convert");
            return Ok(ConversionReport::nothing_to_do(started_at));
        }

        let outcome = match walker.convert_walk(host, total, observer) {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail(host, e)),
        };
        if let Err(e) = host.commit_operation() {
            return Err(self.fail(host, e.into()));
        }

        host.messagebox(&format!(
            "Successfully converted {} image(s) to geometry.",
            outcome.converted
        ));
        let report = ConversionReport::from_outcome(outcome, started_at);
        info!(
            converted = report.converted,
            total = report.total_images,
            faces = report.faces_created,
            failed_images = report.failed_images(),
            failed_containers = report.failed_containers.len(),
            duration_ms = report.duration_ms(),
            "Image Converter: {} images converted to geometry",
            report.converted
        );
        Ok(report)
    }

    /// Roll back the open operation and tell the user.
    fn fail<H: SceneHost + ?Sized>(&self, host: &mut H, err: ConversionError) -> ConversionError {
        if let Err(e) = host.abort_operation() {
            error!(error = %e, "Failed to abort conversion operation");
        }
        error!(error = %err, "Image conversion failed, changes rolled back");
        host.messagebox(&format!("Error during conversion: {err}"));
        err
    }

    /// Count images in the model and show the count.
    pub fn count_images<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
    ) -> Result<usize, ConversionError> {
        let count = self.walker().count_images(&*host)?;
        let noun = if count == 1 { "entity" } else { "entities" };
        host.messagebox(&format!("Found {count} Image {noun} in the model."));
        info!(count, "Counted images");
        Ok(count)
    }

    /// Log where every image and textured face sits in the hierarchy.
    pub fn run_diagnostics<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
    ) -> Result<DiagnosticReport, ConversionError> {
        info!("--- Starting Model Diagnostics ---");
        let report = self.walker().diagnose(&*host)?;
        for line in &report.trace {
            info!("{line}");
        }
        for line in report.summary() {
            info!("{line}");
        }
        for skipped in &report.skipped_containers {
            warn!(container = %skipped.label, error = %skipped.error, "Container skipped");
        }
        info!("--- Diagnostics Complete ---");
        host.messagebox("Diagnostics complete. Check the log for details.");
        Ok(report)
    }
}

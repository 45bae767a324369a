//! Plugin entry point: host version gate and menu commands.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use imgconv_core::traits::host::SceneHost;

use crate::commands::{CommandHandler, CommandOutput, CommandRegistry};
use crate::config::ConverterConfig;
use crate::converter::ImageConverter;
use crate::error::ConversionError;
use crate::progress::ProgressObserver;

/// Command id of "Convert Images to Geometry".
pub const CONVERT_COMMAND: &str = "convert";
/// Command id of "Count Images".
pub const COUNT_COMMAND: &str = "count";
/// Command id of "Debug Context".
pub const DIAGNOSE_COMMAND: &str = "diagnose";

/// Plugin metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
}

/// Image converter plugin
#[derive(Debug)]
pub struct ImageConverterPlugin {
    info: PluginInfo,
    config: ConverterConfig,
    converter: Option<Arc<ImageConverter>>,
}

impl ImageConverterPlugin {
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            info: PluginInfo {
                name: "image-converter".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: "Convert raster images into textured faces".to_string(),
                author: "Image Converter Team".to_string(),
            },
            config,
            converter: None,
        }
    }

    /// Initialize against a host.
    ///
    /// Hosts older than `min_host_version` get a message and
    /// [`ConversionError::UnsupportedHost`]; nothing is registered then.
    pub fn initialize<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<Arc<ImageConverter>, ConversionError> {
        let version = host.version();
        let required = self.config.min_host_version;
        if version < required {
            let message = format!("Image Converter requires host version {required} or newer.");
            warn!(host = host.name(), version, required, "Unsupported host version");
            host.messagebox(&message);
            return Err(ConversionError::UnsupportedHost { version, required });
        }

        let converter = Arc::new(ImageConverter::new(self.config.clone())?);
        self.converter = Some(Arc::clone(&converter));
        info!(
            plugin = %self.info.name,
            host = host.name(),
            version,
            "Image converter plugin initialized"
        );
        Ok(converter)
    }

    /// Register the menu commands. Registering twice adds nothing.
    ///
    /// Returns how many commands were added.
    pub fn register_commands(
        &self,
        registry: &mut CommandRegistry,
    ) -> Result<usize, ConversionError> {
        let converter = self
            .converter
            .as_ref()
            .ok_or(ConversionError::NotInitialized)?;

        let handlers: [Arc<dyn CommandHandler>; 3] = [
            Arc::new(ConvertCommand {
                converter: Arc::clone(converter),
            }),
            Arc::new(CountCommand {
                converter: Arc::clone(converter),
            }),
            Arc::new(DiagnoseCommand {
                converter: Arc::clone(converter),
            }),
        ];

        let added = handlers
            .into_iter()
            .filter(|handler| registry.register(&self.info.name, Arc::clone(handler)))
            .count();
        info!(plugin = %self.info.name, added, "Registered image converter commands");
        Ok(added)
    }

    pub fn info(&self) -> &PluginInfo {
        &self.info
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn converter(&self) -> Option<&Arc<ImageConverter>> {
        self.converter.as_ref()
    }
}

impl Default for ImageConverterPlugin {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}

#[derive(Debug)]
struct ConvertCommand {
    converter: Arc<ImageConverter>,
}

impl CommandHandler for ConvertCommand {
    fn id(&self) -> &str {
        CONVERT_COMMAND
    }

    fn label(&self) -> &str {
        "Convert Images to Geometry"
    }

    fn in_context_menu(&self) -> bool {
        true
    }

    fn run(
        &self,
        host: &mut dyn SceneHost,
        observer: &mut dyn ProgressObserver,
    ) -> Result<CommandOutput, ConversionError> {
        self.converter
            .convert_images_with(host, observer)
            .map(CommandOutput::Converted)
    }
}

#[derive(Debug)]
struct CountCommand {
    converter: Arc<ImageConverter>,
}

impl CommandHandler for CountCommand {
    fn id(&self) -> &str {
        COUNT_COMMAND
    }

    fn label(&self) -> &str {
        "Count Images"
    }

    fn run(
        &self,
        host: &mut dyn SceneHost,
        _observer: &mut dyn ProgressObserver,
    ) -> Result<CommandOutput, ConversionError> {
        let images = self.converter.count_images(host)?;
        Ok(CommandOutput::Counted { images })
    }
}

#[derive(Debug)]
struct DiagnoseCommand {
    converter: Arc<ImageConverter>,
}

impl CommandHandler for DiagnoseCommand {
    fn id(&self) -> &str {
        DIAGNOSE_COMMAND
    }

    fn label(&self) -> &str {
        "Debug Context"
    }

    fn run(
        &self,
        host: &mut dyn SceneHost,
        _observer: &mut dyn ProgressObserver,
    ) -> Result<CommandOutput, ConversionError> {
        self.converter
            .run_diagnostics(host)
            .map(CommandOutput::Diagnosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgress;
    use imgconv_host::{Collection, ImageSpec, MemoryModel};

    #[test]
    fn test_old_host_is_rejected() {
        let mut model = MemoryModel::new("Studio", 20);
        let mut plugin = ImageConverterPlugin::default();

        let err = plugin.initialize(&mut model).expect_err("too old");
        assert!(matches!(
            err,
            ConversionError::UnsupportedHost {
                version: 20,
                required: 21
            }
        ));
        assert_eq!(
            model.messages(),
            &["Image Converter requires host version 21 or newer."]
        );

        let mut registry = CommandRegistry::new();
        assert!(matches!(
            plugin.register_commands(&mut registry),
            Err(ConversionError::NotInitialized)
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_commands_register_once_in_order() {
        let mut model = MemoryModel::new("Studio", 21);
        let mut plugin = ImageConverterPlugin::default();
        plugin.initialize(&mut model).expect("init");

        let mut registry = CommandRegistry::new();
        assert_eq!(plugin.register_commands(&mut registry).expect("register"), 3);
        assert_eq!(plugin.register_commands(&mut registry).expect("again"), 0);

        assert_eq!(
            registry.menu(),
            vec!["Convert Images to Geometry", "Count Images", "Debug Context"]
        );
        assert_eq!(registry.context_menu(), vec!["Convert Images to Geometry"]);
    }

    #[test]
    fn test_registered_convert_runs() {
        let mut model = MemoryModel::default();
        model
            .add_image(Collection::Root, ImageSpec::new("a", 1.0, 1.0))
            .expect("a");
        let mut plugin = ImageConverterPlugin::default();
        plugin.initialize(&mut model).expect("init");
        let mut registry = CommandRegistry::new();
        plugin.register_commands(&mut registry).expect("register");

        let output = registry
            .run(COUNT_COMMAND, &mut model, &mut NoopProgress)
            .expect("count");
        assert!(matches!(output, CommandOutput::Counted { images: 1 }));

        let output = registry
            .run(CONVERT_COMMAND, &mut model, &mut NoopProgress)
            .expect("convert");
        match output {
            CommandOutput::Converted(report) => assert_eq!(report.converted, 1),
            other => panic!("unexpected output: {other:?}"),
        }
    }
}

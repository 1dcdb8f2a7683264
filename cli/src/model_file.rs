//! Reading and writing schema model files.
//!
//! Models are stored in the editor's camelCase layout, as JSON (`.json`)
//! or YAML (`.yaml`, `.yml`).

use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use schema_builder_core::SchemaDefinition;

use crate::error::{CliError, Result};

/// On-disk encoding of a model file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelFormat {
    Json,
    Yaml,
}

impl ModelFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(CliError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub fn load_model(path: &Path) -> Result<SchemaDefinition> {
    let format = ModelFormat::from_path(path)?;
    let reader = BufReader::new(std::fs::File::open(path)?);
    let schema = match format {
        ModelFormat::Json => serde_json::from_reader(reader)?,
        ModelFormat::Yaml => serde_yaml::from_reader(reader)?,
    };
    Ok(schema)
}

pub fn save_model(path: &Path, schema: &SchemaDefinition) -> Result<()> {
    let format = ModelFormat::from_path(path)?;
    let mut writer = BufWriter::new(std::fs::File::create(path)?);
    write_model(&mut writer, schema, format)?;
    writer.flush()?;
    Ok(())
}

pub fn write_model(
    writer: impl Write,
    schema: &SchemaDefinition,
    format: ModelFormat,
) -> Result<()> {
    match format {
        ModelFormat::Json => serde_json::to_writer_pretty(writer, schema)?,
        ModelFormat::Yaml => serde_yaml::to_writer(writer, schema)?,
    }
    Ok(())
}

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    /// Alpha is dropped.
    Jpeg,
}

impl OutputFormat {
    pub fn from_extension(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Ok(Self::Png),
            Some("jpg" | "jpeg") => Ok(Self::Jpeg),
            _ => bail!(
                "unsupported format for {}, expected .png, .jpg or .jpeg",
                path.display()
            ),
        }
    }
}

/// Where the diff image is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// PNG bytes on stdout.
    Stdout,
    File { path: PathBuf, format: OutputFormat },
}

impl Destination {
    /// `-` selects stdout; anything else is a file typed by its extension.
    pub fn from_path(path: PathBuf) -> Result<Self> {
        if path.as_os_str() == "-" {
            return Ok(Self::Stdout);
        }
        let format = OutputFormat::from_extension(&path)?;
        Ok(Self::File { path, format })
    }

    pub fn write(&self, image: &RgbaImage) -> Result<()> {
        match self {
            Self::Stdout => {
                let bytes = encode(image, OutputFormat::Png)?;
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(&bytes)
                    .and_then(|()| stdout.flush())
                    .context("Failed to write diff image to stdout")?;
                debug!(bytes = bytes.len(), "wrote diff image to stdout");
            }
            Self::File { path, format } => {
                let bytes = encode(image, *format)?;
                ensure_parent(path)?;
                std::fs::write(path, &bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                debug!(path = %path.display(), bytes = bytes.len(), "wrote diff image");
            }
        }
        Ok(())
    }
}

pub fn encode(image: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut cursor = Cursor::new(&mut bytes);
    let encoded = match format {
        OutputFormat::Png => image.write_to(&mut cursor, ImageFormat::Png),
        OutputFormat::Jpeg => DynamicImage::ImageRgba8(image.clone())
            .into_rgb8()
            .write_to(&mut cursor, ImageFormat::Jpeg),
    };
    encoded.context("Failed to encode diff image")?;
    Ok(bytes)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

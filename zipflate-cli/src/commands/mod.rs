//! Command implementations for the zipflate CLI.

pub mod compress;
pub mod crc;
pub mod pdf;
pub mod zip;

pub use compress::{cmd_compress, cmd_decompress};
pub use crc::cmd_crc32;
pub use pdf::cmd_pdf_stream;
pub use zip::cmd_zip;

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use zipflate_deflate::DeflateConfig;

/// Result of a command.
pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Match search effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CompressionLevel {
    /// Fewer candidates per position
    Fast,
    /// Default search limits
    #[default]
    Normal,
}

impl CompressionLevel {
    /// Encoder settings for this level.
    pub fn config(self) -> DeflateConfig {
        match self {
            Self::Fast => DeflateConfig::FAST,
            Self::Normal => DeflateConfig::DEFAULT,
        }
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read a whole input file, or stdin for `-`.
pub(crate) fn read_input(path: &Path) -> io::Result<Vec<u8>> {
    if is_stdio(path) {
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data)?;
        Ok(data)
    } else {
        fs::read(path)
    }
}

/// Write output to `path`, or stdout when it is absent or `-`.
pub(crate) fn write_output(path: Option<&Path>, data: &[u8]) -> io::Result<()> {
    match path {
        Some(path) if !is_stdio(path) => fs::write(path, data),
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()
        }
    }
}

/// Create a progress bar with standard styling.
pub(crate) fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("█▓▒░ "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len).with_style(style)
}

/// Percentage saved by compression, 0 for empty input.
pub(crate) fn savings(size: u64, compressed: u64) -> f64 {
    if size == 0 {
        0.0
    } else {
        (1.0 - compressed as f64 / size as f64) * 100.0
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::path::PathBuf;

    /// A scratch directory removed on drop.
    pub struct ScratchDir(pub PathBuf);

    impl ScratchDir {
        pub fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("zipflate-cli-{}-{}", std::process::id(), name));
            let _ = std::fs::remove_dir_all(&dir);
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        pub fn path(&self, file: &str) -> PathBuf {
            self.0.join(file)
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }
}

//! Output writing

use crate::error::{FlowError, Result};
use mixsyn_net::{write_blif, write_verilog, Network, WriteOptions};
use std::path::Path;

/// Accepted netlist formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Structural Verilog (`.v`)
    Verilog,
    /// BLIF (`.blif`)
    Blif,
}

impl OutputFormat {
    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("v") => Ok(OutputFormat::Verilog),
            Some("blif") => Ok(OutputFormat::Blif),
            _ => Err(FlowError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Write a network in the format implied by `path`.
///
/// The extension is checked before anything touches the filesystem.
pub fn write_output(network: &Network, path: &Path, options: &WriteOptions) -> Result<OutputFormat> {
    let format = OutputFormat::from_path(path)?;
    match format {
        OutputFormat::Verilog => write_verilog(network, path, options)?,
        OutputFormat::Blif => write_blif(network, path, options)?,
    }
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixsyn_net::Signal;

    fn small() -> Network {
        let mut ntk = Network::new("small");
        let a = Signal::new(ntk.add_input("a"));
        let b = Signal::new(ntk.add_input("b"));
        let y = ntk.add_and(a, b);
        ntk.add_output("y", y);
        ntk
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out.v")).unwrap(), OutputFormat::Verilog);
        assert_eq!(OutputFormat::from_path(Path::new("a/b.blif")).unwrap(), OutputFormat::Blif);
        assert!(OutputFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_unsupported_extension_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.txt");

        let err = write_output(&small(), &path, &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, FlowError::UnsupportedFormat(_)));
        assert!(err.to_string().ends_with("result.txt is not an accepted output file {.v, .blif}"));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let v = dir.path().join("out.v");
        let b = dir.path().join("out.blif");

        assert_eq!(write_output(&small(), &v, &WriteOptions::default()).unwrap(), OutputFormat::Verilog);
        assert_eq!(write_output(&small(), &b, &WriteOptions::default()).unwrap(), OutputFormat::Blif);
        assert!(std::fs::read_to_string(v).unwrap().starts_with("module small"));
        assert!(std::fs::read_to_string(b).unwrap().starts_with(".model small"));
    }
}

//! Log export renderers.
//!
//! Each renderer turns a contest run into a complete output document as
//! a `String`; [`write_atomic`] puts one on disk without ever leaving a
//! half-written file behind.

/// ADIF 3.x renderer.
pub mod adif;
/// Cabrillo 3.0 renderer.
pub mod cabrillo;
/// EDI (REG1TEST) renderer for VHF contests.
pub mod edi;

use std::fs;
use std::io::Write;
use std::path::Path;

/// Export failures.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Filesystem failure while writing the output.
    #[error("export io error: {0}")]
    Io(#[from] std::io::Error),
    /// The contest cannot produce this format.
    #[error("contest does not support {0} export")]
    Unsupported(&'static str),
}

/// Writes `content` to `path` via a temporary sibling file and rename,
/// so a crash mid-write never corrupts an existing export.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), ExportError> {
    let tmp = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

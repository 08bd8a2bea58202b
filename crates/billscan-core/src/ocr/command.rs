//! Helpers for running external OCR and rendering programs.

use std::io;
use std::process::Output;

use crate::error::OcrError;

/// Map a finished command to its stdout, or to an `OcrError`.
///
/// `install_hint` is shown when the program is not on the PATH.
pub(crate) fn command_stdout(result: io::Result<Output>, program: &str, install_hint: &str) -> Result<String, OcrError> {
    match result {
        Ok(output) if output.status.success() => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
        Ok(output) => Err(OcrError::Recognition(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(OcrError::BackendNotAvailable(format!(
            "{} not found ({})",
            program, install_hint
        ))),
        Err(e) => Err(OcrError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let result = std::process::Command::new("billscan-no-such-program-7f3a").output();
        let err = command_stdout(result, "billscan-no-such-program-7f3a", "install it").unwrap_err();
        assert!(matches!(err, OcrError::BackendNotAvailable(ref m) if m.contains("install it")));
    }
}

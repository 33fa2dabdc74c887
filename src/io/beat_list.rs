//! Beat-list text files
//!
//! Plain decimal text, one time per line, no header. Values are written in
//! shortest round-trip form with a trailing `.0` on whole numbers, switching to
//! exponent notation below `1e-4` and from `1e16` on (`5e-05`, `1e+16`).
//! Files written here read back to the exact same values.
//!
//! # Example
//!
//! ```
//! use stratum_eval::io::beat_list::{format_beat_list, parse_beat_list};
//!
//! let text = format_beat_list(&[5.0, 5.52, 6.04]);
//! assert_eq!(text, "5.0\n5.52\n6.04\n");
//! assert_eq!(parse_beat_list(&text)?, vec![5.0, 5.52, 6.04]);
//! # Ok::<(), stratum_eval::EvaluationError>(())
//! ```

use crate::error::EvaluationError;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory beat lists are written to when the caller has no preference
pub const DEFAULT_OUTPUT_DIR: &str = "beats_out/";

/// Parse beat times from beat-list text
///
/// Blank lines are skipped; surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns `EvaluationError::ParseError` naming the 1-based line of the first
/// value that is not a number.
pub fn parse_beat_list(text: &str) -> Result<Vec<f64>, EvaluationError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let value = line.trim();
            value.parse::<f64>().map_err(|_| {
                EvaluationError::ParseError(format!(
                    "line {}: '{}' is not a beat time",
                    i + 1,
                    value
                ))
            })
        })
        .collect()
}

/// Read a beat-list file
///
/// # Errors
///
/// Returns `EvaluationError::IoError` if the file cannot be read and
/// `EvaluationError::ParseError` if a line is not a number.
pub fn read_beat_list<P: AsRef<Path>>(path: P) -> Result<Vec<f64>, EvaluationError> {
    let path = path.as_ref();
    log::debug!("Reading beat list: {}", path.display());
    let text = fs::read_to_string(path)
        .map_err(|e| EvaluationError::IoError(format!("{}: {}", path.display(), e)))?;
    let beats = parse_beat_list(&text).map_err(|e| match e {
        EvaluationError::ParseError(msg) => {
            EvaluationError::ParseError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })?;
    log::debug!("Read {} beat times from {}", beats.len(), path.display());
    Ok(beats)
}

/// Render beat times as beat-list text, one value per line
pub fn format_beat_list(beats: &[f64]) -> String {
    let mut text = String::with_capacity(beats.len() * 8);
    for &beat in beats {
        text.push_str(&format_beat_time(beat));
        text.push('\n');
    }
    text
}

/// Write `beats` to `directory/filename`, creating the directory if needed
///
/// With no directory the file goes under [`DEFAULT_OUTPUT_DIR`], relative to
/// the working directory. Returns the path written to.
///
/// # Errors
///
/// Returns `EvaluationError::IoError` if the directory cannot be created or
/// the file cannot be written.
pub fn write_beat_list(
    beats: &[f64],
    filename: &str,
    directory: Option<&Path>,
) -> Result<PathBuf, EvaluationError> {
    let directory = directory.unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR));
    fs::create_dir_all(directory)?;
    let path = directory.join(filename);
    fs::write(&path, format_beat_list(beats))
        .map_err(|e| EvaluationError::IoError(format!("{}: {}", path.display(), e)))?;
    log::debug!("Wrote {} beat times to {}", beats.len(), path.display());
    Ok(path)
}

/// Format one value in shortest round-trip form
///
/// Exponents are signed and at least two digits wide.
pub fn format_beat_time(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

//! `version = ...` write-back into Java-style properties files.

use std::path::{Path, PathBuf};

use crate::error::{Result, StagerError};
use crate::types::Version;

/// Default properties file holding the project version.
pub const DEFAULT_PROPERTIES_FILE: &str = "gradle.properties";

const VERSION_KEY: &str = "version";

/// Value of the first `version` line, if any. Missing file reads as `None`.
pub fn read_version(path: &Path) -> Result<Option<String>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StagerError::io(path, err)),
    };
    Ok(text
        .lines()
        .find_map(version_value)
        .map(|value| value.to_string()))
}

/// Set `version = <version>` in the properties file at `path`.
///
/// Every matching line is replaced and all other lines are kept in order.
/// The previous content is copied to `<file>.bak` first. A missing line is
/// appended; a missing file is created.
pub fn write_version(path: &Path, version: &Version) -> Result<()> {
    let original = match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => return Err(StagerError::io(path, err)),
    };

    let updated = match &original {
        Some(text) => {
            let bak = backup_path(path);
            std::fs::write(&bak, text).map_err(|err| StagerError::io(&bak, err))?;
            replace_version_line(text, version)
        }
        None => format!("{VERSION_KEY} = {version}\n"),
    };

    tracing::debug!(path = %path.display(), %version, "writing project version");
    std::fs::write(path, updated).map_err(|err| StagerError::io(path, err))
}

/// Rewrite `text` with every `version` line set to `version`.
///
/// The line ending of the first line (`\r\n` or `\n`) is used throughout.
pub fn replace_version_line(text: &str, version: &Version) -> String {
    let line = format!("{VERSION_KEY} = {version}");
    let newline = match text.find('\n') {
        Some(idx) if text[..idx].ends_with('\r') => "\r\n",
        _ => "\n",
    };
    let mut found = false;
    let mut out: Vec<&str> = Vec::new();
    for current in text.lines() {
        if version_value(current).is_some() {
            found = true;
            out.push(&line);
        } else {
            out.push(current);
        }
    }
    if !found {
        out.push(&line);
    }

    let mut joined = out.join(newline);
    joined.push_str(newline);
    joined
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

fn version_value(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(VERSION_KEY)?;
    let value = rest.trim_start().strip_prefix('=')?;
    Some(value.trim())
}

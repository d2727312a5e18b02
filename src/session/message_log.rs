//! Append-only message log file
//!
//! One message per line, UTF-8, no header. Lines are written verbatim unless
//! they contain a line break; those are written as [`ESCAPED_PREFIX`] followed
//! by the message with `\\`, `\n` and `\r` escapes. Only prefixed lines are
//! unescaped on load, so plain logs (backslashes included) read back unchanged.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{MeshUiError, Result, ResultExt};

/// Default log file name, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "messages.log";

/// Marks a line holding an escaped message
pub const ESCAPED_PREFIX: &str = "\\~";

/// Append-only text log of sent and received messages
#[derive(Debug, Clone)]
pub struct MessageLog {
    /// Location of the log file
    path: PathBuf,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILE)
    }
}

impl MessageLog {
    /// Create a log backed by the given file (not created until first append)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry
    pub fn append(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut encoded = escape_line(line);
        encoded.push('\n');
        file.write_all(encoded.as_bytes())
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;

        tracing::trace!("Appended {} bytes to {:?}", encoded.len(), self.path);
        Ok(())
    }

    /// Read every entry in file order
    ///
    /// Returns an `Io` error of kind `NotFound` when the file does not exist.
    pub fn load(&self) -> Result<Vec<String>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            entries.push(unescape_line(line.trim()));
        }

        tracing::debug!("Loaded {} entries from {:?}", entries.len(), self.path);
        Ok(entries)
    }
}

/// Check whether an error means the log file is missing
pub fn is_not_found(err: &MeshUiError) -> bool {
    match err {
        MeshUiError::Io(e) => e.kind() == ErrorKind::NotFound,
        MeshUiError::WithContext { source, .. } => is_not_found(source),
        _ => false,
    }
}

/// Encode a message so it occupies exactly one line
///
/// Lines that already look escaped are escaped again so they survive a reload.
pub fn escape_line(line: &str) -> String {
    let needs_escape =
        line.contains(['\n', '\r']) || line.trim_start().starts_with(ESCAPED_PREFIX);
    if !needs_escape {
        return line.to_string();
    }

    let mut out = String::with_capacity(ESCAPED_PREFIX.len() + line.len() + 8);
    out.push_str(ESCAPED_PREFIX);
    for c in line.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_line`]; lines without the prefix are returned as written
pub fn unescape_line(line: &str) -> String {
    let Some(body) = line.strip_prefix(ESCAPED_PREFIX) else {
        return line.to_string();
    };

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_load() {
        let dir = TempDir::new().unwrap();
        let log = MessageLog::new(dir.path().join("messages.log"));
        assert!(!log.path().exists());

        log.append("Message from !00000001: hi").unwrap();
        log.append("Message from !00000002: hello").unwrap();

        assert_eq!(
            log.load().unwrap(),
            vec![
                "Message from !00000001: hi".to_string(),
                "Message from !00000002: hello".to_string(),
            ]
        );

        let raw = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw, "Message from !00000001: hi\nMessage from !00000002: hello\n");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let log = MessageLog::new(dir.path().join("absent.log"));
        let err = log.load().unwrap_err();
        assert!(is_not_found(&err));
    }

    #[test]
    fn test_multiline_message_stays_one_entry() {
        let dir = TempDir::new().unwrap();
        let log = MessageLog::new(dir.path().join("messages.log"));
        log.append("line one\nline two").unwrap();
        log.append("after").unwrap();

        let entries = log.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], "line one\nline two");
    }

    #[test]
    fn test_plain_lines_written_verbatim() {
        assert_eq!(escape_line("C:/path ok"), "C:/path ok");
        assert_eq!(escape_line("saved to C:\\new\\readme.txt"), "saved to C:\\new\\readme.txt");
        assert_eq!(escape_line("a\nb"), "\\~a\\nb");
        assert_eq!(unescape_line("odd \\t escape"), "odd \\t escape");
    }

    #[test]
    fn test_hand_written_log_with_backslashes_loads_unchanged() {
        let dir = TempDir::new().unwrap();
        let log = MessageLog::new(dir.path().join("messages.log"));
        let lines = [
            "Message from 1: saved to C:\\new\\readme.txt",
            "Message from 2: share is \\\\server\\radio",
            "Message from 3: ends with a backslash \\",
        ];
        std::fs::write(log.path(), lines.join("\n") + "\n").unwrap();

        assert_eq!(log.load().unwrap(), lines.map(str::to_string).to_vec());
    }

    #[test]
    fn test_prefixed_message_survives_reload() {
        let dir = TempDir::new().unwrap();
        let log = MessageLog::new(dir.path().join("messages.log"));
        let text = format!("{}not really escaped", ESCAPED_PREFIX);
        log.append(&text).unwrap();
        assert_eq!(log.load().unwrap(), vec![text]);
    }

    proptest! {
        #[test]
        fn escaped_lines_never_contain_newlines(s in any::<String>()) {
            let escaped = escape_line(&s);
            prop_assert!(!escaped.contains('\n'));
            prop_assert_eq!(unescape_line(&escaped), s);
        }
    }
}

//! Access log parsing.
//!
//! An access log is line-oriented text, optionally zstd-compressed:
//!
//! ```text
//! # comment
//! begin <label> <addr> [owner]
//! access <label> <addr>
//! finish <label>
//! ```
//!
//! Addresses are hex with a `0x` prefix or decimal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Leading bytes of a zstd frame.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

static DIRECTIVE_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Access log errors.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: variable `{label}` is not being tracked")]
    UnknownVariable { line: usize, label: String },
}

/// One parsed access log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Start tracking `label` at `address`.
    Begin {
        label: String,
        address: u64,
        owner: Option<String>,
    },
    /// One access to `label` at `address`.
    Access { label: String, address: u64 },
    /// Finalize `label`.
    Finish { label: String },
}

impl Directive {
    /// Parse a single line.
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments.
    ///
    /// # Errors
    ///
    /// Returns a message describing why the line is malformed.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let pattern = DIRECTIVE_PATTERN.get_or_init(|| {
            Regex::new(r"^(\w+)\s+(\S+)(?:\s+(\S+))?(?:\s+(\S+))?$")
                .expect("directive pattern is valid")
        });
        let caps = pattern
            .captures(line)
            .ok_or_else(|| format!("malformed directive `{line}`"))?;

        let keyword = &caps[1];
        let label = caps[2].to_string();
        let arg = caps.get(3).map(|m| m.as_str());
        let extra = caps.get(4).map(|m| m.as_str());

        let directive = match (keyword, arg, extra) {
            ("begin", Some(addr), owner) => Self::Begin {
                label,
                address: parse_address(addr)?,
                owner: owner.map(str::to_string),
            },
            ("access", Some(addr), None) => Self::Access {
                label,
                address: parse_address(addr)?,
            },
            ("finish", None, None) => Self::Finish { label },
            ("begin" | "access", None, _) => {
                return Err(format!("`{keyword}` requires an address"));
            }
            ("access" | "finish", _, _) => {
                return Err(format!("too many arguments for `{keyword}`"));
            }
            _ => return Err(format!("unknown directive `{keyword}`")),
        };
        Ok(Some(directive))
    }
}

/// Parse a `0x`-prefixed hex or decimal address.
///
/// Only digits are accepted after the optional prefix, so signs are rejected.
///
/// # Errors
///
/// Returns a message if the text is not a valid 64-bit address.
pub fn parse_address(text: &str) -> Result<u64, String> {
    let (digits, radix) = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };
    let is_digit = |b: &u8| {
        if radix == 16 {
            b.is_ascii_hexdigit()
        } else {
            b.is_ascii_digit()
        }
    };
    if !digits.as_bytes().first().is_some_and(is_digit) {
        return Err(format!("invalid address `{text}`: expected digits"));
    }
    u64::from_str_radix(digits, radix).map_err(|e| format!("invalid address `{text}`: {e}"))
}

/// Open an access log, transparently decompressing zstd input.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or the zstd stream cannot
/// be initialized.
pub fn open_log(path: &Path) -> Result<Box<dyn BufRead + Send>, TraceError> {
    let mut reader = BufReader::new(File::open(path)?);
    let compressed = reader.fill_buf()?.starts_with(&ZSTD_MAGIC)
        || path.extension().is_some_and(|ext| ext == "zst");

    if compressed {
        let decoder = zstd::stream::read::Decoder::with_buffer(reader)?;
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Lazily parse directives from a reader, tagging each with its 1-based line.
///
/// Lines are read one at a time, so arbitrarily long logs are never held in
/// memory. Blank lines and comments are skipped.
pub fn parse_directives<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<(usize, Directive), TraceError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line_no = idx + 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(TraceError::Io(e))),
            };
            match Directive::parse(&line) {
                Ok(Some(directive)) => Some(Ok((line_no, directive))),
                Ok(None) => None,
                Err(message) => Some(Err(TraceError::Parse {
                    line: line_no,
                    message,
                })),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_begin() {
        assert_eq!(
            Directive::parse("begin matrix 0x1000 gemm").unwrap(),
            Some(Directive::Begin {
                label: "matrix".to_string(),
                address: 0x1000,
                owner: Some("gemm".to_string()),
            })
        );
        assert_eq!(
            Directive::parse("  begin v 4096  ").unwrap(),
            Some(Directive::Begin {
                label: "v".to_string(),
                address: 4096,
                owner: None,
            })
        );
    }

    #[test]
    fn test_parse_access_and_finish() {
        assert_eq!(
            Directive::parse("access v 0xFF").unwrap(),
            Some(Directive::Access {
                label: "v".to_string(),
                address: 0xff,
            })
        );
        assert_eq!(
            Directive::parse("finish v").unwrap(),
            Some(Directive::Finish {
                label: "v".to_string()
            })
        );
    }

    #[test]
    fn test_skip_blank_and_comments() {
        assert_eq!(Directive::parse("").unwrap(), None);
        assert_eq!(Directive::parse("   ").unwrap(), None);
        assert_eq!(Directive::parse("# begin v 0").unwrap(), None);
    }

    #[test]
    fn test_reject_malformed() {
        assert!(Directive::parse("access v").is_err());
        assert!(Directive::parse("access v 0x10 extra").is_err());
        assert!(Directive::parse("finish v 0x10").is_err());
        assert!(Directive::parse("jump v 0x10").is_err());
        assert!(Directive::parse("access v 0xzz").is_err());
        assert!(Directive::parse("begin").is_err());
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x10"), Ok(16));
        assert_eq!(parse_address("0X10"), Ok(16));
        assert_eq!(parse_address("10"), Ok(10));
        assert!(parse_address("-4").is_err());
        assert!(parse_address("+5").is_err());
        assert!(parse_address("0x+ff").is_err());
        assert!(parse_address("0x").is_err());
        assert!(Directive::parse("access v +16").is_err());
    }

    #[test]
    fn test_parse_directives_reports_line() {
        let log = "begin v 0\n\n# note\naccess v 4\naccess v\n";
        let parsed: Vec<_> = parse_directives(Cursor::new(log)).collect();
        assert_eq!(parsed.len(), 3);
        assert!(matches!(parsed[1], Ok((4, Directive::Access { address: 4, .. }))));
        assert!(matches!(parsed[2], Err(TraceError::Parse { line: 5, .. })));
    }

    #[test]
    fn test_parse_directives_is_lazy() {
        // Only the first line is well formed; taking one item must not touch the rest.
        let log = "begin v 0
not a directive at all
";
        let first = parse_directives(Cursor::new(log)).next().unwrap().unwrap();
        assert_eq!(first.0, 1);
    }
}

//! Line-oriented rule source parser
//!
//! Format:
//! - `reload <duration>` sets the reload period (`30s`, `1h30m`, `-1s`)
//! - `reverse <bool>` inverts the verdict
//! - any other line is one bypass pattern
//! - `#` starts a comment; blank lines are ignored
//!
//! Only the first token of a pattern line is used. Lines are read as raw
//! bytes: comments may hold any encoding, and invalid UTF-8 elsewhere is
//! replaced with U+FFFD.

use std::borrow::Cow;
use std::io::BufRead;
use std::time::Duration;
use tracing::warn;

use crate::error::{Error, Result};
use crate::matcher::Matcher;
use crate::rules::RuleSet;

/// How malformed directive values are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Malformed values fall back to zero period / not reversed
    #[default]
    Lenient,
    /// Malformed values fail with [`Error::InvalidDirective`]
    Strict,
}

impl ParseMode {
    fn reject(self, line: usize, directive: &'static str, value: &str) -> Result<()> {
        match self {
            Self::Strict => Err(Error::invalid_directive(line, directive, value)),
            Self::Lenient => {
                warn!(line, directive, value, "Ignoring malformed directive value");
                Ok(())
            }
        }
    }
}

/// Parse a complete rule source.
///
/// Read errors and glob compilation errors abort parsing.
pub fn parse_rules<R: BufRead>(mut reader: R, mode: ParseMode) -> Result<RuleSet> {
    let mut rules = RuleSet::default();
    let mut buf = Vec::new();

    for idx in 0.. {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = decode_line(&buf);
        let tokens = split_line(&line);
        let Some((&first, rest)) = tokens.split_first() else {
            continue;
        };

        match first {
            "reload" => {
                if let Some(&value) = rest.first() {
                    let period = match parse_duration(value) {
                        Some(period) => period,
                        None => {
                            mode.reject(idx + 1, "reload", value)?;
                            Some(Duration::ZERO)
                        }
                    };
                    rules.set_period(period);
                }
            }
            "reverse" => {
                if let Some(&value) = rest.first() {
                    let reversed = match parse_bool(value) {
                        Some(reversed) => reversed,
                        None => {
                            mode.reject(idx + 1, "reverse", value)?;
                            false
                        }
                    };
                    rules.set_reversed(reversed);
                }
            }
            pattern => {
                if let Some(m) = Matcher::new(pattern)? {
                    rules.push(m);
                }
            }
        }
    }

    Ok(rules)
}

/// Decode one raw line, dropping the comment before any UTF-8 check.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let end = raw
        .iter()
        .position(|&b| b == b'#' || b == b'\n')
        .unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end])
}

/// Split a config line into tokens.
///
/// Drops a trailing `#` comment, treats tabs as spaces and discards empty
/// tokens.
pub fn split_line(line: &str) -> Vec<&str> {
    let line = line.find('#').map_or(line, |n| &line[..n]);
    line.split([' ', '\t'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a signed duration such as `300ms`, `1.5h` or `2h45m`.
///
/// Returns `None` if malformed, `Some(None)` for a negative duration
/// (reloading disabled).
pub fn parse_duration(s: &str) -> Option<Option<Duration>> {
    const MAX_NANOS: u128 = i64::MAX as u128;

    let (negative, mut rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if rest == "0" {
        return Some(Some(Duration::ZERO));
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, mut tail) = rest.split_at(int_len);

        let mut frac_digits = "";
        if let Some(after_dot) = tail.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            (frac_digits, tail) = after_dot.split_at(frac_len);
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return None;
        }

        let unit_len = tail
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);
        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "\u{b5}s" | "\u{3bc}s" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            _ => return None,
        };

        if !int_digits.is_empty() {
            let int: u128 = int_digits.parse().ok()?;
            total = total.checked_add(int.checked_mul(unit_nanos)?)?;
        }
        if !frac_digits.is_empty() {
            // Digits past nanosecond precision of an hour cannot change the result.
            let digits = &frac_digits[..frac_digits.len().min(18)];
            let frac: u128 = digits.parse().ok()?;
            let scale = 10u128.pow(digits.len() as u32);
            total = total.checked_add(frac * unit_nanos / scale)?;
        }
        if total > MAX_NANOS {
            return None;
        }
        rest = next;
    }

    if negative && total > 0 {
        return Some(None);
    }
    Some(Some(Duration::from_nanos(total as u64)))
}

/// Parse a boolean the way config values are usually spelled.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<RuleSet> {
        parse_rules(source.as_bytes(), ParseMode::Lenient)
    }

    // =========== Tokenizer Tests ===========

    #[test]
    fn test_split_line() {
        assert!(split_line("").is_empty());
        assert!(split_line("   \t  ").is_empty());
        assert!(split_line("# just a comment").is_empty());
        assert_eq!(split_line("example.com"), vec!["example.com"]);
        assert_eq!(split_line("  reload\t\t30s  # every half minute"), vec!["reload", "30s"]);
        assert_eq!(split_line("a  b\tc"), vec!["a", "b", "c"]);
        assert_eq!(split_line("example.com#comment"), vec!["example.com"]);
    }

    // =========== Duration Tests ===========

    #[test]
    fn test_parse_duration_valid() {
        let secs = |s| Some(Some(Duration::from_secs(s)));
        assert_eq!(parse_duration("0"), Some(Some(Duration::ZERO)));
        assert_eq!(parse_duration("30s"), secs(30));
        assert_eq!(parse_duration("+30s"), secs(30));
        assert_eq!(parse_duration("5m"), secs(300));
        assert_eq!(parse_duration("1h30m"), secs(5400));
        assert_eq!(parse_duration("1.5h"), secs(5400));
        assert_eq!(parse_duration("300ms"), Some(Some(Duration::from_millis(300))));
        assert_eq!(parse_duration("10us"), Some(Some(Duration::from_micros(10))));
        assert_eq!(parse_duration("10\u{b5}s"), Some(Some(Duration::from_micros(10))));
        assert_eq!(parse_duration("7ns"), Some(Some(Duration::from_nanos(7))));
        assert_eq!(parse_duration(".5s"), Some(Some(Duration::from_millis(500))));
        assert_eq!(parse_duration("1.s"), secs(1));
        assert_eq!(parse_duration("-0s"), Some(Some(Duration::ZERO)));
    }

    #[test]
    fn test_parse_duration_negative() {
        assert_eq!(parse_duration("-1s"), Some(None));
        assert_eq!(parse_duration("-1h30m"), Some(None));
    }

    #[test]
    fn test_parse_duration_malformed() {
        for s in ["", "-", "30", "s", "1x", "1.5", ".s", "1h-30m", "thirty", "9999999999999999h"] {
            assert_eq!(parse_duration(s), None, "input {s:?}");
        }
    }

    // =========== Boolean Tests ===========

    #[test]
    fn test_parse_bool() {
        for s in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(s), Some(true));
        }
        for s in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(s), Some(false));
        }
        for s in ["yes", "on", "tRUE", ""] {
            assert_eq!(parse_bool(s), None);
        }
    }

    // =========== Rule Parsing Tests ===========

    #[test]
    fn test_parse_rules() {
        let rules = parse(
            "# bypass list\n\
             reload 10s\n\
             reverse true\n\
             \n\
             example.com\n\
             10.0.0.0/8   # private\n\
             \t192.168.1.1\n",
        )
        .unwrap();

        assert_eq!(rules.period(), Some(Duration::from_secs(10)));
        assert!(rules.is_reversed());
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.matchers()[1].kind(), "cidr");
    }

    #[test]
    fn test_parse_rules_crlf() {
        let rules = parse("reverse true\r\nexample.com\r\n").unwrap();
        assert!(rules.is_reversed());
        assert!(rules.evaluate("other.com"));
        assert!(!rules.evaluate("example.com"));
    }

    #[test]
    fn test_only_first_token_is_a_pattern() {
        let rules = parse("example.com other.com\n").unwrap();
        assert_eq!(rules.len(), 1);
        assert!(!rules.evaluate("other.com"));
    }

    #[test]
    fn test_directive_without_value() {
        let rules = parse("reload 10s\nreload\nreverse true\nreverse\n").unwrap();
        assert_eq!(rules.period(), Some(Duration::from_secs(10)));
        assert!(rules.is_reversed());
        assert!(rules.is_empty());
    }

    #[test]
    fn test_lenient_defaults() {
        let rules = parse("reload soon\nreverse maybe\nexample.com\n").unwrap();
        assert_eq!(rules.period(), Some(Duration::ZERO));
        assert!(!rules.is_reversed());
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_later_directive_wins() {
        let rules = parse("reverse true\nreload 5s\nreverse false\nreload 1m\n").unwrap();
        assert!(!rules.is_reversed());
        assert_eq!(rules.period(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_strict_mode_rejects() {
        let err = parse_rules("example.com\nreverse maybe\n".as_bytes(), ParseMode::Strict).unwrap_err();
        match err {
            Error::InvalidDirective { line, directive, value } => {
                assert_eq!(line, 2);
                assert_eq!(directive, "reverse");
                assert_eq!(value, "maybe");
            }
            other => panic!("Wrong error type: {other}"),
        }

        let err = parse_rules("reload 5 minutes\n".as_bytes(), ParseMode::Strict).unwrap_err();
        assert!(matches!(err, Error::InvalidDirective { line: 1, directive: "reload", .. }));
    }

    #[test]
    fn test_strict_mode_accepts_valid() {
        let rules = parse_rules("reload -1s\nreverse 1\n*.example.com\n".as_bytes(), ParseMode::Strict).unwrap();
        assert_eq!(rules.period(), None);
        assert!(rules.is_reversed());
    }

    #[test]
    fn test_bad_glob_aborts() {
        assert!(matches!(parse("example.com\n[oops\n"), Err(Error::Glob { .. })));
    }

    #[test]
    fn test_latin1_comment_is_ignored() {
        let rules = parse_rules(&b"# caf\xe9\nnew.com # na\xefve\n"[..], ParseMode::Strict).unwrap();
        assert_eq!(rules.len(), 1);
        assert!(rules.evaluate("new.com"));
    }

    #[test]
    fn test_invalid_utf8_pattern_is_replaced() {
        let rules = parse_rules(&b"bad\xffhost.com\nexample.com\n"[..], ParseMode::Lenient).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules.evaluate("bad\u{FFFD}host.com"));
        assert!(rules.evaluate("example.com"));
    }

    #[test]
    fn test_last_line_without_newline() {
        let rules = parse("reverse true\nexample.com").unwrap();
        assert_eq!(rules.len(), 1);
        assert!(rules.is_reversed());
    }
}

//! Parser for the `.properties` text format.
//!
//! Follows the usual conventions:
//! - `#` and `!` start comment lines
//! - keys end at the first unescaped `=`, `:` or whitespace
//! - a trailing odd run of backslashes continues the entry on the next line
//! - `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes; any other escaped
//!   character stands for itself

use crate::core::PropertySnapshot;

/// A malformed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesError {
    /// 1-based line where the entry starts.
    pub line: usize,
    /// What was wrong with it.
    pub reason: String,
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0C')
}

/// Parse `text` into a snapshot.
///
/// Duplicate keys keep their first position and take the last value.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::sources::properties;
///
/// let props = properties::parse("# credentials\npg.user = admin\npg.password:quest\n").unwrap();
/// assert_eq!(props.get("pg.user"), Some("admin"));
/// assert_eq!(props.get("pg.password"), Some("quest"));
/// ```
pub fn parse(text: &str) -> Result<PropertySnapshot, PropertiesError> {
    let normalized = text.replace("\r\n", "\n");
    let mut lines = normalized.split(['\n', '\r']).enumerate();
    let mut snapshot = PropertySnapshot::new();

    while let Some((idx, line)) = lines.next() {
        let trimmed = line.trim_start_matches(is_blank);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical).map_err(|reason| PropertiesError {
            line: idx + 1,
            reason,
        })?;
        snapshot.insert(key, value);
    }

    Ok(snapshot)
}

/// An odd number of trailing backslashes escapes the line terminator.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> Result<(String, String), String> {
    let mut key_end = line.len();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = i;
            break;
        }
    }

    let rest = line[key_end..].trim_start_matches(is_blank);
    let rest = rest
        .strip_prefix(['=', ':'])
        .unwrap_or(rest)
        .trim_start_matches(is_blank);

    Ok((unescape(&line[..key_end])?, unescape(rest)?))
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    let mut high_surrogate: Option<u16> = None;

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_surrogate(&mut high_surrogate)?;
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            break;
        };
        if escaped == 'u' {
            let hex: String = chars.by_ref().take(4).collect();
            if hex.len() != 4 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
                return Err("malformed \\uxxxx encoding".to_string());
            }
            let unit = u16::from_str_radix(&hex, 16)
                .map_err(|_| "malformed \\uxxxx encoding".to_string())?;
            match (high_surrogate.take(), unit) {
                (None, 0xD800..=0xDBFF) => high_surrogate = Some(unit),
                (Some(high), 0xDC00..=0xDFFF) => {
                    let decoded = char::decode_utf16([high, unit])
                        .next()
                        .and_then(|r| r.ok())
                        .ok_or_else(|| format!("invalid surrogate pair \\u{:04X}\\u{:04X}", high, unit))?;
                    out.push(decoded);
                }
                (Some(high), _) => return Err(format!("unpaired surrogate \\u{:04X}", high)),
                (None, _) => {
                    let decoded = char::from_u32(u32::from(unit))
                        .ok_or_else(|| format!("unpaired surrogate \\u{:04X}", unit))?;
                    out.push(decoded);
                }
            }
            continue;
        }
        flush_surrogate(&mut high_surrogate)?;
        out.push(match escaped {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0C',
            other => other,
        });
    }
    flush_surrogate(&mut high_surrogate)?;

    Ok(out)
}

fn flush_surrogate(pending: &mut Option<u16>) -> Result<(), String> {
    match pending.take() {
        Some(high) => Err(format!("unpaired surrogate \\u{:04X}", high)),
        None => Ok(()),
    }
}

//! Per-line options of an allowed-signers entry.
//!
//! ```text
//! cert-authority,namespaces="git,file",valid-after="20240101",valid-before="20250101Z"
//! ```

use crate::time::{parse_absolute_time, TimeError};
use thiserror::Error;

/// Errors raised while parsing an options clause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// Option name not recognised.
    #[error("unknown option near \"{0}\"")]
    UnknownOption(String),
    /// A quoted value was never closed.
    #[error("missing end quote in \"{0}\" value")]
    UnterminatedQuote(&'static str),
    /// A value option was not followed by `="..."`.
    #[error("option \"{0}\" requires a quoted value")]
    MissingValue(&'static str),
    /// The same value option appeared twice.
    #[error("duplicate \"{0}\" option")]
    Duplicate(&'static str),
    /// Something other than `,` followed an option.
    #[error("unexpected text after option: \"{0}\"")]
    TrailingText(String),
    /// A time value could not be parsed.
    #[error("{option}: {source}")]
    Time {
        /// Option holding the bad value.
        option: &'static str,
        /// Underlying parse failure.
        source: TimeError,
    },
    /// `valid-before` does not come after `valid-after`.
    #[error("valid-before must be later than valid-after")]
    EmptyWindow,
}

/// Options attached to an allowed-signers line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignerOptions {
    /// The key is a certificate authority, trusted for certificates it signed.
    pub cert_authority: bool,
    /// Pattern list of namespaces the key may sign for; `None` allows all.
    pub namespaces: Option<String>,
    /// Key is not valid before this time (seconds since the epoch).
    pub valid_after: Option<u64>,
    /// Key is not valid after this time (seconds since the epoch).
    pub valid_before: Option<u64>,
}

impl SignerOptions {
    /// Whether `verify_time` lies inside the configured validity window.
    pub fn is_valid_at(&self, verify_time: u64) -> bool {
        self.valid_after.map_or(true, |after| verify_time >= after)
            && self.valid_before.map_or(true, |before| verify_time <= before)
    }
}

const CERT_AUTHORITY: &str = "cert-authority";
const NAMESPACES: &str = "namespaces";
const VALID_AFTER: &str = "valid-after";
const VALID_BEFORE: &str = "valid-before";

/// Parses a comma-separated options clause. Option names are case-insensitive.
pub fn parse_options(text: &str) -> Result<SignerOptions, OptionsError> {
    let mut options = SignerOptions::default();
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(after) = strip_name(rest, CERT_AUTHORITY) {
            options.cert_authority = true;
            rest = after;
        } else if let Some(after) = strip_name(rest, NAMESPACES) {
            let (value, after) = take_value(after, NAMESPACES)?;
            if options.namespaces.replace(value).is_some() {
                return Err(OptionsError::Duplicate(NAMESPACES));
            }
            rest = after;
        } else if let Some(after) = strip_name(rest, VALID_AFTER) {
            let (value, after) = take_value(after, VALID_AFTER)?;
            let time = parse_time(&value, VALID_AFTER)?;
            if options.valid_after.replace(time).is_some() {
                return Err(OptionsError::Duplicate(VALID_AFTER));
            }
            rest = after;
        } else if let Some(after) = strip_name(rest, VALID_BEFORE) {
            let (value, after) = take_value(after, VALID_BEFORE)?;
            let time = parse_time(&value, VALID_BEFORE)?;
            if options.valid_before.replace(time).is_some() {
                return Err(OptionsError::Duplicate(VALID_BEFORE));
            }
            rest = after;
        } else {
            return Err(OptionsError::UnknownOption(rest.to_string()));
        }

        if rest.is_empty() {
            break;
        }
        match rest.strip_prefix(',') {
            Some(after) => rest = after,
            None => return Err(OptionsError::TrailingText(rest.to_string())),
        }
    }

    if let (Some(after), Some(before)) = (options.valid_after, options.valid_before) {
        if before <= after {
            return Err(OptionsError::EmptyWindow);
        }
    }
    Ok(options)
}

fn parse_time(value: &str, option: &'static str) -> Result<u64, OptionsError> {
    parse_absolute_time(value).map_err(|source| OptionsError::Time { option, source })
}

/// Strips a case-insensitive option name; the name must end at `,`, `=` or the end.
fn strip_name<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let head = text.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    let rest = &text[name.len()..];
    match rest.as_bytes().first() {
        None | Some(b',') | Some(b'=') => Some(rest),
        Some(_) => None,
    }
}

/// Reads `="value"`, unescaping `\"`. Returns the value and the text after the closing quote.
fn take_value<'a>(text: &'a str, option: &'static str) -> Result<(String, &'a str), OptionsError> {
    let body = text
        .strip_prefix("=\"")
        .ok_or(OptionsError::MissingValue(option))?;
    let mut value = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if body[i + 1..].starts_with('"') => {
                value.push('"');
                chars.next();
            }
            '"' => return Ok((value, &body[i + 1..])),
            _ => value.push(c),
        }
    }
    Err(OptionsError::UnterminatedQuote(option))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_clause_is_default() {
        assert_eq!(parse_options("").unwrap(), SignerOptions::default());
    }

    #[test]
    fn cert_authority_flag() {
        let options = parse_options("cert-authority").unwrap();
        assert!(options.cert_authority);
        assert!(options.namespaces.is_none());
    }

    #[test]
    fn namespaces_value() {
        let options = parse_options("namespaces=\"git,file\"").unwrap();
        assert_eq!(options.namespaces.as_deref(), Some("git,file"));
    }

    #[test]
    fn combined_and_case_insensitive() {
        let options =
            parse_options("CERT-AUTHORITY,Namespaces=\"file\",valid-after=\"20240101Z\"").unwrap();
        assert!(options.cert_authority);
        assert_eq!(options.namespaces.as_deref(), Some("file"));
        assert_eq!(options.valid_after, Some(1_704_067_200));
        assert_eq!(options.valid_before, None);
    }

    #[test]
    fn escaped_quote_inside_value() {
        let options = parse_options(r#"namespaces="a\"b""#).unwrap();
        assert_eq!(options.namespaces.as_deref(), Some("a\"b"));
    }

    #[test]
    fn authority_with_namespace_list() {
        let options = parse_options("cert-authority,namespaces=\"a,b\"").unwrap();
        assert_eq!(
            options,
            SignerOptions {
                cert_authority: true,
                namespaces: Some("a,b".to_string()),
                ..SignerOptions::default()
            }
        );
        assert!(parse_options("frobnicate").is_err());
    }

    #[test]
    fn unknown_option_is_an_error() {
        assert!(matches!(
            parse_options("no-touch-required"),
            Err(OptionsError::UnknownOption(_))
        ));
        assert!(matches!(
            parse_options("cert-authorityx"),
            Err(OptionsError::UnknownOption(_))
        ));
    }

    #[test]
    fn unterminated_quote_is_distinct() {
        assert_eq!(
            parse_options("namespaces=\"file"),
            Err(OptionsError::UnterminatedQuote("namespaces"))
        );
    }

    #[test]
    fn value_must_be_quoted() {
        assert_eq!(
            parse_options("namespaces=file"),
            Err(OptionsError::MissingValue("namespaces"))
        );
        assert_eq!(
            parse_options("namespaces"),
            Err(OptionsError::MissingValue("namespaces"))
        );
    }

    #[test]
    fn duplicates_are_rejected() {
        assert_eq!(
            parse_options("namespaces=\"a\",namespaces=\"b\""),
            Err(OptionsError::Duplicate("namespaces"))
        );
    }

    #[test]
    fn text_after_value_must_be_separated() {
        assert!(matches!(
            parse_options("namespaces=\"a\"cert-authority"),
            Err(OptionsError::TrailingText(_))
        ));
    }

    #[test]
    fn bad_time_names_its_option() {
        assert!(matches!(
            parse_options("valid-before=\"tomorrow\""),
            Err(OptionsError::Time { option: "valid-before", .. })
        ));
    }

    #[test]
    fn window_must_not_be_empty() {
        assert_eq!(
            parse_options("valid-after=\"20250101Z\",valid-before=\"20240101Z\""),
            Err(OptionsError::EmptyWindow)
        );
    }

    #[test]
    fn validity_window_bounds() {
        let options = SignerOptions {
            valid_after: Some(100),
            valid_before: Some(200),
            ..SignerOptions::default()
        };
        assert!(!options.is_valid_at(99));
        assert!(options.is_valid_at(100));
        assert!(options.is_valid_at(200));
        assert!(!options.is_valid_at(201));
    }
}

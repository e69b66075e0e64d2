use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Armor header literal.
pub const BEGIN_SIGNATURE: &str = "-----BEGIN SSH SIGNATURE-----";

/// Armor footer literal.
pub const END_SIGNATURE: &str = "-----END SSH SIGNATURE-----";

/// Base64 characters per armored line.
pub const LINE_WIDTH: usize = 70;

/// Errors raised when unwrapping armored text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArmorError {
    /// Text does not start with the BEGIN line.
    #[error("missing signature header")]
    MissingHeader,
    /// No END line follows the header.
    #[error("missing signature footer")]
    MissingFooter,
    /// The body between the markers is not valid base64.
    #[error("invalid base64 in signature body: {0}")]
    InvalidBase64(String),
}

/// Wraps a binary signature blob in BEGIN/END armor.
///
/// The body is standard padded base64 wrapped at [`LINE_WIDTH`] columns.
pub fn armor(blob: &[u8]) -> String {
    let encoded = STANDARD.encode(blob);
    let mut out = String::with_capacity(
        BEGIN_SIGNATURE.len() + END_SIGNATURE.len() + encoded.len() + encoded.len() / LINE_WIDTH + 4,
    );
    out.push_str(BEGIN_SIGNATURE);
    out.push('\n');
    // base64 output is ASCII, so byte chunks are valid str boundaries.
    for line in encoded.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(std::str::from_utf8(line).unwrap_or_default());
        out.push('\n');
    }
    out.push_str(END_SIGNATURE);
    out.push('\n');
    out
}

/// Extracts the binary blob from armored text.
///
/// The header line, newline included, must sit at offset 0. The footer is
/// searched for as `"\n" + END_SIGNATURE` anywhere after it; whitespace in the
/// body is ignored.
pub fn dearmor(text: &str) -> Result<Vec<u8>, ArmorError> {
    let body = text
        .strip_prefix(BEGIN_SIGNATURE)
        .and_then(|rest| rest.strip_prefix('\n'))
        .ok_or(ArmorError::MissingHeader)?;
    let footer = format!("\n{END_SIGNATURE}");
    let end = body.find(&footer).ok_or(ArmorError::MissingFooter)?;
    let compact: String = body[..end]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|e| ArmorError::InvalidBase64(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armored_text_has_header_lines_and_trailing_newline() {
        let text = armor(&[7u8; 120]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.first(), Some(&BEGIN_SIGNATURE));
        assert_eq!(lines.last(), Some(&END_SIGNATURE));
        assert!(text.ends_with("-----\n"));
        assert!(lines[1..lines.len() - 1]
            .iter()
            .all(|l| l.len() <= LINE_WIDTH));
        assert_eq!(lines[1].len(), LINE_WIDTH);
    }

    #[test]
    fn round_trip_for_assorted_lengths() {
        for len in [0usize, 1, 2, 3, 52, 53, 54, 300] {
            let blob: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
            assert_eq!(dearmor(&armor(&blob)).unwrap(), blob);
        }
    }

    #[test]
    fn missing_markers_fail_distinctly() {
        let text = armor(b"payload");
        assert_eq!(
            dearmor(&text.replace(BEGIN_SIGNATURE, "")),
            Err(ArmorError::MissingHeader)
        );
        assert_eq!(
            dearmor(&text.replace(END_SIGNATURE, "")),
            Err(ArmorError::MissingFooter)
        );
    }

    #[test]
    fn header_must_be_at_offset_zero() {
        let text = format!("\n{}", armor(b"payload"));
        assert_eq!(dearmor(&text), Err(ArmorError::MissingHeader));
    }

    #[test]
    fn corrupt_body_is_invalid_base64() {
        let text = format!("{BEGIN_SIGNATURE}\nnot*base64!\n{END_SIGNATURE}\n");
        assert!(matches!(dearmor(&text), Err(ArmorError::InvalidBase64(_))));
    }

    #[test]
    fn header_line_must_end_in_newline() {
        let armored = armor(b"payload");
        let body = &armored[BEGIN_SIGNATURE.len()..];
        assert_eq!(
            dearmor(&format!("{BEGIN_SIGNATURE}junk{body}")),
            Err(ArmorError::MissingHeader)
        );
        assert_eq!(
            dearmor(&armored.replace('\n', "\r\n")),
            Err(ArmorError::MissingHeader)
        );
    }

    #[test]
    fn crlf_body_lines_are_tolerated() {
        let armored = armor(b"windows");
        let body = &armored[BEGIN_SIGNATURE.len() + 1..];
        let text = format!("{BEGIN_SIGNATURE}\n{}", body.replace('\n', "\r\n"));
        assert_eq!(dearmor(&text).unwrap(), b"windows");
    }
}

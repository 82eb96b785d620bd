//! Type-marker extraction.
//!
//! Every APRS line has the shape `<sender>><marker>,<path...>:<payload>`,
//! e.g. `FLRDD89C9>APRS,qAS,EDER:/114500h...`. The marker (`APRS` here,
//! `OGFLR`, `OGNSDR`, ... on newer OGN servers) tells which decoder applies.

use crate::errors::MessageError;

/// Separator between the sender and the marker.
const SENDER_SEPARATOR: char = '>';

/// Separator between the marker and the rest of the path.
const PATH_SEPARATOR: char = ',';

/// Extract the type marker from a raw line.
///
/// The marker is the text strictly between the first `>` and the first `,`
/// that follows it.
///
/// # Errors
///
/// Returns [`MessageError::MalformedMessage`] if either separator is missing.
pub fn extract_message_type(line: &str) -> Result<&str, MessageError> {
    let start = line
        .find(SENDER_SEPARATOR)
        .ok_or_else(|| MessageError::MalformedMessage(line.to_string()))?;
    let rest = &line[start + SENDER_SEPARATOR.len_utf8()..];
    let end = rest
        .find(PATH_SEPARATOR)
        .ok_or_else(|| MessageError::MalformedMessage(line.to_string()))?;
    Ok(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extract_message_type() {
        assert_eq!(extract_message_type("FLRDD89C9>TYPE,qAS").unwrap(), "TYPE");
    }

    #[test]
    fn test_extract_full_beacon() {
        let line = "FLRDD89C9>APRS,qAS,EDER:/114500h4803.32N/01140.36E'342/049/A=005524";
        assert_eq!(extract_message_type(line).unwrap(), "APRS");
    }

    #[test]
    fn test_extract_missing_start() {
        let err = extract_message_type("FLRDD89C9TYPE,qAS").unwrap_err();
        assert!(matches!(err, MessageError::MalformedMessage(ref l) if l == "FLRDD89C9TYPE,qAS"));
    }

    #[test]
    fn test_extract_missing_end() {
        let err = extract_message_type("FLRDD89C9>TYPEqAS").unwrap_err();
        assert!(matches!(err, MessageError::MalformedMessage(_)));
    }

    #[test]
    fn test_comma_before_separator_is_ignored() {
        // Only a comma after the '>' terminates the marker.
        let err = extract_message_type("A,B>TYPE").unwrap_err();
        assert!(matches!(err, MessageError::MalformedMessage(_)));
        assert_eq!(extract_message_type("A,B>TYPE,x").unwrap(), "TYPE");
    }

    #[test]
    fn test_empty_marker() {
        assert_eq!(extract_message_type("SENDER>,rest").unwrap(), "");
    }

    proptest! {
        #[test]
        fn prop_extracts_marker(
            sender in "[A-Za-z0-9-]{1,12}",
            marker in "[A-Za-z0-9]{1,10}",
            rest in "[ -~]{0,60}",
        ) {
            let line = format!("{}>{},{}", sender, marker, rest);
            prop_assert_eq!(extract_message_type(&line).unwrap(), marker.as_str());
        }

        #[test]
        fn prop_rejects_lines_without_sender_separator(line in "[^>]{0,80}") {
            prop_assert!(matches!(
                extract_message_type(&line),
                Err(MessageError::MalformedMessage(_))
            ));
        }

        #[test]
        fn prop_rejects_lines_without_path_separator(
            sender in "[^>]{0,12}",
            tail in "[^,]{0,40}",
        ) {
            let line = format!("{}>{}", sender, tail);
            prop_assert!(matches!(
                extract_message_type(&line),
                Err(MessageError::MalformedMessage(_))
            ));
        }
    }
}

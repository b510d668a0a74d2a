//! User-defined-units file format (spec section 6.4).
//!
//! Ported from `units.cpp`'s `definedUnitsFromFile`: lines of
//! `"<name>" = <measurement>`, where the separator may be `=`/`==`
//! (bidirectional), `=>` (input-only, the name only parses, never
//! serializes back to it) or `<=` (output-only). `#` starts a comment;
//! malformed lines are collected into a diagnostic string rather than
//! aborting the rest of the file.

use std::fs;
use std::path::Path;

use crate::dictionary::{self, Visibility};
use crate::error::Error;
use crate::flags::MatchFlags;
use crate::measurement::measurement_from_string;

/// Parse `contents` as a user-defined-units file, registering every
/// well-formed line into the global dictionary overlay. Returns a
/// newline-joined diagnostic for each malformed or unresolvable line
/// (empty if every line was well-formed).
pub fn defined_units_from_string(contents: &str) -> String {
    let mut diagnostics = String::new();
    for line in contents.lines() {
        if let Err(message) = process_line(line) {
            diagnostics.push_str(&message);
            diagnostics.push('\n');
        }
    }
    diagnostics
}

/// Read `path` and parse it the same way as [`defined_units_from_string`].
pub fn defined_units_from_file(path: &Path) -> Result<String, Error> {
    let contents = fs::read_to_string(path)?;
    Ok(defined_units_from_string(&contents))
}

fn process_line(line: &str) -> Result<(), String> {
    let Some(comment_start) = line.find(|c: char| !c.is_whitespace()) else {
        return Ok(());
    };
    if line.as_bytes()[comment_start] == b'#' {
        return Ok(());
    }

    let bytes = line.as_bytes();
    let search_start = if bytes[comment_start] == b'"' || bytes[comment_start] == b'\'' {
        match find_unescaped(bytes, bytes[comment_start], comment_start + 1) {
            Some(end) => end + 1,
            None => comment_start + 1,
        }
    } else {
        comment_start + 1
    };

    let Some(mut sep) = bytes[search_start..]
        .iter()
        .position(|&b| b == b',' || b == b';' || b == b'=')
        .map(|p| p + search_start)
    else {
        return Err(format!("{line} is not a valid user defined unit definition"));
    };
    if sep == bytes.len() - 1 {
        return Err(format!("{line} does not have any valid definitions"));
    }

    let mut op_len = 1;
    if bytes.get(sep + 1) == Some(&b'=') || bytes.get(sep + 1) == Some(&b'>') {
        op_len = 2;
    } else if sep > 0 && bytes[sep - 1] == b'<' {
        sep -= 1;
        op_len = 2;
    }

    let visibility = if bytes[sep + op_len - 1] == b'>' {
        Visibility::InputOnly
    } else if bytes[sep] == b'<' {
        Visibility::OutputOnly
    } else {
        Visibility::Both
    };

    let mut name = unquote(line[comment_start..sep].trim_end());
    if name.is_empty() {
        return Err(format!("{line} does not specify a user string"));
    }
    name = name.trim().to_owned();

    let Some(value_start) = line[sep + op_len..].find(|c: char| !c.is_whitespace()) else {
        return Err(format!("{line} does not specify a unit definition string"));
    };
    let measurement_text = unquote(line[sep + op_len + value_start..].trim_end());
    if measurement_text.is_empty() {
        return Err(format!("{line} does not specify a unit definition string"));
    }

    let measurement = measurement_from_string(&measurement_text, MatchFlags::DEFAULT);
    if measurement.unit().is_invalid() {
        return Err(format!("{measurement_text} does not generate a valid unit"));
    }

    dictionary::global().add_user_defined_unit(&name, measurement.unit(), visibility);
    Ok(())
}

fn find_unescaped(bytes: &[u8], needle: u8, start: usize) -> Option<usize> {
    let mut i = start;
    loop {
        let rel = bytes[i..].iter().position(|&b| b == needle)?;
        let pos = i + rel;
        if pos > 0 && bytes[pos - 1] == b'\\' {
            i = pos + 1;
            continue;
        }
        return Some(pos);
    }
}

fn unquote(s: &str) -> String {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[bytes.len() - 1] == bytes[0]
    {
        s[1..s.len() - 1].to_owned()
    } else {
        s.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    #[test]
    fn bidirectional_definition_registers_both_ways() {
        registry::enable_user_defined_units();
        let diagnostics = defined_units_from_string("furlong = 201.168 m\n");
        assert_eq!(diagnostics, "");
        let unit = dictionary::global().lookup("furlong", dictionary::domain::NONE);
        assert!(unit.is_some());
        dictionary::global().remove_user_defined_unit("furlong");
    }

    #[test]
    fn input_only_operator_registers_input_only_visibility() {
        registry::enable_user_defined_units();
        defined_units_from_string("smoot => 1.7018 m\n");
        assert!(dictionary::global().lookup("smoot", dictionary::domain::NONE).is_some());
        dictionary::global().remove_user_defined_unit("smoot");
    }

    #[test]
    fn comment_and_blank_lines_are_skipped() {
        let diagnostics = defined_units_from_string("# a comment\n\n   \n");
        assert_eq!(diagnostics, "");
    }

    #[test]
    fn malformed_line_is_reported_without_aborting_the_file() {
        registry::enable_user_defined_units();
        let diagnostics =
            defined_units_from_string("not a definition line\nfortnight = 1209600 s\n");
        assert!(diagnostics.contains("not a valid user defined unit definition"));
        assert!(dictionary::global().lookup("fortnight", dictionary::domain::NONE).is_some());
        dictionary::global().remove_user_defined_unit("fortnight");
    }

    #[test]
    fn quoted_name_may_contain_a_separator_character() {
        registry::enable_user_defined_units();
        defined_units_from_string("\"odd=name\" = 1 m\n");
        assert!(dictionary::global().lookup("odd=name", dictionary::domain::NONE).is_some());
        dictionary::global().remove_user_defined_unit("odd=name");
    }
}

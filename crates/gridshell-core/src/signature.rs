//! Parsing of argument signatures published by the service.
//!
//! Signatures arrive as Python literals, for example
//! `['dir_listings', {'flags': [''], 'path': ['.']}]` or
//! `{'src': 'MUST_BE_SET_AND_NO_DEFAULT_VALUE', 'dst': ['']}`. Only the
//! `'key': value` pairs matter; anything else in the text is ignored.

use std::sync::OnceLock;

use regex::Regex;

/// Marker value for a field the caller must supply.
pub const REQUIRED_MARKER: &str = "MUST_BE_SET_AND_NO_DEFAULT_VALUE";

/// Field name that switches on single-letter flags.
pub const FLAGS_FIELD: &str = "flags";

/// Signature text of a method that takes no argument struct.
pub const NO_ARGS: &str = "none, array";

fn field_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"'(?P<name>[^']*)'\s*:\s*(?P<value>'[^']*'|\[[^\]]*\])"#).unwrap()
    })
}

fn quoted_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"'([^']*)'").unwrap())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub required: Vec<String>,
    /// Optional fields in declaration order with their first default.
    pub optional: Vec<(String, Option<String>)>,
    pub accepts_flags: bool,
    /// False when the method is called without any parameters.
    pub takes_args: bool,
}

impl Signature {
    pub fn parse(text: &str) -> Self {
        if text.trim() == NO_ARGS {
            return Self::default();
        }

        let mut sig = Signature {
            takes_args: true,
            ..Self::default()
        };
        for caps in field_regex().captures_iter(text) {
            let name = &caps["name"];
            let value = &caps["value"];
            if name == FLAGS_FIELD {
                sig.accepts_flags = true;
            } else if value.trim_matches('\'') == REQUIRED_MARKER {
                sig.required.push(name.to_string());
            } else {
                let default = quoted_regex()
                    .captures(value)
                    .map(|c| c[1].to_string());
                sig.optional.push((name.to_string(), default));
            }
        }
        sig
    }
}

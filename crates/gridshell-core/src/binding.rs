use std::collections::VecDeque;

use gridshell_rpc::RpcValue;
use gridshell_rpc::Struct;
use indexmap::IndexMap;

use crate::command::CommandSpec;
use crate::error::CoreError;
use crate::path::DirPath;
use crate::signature::FLAGS_FIELD;

/// Directory state consulted while binding path-like fields.
#[derive(Debug, Clone, Copy)]
pub struct BindContext<'a> {
    pub cwd: &'a DirPath,
    pub path_fields: &'a [String],
}

impl<'a> BindContext<'a> {
    pub fn new(cwd: &'a DirPath, path_fields: &'a [String]) -> Self {
        Self { cwd, path_fields }
    }

    fn is_path_field(&self, field: &str) -> bool {
        self.path_fields.iter().any(|f| f == field)
    }

    fn value_for(&self, field: &str, raw: &str) -> String {
        if self.is_path_field(field) {
            self.cwd.render_argument(raw)
        } else {
            raw.to_string()
        }
    }
}

/// Arguments of one submitted line, bound to a command's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    /// Required fields in declaration order.
    pub required: Vec<(String, String)>,
    /// Optional fields in the order they were bound.
    pub options: IndexMap<String, String>,
    /// Distinct flag letters in order of first appearance.
    pub flags: String,
}

impl ParsedCommand {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.required
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
            .or_else(|| self.options.get(field).map(String::as_str))
    }

    pub fn has_flag(&self, letter: char) -> bool {
        self.flags.contains(letter)
    }

    /// Builds the single struct argument sent to a remote method.
    ///
    /// Each bound field maps to a one-element list holding its text; fields
    /// follow the declaration order of `spec`. Returns `None` for methods
    /// called without parameters.
    pub fn to_argument(&self, spec: &CommandSpec) -> Option<RpcValue> {
        if !spec.takes_args {
            return None;
        }
        let mut members = Struct::new();
        for (name, value) in &self.required {
            members.insert(name.clone(), RpcValue::from(vec![value.as_str()]));
        }
        for field in spec.optional_fields() {
            if let Some(value) = self.options.get(&field.name) {
                members.insert(field.name.clone(), RpcValue::from(vec![value.as_str()]));
            }
        }
        if spec.accepts_flags() {
            members.insert(FLAGS_FIELD.to_string(), RpcValue::from(self.flags.as_str()));
        }
        Some(RpcValue::Struct(members))
    }
}

struct OptionalSlot<'s> {
    name: &'s str,
    claimed: bool,
}

struct BindState<'s> {
    required: VecDeque<&'s str>,
    optional: Vec<OptionalSlot<'s>>,
    parsed: ParsedCommand,
}

impl<'s> BindState<'s> {
    fn next_unclaimed(&mut self, prefix: &str) -> Option<&'s str> {
        let slot = self
            .optional
            .iter_mut()
            .find(|slot| !slot.claimed && slot.name.starts_with(prefix))?;
        slot.claimed = true;
        Some(slot.name)
    }
}

/// Binds the argument tokens of a line (command name excluded) to `spec`.
///
/// Plain tokens fill required fields, then free optional fields. A `-name`
/// token claims the first free optional field whose name starts with
/// `name` and takes the next token as its value unless that token is
/// itself an option. Other `-xyz` tokens made only of accepted flag
/// letters add to the flags; anything else is skipped.
pub fn bind(
    tokens: &[String],
    spec: &CommandSpec,
    ctx: &BindContext<'_>,
) -> Result<ParsedCommand, CoreError> {
    let mut state = BindState {
        required: spec.required_fields().map(|f| f.name.as_str()).collect(),
        optional: spec
            .optional_fields()
            .map(|f| OptionalSlot {
                name: f.name.as_str(),
                claimed: false,
            })
            .collect(),
        parsed: ParsedCommand {
            name: spec.name().to_string(),
            ..ParsedCommand::default()
        },
    };

    let mut cursor = tokens.iter().peekable();
    while let Some(token) = cursor.next() {
        let Some(option) = token.strip_prefix('-') else {
            if let Some(field) = state.required.pop_front() {
                let value = ctx.value_for(field, token);
                state.parsed.required.push((field.to_string(), value));
            } else if let Some(field) = state.next_unclaimed("") {
                let value = ctx.value_for(field, token);
                state.parsed.options.insert(field.to_string(), value);
            }
            continue;
        };

        if let Some(field) = state.next_unclaimed(option) {
            let raw = match cursor.peek() {
                Some(next) if !next.starts_with('-') => cursor.next().map(String::as_str),
                _ => None,
            };
            let value = ctx.value_for(field, raw.unwrap_or_default());
            state.parsed.options.insert(field.to_string(), value);
            continue;
        }

        if !option.is_empty() && option.chars().all(|c| spec.flag_letters.contains(c)) {
            state.parsed.flags.push_str(option);
        }
    }

    if !state.required.is_empty() {
        return Err(CoreError::MissingArgs {
            count: state.required.len(),
        });
    }

    for slot in state.optional.iter_mut().filter(|s| !s.claimed) {
        if ctx.is_path_field(slot.name) {
            slot.claimed = true;
            state
                .parsed
                .options
                .insert(slot.name.to_string(), ctx.cwd.to_string());
        }
    }

    state.parsed.flags = dedup_flags(&state.parsed.flags);
    Ok(state.parsed)
}

/// Keeps the first occurrence of each flag letter.
pub fn dedup_flags(flags: &str) -> String {
    let mut seen = String::with_capacity(flags.len());
    for c in flags.chars() {
        if !seen.contains(c) {
            seen.push(c);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn no_paths() -> Vec<String> {
        Vec::new()
    }

    fn bind_at(items: &[&str], spec: &CommandSpec, cwd: &DirPath) -> Result<ParsedCommand, CoreError> {
        let fields = vec!["path".to_string(), "src".to_string(), "dst".to_string()];
        bind(&tokens(items), spec, &BindContext::new(cwd, &fields))
    }

    fn copy_spec() -> CommandSpec {
        CommandSpec::remote(
            "cp",
            "{'flags': [''], 'src': 'MUST_BE_SET_AND_NO_DEFAULT_VALUE', \
             'dst': 'MUST_BE_SET_AND_NO_DEFAULT_VALUE'}",
        )
    }

    #[test]
    fn test_missing_required_reports_count() {
        let spec = copy_spec();
        let paths = no_paths();
        let root = DirPath::root();
        let ctx = BindContext::new(&root, &paths);
        assert_eq!(
            bind(&tokens(&["x.txt"]), &spec, &ctx),
            Err(CoreError::MissingArgs { count: 1 })
        );
        assert_eq!(
            bind(&[], &spec, &ctx),
            Err(CoreError::MissingArgs { count: 2 })
        );
    }

    #[test]
    fn test_flags_deduplicated() {
        let spec = CommandSpec::remote("rm", "{'flags': [''], 'path': ['']}").with_flag_letters("rf");
        let paths = no_paths();
        let root = DirPath::root();
        let ctx = BindContext::new(&root, &paths);
        let parsed = bind(&tokens(&["-rf", "-f"]), &spec, &ctx).unwrap();
        assert_eq!(parsed.flags, "rf");
        assert!(parsed.has_flag('r') && parsed.has_flag('f'));
    }

    #[test]
    fn test_unknown_dash_tokens_skipped() {
        let spec = CommandSpec::remote("rm", "{'flags': [''], 'path': ['']}").with_flag_letters("rf");
        let paths = no_paths();
        let root = DirPath::root();
        let ctx = BindContext::new(&root, &paths);
        // "-x" is not a flag letter and "path" is claimed by the first token.
        let parsed = bind(&tokens(&["a", "-x", "-rq"]), &spec, &ctx).unwrap();
        assert_eq!(parsed.flags, "");
        assert_eq!(parsed.get("path"), Some("a"));
    }

    #[test]
    fn test_option_prefix_takes_next_value() {
        let spec = CommandSpec::remote("submit", "{'job_id': [''], 'output': ['']}");
        let paths = no_paths();
        let root = DirPath::root();
        let ctx = BindContext::new(&root, &paths);
        let parsed = bind(&tokens(&["-out", "res.txt", "42"]), &spec, &ctx).unwrap();
        assert_eq!(parsed.get("output"), Some("res.txt"));
        assert_eq!(parsed.get("job_id"), Some("42"));
    }

    #[test]
    fn test_option_followed_by_dash_gets_empty_value() {
        let spec = CommandSpec::remote("ls", "{'flags': [''], 'job_id': [''], 'output': ['']}");
        let paths = no_paths();
        let root = DirPath::root();
        let ctx = BindContext::new(&root, &paths);
        let parsed = bind(&tokens(&["-job", "-l"]), &spec, &ctx).unwrap();
        assert_eq!(parsed.get("job_id"), Some(""));
        assert_eq!(parsed.flags, "l");

        let parsed = bind(&tokens(&["-output"]), &spec, &ctx).unwrap();
        assert_eq!(parsed.get("output"), Some(""));
    }

    #[test]
    fn test_option_prefix_is_case_sensitive() {
        let spec = CommandSpec::remote("x", "{'name': ['']}");
        let paths = no_paths();
        let root = DirPath::root();
        let ctx = BindContext::new(&root, &paths);
        let parsed = bind(&tokens(&["-Name", "v"]), &spec, &ctx).unwrap();
        assert_eq!(parsed.get("name"), Some("v"));
        assert_eq!(parsed.options.len(), 1);
    }

    #[test]
    fn test_path_fields_resolved_against_cwd() {
        let cwd = DirPath::root().resolve("/home/user");
        let parsed = bind_at(&["a.txt", "../b/"], &copy_spec(), &cwd).unwrap();
        assert_eq!(
            parsed.required,
            vec![
                ("src".to_string(), "/home/user/a.txt".to_string()),
                ("dst".to_string(), "/home/b/".to_string()),
            ]
        );
    }

    #[test]
    fn test_unbound_path_field_defaults_to_cwd() {
        let cwd = DirPath::root().resolve("/home/user");
        let spec = CommandSpec::remote("ls", "['dir_listings', {'flags': [''], 'path': ['.']}]");
        let parsed = bind_at(&["-la"], &spec, &cwd).unwrap();
        assert_eq!(parsed.get("path"), Some("/home/user/"));
        assert_eq!(parsed.flags, "la");
    }

    #[test]
    fn test_to_argument_shape() {
        let cwd = DirPath::root();
        let spec = copy_spec();
        let parsed = bind_at(&["-r", "a", "b"], &spec, &cwd).unwrap();
        let arg = parsed.to_argument(&spec).unwrap();
        let expected: RpcValue = [
            ("src", RpcValue::from(vec!["/a"])),
            ("dst", RpcValue::from(vec!["/b"])),
            ("flags", RpcValue::from("r")),
        ]
        .into_iter()
        .collect();
        assert_eq!(arg, expected);
    }

    #[test]
    fn test_to_argument_orders_optional_by_declaration() {
        let spec = CommandSpec::remote("x", "{'first': [''], 'second': ['']}");
        let paths = no_paths();
        let root = DirPath::root();
        let ctx = BindContext::new(&root, &paths);
        let parsed = bind(&tokens(&["-s", "2", "-f", "1"]), &spec, &ctx).unwrap();
        let arg = parsed.to_argument(&spec).unwrap();
        let names: Vec<_> = arg.as_struct().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_to_argument_without_params() {
        let spec = CommandSpec::remote("my_id", "none, array");
        let paths = no_paths();
        let root = DirPath::root();
        let ctx = BindContext::new(&root, &paths);
        let parsed = bind(&tokens(&["ignored"]), &spec, &ctx).unwrap();
        assert_eq!(parsed.to_argument(&spec), None);
    }

    #[test]
    fn test_dedup_flags() {
        assert_eq!(dedup_flags("rfrrf"), "rf");
        assert_eq!(dedup_flags("lal"), "la");
        assert_eq!(dedup_flags(""), "");
    }

    proptest! {
        #[test]
        fn dedup_keeps_each_letter_once(flags in "[a-e]{0,20}") {
            let deduped = dedup_flags(&flags);
            for c in flags.chars() {
                prop_assert_eq!(deduped.matches(c).count(), 1);
            }
            prop_assert!(deduped.len() <= 5);
        }
    }
}

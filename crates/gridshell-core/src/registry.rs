use gridshell_rpc::RpcValue;
use tracing::warn;

use crate::command::CommandSpec;
use crate::command::Locality;

/// Methods whose names contain this are service internals.
const SYSTEM_PREFIX: &str = "system.";

/// Known commands in registration order: local commands first, then the
/// remote methods discovered at startup.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: Vec<CommandSpec>,
}

impl Registry {
    pub fn new(local: Vec<CommandSpec>) -> Self {
        Self { commands: local }
    }

    /// Appends remote methods from `(name, signature)` pairs, skipping
    /// `system.` methods. Methods taking flags accept `flag_letters`.
    /// Returns how many were added.
    pub fn append_remote<I>(&mut self, signatures: I, flag_letters: &str) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let before = self.commands.len();
        for (name, signature) in signatures {
            if name.contains(SYSTEM_PREFIX) {
                continue;
            }
            self.commands
                .push(CommandSpec::remote(name, signature).with_flag_letters(flag_letters));
        }
        self.commands.len() - before
    }

    /// Finds the command for `name`.
    ///
    /// A command with the requested locality wins; otherwise the first
    /// command carrying the alias in registration order is returned.
    pub fn resolve(&self, name: &str, priority: Option<Locality>) -> Option<&CommandSpec> {
        let mut first = None;
        for spec in self.commands.iter().filter(|spec| spec.matches(name)) {
            if Some(spec.locality) == priority {
                return Some(spec);
            }
            first.get_or_insert(spec);
        }
        first
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.iter().any(|spec| spec.matches(name))
    }

    pub fn list(&self, locality: Locality) -> impl Iterator<Item = &CommandSpec> {
        self.commands
            .iter()
            .filter(move |spec| spec.locality == locality)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Extracts `(name, signature)` pairs from an `AllMethodSignatures` result.
///
/// Malformed entries are skipped with a warning.
pub fn remote_signatures(value: &RpcValue) -> Vec<(String, String)> {
    let Some(entries) = value.as_list() else {
        warn!(kind = value.type_name(), "method signature listing is not an array");
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.at(0).and_then(RpcValue::as_str);
            let signature = entry.at(1);
            match (name, signature) {
                (Some(name), Some(signature)) => Some((name.to_string(), signature_text(signature))),
                _ => {
                    warn!(entry = %entry, "skipping malformed method signature");
                    None
                }
            }
        })
        .collect()
}

fn signature_text(signature: &RpcValue) -> String {
    match signature {
        RpcValue::String(text) => text.clone(),
        // Some services return the signature as a nested list of strings.
        RpcValue::List(items) => items
            .iter()
            .map(RpcValue::show)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.show(),
    }
}

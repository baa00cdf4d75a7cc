use crate::signature::Signature;
use crate::signature::FLAGS_FIELD;

/// Letters accepted as boolean flags by commands that take flags.
pub const DEFAULT_FLAG_LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locality {
    /// Handled inside the shell.
    Local,
    /// Invoked on the service over XML-RPC.
    Remote,
}

impl Locality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locality::Local => "local",
            Locality::Remote => "remote",
        }
    }
}

impl std::str::FromStr for Locality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "console" => Ok(Locality::Local),
            "remote" => Ok(Locality::Remote),
            other => Err(format!("unknown locality '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub required: bool,
    pub default: Option<String>,
}

/// A command the shell can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Never empty; the first alias is the canonical name.
    pub aliases: Vec<String>,
    pub fields: Vec<FieldSpec>,
    /// Letters accepted as flags; empty when the command takes none.
    pub flag_letters: String,
    pub takes_args: bool,
    pub locality: Locality,
    /// Signature text the command was built from.
    pub signature: String,
}

impl CommandSpec {
    pub fn local(aliases: &[&str], signature: &str) -> Self {
        Self::build(
            aliases.iter().map(|a| a.to_string()).collect(),
            signature,
            Locality::Local,
        )
    }

    pub fn remote(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self::build(vec![name.into()], &signature.into(), Locality::Remote)
    }

    fn build(aliases: Vec<String>, signature: &str, locality: Locality) -> Self {
        let sig = Signature::parse(signature);
        let required = sig.required.into_iter().map(|name| FieldSpec {
            name,
            required: true,
            default: None,
        });
        let optional = sig.optional.into_iter().map(|(name, default)| FieldSpec {
            name,
            required: false,
            default,
        });
        Self {
            aliases,
            fields: required.chain(optional).collect(),
            flag_letters: if sig.accepts_flags {
                DEFAULT_FLAG_LETTERS.to_string()
            } else {
                String::new()
            },
            takes_args: sig.takes_args,
            locality,
            signature: signature.to_string(),
        }
    }

    /// Marks a field as required, e.g. a local command whose declaration
    /// lists the field with a default.
    pub fn require(mut self, field: &str) -> Self {
        if let Some(pos) = self.fields.iter().position(|f| f.name == field) {
            let mut spec = self.fields.remove(pos);
            spec.required = true;
            spec.default = None;
            let insert_at = self.fields.iter().filter(|f| f.required).count();
            self.fields.insert(insert_at, spec);
        }
        self
    }

    pub fn with_flag_letters(mut self, letters: &str) -> Self {
        if self.accepts_flags() {
            self.flag_letters = letters.to_string();
        }
        self
    }

    pub fn name(&self) -> &str {
        self.aliases.first().map(String::as_str).unwrap_or_default()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.aliases.iter().any(|alias| alias == name)
    }

    pub fn accepts_flags(&self) -> bool {
        !self.flag_letters.is_empty()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn optional_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.required)
    }

    /// One-line usage summary shown by `help <command>`.
    pub fn help_line(&self) -> String {
        let required: Vec<&str> = self.required_fields().map(|f| f.name.as_str()).collect();
        let optional: Vec<&str> = self.optional_fields().map(|f| f.name.as_str()).collect();
        format!(
            "{} Required:[{}]  Optional:[{}]  Flags:[{}]",
            self.aliases.join(","),
            required.join(","),
            optional.join(","),
            if self.accepts_flags() { FLAGS_FIELD } else { "" }
        )
    }
}

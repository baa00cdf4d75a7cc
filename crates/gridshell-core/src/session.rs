use std::sync::OnceLock;

use regex::Regex;

use crate::binding::BindContext;
use crate::command::Locality;
use crate::command::DEFAULT_FLAG_LETTERS;
use crate::history::History;
use crate::path::DirPath;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const UNKNOWN_USER: &str = "unknown";

/// Shell behavior that does not depend on the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub history_limit: usize,
    /// Locality preferred when a name is both local and remote.
    pub priority: Option<Locality>,
    pub flag_letters: String,
    /// Field names whose values are resolved against the current directory.
    pub path_fields: Vec<String>,
    pub fallback_user: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            priority: None,
            flag_letters: DEFAULT_FLAG_LETTERS.to_string(),
            path_fields: ["path", "src", "dst"].map(String::from).to_vec(),
            fallback_user: UNKNOWN_USER.to_string(),
        }
    }
}

fn common_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/CN=([^/]+)").unwrap())
}

/// Common name from a certificate DN such as `/O=Grid/CN=Jane Doe/emailAddress=...`.
pub fn user_from_dn(dn: &str) -> Option<&str> {
    common_name_regex()
        .captures(dn)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// State shared by all lines of one shell session.
#[derive(Debug, Clone)]
pub struct Session {
    config: ShellConfig,
    cwd: DirPath,
    history: History,
    user: String,
    running: bool,
}

impl Session {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            cwd: DirPath::root(),
            history: History::new(config.history_limit),
            user: config.fallback_user.clone(),
            running: true,
            config,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn cwd(&self) -> &DirPath {
        &self.cwd
    }

    /// Moves to `path`, relative to the current directory unless absolute.
    pub fn change_dir(&mut self, path: &str) {
        self.cwd = self.cwd.resolve(path);
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Takes the user name from a DN, falling back to the configured name.
    pub fn set_user_from_dn(&mut self, dn: &str) {
        self.user = user_from_dn(dn)
            .unwrap_or(self.config.fallback_user.as_str())
            .to_string();
    }

    pub fn prompt(&self) -> String {
        format!("{}@{}>", self.user, self.cwd)
    }

    pub fn bind_context(&self) -> BindContext<'_> {
        BindContext::new(&self.cwd, &self.config.path_fields)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn end(&mut self) {
        self.running = false;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

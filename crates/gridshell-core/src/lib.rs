//! Command parsing, registry and session state for gridshell.
//!
//! A submitted line goes through [`tokenize`], is matched against the
//! [`Registry`] with [`Registry::resolve`], and its arguments are bound to the
//! command's fields with [`bind`]. The [`Session`] owns the state shared
//! between lines: current directory, history and user name.

#![deny(clippy::all)]

mod binding;
mod command;
mod error;
mod history;
mod path;
mod registry;
mod session;
pub mod signature;
mod tokenize;

pub use binding::BindContext;
pub use binding::ParsedCommand;
pub use binding::bind;
pub use binding::dedup_flags;
pub use command::CommandSpec;
pub use command::FieldSpec;
pub use command::Locality;
pub use command::DEFAULT_FLAG_LETTERS;
pub use error::CoreError;
pub use history::Direction;
pub use history::History;
pub use path::DirPath;
pub use registry::Registry;
pub use registry::remote_signatures;
pub use session::Session;
pub use session::ShellConfig;
pub use session::user_from_dn;
pub use signature::Signature;
pub use tokenize::tokenize;

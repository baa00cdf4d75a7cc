#![deny(clippy::all)]

pub mod app;
pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod presenter;
pub mod render;
pub mod repl;

pub use dispatcher::Dispatcher;
pub use error::ShellError;
pub use handlers::HandlerResult;
pub use presenter::Presenter;

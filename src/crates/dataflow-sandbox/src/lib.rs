//! # dataflow-sandbox
//!
//! Concrete [`dataflow_graph::exec_env::ExecutionEnvironment`] adapters:
//! [`command::ShellCommandRunner`] shells out to an interpreter process to
//! run `Code` block bodies, and [`completion::CompletionProvider`]
//! implementations stand in for an LLM collaborator. [`env::LocalCodeRunner`]
//! combines the two into the environment the rest of the workspace wires
//! into a live `Graph`.

pub mod command;
pub mod completion;
pub mod env;
pub mod error;

pub use command::{CommandCodeRunner, ShellCommandRunner};
pub use completion::{
    CompletionProvider, EchoCompletionProvider, HttpCompletionConfig, HttpCompletionProvider, TemplateCompletionProvider,
};
pub use env::LocalCodeRunner;
pub use error::{Result, SandboxError};

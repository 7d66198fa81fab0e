//! docker-template build functionality
//!
//! This crate assembles container build commands from resolved tags
//! and runs them as subprocesses without going through a shell.

pub mod command;
pub mod error;
pub mod runner;

pub use command::{BuildCommand, BuildRequest, DEFAULT_DOCKERFILE, DEFAULT_PROGRAM, image_references};
pub use error::{BuildError, BuildResult};
pub use runner::{CommandRunner, ProcessRunner, run_build};

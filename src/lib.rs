//! Command dispatch engine for a small line-oriented shell.
//!
//! An already tokenized argument vector is classified into one of four shapes
//! (plain command, `cmd &`, `a | b`, `cmd > file`) and run with fork, exec,
//! pipe and dup2.
//!
//! ```no_run
//! let shell = ish_dispatch::startup();
//! shell.dispatch(&["ls", "|", "wc", "-l"]);
//! shell.shutdown();
//! ```

pub mod classify;
pub mod error;
pub mod eval;
pub mod job;
pub mod parser;
pub mod signal;
pub mod types;

use std::io::{self, Write};
use std::process;

use log::error;

pub use crate::error::{Error, Result};
pub use crate::types::{Flow, Shape};
use crate::signal::SignalPolicy;

pub struct Dispatcher {
	policy: SignalPolicy,
}

impl Dispatcher {
	/// Installs the shell signal policy. Must be called once, before any dispatch.
	pub fn try_startup() -> Result<Dispatcher> {
		let policy = SignalPolicy::shell();
		policy.install_shell_policy()?;
		Ok(Dispatcher { policy })
	}

	pub fn try_dispatch<T: AsRef<[u8]>>(&self, argv: &[T]) -> Result<Flow> {
		eval::eval(&self.policy, argv)?;
		Ok(Flow::Continue)
	}

	/// Runs one command request. Input errors are reported and skipped; failures of
	/// OS primitives terminate the interpreter.
	pub fn dispatch<T: AsRef<[u8]>>(&self, argv: &[T]) -> Flow {
		match self.try_dispatch(argv) {
			Ok(flow) => flow,
			Err(e) => {
				report(&e);
				if e.is_fatal() {
					error!("terminating on fatal error: {:?}", e);
					process::exit(1);
				}
				Flow::Continue
			},
		}
	}

	pub fn shutdown(self) {}
}

fn report(e: &Error) {
	let _ = writeln!(io::stderr(), "ish: {}", e);
}

/// Like [`Dispatcher::try_startup`], but a failure ends the process.
pub fn startup() -> Dispatcher {
	match Dispatcher::try_startup() {
		Ok(dispatcher) => dispatcher,
		Err(e) => {
			report(&e);
			process::exit(1);
		},
	}
}

use std::ffi::{CStr, CString};
use std::io::{self, Write};

use log::{debug, trace};
use nix::errno::Errno;
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};

use crate::error::{Error, OsContext, Result};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum State { Active, Stopped, Terminated }

pub trait WaitStatusExt {
	fn state(self) -> State;
}

impl WaitStatusExt for WaitStatus {
	fn state(self) -> State {
		match self {
			WaitStatus::Exited(..) | WaitStatus::Signaled(..) => State::Terminated,
			WaitStatus::Stopped(..) => State::Stopped,
			#[cfg(any(target_os = "linux", target_os = "android"))]
			WaitStatus::PtraceEvent(..) | WaitStatus::PtraceSyscall(..) => State::Stopped,
			WaitStatus::Continued(..) | WaitStatus::StillAlive => State::Active,
		}
	}
}

/// An argument vector converted to C strings before fork, so the child only has
/// to exec.
#[derive(Debug)]
pub struct ChildCommand {
	argv: Vec<CString>,
}

impl ChildCommand {
	pub fn new<T: AsRef<[u8]>>(argv: &[T]) -> Result<ChildCommand> {
		if argv.is_empty() {
			return Err(Error::Empty);
		}
		let argv = argv.iter()
			.map(|t| CString::new(t.as_ref()))
			.collect::<std::result::Result<Vec<CString>, _>>()?;
		Ok(ChildCommand { argv })
	}

	pub fn name(&self) -> &CStr {
		&self.argv[0]
	}

	pub fn args(&self) -> &[CString] {
		&self.argv
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Fork {
	Parent(Pid),
	Child,
}

pub fn spawn() -> Result<Fork> {
	// The interpreter is single threaded, and the child only touches
	// descriptors and signal dispositions before exec or _exit.
	match unsafe { unistd::fork() }.os("fork")? {
		ForkResult::Parent { child } => {
			debug!("spawned child {}", child);
			Ok(Fork::Parent(child))
		},
		ForkResult::Child => Ok(Fork::Child),
	}
}

/// Blocks until `pid` exits, is killed or stops.
pub fn wait_for(pid: Pid) -> Result<()> {
	loop {
		match wait::waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
			Ok(status) => match status.state() {
				State::Active => continue,
				State::Stopped | State::Terminated => {
					debug!("child {} finished waiting with {:?}", pid, status);
					return Ok(());
				},
			},
			Err(Errno::EINTR) => continue,
			Err(Errno::ECHILD) => {
				// already collected by the SIGCHLD handler
				debug!("child {} was reaped before it could be waited for", pid);
				return Ok(());
			},
			Err(e) => return Err(Error::Os { op: "waitpid", errno: e }),
		}
	}
}

/// Replaces the current program image. Only ever returns control by exiting.
pub fn replace_image(command: &ChildCommand) -> ! {
	trace!("exec {:?}", command.args());
	let errno = match unistd::execvp(command.name(), command.args()) {
		Ok(never) => match never {},
		Err(e) => e,
	};
	let _ = writeln!(io::stderr(), "{}: {}", command.name().to_string_lossy(), errno.desc());
	exit_child(1)
}

/// Leaves a forked child after a setup failure.
pub fn abort_child(e: &Error) -> ! {
	let _ = writeln!(io::stderr(), "{}", e);
	exit_child(1)
}

fn exit_child(status: libc::c_int) -> ! {
	unsafe { libc::_exit(status) }
}

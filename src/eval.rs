use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use log::{debug, trace, warn};
use nix::fcntl::{self, FcntlArg};
use nix::unistd;

use crate::classify;
use crate::error::{Error, OsContext, Result};
use crate::job::{self, ChildCommand, Fork};
use crate::signal::SignalPolicy;
use crate::types::Shape;

/// Classifies `argv` and runs it with the matching strategy.
pub fn eval<T: AsRef<[u8]>>(policy: &SignalPolicy, argv: &[T]) -> Result<()> {
	match classify::classify(argv) {
		Shape::Normal => run_normal(policy, argv),
		Shape::Background => run_background(argv),
		Shape::Pipe => run_pipe(policy, argv),
		Shape::Redirect => run_redirect(policy, argv),
	}
}

fn exec_foreground(policy: &SignalPolicy, command: &ChildCommand) -> ! {
	if let Err(e) = policy.restore_default_interrupt() {
		job::abort_child(&e);
	}
	job::replace_image(command)
}

fn launch_foreground(policy: &SignalPolicy, command: &ChildCommand) -> Result<()> {
	match job::spawn()? {
		Fork::Child => exec_foreground(policy, command),
		Fork::Parent(pid) => job::wait_for(pid),
	}
}

pub fn run_normal<T: AsRef<[u8]>>(policy: &SignalPolicy, argv: &[T]) -> Result<()> {
	let command = ChildCommand::new(classify::command(argv)?)?;
	launch_foreground(policy, &command)
}

/// Fire and forget. The child keeps SIGINT ignored and is reaped by the SIGCHLD
/// handler whenever it exits.
pub fn run_background<T: AsRef<[u8]>>(argv: &[T]) -> Result<()> {
	let command = ChildCommand::new(classify::strip_background(argv)?)?;
	match job::spawn()? {
		Fork::Child => job::replace_image(&command),
		Fork::Parent(pid) => {
			debug!("child {} runs in background", pid);
			Ok(())
		},
	}
}

fn attach(policy: &SignalPolicy, pipe_end: &OwnedFd, stdio: RawFd) -> Result<()> {
	policy.restore_default_interrupt()?;
	unistd::dup2(pipe_end.as_raw_fd(), stdio).os("dup2")?;
	trace!("pipe fd {} attached to fd {}", pipe_end.as_raw_fd(), stdio);
	Ok(())
}

pub fn run_pipe<T: AsRef<[u8]>>(policy: &SignalPolicy, argv: &[T]) -> Result<()> {
	let (left, right) = classify::split_pipe(argv)?;
	let left = ChildCommand::new(left)?;
	let right = ChildCommand::new(right)?;

	let (read_end, write_end) = unistd::pipe().os("pipe")?;

	let writer = match job::spawn()? {
		Fork::Child => {
			if let Err(e) = attach(policy, &write_end, libc::STDOUT_FILENO) {
				job::abort_child(&e);
			}
			drop((read_end, write_end));
			job::replace_image(&left)
		},
		Fork::Parent(pid) => pid,
	};
	let reader = match job::spawn()? {
		Fork::Child => {
			if let Err(e) = attach(policy, &read_end, libc::STDIN_FILENO) {
				job::abort_child(&e);
			}
			drop((read_end, write_end));
			job::replace_image(&right)
		},
		Fork::Parent(pid) => pid,
	};

	// The reader only sees EOF once every copy of the write end is closed.
	drop((read_end, write_end));
	job::wait_for(writer)?;
	job::wait_for(reader)
}

/// The shell's own stdout, parked on a spare descriptor while fd 1 points elsewhere.
struct SavedStdout {
	saved: Option<OwnedFd>,
}

impl SavedStdout {
	fn redirect_to(file: File) -> Result<SavedStdout> {
		if let Err(e) = io::stdout().flush() {
			warn!("shell stdout not flushed before redirect: {}", e);
		}
		// close-on-exec, so the redirected command does not inherit the shell's stdout
		let saved = fcntl::fcntl(libc::STDOUT_FILENO, FcntlArg::F_DUPFD_CLOEXEC(3)).os("fcntl(F_DUPFD_CLOEXEC)")?;
		let saved = unsafe { OwnedFd::from_raw_fd(saved) };
		unistd::dup2(file.as_raw_fd(), libc::STDOUT_FILENO).os("dup2")?;
		trace!("stdout redirected, original kept on fd {}", saved.as_raw_fd());
		Ok(SavedStdout { saved: Some(saved) })
	}

	fn restore(mut self) -> Result<()> {
		match self.saved.take() {
			Some(saved) => unistd::dup2(saved.as_raw_fd(), libc::STDOUT_FILENO).map(drop).os("dup2"),
			None => Ok(()),
		}
	}
}

impl Drop for SavedStdout {
	fn drop(&mut self) {
		if let Some(saved) = self.saved.take() {
			let _ = unistd::dup2(saved.as_raw_fd(), libc::STDOUT_FILENO);
		}
	}
}

fn open_target(target: &[u8]) -> Result<File> {
	let path = Path::new(OsStr::from_bytes(target));
	OpenOptions::new()
		.write(true)
		.create(true)
		.truncate(true)
		.mode(0o600)
		.open(path)
		.map_err(|source| Error::Open { path: path.to_path_buf(), source })
}

/// Runs the command portion as a normal foreground command with the shell's
/// stdout pointed at the target file, then puts stdout back.
pub fn run_redirect<T: AsRef<[u8]>>(policy: &SignalPolicy, argv: &[T]) -> Result<()> {
	let (command, target) = classify::split_redirect(argv)?;
	let command = ChildCommand::new(command)?;
	let file = open_target(target.as_ref())?;

	let stdout = SavedStdout::redirect_to(file)?;
	let ran = launch_foreground(policy, &command);
	stdout.restore()?;
	ran
}

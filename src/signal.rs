use log::debug;
use nix::errno::Errno;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};

use crate::error::{OsContext, Result};

/// Reaps every terminated child without blocking. Runs in signal context, so no
/// allocation and no logging here.
extern "C" fn reap_children(_: libc::c_int) {
	let saved = Errno::last_raw();
	loop {
		match wait::waitpid(None, Some(WaitPidFlag::WNOHANG)) {
			Ok(WaitStatus::StillAlive) | Err(_) => break,
			Ok(_) => {},
		}
	}
	Errno::set_raw(saved);
}

/// Process-wide signal dispositions of the interpreter.
///
/// The interpreter ignores SIGINT and reaps children asynchronously on SIGCHLD.
/// Foreground children put SIGINT back to the default right after fork; background
/// children keep the inherited ignore disposition.
pub struct SignalPolicy {
	interrupt: SigAction,
	child: SigAction,
}

impl SignalPolicy {
	pub fn shell() -> SignalPolicy {
		SignalPolicy {
			interrupt: SigAction::new(SigHandler::SigIgn, SaFlags::SA_RESTART, SigSet::empty()),
			child: SigAction::new(SigHandler::Handler(reap_children),
			                      SaFlags::SA_RESTART | SaFlags::SA_NOCLDSTOP, SigSet::empty()),
		}
	}

	pub fn install_shell_policy(&self) -> Result<()> {
		unsafe {
			signal::sigaction(Signal::SIGINT, &self.interrupt).os("sigaction(SIGINT)")?;
			signal::sigaction(Signal::SIGCHLD, &self.child).os("sigaction(SIGCHLD)")?;
			// the Rust runtime ignores SIGPIPE, and children would inherit that through exec
			signal::signal(Signal::SIGPIPE, SigHandler::SigDfl).os("signal(SIGPIPE)")?;
		}
		debug!("signal policy installed: SIGINT ignored, SIGCHLD reaped asynchronously");
		Ok(())
	}

	/// Called in a freshly forked child before exec.
	pub fn restore_default_interrupt(&self) -> Result<()> {
		let default = SigAction::new(SigHandler::SigDfl, SaFlags::SA_RESTART, SigSet::empty());
		unsafe { signal::sigaction(Signal::SIGINT, &default) }.os("sigaction(SIGINT)")?;
		Ok(())
	}
}

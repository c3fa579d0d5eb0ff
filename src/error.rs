use std::{error, ffi, fmt, io};
use std::path::PathBuf;

use nix::errno::Errno;

#[derive(Debug)]
pub enum Error {
	/// An OS primitive (fork, pipe, dup, sigaction, ...) failed.
	Os { op: &'static str, errno: Errno },
	Open { path: PathBuf, source: io::Error },
	Unsupported(&'static str),
	Nul(ffi::NulError),
	Empty,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	/// Fatal errors terminate the process that hit them; the rest are reported and skipped.
	pub fn is_fatal(&self) -> bool {
		match *self {
			Error::Os { .. } | Error::Open { .. } => true,
			Error::Unsupported(_) | Error::Nul(_) | Error::Empty => false,
		}
	}
}

/// Tags a nix result with the name of the primitive that produced it.
pub trait OsContext<T> {
	fn os(self, op: &'static str) -> Result<T>;
}

impl<T> OsContext<T> for nix::Result<T> {
	fn os(self, op: &'static str) -> Result<T> {
		self.map_err(|errno| Error::Os { op, errno })
	}
}

impl From<ffi::NulError> for Error {
	fn from(e: ffi::NulError) -> Error {
		Error::Nul(e)
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Error::Os { op, errno } => write!(f, "{} failed: {}", op, errno.desc()),
			Error::Open { ref path, ref source } => write!(f, "can't open output file {}: {}", path.display(), source),
			Error::Unsupported(what) => write!(f, "unsupported command line: {}", what),
			Error::Nul(ref e) => write!(f, "argument contains a nul byte: {}", e),
			Error::Empty => write!(f, "empty command"),
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match *self {
			Error::Os { ref errno, .. } => Some(errno),
			Error::Open { ref source, .. } => Some(source),
			Error::Nul(ref e) => Some(e),
			Error::Unsupported(_) | Error::Empty => None,
		}
	}
}

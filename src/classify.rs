//! Shape classification and non-destructive splitting of argument vectors.
//!
//! Precedence is fixed: a trailing `&` wins over a `|` anywhere, which wins over a
//! `>` in second-to-last position. Whatever remains after splitting must be a plain
//! command, free of operator tokens.

use log::debug;

use crate::error::{Error, Result};
use crate::types::{self, Shape};

pub fn classify<T: AsRef<[u8]>>(argv: &[T]) -> Shape {
	let shape = if argv.last().map_or(false, |t| t.as_ref() == types::BACKGROUND) {
		Shape::Background
	} else if argv.iter().any(|t| t.as_ref() == types::PIPE) {
		Shape::Pipe
	} else if argv.len() >= 2 && argv[argv.len() - 2].as_ref() == types::REDIRECT {
		Shape::Redirect
	} else {
		Shape::Normal
	};
	debug!("classified {} token(s) as {:?}", argv.len(), shape);
	shape
}

/// Checks that `argv` can be handed to exec as is.
pub fn command<T: AsRef<[u8]>>(argv: &[T]) -> Result<&[T]> {
	if argv.is_empty() {
		return Err(Error::Empty);
	}
	match argv.iter().map(|t| t.as_ref()).find(|t| types::is_operator(t)) {
		Some(t) if t == types::PIPE => Err(Error::Unsupported("only a single pipe without other operators is supported")),
		Some(t) if t == types::REDIRECT => Err(Error::Unsupported("'>' must be second to last, followed by one file name")),
		Some(_) => Err(Error::Unsupported("'&' is only recognized as the last token")),
		None => Ok(argv),
	}
}

pub fn strip_background<T: AsRef<[u8]>>(argv: &[T]) -> Result<&[T]> {
	match argv.split_last() {
		Some((last, rest)) if last.as_ref() == types::BACKGROUND => command(rest),
		_ => Err(Error::Unsupported("background command must end with '&'")),
	}
}

/// Splits at the first `|`. The delimiter belongs to neither side.
pub fn split_pipe<T: AsRef<[u8]>>(argv: &[T]) -> Result<(&[T], &[T])> {
	let i = argv.iter().position(|t| t.as_ref() == types::PIPE)
		.ok_or(Error::Unsupported("pipeline without '|'"))?;
	Ok((command(&argv[..i])?, command(&argv[i + 1..])?))
}

/// Splits `cmd ... > target` into the command portion and the target token.
pub fn split_redirect<T: AsRef<[u8]>>(argv: &[T]) -> Result<(&[T], &T)> {
	let n = argv.len();
	if n < 2 || argv[n - 2].as_ref() != types::REDIRECT {
		return Err(Error::Unsupported("'>' must be second to last, followed by one file name"));
	}
	let target = &argv[n - 1];
	if types::is_operator(target.as_ref()) {
		return Err(Error::Unsupported("redirect target must be a file name"));
	}
	Ok((command(&argv[..n - 2])?, target))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn argv(line: &str) -> Vec<&[u8]> {
		line.split(' ').filter(|s| !s.is_empty()).map(str::as_bytes).collect()
	}

	#[test]
	fn shapes() {
		assert_eq!(classify(&argv("ls -l")), Shape::Normal);
		assert_eq!(classify(&argv("echo hi &")), Shape::Background);
		assert_eq!(classify(&argv("ls | wc -l")), Shape::Pipe);
		assert_eq!(classify(&argv("echo hi > out.txt")), Shape::Redirect);
		assert_eq!(classify(&argv("&")), Shape::Background);
		assert_eq!(classify(&argv(">")), Shape::Normal);
	}

	#[test]
	fn operators_match_whole_tokens_only() {
		assert_eq!(classify(&argv("echo a&")), Shape::Normal);
		assert_eq!(classify(&argv("echo a|b")), Shape::Normal);
		assert_eq!(classify(&argv("echo >> out")), Shape::Normal);
	}

	#[test]
	fn precedence() {
		assert_eq!(classify(&argv("ls | wc &")), Shape::Background);
		assert_eq!(classify(&argv("ls | wc > out")), Shape::Pipe);
		assert_eq!(classify(&argv("echo > out &")), Shape::Background);
		// '>' anywhere but second to last is not a redirect
		assert_eq!(classify(&argv("echo > a b")), Shape::Normal);
	}

	#[test]
	fn pipe_split_leaves_caller_vector_intact() {
		let v = argv("ls -a | wc -l");
		let (left, right) = split_pipe(&v).unwrap();
		assert_eq!(left, &argv("ls -a")[..]);
		assert_eq!(right, &argv("wc -l")[..]);
		assert_eq!(v.len(), 5);
	}

	#[test]
	fn pipe_with_empty_side() {
		assert!(matches!(split_pipe(&argv("| wc")), Err(Error::Empty)));
		assert!(matches!(split_pipe(&argv("ls |")), Err(Error::Empty)));
	}

	#[test]
	fn combined_operators_are_rejected() {
		assert!(matches!(split_pipe(&argv("a | b | c")), Err(Error::Unsupported(_))));
		assert!(matches!(split_pipe(&argv("ls | wc > out")), Err(Error::Unsupported(_))));
		assert!(matches!(strip_background(&argv("ls | wc &")), Err(Error::Unsupported(_))));
		assert!(matches!(command(&argv("echo > a b")), Err(Error::Unsupported(_))));
		assert!(matches!(command(&argv("echo & hi")), Err(Error::Unsupported(_))));
	}

	#[test]
	fn background_strip() {
		let v = argv("sleep 3 &");
		assert_eq!(strip_background(&v).unwrap(), &argv("sleep 3")[..]);
		assert!(matches!(strip_background(&argv("&")), Err(Error::Empty)));
	}

	#[test]
	fn redirect_split() {
		let v = argv("echo hi > out.txt");
		let (cmd, target) = split_redirect(&v).unwrap();
		assert_eq!(cmd, &argv("echo hi")[..]);
		assert_eq!(*target, b"out.txt");
		assert!(matches!(split_redirect(&argv("> out.txt")), Err(Error::Empty)));
		assert!(matches!(split_redirect(&argv("echo > >")), Err(Error::Unsupported(_))));
	}
}

pub const BACKGROUND: &[u8] = b"&";
pub const PIPE: &[u8] = b"|";
pub const REDIRECT: &[u8] = b">";

pub fn is_operator(token: &[u8]) -> bool {
	token == BACKGROUND || token == PIPE || token == REDIRECT
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Shape { Normal, Background, Pipe, Redirect }

/// What the caller should do after a dispatch. The engine itself never asks to stop.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Flow {
	Continue,
	/// Never produced by the engine; lets a caller's own commands end the read loop.
	Exit,
}

impl Flow {
	pub fn should_continue(self) -> bool {
		self == Flow::Continue
	}
}

use std::io::{self, BufRead, IsTerminal, Write};

use env_logger::Env;
use ish_dispatch::parser;

const PROMPT: &[u8] = b"ish> ";

fn main() {
	env_logger::Builder::from_env(Env::default().filter_or("ISH_LOG", "warn")).init();

	let shell = ish_dispatch::startup();

	let mut stdout = io::stdout();
	let stdin = io::stdin();
	let interactive = stdin.is_terminal();
	let mut stdin_locked = stdin.lock();
	loop {
		if interactive {
			let _ = stdout.write_all(PROMPT);
			let _ = stdout.flush();
		}
		let mut line: Vec<u8> = vec![];
		match stdin_locked.read_until(b'\n', &mut line) {
			Ok(0) => break,
			Ok(_) => {},
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => {
				log::error!("reading input: {}", e);
				break;
			},
		}
		let argv = parser::tokenize(&line);
		if argv.is_empty() {
			continue;
		}
		if !shell.dispatch(&argv).should_continue() {
			break;
		}
	}
	shell.shutdown();
}

use std::io::{self, BufRead, Write};

pub const PROMPT: &str = "continue (y/n/_): ";

/// Ask the operator once whether to proceed. Only a bare `y` counts as
/// yes; end of input counts as no.
pub fn confirm<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<bool> {
	write!(output, "{PROMPT}")?;
	output.flush()?;

	let mut line = String::new();
	input.read_line(&mut line)?;
	Ok(line.trim_end_matches(['\r', '\n']) == "y")
}

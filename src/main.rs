mod args;
mod compiler;
mod fmt;
mod runtime;
mod symbol;
mod syntax;
mod term;

use std::{
	io::{self, BufRead, Write},
	path::Path,
};

use args::{Args, Command};
use compiler::code;
use fmt::{FmtString, Show};
use runtime::{Runtime, value::Value};
use syntax::{Reader, Source};
use term::color;


fn main() -> ! {
	let command = match args::parse(std::env::args_os()) {
		Ok(command) => command,
		Err(error) => {
			eprint!("{}", error);
			std::process::exit(1)
		}
	};

	let exit_code = match command {
		Command::Run(args) => run(&args),
		Command::Help(msg) | Command::Version(msg) => {
			println!("{}", msg);
			0
		}
	};

	std::process::exit(exit_code)
}


fn run(args: &Args) -> i32 {
	let mut runtime = Runtime::new();

	match &args.script {
		Some(script) => run_file(script.as_ref(), args, &mut runtime),
		None => run_repl(args, &mut runtime),
	}
}


/// Evaluate every expression in the script, aborting the run on the first error.
fn run_file(path: &Path, args: &Args, runtime: &mut Runtime) -> i32 {
	let source = match Source::from_path(path) {
		Ok(source) => source,
		Err(error) => {
			eprintln!("{}: {}", color::Fg(color::Red, "Error"), error);
			return 1;
		}
	};

	let data = {
		let mut reader = Reader::new(&source, runtime.interner_mut());
		let mut data = Vec::new();

		loop {
			match reader.read() {
				Ok(Some(datum)) => data.push(datum),
				Ok(None) => break data,
				Err(error) => {
					eprintln!(
						"{}: {}: {}",
						color::Fg(color::Red, "Error"),
						source.path.display(),
						error
					);
					return 2;
				}
			}
		}
	};

	for datum in &data {
		if let Err(exit_code) = evaluate(datum, args, runtime) {
			return exit_code;
		}
	}

	0
}


/// Read one expression at a time, evaluate it and print the result.
/// Errors abort only the offending expression: definitions from previous
/// expressions persist.
fn run_repl(args: &Args, runtime: &mut Runtime) -> i32 {
	let exit = runtime.interner_mut().get_or_intern("exit");

	let stdin = io::stdin();
	let mut stdin = stdin.lock();
	let mut buffer = String::new();

	loop {
		let prompt = if buffer.is_empty() { "> " } else { "  " };
		print!("{}", prompt);

		if io::stdout().flush().is_err() {
			return 1;
		}

		let mut line = String::new();
		match stdin.read_line(&mut line) {
			Ok(0) => return 0, // End of input.
			Ok(_) => buffer.push_str(&line),
			Err(error) => {
				eprintln!("{}: {}", color::Fg(color::Red, "Error"), error);
				return 1;
			}
		}

		let source = Source::from_str(Path::new("<stdin>"), &buffer);

		// Read everything accumulated so far. A datum cut short by the end of the
		// buffer waits for further lines instead of failing.
		let mut data = Vec::new();
		let mut failed = false;
		let mut incomplete = false;

		{
			let mut reader = Reader::new(&source, runtime.interner_mut());

			loop {
				match reader.read() {
					Ok(Some(datum)) => data.push(datum),

					Ok(None) => break,

					Err(error) if error.is_incomplete() => {
						incomplete = true;
						break;
					}

					Err(error) => {
						eprintln!("{}: {}", color::Fg(color::Red, "Error"), error);
						failed = true;
						break;
					}
				}
			}
		}

		if incomplete {
			continue;
		}

		buffer.clear();

		if failed {
			continue;
		}

		for datum in &data {
			if datum.as_symbol() == Some(exit) {
				return 0;
			}

			if let Ok(Some(value)) = evaluate(datum, args, runtime) {
				println!("{}", value.fmt_string(runtime.interner()));
			}
		}
	}
}


/// Compile and run one top level datum, honoring the dump flags.
/// Errors are reported, and mapped to the corresponding exit code. A None result
/// means execution was skipped by --check.
fn evaluate(datum: &Value, args: &Args, runtime: &mut Runtime) -> Result<Option<Value>, i32> {
	if args.print_ast {
		println!("{}", Show(datum, runtime.interner()));
	}

	let code = match runtime.compile(datum) {
		Ok(code) => code,
		Err(error) => {
			eprintln!(
				"{}: {}",
				color::Fg(color::Red, "Error"),
				Show(&error, runtime.interner())
			);
			return Err(2);
		}
	};

	if args.print_code {
		println!("{}", color::Fg(color::Yellow, "--------------------------------------------------"));
		print!("{}", Show(&*code, code::fmt::Context::from(runtime.interner())));
		println!("{}", color::Fg(color::Yellow, "--------------------------------------------------"));
	}

	if args.check {
		return Ok(None);
	}

	match runtime.exec(code) {
		Ok(value) => Ok(Some(value)),

		Err(panic) => {
			eprintln!(
				"{}: {}",
				color::Fg(color::Red, "Panic"),
				Show(&panic, runtime.interner())
			);
			Err(1)
		}
	}
}

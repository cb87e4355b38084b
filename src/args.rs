use std::{
	ffi::OsString,
	path::PathBuf,
};

use clap::{clap_app, crate_version, crate_description};


#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
	Help(Box<str>),
	Version(Box<str>),
	Run(Args)
}


#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Args {
	/// The script to run. Absent means interactive mode on stdin.
	pub script: Option<PathBuf>,
	/// Compile the program, but don't run.
	pub check: bool,
	/// Print each expression as read.
	pub print_ast: bool,
	/// Print compiled instruction sequences.
	pub print_code: bool,
}


pub fn parse<A, T>(args: A) -> clap::Result<Command>
where
	A: IntoIterator<Item = T>,
	T: Into<OsString> + Clone
{
	let app = clap_app!(
		Vesper =>
			(version: crate_version!())
			(about: crate_description!())
			(@arg SCRIPT: "Script to run. Reads expressions interactively when absent.")
			(@arg check: --check "Perform only compilation instead of executing.")
			(@arg ast: --ast "Print each expression as read")
			(@arg code: --code "Print compiled instruction sequences")
	);

	match app.get_matches_from_safe(args) {
		Ok(matches) => Ok(
			Command::Run(
				Args {
					script: matches.value_of_os("SCRIPT").map(PathBuf::from),
					check: matches.is_present("check"),
					print_ast: matches.is_present("ast"),
					print_code: matches.is_present("code"),
				}
			)
		),

		Err(error) => match error.kind {
			clap::ErrorKind::HelpDisplayed => Ok(
				Command::Help(error.message.into_boxed_str())
			),
			clap::ErrorKind::VersionDisplayed => Ok(
				Command::Version(error.message.into_boxed_str())
			),
			_ => Err(error)
		}
	}
}

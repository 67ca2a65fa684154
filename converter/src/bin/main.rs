extern crate classic_converter;
extern crate clap;
extern crate env_logger;
extern crate log;

use clap::{Arg, App};
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use classic_converter::{convert_file, time_seed, Target, INPUT_EXTENSIONS};
use log::error;

struct ConverterOptions {
	input: PathBuf,
	target: Target,
	seed: u64
}

fn parse_seed(seed: &str) -> Result<u64, String> {
	let seed = if seed.starts_with('-') {
		i64::from_str(seed).map(|seed| seed as u64)
	} else {
		u64::from_str(seed)
	};

	seed.map_err(|parse| parse.to_string())
}

fn validate_seed(seed: String) -> Result<(), String> {
	parse_seed(&seed).map(|_| ())
}

fn validate_input(input: String) -> Result<(), String> {
	let extension = Path::new(&input).extension().and_then(|extension| extension.to_str());

	match extension {
		Some(extension) if INPUT_EXTENSIONS.contains(&extension) => Ok(()),
		_ => Err(format!("{} is not a classic save, expected a .dat or .mine file", input))
	}
}

fn validate_target(target: String) -> Result<(), String> {
	Target::from_str(&target).map(|_| ())
}

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let matches = App::new("Classic Converter")
		.version("0.1.0")
		.author("coderbot16 <coderbot16@gmail.com>")
		.about("Converts pre-classic and classic saves into indev levels or schematics")
		.arg(Arg::with_name("input")
			.short("i")
			.long("input")
			.value_name("FILE")
			.help("The classic save to convert, a .dat or .mine file")
			.takes_value(true)
			.required(true)
			.validator(validate_input)
		)
		.arg(Arg::with_name("format")
			.short("f")
			.long("format")
			.value_name("FORMAT")
			.help("The format to convert to: indev_level or schematic")
			.takes_value(true)
			.required(true)
			.validator(validate_target)
		)
		.arg(Arg::with_name("seed")
			.short("s")
			.long("seed")
			.value_name("SEED")
			.long_help("Seeds the spawn search, for saves that do not store a spawn \n\
			               Default: derived from the current time")
			.takes_value(true)
			.validator(validate_seed)
		)
		.get_matches();

	// Validators already ran, so every value below parses
	let options = ConverterOptions {
		input: PathBuf::from(matches.value_of("input").unwrap_or_default()),
		target: matches.value_of("format").and_then(|target| Target::from_str(target).ok()).unwrap_or(Target::IndevLevel),
		seed: matches.value_of("seed").and_then(|seed| parse_seed(seed).ok()).unwrap_or_else(time_seed)
	};

	if let Err(e) = convert_file(&options.input, options.target, options.seed) {
		error!("Failed to convert {}: {}", options.input.display(), e);

		process::exit(1);
	}
}

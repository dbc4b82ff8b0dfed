use std::{
	fs,
	path::{Path, PathBuf},
	process::ExitCode,
};

use clap::{Arg, ArgAction, ArgMatches, Command};
use rexfa::{automata::dot::DotDisplay, syntax, Compiler, Graph, Options, DFA, NFA};

#[derive(Debug, thiserror::Error)]
enum Error {
	#[error("unable to read `{}`: {}", .0.display(), .1)]
	Io(PathBuf, std::io::Error),

	#[error("invalid graph file: {0}")]
	Yaml(#[from] serde_yaml::Error),

	#[error(transparent)]
	Rexfa(#[from] rexfa::Error),
}

impl From<rexfa::automata::Error> for Error {
	fn from(value: rexfa::automata::Error) -> Self {
		Self::Rexfa(value.into())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
	Table,
	Yaml,
	Dot,
}

impl Format {
	fn from_matches(matches: &ArgMatches) -> Self {
		match matches.get_one::<String>("format").map(String::as_str) {
			Some("yaml") => Self::Yaml,
			Some("dot") => Self::Dot,
			_ => Self::Table,
		}
	}
}

fn pattern_arg() -> Arg {
	Arg::new("pattern")
		.help("Regular expression")
		.required(true)
		.value_name("PATTERN")
}

fn format_arg() -> Arg {
	Arg::new("format")
		.long("format")
		.help("Automaton output format")
		.value_parser(["table", "yaml", "dot"])
		.default_value("table")
}

fn command() -> Command {
	Command::new("rexfa")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Regular expression to finite automaton compiler, and back")
		.subcommand_required(true)
		.arg(
			Arg::new("strict-classes")
				.long("strict-classes")
				.global(true)
				.help("Reject character classes missing their closing `]`")
				.action(ArgAction::SetTrue),
		)
		.arg(
			Arg::new("state-limit")
				.long("state-limit")
				.global(true)
				.help("Maximum number of NFA states")
				.value_name("N")
				.value_parser(clap::value_parser!(u32)),
		)
		.subcommand(
			Command::new("tokens")
				.about("Print the token, expanded, postfix sequences and explanations of a pattern")
				.arg(pattern_arg()),
		)
		.subcommand(
			Command::new("nfa")
				.about("Compile a pattern into a Thompson NFA")
				.arg(pattern_arg())
				.arg(format_arg()),
		)
		.subcommand(
			Command::new("dfa")
				.about("Compile a pattern into a DFA")
				.arg(pattern_arg())
				.arg(format_arg())
				.arg(
					Arg::new("no-minimize")
						.long("no-minimize")
						.help("Skip minimization")
						.action(ArgAction::SetTrue),
				),
		)
		.subcommand(
			Command::new("regex")
				.about("Convert an automaton graph (YAML) into a regular expression")
				.arg(
					Arg::new("graph")
						.help("Path to the graph file")
						.required(true)
						.value_name("GRAPH_FILE")
						.value_parser(clap::value_parser!(PathBuf)),
				)
				.arg(
					Arg::new("dfa")
						.long("dfa")
						.help("Reject graphs that are not deterministic")
						.action(ArgAction::SetTrue),
				),
		)
}

fn options(matches: &ArgMatches) -> Options {
	Options {
		syntax: syntax::Options {
			strict_classes: matches.get_flag("strict-classes"),
		},
		state_limit: matches.get_one::<u32>("state-limit").copied(),
		minimize: true,
	}
}

fn print_tokens(compiler: &Compiler, pattern: &str) -> Result<(), Error> {
	let tokens = compiler.tokens(pattern)?;
	println!("tokens:");
	for token in &tokens {
		println!("  {:<9} {token}", token.kind())
	}

	println!("infix:    {}", syntax::DisplayTokens(&compiler.infix(pattern)?));
	println!("postfix:  {}", syntax::DisplayTokens(&compiler.postfix(pattern)?));

	let explanations = syntax::explain(&syntax::group_quantifiers(tokens));
	if !explanations.is_empty() {
		println!("explanation:");
		for e in explanations {
			println!("  {e}")
		}
	}

	Ok(())
}

fn print_graph(graph: &Graph, format: Format, dot: impl FnOnce() -> String) -> Result<(), Error> {
	match format {
		Format::Table => println!("{}", graph.definition()),
		Format::Yaml => print!("{}", serde_yaml::to_string(graph)?),
		Format::Dot => println!("{}", dot()),
	}

	Ok(())
}

fn print_nfa(nfa: &NFA, format: Format) -> Result<(), Error> {
	print_graph(&Graph::from_nfa(nfa), format, || nfa.dot().to_string())
}

fn print_dfa(dfa: &DFA, format: Format) -> Result<(), Error> {
	print_graph(&Graph::from_dfa(dfa), format, || dfa.dot().to_string())
}

fn graph_to_regex(path: &Path, deterministic: bool) -> Result<String, Error> {
	let content = fs::read_to_string(path).map_err(|e| Error::Io(path.to_owned(), e))?;
	let graph: Graph = serde_yaml::from_str(&content)?;

	let nfa = if deterministic {
		DFA::try_from(&graph)?.to_nfa()
	} else {
		graph.to_nfa()?
	};

	Ok(nfa.to_regex()?)
}

fn run(matches: ArgMatches) -> Result<(), Error> {
	let options = options(&matches);
	log::debug!("options: {options:?}");
	let mut compiler = Compiler::new(options);

	match matches.subcommand() {
		Some(("tokens", sub)) => {
			let pattern = sub.get_one::<String>("pattern").map(String::as_str).unwrap_or_default();
			print_tokens(&compiler, pattern)
		}
		Some(("nfa", sub)) => {
			let pattern = sub.get_one::<String>("pattern").map(String::as_str).unwrap_or_default();
			print_nfa(&compiler.compile(pattern)?, Format::from_matches(sub))
		}
		Some(("dfa", sub)) => {
			let pattern = sub.get_one::<String>("pattern").map(String::as_str).unwrap_or_default();
			let mut compiler = Compiler::new(Options {
				minimize: !sub.get_flag("no-minimize"),
				..options
			});
			print_dfa(&compiler.compile_dfa(pattern)?, Format::from_matches(sub))
		}
		Some(("regex", sub)) => match sub.get_one::<PathBuf>("graph") {
			Some(path) => {
				println!("{}", graph_to_regex(path, sub.get_flag("dfa"))?);
				Ok(())
			}
			None => Ok(()),
		},
		_ => Ok(()),
	}
}

fn main() -> ExitCode {
	env_logger::init();

	match run(command().get_matches()) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			log::debug!("{e:?}");
			eprintln!("error: {e}");
			ExitCode::FAILURE
		}
	}
}

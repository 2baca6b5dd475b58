use clap::Parser;

use bitmeta::engine::{use_command, Cli};

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	let cli = Cli::parse();
	if let Err(err) = use_command(cli) {
		eprintln!("Error: {:#}", err);
		std::process::exit(1);
	}
}

//! Command-line entry point for the Safe transaction decoder.
//!
//! `safe-decoder decode` classifies a list of Safe transactions and
//! `safe-decoder hash` computes the EIP-712 digests owners sign. Results are
//! written to stdout as JSON; logs go to stderr.

use clap::{Parser, Subcommand};
use decoder_config::Config;
use decoder_core::TransactionDecoder;
use std::path::PathBuf;

mod commands {
	pub mod decode;
	pub mod hash;
}
mod factory_registry;

/// Command-line arguments for the decoder.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Classify a JSON array of `{ to, value?, data? }` transactions
	Decode {
		/// Chain the transactions belong to
		#[arg(long)]
		chain_id: u64,
		/// JSON file with the transactions
		#[arg(short, long)]
		input: PathBuf,
	},
	/// Compute domain, SafeTx and SafeMessage digests
	Hash {
		/// JSON file with `{ chain_id, safe, version?, transaction?, message? }`
		#[arg(short, long)]
		input: PathBuf,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();

	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Invalid config path: {}", args.config.display()))?;
	let config = Config::from_file(config_path).await?;

	let output = match args.command {
		Command::Decode { chain_id, input } => {
			let chain = config.chain_name(chain_id).unwrap_or("unknown");
			tracing::info!(chain_id, chain, "Starting decode [{}]", config.service.id);

			let resolver = factory_registry::build_resolver(&config)?;
			let decoder = TransactionDecoder::new(resolver);
			commands::decode::run(&decoder, chain_id, &input).await?
		},
		Command::Hash { input } => serde_json::to_value(commands::hash::run(&input).await?)?,
	};

	println!("{}", serde_json::to_string_pretty(&output)?);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_decode_arguments() {
		let args = Args::try_parse_from([
			"safe-decoder",
			"--config",
			"custom.toml",
			"decode",
			"--chain-id",
			"11155111",
			"--input",
			"txs.json",
		])
		.unwrap();

		assert_eq!(args.config, PathBuf::from("custom.toml"));
		assert_eq!(args.log_level, "info");
		match args.command {
			Command::Decode { chain_id, input } => {
				assert_eq!(chain_id, 11155111);
				assert_eq!(input, PathBuf::from("txs.json"));
			},
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[test]
	fn test_hash_arguments_with_defaults() {
		let args =
			Args::try_parse_from(["safe-decoder", "-l", "debug", "hash", "-i", "request.json"])
				.unwrap();

		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "debug");
		assert!(matches!(args.command, Command::Hash { .. }));
	}

	#[test]
	fn test_decode_requires_chain_id() {
		assert!(Args::try_parse_from(["safe-decoder", "decode", "--input", "txs.json"]).is_err());
	}
}

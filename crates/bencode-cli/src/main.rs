//! `bencode` CLI: convert bencode (`.torrent`) files to and from JSON.
//!
//! ## Usage
//!
//! ```sh
//! # Bencode to pretty-printed JSON (stdin → stdout)
//! bencode to-json < file.torrent
//!
//! # From file to file
//! bencode to-json -i file.torrent -o file.json
//!
//! # JSON back to bencode
//! bencode from-json -i file.json -o file.torrent
//!
//! # Infohash of the torrent
//! bencode info-hash -i file.torrent
//!
//! # Indented tree summary
//! bencode show -i file.torrent
//! ```
//!
//! Byte strings that are not printable ASCII appear in JSON with `%xx`
//! escapes, so `to-json` followed by `from-json` reproduces the input exactly.
//! Set `RUST_LOG=bencode_core=debug` to trace the codec.

use anyhow::{Context, Result};
use bencode_core::{Bencode, Options};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bencode",
    version,
    about = "Bencode (.torrent) <-> JSON converter"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    codec: CodecArgs,
}

/// Flags mapped onto `bencode_core::Options`.
#[derive(Args)]
struct CodecArgs {
    /// Extra dictionary key whose string value is binary (repeatable)
    #[arg(long = "hex-key", global = true, value_name = "KEY")]
    hex_keys: Vec<String>,

    /// Do not treat pieces/originator/certificate/signature as binary
    #[arg(long, global = true)]
    no_default_hex_keys: bool,

    /// Maximum list/dictionary nesting accepted by the parser
    #[arg(long, global = true, value_name = "LEVELS")]
    max_depth: Option<usize>,
}

impl CodecArgs {
    fn to_options(&self) -> Options {
        let mut options = Options::default();
        if self.no_default_hex_keys {
            options = options.without_hex_keys();
        }
        for key in &self.hex_keys {
            options = options.with_hex_key(key);
        }
        if let Some(max_depth) = self.max_depth {
            options = options.with_max_depth(max_depth);
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert bencode to JSON
    ToJson {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Convert JSON to bencode
    FromJson {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the SHA-1 infohash of the info dictionary
    InfoHash {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Print the value tree, one node per line
    Show {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bencode_core=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let options = cli.codec.to_options();

    match cli.command {
        Commands::ToJson { input, output } => {
            let tree = read_tree(input.as_deref(), &options)?;
            let json = bencode_core::to_json(&tree);
            let mut pretty = serde_json::to_string_pretty(&json)?;
            pretty.push('\n');
            write_output(output.as_deref(), pretty.as_bytes())?;
        }
        Commands::FromJson { input, output } => {
            let raw = read_input(input.as_deref())?;
            let json = String::from_utf8(raw).context("JSON input is not valid UTF-8")?;
            let bencode = bencode_core::json_to_raw(&json, &options)
                .context("Failed to convert JSON to bencode")?;
            write_output(output.as_deref(), &bencode)?;
        }
        Commands::InfoHash { input } => {
            let tree = read_tree(input.as_deref(), &options)?;
            let hash = bencode_core::info_hash_hex(&tree)
                .context("input has no info dictionary")?;
            println!("{}", hash);
        }
        Commands::Show { input } => {
            let tree = read_tree(input.as_deref(), &options)?;
            let mut lines = String::new();
            render_tree(&tree, 0, None, &mut lines);
            print!("{}", lines);
        }
    }

    Ok(())
}

/// Read and parse bencode input; empty input is an error at this level.
fn read_tree(path: Option<&str>, options: &Options) -> Result<Bencode> {
    let raw = read_input(path)?;
    tracing::debug!(bytes = raw.len(), "read bencode input");
    bencode_core::parse_with(&raw, options)
        .context("Failed to parse bencode input")?
        .context("input contains no bencode value")
}

/// One line per node, children indented by two spaces. List items are
/// prefixed with their index.
fn render_tree(node: &Bencode, depth: usize, index: Option<usize>, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    if let Some(index) = index {
        out.push_str(&format!("[{}] ", index));
    }
    out.push_str(&node.to_display_string());
    out.push('\n');

    let list = node.is_list();
    for (i, child) in node.children().iter().enumerate() {
        render_tree(child, depth + 1, list.then_some(i), out);
    }
}

fn read_input(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("Failed to read file: {}", path)),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content)
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

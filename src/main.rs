// src/main.rs
use clap::{ArgAction, Parser};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use hzip::config::{DEFAULT_BUFFER_SIZE, Options};
use hzip::{archive, logger};

const EXIT_USAGE: u8 = 2;
const EXIT_COMPRESS: u8 = 3;
const EXIT_DECOMPRESS: u8 = 4;

#[derive(Parser)]
#[command(name = "hzip", version = "0.1.0")]
#[command(about = "Compress a file with Huffman coding, or restore a .hzip file.", long_about = None)]
struct Cli {
    /// File to compress, or a .hzip file to decompress. Prompted for when omitted.
    path: Option<String>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Size in bytes of the internal I/O buffers
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE as u64, value_parser = clap::value_parser!(u64).range(1..))]
    buffer_size: u64,
}

fn prompt_path() -> io::Result<String> {
    println!("Enter the file that you want to compress or decompress:");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    logger::init(logger::level_for(cli.verbose, cli.quiet));

    let path = match cli.path {
        Some(p) => p,
        None => match prompt_path() {
            Ok(p) if !p.is_empty() => p,
            Ok(_) => {
                tracing::error!("no file given");
                return ExitCode::from(EXIT_USAGE);
            }
            Err(e) => {
                tracing::error!(error = %e, "could not read a path from stdin");
                return ExitCode::from(EXIT_USAGE);
            }
        },
    };

    let span = tracing::info_span!("command_execution", path = %path);
    let _enter = span.enter();

    let decompressing = hzip::path::is_container(&path);
    let options = Options::with_buffer_size(usize::try_from(cli.buffer_size).unwrap_or(usize::MAX));
    match archive::run(&path, &options) {
        Ok(outcome) => {
            println!("{}", outcome.summary());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(kind = ?e.kind(), "{e}");
            if decompressing {
                eprintln!("Error: File could not be decompressed: {e}");
                ExitCode::from(EXIT_DECOMPRESS)
            } else {
                eprintln!("Error: File could not be compressed: {e}");
                ExitCode::from(EXIT_COMPRESS)
            }
        }
    }
}

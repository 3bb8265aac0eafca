//! zipflate CLI
//!
//! Raw DEFLATE streams, ZIP archives, CRC-32 checksums and PDF
//! `/FlateDecode` stream objects from the command line.

mod commands;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use commands::{
    CompressionLevel, cmd_compress, cmd_crc32, cmd_decompress, cmd_pdf_stream, cmd_zip,
};
use std::io;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "zipflate")]
#[command(author, version, about = "Pure Rust DEFLATE, ZIP and PDF stream tool")]
#[command(long_about = "
zipflate compresses raw DEFLATE streams, builds ZIP archives and wraps PDF
content streams with /FlateDecode. Use '-' for standard input or output.

Examples:
  zipflate compress page.txt -o page.deflate
  zipflate decompress page.deflate -o page.txt
  zipflate decompress object.bin --offset 2
  zipflate zip fonts.zip regular.ttf bold.ttf
  zipflate crc32 regular.ttf bold.ttf
  zipflate pdf-stream content.txt -o content.stream
  zipflate pdf-stream content.stream --decode
")]
struct Cli {
    /// Log level for diagnostics on stderr
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a raw DEFLATE stream
    #[command(alias = "c")]
    Compress {
        /// Input file ('-' for stdin)
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Match search effort
        #[arg(short = 'l', long, value_enum, default_value = "normal")]
        compression: CompressionLevel,

        /// Write stored blocks only
        #[arg(long)]
        stored: bool,
    },

    /// Decompress a raw DEFLATE stream
    #[command(alias = "d")]
    Decompress {
        /// Input file ('-' for stdin)
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Byte offset where the stream starts
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Create a ZIP archive
    #[command(alias = "z")]
    Zip {
        /// Output archive ('-' for stdout)
        archive: PathBuf,

        /// Files to add to the archive
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Match search effort
        #[arg(short = 'l', long, value_enum, default_value = "normal")]
        compression: CompressionLevel,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,

        /// Print one line per entry
        #[arg(short, long)]
        verbose: bool,

        /// Print the entry list as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print CRC-32 checksums of files
    Crc32 {
        /// Files to checksum
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Wrap content in a PDF /FlateDecode stream object, or unwrap one
    PdfStream {
        /// Input file ('-' for stdin)
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Decode a stream object instead of creating one
        #[arg(short, long)]
        decode: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Diagnostic verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn init_logging(level: LogLevel) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(level))
        .with_target(true)
        .with_writer(io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install logger: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            compression,
            stored,
        } => cmd_compress(&input, output.as_deref(), compression, stored),
        Commands::Decompress {
            input,
            output,
            offset,
        } => cmd_decompress(&input, output.as_deref(), offset),
        Commands::Zip {
            archive,
            files,
            compression,
            progress,
            verbose,
            json,
        } => cmd_zip(&archive, &files, compression, progress, verbose, json),
        Commands::Crc32 { files, json } => cmd_crc32(&files, json),
        Commands::PdfStream {
            input,
            output,
            decode,
        } => cmd_pdf_stream(&input, output.as_deref(), decode),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "zipflate", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

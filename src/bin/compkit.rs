#![warn(rust_2018_idioms)]

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::exit;

use clap::Parser;
use log::{error, info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use compkit::config::PipelineSpec;
use compkit::metrics::evaluate;
use compkit::Compression;

const DEFAULT_PIPELINE: &str = "bwt:block_size=512+mtf+rle+huffman";
const EXTENSION: &str = ".ck";

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Compress, decompress or test a file through a pipeline of lossless codecs",
    long_about = "
    Codecs are chained with '+' and take optional parameters after ':', for example
    'lz77:window_size=4096,lookahead_buffer_size=18+huffman'. Available codecs are
    rle, rle-pair, mtf, bwt, huffman (ha), lz77, lzss, lz78 and lzw.

    Decompression must use the same pipeline that produced the file."
)]
struct Args {
    /// Filename of file to process
    #[clap()]
    filename: String,

    /// Perform compression on the input file (default)
    #[clap(short = 'z', long = "compress")]
    compress: bool,

    /// Perform decompression on the input file
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Compress and decompress in memory and print a report; nothing is written
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Codec pipeline description
    #[clap(short = 'p', long = "pipeline", default_value = DEFAULT_PIPELINE)]
    pipeline: String,

    /// Output file (default: add .ck when compressing, remove it when decompressing)
    #[clap(short = 'o', long = "output")]
    output: Option<String>,

    /// Send output to the terminal
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Hex-encode the output; when decompressing, the input is read as hex
    #[clap(short = 'x', long = "hex")]
    hex: bool,

    /// Force overwriting output file
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Sets verbosity. -v0 is silent, -v5 traces every block
    #[clap(short = 'v', default_value_t = 2)]
    v: u8,
}

/// Compress, decompress or test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Zip,
    Unzip,
    Test,
}

impl Args {
    fn mode(&self) -> Result<Mode, String> {
        match (self.compress, self.decompress, self.test) {
            (_, false, false) => Ok(Mode::Zip),
            (false, true, false) => Ok(Mode::Unzip),
            (false, false, true) => Ok(Mode::Test),
            _ => Err("choose only one of -z, -d and -t".to_string()),
        }
    }
}

fn level_filter(v: u8) -> LevelFilter {
    match v {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Output name used when `-o` is not given.
fn default_output(input: &str, mode: Mode) -> String {
    match mode {
        Mode::Unzip => match input.strip_suffix(EXTENSION) {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => format!("{}.out", input),
        },
        Mode::Zip | Mode::Test => format!("{}{}", input, EXTENSION),
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mode = args.mode()?;
    let spec: PipelineSpec = args.pipeline.parse()?;
    let pipeline = spec.build()?;
    info!("Pipeline: {}", spec);

    let mut data = fs::read(&args.filename)?;
    info!("Read {} bytes from {}", data.len(), args.filename);

    let result = match mode {
        Mode::Test => {
            let report = evaluate(&pipeline, &data)?;
            println!("{}", report);
            if !report.round_trip_ok {
                return Err(format!("{}: round trip mismatch", args.filename).into());
            }
            return Ok(());
        }
        Mode::Zip => pipeline.compress(&data)?,
        Mode::Unzip => {
            if args.hex {
                let text = String::from_utf8_lossy(&data);
                data = hex::decode(text.trim())?;
            }
            pipeline.decompress(&data)?
        }
    };

    let result = if args.hex && mode == Mode::Zip {
        hex::encode(&result).into_bytes()
    } else {
        result
    };

    if args.stdout {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&result)?;
        stdout.flush()?;
        return Ok(());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.filename, mode));
    if Path::new(&output).exists() {
        if !args.force {
            return Err(format!("{} already exists, use -f to overwrite", output).into());
        }
        warn!("Overwriting {}", output);
    }
    fs::write(&output, &result)?;
    info!("Wrote {} bytes to {}", result.len(), output);
    Ok(())
}

fn main() {
    let args = Args::parse();

    // Logs go to stderr so `-c` output stays clean.
    if let Err(e) = TermLogger::init(
        level_filter(args.v),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("compkit: logging unavailable: {}", e);
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        eprintln!("compkit: {}", e);
        exit(1);
    }
}

use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use smile_tool::copy::{copy_all, copy_segmented};
use smile_tool::verify::verify;
use smile_tool::{Error, JsonReader, JsonWriter, SmileOptions, SmileReader, SmileWriter, TokenWrite};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read};
use std::path::PathBuf;
use std::process;

/// Convert between JSON and Smile encodings of the same data.
#[derive(Parser)]
#[command(
    name = "smile-tool",
    group(ArgGroup::new("mode").required(true)),
    after_help = "If no file is given, reads from stdin. Always writes to stdout."
)]
struct Opts {
    /// Encode JSON (text) input as Smile.
    #[arg(short = 'e', group = "mode")]
    encode: bool,

    /// Decode Smile encoded input as JSON.
    #[arg(short = 'd', group = "mode")]
    decode: bool,

    /// Encode JSON (text) input as Smile, read it back and verify; writes
    /// nothing but the verification summary.
    #[arg(short = 'v', group = "mode")]
    verify: bool,

    /// The input file.
    file: Option<PathBuf>,
}

fn main() {
    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                process::exit(0);
            }
            _ => {
                let _ = e.print();
                process::exit(1);
            }
        },
    };

    // the original Jackson tool's configuration: all shared back-references
    // for size, 7-bit safe binary, a header but no trailing end marker, and
    // headerless input accepted
    let mut options = SmileOptions::new();
    options
        .shared_properties(true)
        .shared_strings(true)
        .raw_binary(false)
        .write_header(true)
        .write_end_marker(false)
        .require_header(false);

    if let Err(e) = run(&opts, &options) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(opts: &Opts, options: &SmileOptions) -> Result<(), Error> {
    if opts.encode {
        encode(open_input(opts)?, options)
    } else if opts.decode {
        decode(open_input(opts)?, options)
    } else {
        let verified = match &opts.file {
            // the input is single-pass, so verification needs two handles
            Some(path) => verify(open_file(path)?, open_file(path)?, options)?,
            None => {
                let mut buf = vec![];
                io::stdin().lock().read_to_end(&mut buf)?;
                verify(&buf[..], &buf[..], options)?
            }
        };
        println!("{}", verified);
        Ok(())
    }
}

fn encode(input: Box<dyn BufRead>, options: &SmileOptions) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut reader = JsonReader::from_reader(input);
    let mut writer = SmileWriter::new(BufWriter::new(stdout.lock()), options)?;
    copy_all(&mut reader, &mut writer)?;
    writer.close()
}

fn decode(input: Box<dyn BufRead>, options: &SmileOptions) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut reader = SmileReader::from_reader(input, options);
    let mut writer = JsonWriter::new(BufWriter::new(stdout.lock()));
    copy_segmented(&mut reader, &mut writer)?;
    writer.close()
}

fn open_input(opts: &Opts) -> Result<Box<dyn BufRead>, Error> {
    match &opts.file {
        Some(path) => Ok(Box::new(open_file(path)?)),
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn open_file(path: &PathBuf) -> Result<BufReader<File>, Error> {
    if !path.exists() {
        eprintln!("File '{}' does not exist.", path.display());
        process::exit(1);
    }
    Ok(BufReader::new(File::open(path)?))
}

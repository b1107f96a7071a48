//! Read an AFP file or files and print a human-readable version of every
//! structured field.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use afpread::fields::{sfi_ext_flag, sfi_pad_flag, sfi_seg_flag, SF_TYPES};
use afpread::functions::FUNCTIONS;
use afpread::triplets::TRIPLET_TYPES;
use afpread::{stream, ParserConfig, Record, Value};

#[derive(Parser, Debug)]
#[command(
    name = "dumpafp",
    about = "Read an AFP file or files and output a human-readable version"
)]
struct Args {
    /// an AFP file
    #[arg(value_name = "afp-file", required = true)]
    afp_files: Vec<PathBuf>,

    /// allow structured fields not supported by the parser in the output
    #[arg(long)]
    allow_unknown_fields: bool,

    /// allow functions not supported by the parser in the output
    #[arg(long)]
    allow_unknown_functions: bool,

    /// allow triplets not supported by the parser in the output
    #[arg(long)]
    allow_unknown_triplets: bool,

    /// print debugging information to stderr
    #[arg(long)]
    debug: bool,

    /// the filename for the output (defaults to stdout)
    #[arg(long, short)]
    outfile: Option<PathBuf>,

    /// enable strict parsing - missing mandatory fields are not allowed
    #[arg(long)]
    strict: bool,

    /// print warning information to stderr
    #[arg(long)]
    warn: bool,
}

fn print_line(out: &mut dyn Write, text: &str, indent: usize) -> Result<()> {
    writeln!(out, "{:indent$}{}", "", text, indent = indent)?;
    Ok(())
}

/// Print the parameters of a structured field, triplet or control sequence,
/// expanding nested record lists recursively.
fn print_params(out: &mut dyn Write, params: &Record, ignore: &[&str], indent: usize) -> Result<()> {
    for (name, value) in params.iter() {
        if ignore.contains(&name) {
            continue;
        }
        match value {
            Value::Records(items) if name.starts_with("Triplets") => {
                print_line(out, &format!("{}:", name), indent)?;
                for (i, triplet) in items.iter().enumerate() {
                    print_line(out, &format!("__Triplet {}__", i + 1), indent + 4)?;
                    let t_id = triplet.num("Tid").unwrap_or(0) as u8;
                    let description = TRIPLET_TYPES
                        .get(&t_id)
                        .map(|t| format!(" ({})", t.name))
                        .unwrap_or_default();
                    print_line(
                        out,
                        &format!("Tlength: {}", triplet.num("Tlength").unwrap_or(0)),
                        indent + 4,
                    )?;
                    print_line(out, &format!("Tid: 0x{:02X}{}", t_id, description), indent + 4)?;
                    print_params(out, triplet, &["Tlength", "Tid"], indent + 4)?;
                }
            }
            Value::Records(items) if name.starts_with("PTOCAdat") => {
                print_line(out, &format!("{}:", name), indent)?;
                for (i, function) in items.iter().enumerate() {
                    print_line(out, &format!("__Function {}__", i + 1), indent + 4)?;
                    let fn_type = function.num("TYPE").unwrap_or(0) as u8;
                    let description = FUNCTIONS
                        .get(&fn_type)
                        .map(|f| format!(" ({} {})", f.abbreviation, f.name))
                        .unwrap_or_default();
                    print_line(
                        out,
                        &format!("LENGTH: {}", function.num("LENGTH").unwrap_or(0)),
                        indent + 4,
                    )?;
                    print_line(out, &format!("TYPE: 0x{:02X}{}", fn_type, description), indent + 4)?;
                    print_params(out, function, &["LENGTH", "TYPE"], indent + 4)?;
                }
            }
            Value::Records(items) => {
                print_line(out, &format!("{}:", name), indent)?;
                for (i, group) in items.iter().enumerate() {
                    print_line(out, &format!("__Group {}__", i + 1), indent + 4)?;
                    print_params(out, group, &[], indent + 4)?;
                }
            }
            _ => print_line(out, &format!("{}: {}", name, value), indent)?,
        }
    }
    Ok(())
}

fn print_structured_field(out: &mut dyn Write, sf: &Record) -> Result<()> {
    let sf_type_id = sf.num("SFTypeID").unwrap_or(0) as u32;
    let description = SF_TYPES
        .get(&sf_type_id)
        .map(|t| format!(" ({} {})", t.abbreviation, t.name))
        .unwrap_or_default();
    let flag_byte = sf.num("FlagByte").unwrap_or(0) as u8;
    print_line(out, &format!("SFLength: {}", sf.num("SFLength").unwrap_or(0)), 0)?;
    print_line(out, &format!("SFTypeID: 0x{:06X}{}", sf_type_id, description), 0)?;
    print_line(out, &format!("FlagByte: 0x{:02X}", flag_byte), 0)?;
    print_line(out, &format!("ExtFlag: {}", sfi_ext_flag(flag_byte)), 4)?;
    print_line(out, &format!("SegFlag: {}", sfi_seg_flag(flag_byte)), 4)?;
    print_line(out, &format!("PadFlag: {}", sfi_pad_flag(flag_byte)), 4)?;
    if let Some(reserved) = sf.get("Reserved") {
        print_line(out, &format!("Reserved: {}", reserved), 0)?;
    }
    if sfi_ext_flag(flag_byte) {
        print_line(out, &format!("ExtLength: {}", sf.num("ExtLength").unwrap_or(0)), 0)?;
        if let Some(ext_data) = sf.get("ExtData") {
            print_line(out, &format!("ExtData: {}", ext_data), 0)?;
        }
    }
    for (code, message) in sf.exceptions() {
        print_line(out, &format!("Exception: (0x{:02X}) {}", code, message), 0)?;
    }
    print_params(
        out,
        sf,
        &["SFLength", "SFTypeID", "FlagByte", "Reserved", "ExtLength", "ExtData"],
        0,
    )
}

/// Print a single AFP file to the output.
fn dump_afp_file(infile: File, out: &mut dyn Write, config: ParserConfig) -> Result<()> {
    for (i, sf) in stream(infile, config).enumerate() {
        let sf = sf?;
        print_line(out, &format!("__Structured Field {}__", i + 1), 0)?;
        print_structured_field(out, &sf)?;
    }
    Ok(())
}

fn dump_afp_files(afp_files: &[PathBuf], out: &mut dyn Write, config: ParserConfig) -> Result<()> {
    for filename in afp_files {
        let infile = File::open(filename)
            .with_context(|| format!("no such file: {}", filename.display()))?;
        if afp_files.len() > 1 {
            print_line(out, &format!("__File {}__", filename.display()), 0)?;
        }
        dump_afp_file(infile, out, config)?;
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = ParserConfig {
        allow_unknown_fields: args.allow_unknown_fields,
        allow_unknown_triplets: args.allow_unknown_triplets,
        allow_unknown_functions: args.allow_unknown_functions,
        strict: args.strict,
    };
    match &args.outfile {
        Some(path) => {
            let mut outfile = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            dump_afp_files(&args.afp_files, &mut outfile, config)
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            dump_afp_files(&args.afp_files, &mut out, config)
        }
    }
}

fn main() {
    let args = Args::parse();
    let level = if args.debug {
        LevelFilter::Debug
    } else if args.warn {
        LevelFilter::Warn
    } else {
        LevelFilter::Error
    };
    env_logger::Builder::new().filter_level(level).init();
    if let Err(e) = run(&args) {
        // Writing into a closed pipe (e.g. `dumpafp f | head`) is not a
        // failure of ours.
        if let Some(ioe) = e.downcast_ref::<std::io::Error>() {
            if ioe.kind() == std::io::ErrorKind::BrokenPipe {
                std::process::exit(0);
            }
        }
        eprintln!("dumpafp: error: {:#}", e);
        std::process::exit(1);
    }
}

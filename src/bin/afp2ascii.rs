//! Read an AFP file or files and print the text each page carries and
//! where it is printed.
//!
//! This does not render an image of the document; it lists the positioned
//! text and rules of each page, which is enough to eyeball the content of
//! simple AFP files.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use afpread::fields::{SF_BDT, SF_BPG, SF_EDT, SF_EPG, SF_PTX};
use afpread::functions::{
    FN_C_AMB, FN_C_AMI, FN_C_DBR, FN_C_DIR, FN_C_RMB, FN_C_RMI, FN_C_SCFL, FN_C_TRN, FN_U_AMB,
    FN_U_AMI, FN_U_DBR, FN_U_DIR, FN_U_RMB, FN_U_RMI, FN_U_SCFL, FN_U_TRN,
};
use afpread::{stream, ParserConfig, Record};

#[derive(Parser, Debug)]
#[command(
    name = "afp2ascii",
    about = "Read an AFP file or files and output an ASCII representation"
)]
struct Args {
    /// an AFP file
    #[arg(value_name = "afp-file", required = true)]
    afp_files: Vec<PathBuf>,

    /// the filename for the output (defaults to stdout)
    #[arg(long, short)]
    outfile: Option<PathBuf>,
}

/// Ways the document structure can be malformed for our purposes.
#[derive(thiserror::Error, Debug)]
enum DocumentError {
    #[error("Stream contains nested documents")]
    NestedDocuments,
    #[error("Stream contains nested pages")]
    NestedPages,
    #[error("End page before begin")]
    EndPageBeforeBegin,
    #[error("End document before begin")]
    EndDocumentBeforeBegin,
    #[error("Presentation text outside of a page")]
    TextOutsidePage,
}

/// Where we are in the AFP document.  Some structured fields only make
/// sense relative to previously-processed ones.
#[derive(Default)]
struct ProcessingContext {
    // Between BDT and EDT structured fields.
    in_document: bool,
    // The page being built, between BPG and EPG.
    current_page: Option<Page>,
}

enum Content {
    Text(String),
    InlineRule { length: i64, width: i64 },
    BaselineRule { length: i64, width: i64 },
}

struct PageItem {
    baseline: i64,
    inline: i64,
    font_local_id: i64,
    content: Content,
}

struct Page {
    // Current inline and baseline positions.
    inline: i64,
    baseline: i64,
    font_local_id: i64,
    content: Vec<PageItem>,
}

impl Page {
    fn new() -> Page {
        Page {
            inline: 0,
            baseline: 0,
            font_local_id: 0xFF,
            content: Vec::new(),
        }
    }

    fn place(&mut self, content: Content) {
        self.content.push(PageItem {
            baseline: self.baseline,
            inline: self.inline,
            font_local_id: self.font_local_id,
            content,
        });
    }
}

fn print_page(page: &mut Page, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", "-".repeat(80))?;
    page.content
        .sort_by_key(|item| (item.baseline, item.inline, item.font_local_id));
    for item in &page.content {
        match &item.content {
            Content::Text(text) => writeln!(
                out,
                "({:4}, {:4}): font={:2}, text={}",
                item.baseline, item.inline, item.font_local_id, text
            )?,
            Content::InlineRule { length, width } => writeln!(
                out,
                "({:4}, {:4}): inline draw length={:5}, width={:5}",
                item.baseline, item.inline, length, width
            )?,
            Content::BaselineRule { length, width } => writeln!(
                out,
                "({:4}, {:4}): baseline draw length={:5}, width={:5}",
                item.baseline, item.inline, length, width
            )?,
        }
    }
    writeln!(out, "{}", "-".repeat(80))?;
    Ok(())
}

/// Apply one control sequence to the page being built.
fn process_function(function: &Record, page: &mut Page) {
    let fn_type = function.num("TYPE").unwrap_or(0) as u8;
    match fn_type {
        t if t == FN_C_AMI || t == FN_U_AMI => {
            page.inline = function.num("DSPLCMNT").unwrap_or(0);
        }
        t if t == FN_C_AMB || t == FN_U_AMB => {
            page.baseline = function.num("DSPLCMNT").unwrap_or(0);
        }
        t if t == FN_C_RMI || t == FN_U_RMI => {
            page.inline += function.num("INCRMENT").unwrap_or(0);
        }
        t if t == FN_C_RMB || t == FN_U_RMB => {
            page.baseline += function.num("INCRMENT").unwrap_or(0);
        }
        t if t == FN_C_SCFL || t == FN_U_SCFL => {
            page.font_local_id = function.num("LID").unwrap_or(0xFF);
        }
        t if t == FN_C_TRN || t == FN_U_TRN => {
            let text = function.text("TRNDATA").unwrap_or("").to_string();
            page.place(Content::Text(text));
        }
        t if t == FN_C_DIR || t == FN_U_DIR => {
            if let Some(length) = function.num("RLENGTH") {
                let width = function.num("RWIDTH").unwrap_or(0);
                page.place(Content::InlineRule { length, width });
            }
        }
        t if t == FN_C_DBR || t == FN_U_DBR => {
            if let Some(length) = function.num("RLENGTH") {
                let width = function.num("RWIDTH").unwrap_or(0);
                page.place(Content::BaselineRule { length, width });
            }
        }
        _ => {}
    }
}

/// Apply one structured field to the context, emitting finished pages.
fn process_field(
    sf: &Record,
    context: &mut ProcessingContext,
    out: &mut dyn Write,
) -> Result<()> {
    match sf.num("SFTypeID").unwrap_or(0) as u32 {
        SF_BDT => {
            if context.in_document {
                return Err(DocumentError::NestedDocuments.into());
            }
            context.in_document = true;
            writeln!(out, "{}", "=".repeat(80))?;
        }
        SF_BPG => {
            if context.current_page.is_some() {
                return Err(DocumentError::NestedPages.into());
            }
            context.current_page = Some(Page::new());
        }
        SF_PTX => {
            let page = context
                .current_page
                .as_mut()
                .ok_or(DocumentError::TextOutsidePage)?;
            if let Some(functions) = sf.records("PTOCAdat") {
                for function in functions {
                    process_function(function, page);
                }
            }
        }
        SF_EPG => {
            let mut page = context
                .current_page
                .take()
                .ok_or(DocumentError::EndPageBeforeBegin)?;
            print_page(&mut page, out)?;
        }
        SF_EDT => {
            if !context.in_document {
                return Err(DocumentError::EndDocumentBeforeBegin.into());
            }
            context.in_document = false;
            writeln!(out, "{}", "=".repeat(80))?;
        }
        _ => {}
    }
    Ok(())
}

/// Print a single AFP file to the output.
fn afp_to_ascii(infile: File, out: &mut dyn Write) -> Result<()> {
    let config = ParserConfig {
        allow_unknown_fields: true,
        allow_unknown_triplets: true,
        allow_unknown_functions: true,
        strict: false,
    };
    let mut context = ProcessingContext::default();
    for sf in stream(infile, config) {
        process_field(&sf?, &mut context, out)?;
    }
    Ok(())
}

fn multiple_afp_to_ascii(afp_files: &[PathBuf], out: &mut dyn Write) -> Result<()> {
    for filename in afp_files {
        let infile = File::open(filename)
            .with_context(|| format!("no such file: {}", filename.display()))?;
        if afp_files.len() > 1 {
            writeln!(out, "File: {}", filename.display())?;
        }
        afp_to_ascii(infile, out)?;
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    match &args.outfile {
        Some(path) => {
            let mut outfile = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            multiple_afp_to_ascii(&args.afp_files, &mut outfile)
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            multiple_afp_to_ascii(&args.afp_files, &mut out)
        }
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Error)
        .init();
    if let Err(e) = run(&args) {
        if let Some(ioe) = e.downcast_ref::<std::io::Error>() {
            if ioe.kind() == std::io::ErrorKind::BrokenPipe {
                std::process::exit(0);
            }
        }
        eprintln!("afp2ascii: error: {:#}", e);
        std::process::exit(1);
    }
}

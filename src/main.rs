//! CLI tool for segmenting SEC submissions and extracting filing text

use secfiling::source::read_text_file;
use secfiling::{assemble, segment_with, AssembleOptions, FormFilter, MinLength, SegmentMode};
use std::env;
use std::path::{Path, PathBuf};

const USAGE: &str = "[--list] [--lenient] [--raw-html] [--min-length <n>] [--separator <s>] [--keys] [--form <type>] [--parallel]";

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <submission.txt> {}", args[0], USAGE);
        eprintln!("\nSegments a raw EDGAR submission and prints the form and exhibit text.");
        eprintln!("Use --list to print the segmented documents as JSON instead.");
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);

    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        std::process::exit(1);
    }

    let mut mode = SegmentMode::Strict;
    let mut list = false;
    let mut min_length: i64 = 0;
    let mut separator: Option<String> = None;
    let mut include_keys = false;
    let mut raw_html = false;
    let mut parallel = false;
    let mut form = String::from("8-K");

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--list" => list = true,
            "--lenient" => mode = SegmentMode::Lenient,
            "--raw-html" => raw_html = true,
            "--keys" => include_keys = true,
            "--parallel" => parallel = true,
            "--min-length" | "--separator" | "--form" => {
                let flag = args[i].clone();
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Error: {} requires a value", flag);
                    std::process::exit(1);
                };
                match flag.as_str() {
                    "--min-length" => match value.parse::<i64>() {
                        Ok(n) => min_length = n,
                        Err(_) => {
                            eprintln!("Error: --min-length expects an integer, got {:?}", value);
                            std::process::exit(1);
                        }
                    },
                    "--separator" => separator = Some(value.clone()),
                    _ => form = value.clone(),
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if let Err(e) = run(&path, mode, list, min_length, separator, include_keys, raw_html, parallel, &form) {
        eprintln!("Error processing file: {}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    path: &Path,
    mode: SegmentMode,
    list: bool,
    min_length: i64,
    separator: Option<String>,
    include_keys: bool,
    raw_html: bool,
    parallel: bool,
    form: &str,
) -> secfiling::Result<()> {
    let min_length = MinLength::try_from(min_length)?;
    let raw = read_text_file(path)?;
    let submission = segment_with(&raw, mode)?;

    if list {
        println!("Documents: {}", submission.len());
        for (i, doc) in submission.iter().enumerate() {
            println!("  [{}] {} ({} bytes)", i + 1, doc.doc_type, doc.body.len());
        }
        println!("\n{}", serde_json::to_string_pretty(&submission)?);
        return Ok(());
    }

    let mut options = AssembleOptions::new(min_length)
        .with_raw_html(raw_html)
        .with_keys(include_keys)
        .with_parallel(parallel)
        .with_filter(FormFilter::form_and_exhibits(form)?);
    if let Some(separator) = separator {
        options = options.with_separator(separator);
    }

    let assembled = assemble(&submission, &options)?;
    if let Some(keys) = &assembled.keys {
        println!("{}", keys);
    }
    println!("{}", assembled.text);

    Ok(())
}

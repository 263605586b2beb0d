#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs::File;
use std::io::prelude::*;
use std::io::{self, BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::process::exit;

use tasmc::context::CompileOptions;
use tasmc::diagnostics::{render, Severity};

#[derive(Debug)]
enum Error {
    Io(std::io::Error, IOErrorContext, PathBuf),
    NotImplemented(&'static str),
    CompileFailed,
}

#[derive(Debug)]
enum IOErrorContext {
    ReadInput,
    WriteOutput,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, context, path) => write!(
                f,
                "{} file \"{}\" failed: {}",
                match context {
                    IOErrorContext::ReadInput => "Reading input",
                    IOErrorContext::WriteOutput => "Writing output",
                },
                path.display(),
                err
            ),
            Error::NotImplemented(flag) => write!(
                f,
                "{} requires an external driver (save-file/process-control collaborator) this build does not include",
                flag
            ),
            Error::CompileFailed => write!(f, "compilation failed; see diagnostics above"),
        }
    }
}

fn init_logging(verbose: u64, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", level);
    }
    pretty_env_logger::init();
}

fn main() {
    let matches = app_from_crate!()
        .arg(Arg::with_name("INPUT").help("TASM source file to compile").required(true).index(1))
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("PATH")
                .help("Where to write the assembled object-stream (or namespace JSON). Defaults to stdout."),
        )
        .arg(Arg::with_name("verbose").short("v").long("verbose").multiple(true).help("Increase log verbosity (repeatable)"))
        .arg(Arg::with_name("quiet").short("q").long("quiet").help("Suppress all but error-level log output"))
        .arg(Arg::with_name("no-warn").long("no-warn").help("Disable warning diagnostics"))
        .arg(Arg::with_name("no-routine-text").long("no-routine-text").help("Exclude debug routine-number/name text markers"))
        .arg(Arg::with_name("show-namespace").long("show-namespace").help("Write the namespace JSON instead of the object-stream"))
        .arg(Arg::with_name("slow").long("slow").help("Disable object-position squishing (useful for debugging in the editor)"))
        .arg(Arg::with_name("superfast").long("superfast").help("Accepted for CLI-surface parity with the reference driver; this build has no interpreter subprocess to forward it to"))
        .arg(Arg::with_name("no-write").long("no-write").help("Compile and validate but do not write any output"))
        .arg(Arg::with_name("group-offset").long("group-offset").takes_value(true).value_name("N").help("Start numbering groups at N"))
        .arg(Arg::with_name("coll-block-offset").long("coll-block-offset").takes_value(true).value_name("N").help("Start numbering collision blocks at N"))
        .arg(Arg::with_name("mem-ptr-pos").long("mem-ptr-pos").takes_value(true).value_name("N").help("Counter id used for the memory pointer index (default 9999)"))
        .arg(Arg::with_name("disable-bit-packing").long("disable-bit-packing").help("Disable large-constant bit-packing"))
        .arg(Arg::with_name("interpret").long("interpret").help("Write the namespace JSON (an external host-engine simulator's input) instead of an object-stream"))
        .arg(Arg::with_name("append").long("append").help("Not implemented in this build"))
        .arg(Arg::with_name("read-only").long("read-only").help("Not implemented in this build"))
        .arg(Arg::with_name("index").long("index").takes_value(true).value_name("N").help("Not implemented in this build"))
        .arg(Arg::with_name("runner").long("runner").help("Not implemented in this build"))
        .get_matches();

    let verbose = matches.occurrences_of("verbose");
    let quiet = matches.is_present("quiet");
    init_logging(verbose, quiet);

    if let Err(err) = run(&matches) {
        eprintln!("{}", err);
        exit(1);
    }
}

fn run(matches: &clap::ArgMatches) -> Result<(), Error> {
    for (flag, name) in [
        ("append", "--append"),
        ("read-only", "--read-only"),
        ("index", "--index"),
        ("runner", "--runner"),
    ] {
        if matches.is_present(flag) {
            return Err(Error::NotImplemented(name));
        }
    }

    let input_path = Path::new(matches.value_of("INPUT").unwrap());
    let source = read_input(input_path)?;

    let mut options = CompileOptions {
        squish: !matches.is_present("slow"),
        warnings_enabled: !matches.is_present("no-warn"),
        routine_text_enabled: !matches.is_present("no-routine-text"),
        bit_packing_enabled: !matches.is_present("disable-bit-packing"),
        ..CompileOptions::default()
    };
    options.group_offset = parse_offset(matches, "group-offset")?;
    options.coll_block_offset = parse_offset(matches, "coll-block-offset")?;
    if let Some(raw) = matches.value_of("mem-ptr-pos") {
        let ptrpos: u32 = raw.parse().map_err(|_| Error::NotImplemented("--mem-ptr-pos requires an integer"))?;
        options.ptrpos_id = ptrpos.min(tasmc::constants::MAX_PTRPOS_ID);
    }

    let run = tasmc::compile(&source, options);

    let source_lines: Vec<&str> = source.lines().collect();
    for diag in run.diagnostics.iter() {
        if diag.severity == Severity::Warning && !options.warnings_enabled {
            continue;
        }
        let line = source_lines.get(diag.line.saturating_sub(1) as usize).copied().unwrap_or("");
        let rendered = render(diag, line);
        match diag.severity {
            Severity::Error => log::error!("{}", rendered),
            Severity::Warning => log::warn!("{}", rendered),
        }
    }

    if run.has_errors() {
        return Err(Error::CompileFailed);
    }

    if matches.is_present("no-write") {
        return Ok(());
    }

    let write_namespace = matches.is_present("show-namespace") || matches.is_present("interpret");
    let payload: Vec<u8> = if write_namespace {
        let interchange = tasmc::namespace::to_interchange(&run.namespace);
        let mut buf = Vec::new();
        tasm_namespace::write_json(&mut buf, &interchange).map_err(|err| {
            Error::Io(err, IOErrorContext::WriteOutput, PathBuf::from("<namespace json>"))
        })?;
        buf
    } else {
        run.output.object_stream.clone().into_bytes()
    };

    write_output(matches.value_of("output"), &payload)
}

fn parse_offset(matches: &clap::ArgMatches, name: &'static str) -> Result<i32, Error> {
    match matches.value_of(name) {
        Some(raw) => raw.parse().map_err(|_| Error::NotImplemented("invalid integer offset")),
        None => Ok(0),
    }
}

fn read_input(path: &Path) -> Result<String, Error> {
    let file = File::open(path).map_err(|err| Error::Io(err, IOErrorContext::ReadInput, path.to_owned()))?;
    let mut reader = BufReader::new(file);
    let mut source = String::new();
    reader
        .read_to_string(&mut source)
        .map_err(|err| Error::Io(err, IOErrorContext::ReadInput, path.to_owned()))?;
    Ok(source)
}

fn write_output(path: Option<&str>, payload: &[u8]) -> Result<(), Error> {
    match path {
        Some(path) => {
            let path = PathBuf::from(path);
            let mut writer = BufWriter::new(
                File::create(&path).map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, path.clone()))?,
            );
            writer
                .write_all(payload)
                .map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, path.clone()))?;
            Ok(())
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(payload)
                .map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, PathBuf::from("<stdout>")))?;
            Ok(())
        }
    }
}

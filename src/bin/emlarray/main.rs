//! emlarray CLI - Tool for inspecting and resolving array descriptors.

use emlarray::array::{DenseArray, Resolver, ValueArray};
use emlarray::store::RawFileStore;
use emlarray::Result;
use std::env;
use std::fs;

use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Verbosity levels selected by global flags
#[derive(Clone, Copy)]
enum Verbosity {
    Quiet,
    Normal,
    Debug,
    Trace,
}

impl Verbosity {
    fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

fn init_tracing(verbosity: Verbosity) {
    // RUST_LOG wins over the command line flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut verbosity = Verbosity::Normal;
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => verbosity = Verbosity::Debug,
            "-vv" | "--trace" => verbosity = Verbosity::Trace,
            "-q" | "--quiet" => verbosity = Verbosity::Quiet,
            _ => filtered_args.push(arg),
        }
    }
    init_tracing(verbosity);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        // Info command - describe the encoding without reading content
        "info" | "i" => {
            let Some(&path) = filtered_args.get(1) else {
                usage_error("emlarray info <desc.json>");
            };
            cmd_info(path)
        }

        // Resolve command - print the dense values
        "resolve" | "r" => {
            let Some(&path) = filtered_args.get(1) else {
                usage_error("emlarray resolve <desc.json> [--store DIR] [--json]");
            };
            let opts = Options::parse(&filtered_args[2..]);
            cmd_resolve(path, &opts)
        }

        // Stats command - recomputed statistics as JSON
        "stats" | "s" => {
            let Some(&path) = filtered_args.get(1) else {
                usage_error("emlarray stats <desc.json> [--store DIR]");
            };
            let opts = Options::parse(&filtered_args[2..]);
            cmd_stats(path, &opts)
        }

        "-V" | "--version" | "version" => {
            print_version();
            Ok(())
        }

        // Help
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn usage_error(usage: &str) -> ! {
    eprintln!("Error: missing file argument");
    eprintln!("Usage: {}", usage);
    std::process::exit(1);
}

fn print_version() {
    let date = option_env!("EMLARRAY_BUILD_DATE").unwrap_or("unknown");
    let time = option_env!("EMLARRAY_BUILD_TIME").unwrap_or("unknown");
    println!("emlarray {} (built {} {})", env!("CARGO_PKG_VERSION"), date, time);
}

fn print_help() {
    println!("emlarray - encoded value array toolkit");
    println!();
    println!("USAGE:");
    println!("    emlarray [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info    <desc.json>                       Show encoding, kind, length and external windows");
    println!("    r, resolve <desc.json> [--store DIR] [--json] Print resolved values");
    println!("    s, stats   <desc.json> [--store DIR]         Print recomputed statistics as JSON");
    println!("    h, help                                      Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!("    -V, --version    Show version and build stamp");
    println!();
    println!("EXAMPLES:");
    println!("    emlarray info depth.json                   # Describe an array");
    println!("    emlarray resolve depth.json --store data   # Read external parts from ./data");
    println!("    emlarray resolve depth.json --json         # Values as a JSON array");
    println!();
    println!("NOTES:");
    println!("    - A store directory holds flat binary files and a catalog.json");
    println!("    - RUST_LOG overrides the verbosity flags");
}

/// Per-command options
#[derive(Default)]
struct Options<'a> {
    store: Option<&'a str>,
    json: bool,
}

impl<'a> Options<'a> {
    fn parse(args: &[&'a str]) -> Self {
        let mut opts = Options::default();
        let mut iter = args.iter();
        while let Some(&arg) = iter.next() {
            match arg {
                "--json" | "-j" => opts.json = true,
                "--store" | "-s" => opts.store = iter.next().copied(),
                other => eprintln!("Ignoring unknown argument: {}", other),
            }
        }
        opts
    }

    fn open_store(&self) -> Result<Option<RawFileStore>> {
        self.store.map(RawFileStore::open).transpose()
    }
}

fn load_descriptor(path: &str) -> Result<ValueArray> {
    info!("Loading descriptor: {}", path);
    let text = fs::read_to_string(path)?;
    let array: ValueArray = serde_json::from_str(&text)?;
    debug!(variant = array.variant_name(), "descriptor parsed");
    Ok(array)
}

fn with_resolver<T>(opts: &Options<'_>, f: impl FnOnce(&Resolver<'_>) -> Result<T>) -> Result<T> {
    let store = opts.open_store()?;
    match &store {
        Some(s) => f(&Resolver::with_store(s)),
        None => f(&Resolver::new()),
    }
}

fn cmd_info(path: &str) -> Result<()> {
    let array = load_descriptor(path)?;

    println!("Descriptor: {}", path);
    println!("Encoding:        {}", array.variant_name());
    println!("Element kind:    {}", array.element_kind());
    println!("Count per value: {}", array.count_per_value);
    match array.static_len() {
        Some(n) => println!("Length:          {}", n),
        None => println!("Length:          (requires content)"),
    }
    match array.validate() {
        Ok(()) => println!("Valid:           yes"),
        Err(e) => println!("Valid:           no ({})", e),
    }
    if array.declared_statistics.is_some() {
        println!("Declared statistics: present");
    }

    let requests = array.external_requests();
    if !requests.is_empty() {
        println!();
        println!("External windows ({}):", requests.len());
        for (i, req) in requests.iter().enumerate() {
            println!("  [{}] {} ({} values)", i, req, req.len());
        }
    }
    Ok(())
}

fn cmd_resolve(path: &str, opts: &Options<'_>) -> Result<()> {
    let array = load_descriptor(path)?;
    let dense = with_resolver(opts, |r| r.resolve(&array))?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&dense_to_json(&dense)?)?);
    } else {
        print_dense(&dense, 0)?;
    }
    Ok(())
}

fn cmd_stats(path: &str, opts: &Options<'_>) -> Result<()> {
    let array = load_descriptor(path)?;
    with_resolver(opts, |r| {
        let stats = r.statistics(&array)?;
        println!("{}", serde_json::to_string_pretty(&stats)?);
        if !r.check_declared_statistics(&array)? {
            eprintln!("Note: declared statistics disagree with the array content");
        }
        Ok(())
    })
}

/// Convert a resolved array to nested JSON arrays.
fn dense_to_json(dense: &DenseArray) -> Result<serde_json::Value> {
    use serde_json::Value;
    match dense {
        DenseArray::Flat { values, count_per_value } => {
            let scalars = (0..values.len())
                .filter_map(|i| values.get(i))
                .map(serde_json::to_value)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            if *count_per_value == 1 {
                return Ok(Value::Array(scalars));
            }
            Ok(Value::Array(
                scalars
                    .chunks(*count_per_value)
                    .map(|tuple| Value::Array(tuple.to_vec()))
                    .collect(),
            ))
        }
        DenseArray::Jagged(jagged) => jagged
            .iter()
            .map(|sub| sub.and_then(|s| dense_to_json(&s)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
    }
}

/// Print one logical position per line.
fn print_dense(dense: &DenseArray, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    match dense {
        DenseArray::Flat { values, count_per_value } => {
            let cpv = *count_per_value;
            for pos in 0..dense.len() {
                let tuple: Vec<String> = (pos * cpv..(pos + 1) * cpv)
                    .filter_map(|i| values.get(i))
                    .map(|s| s.to_string())
                    .collect();
                println!("{}[{}] {}", indent, pos, tuple.join(" "));
            }
        }
        DenseArray::Jagged(jagged) => {
            for (i, sub) in jagged.iter().enumerate() {
                let sub = sub?;
                println!("{}[{}] ({} values)", indent, i, sub.len());
                print_dense(&sub, depth + 1)?;
            }
        }
    }
    Ok(())
}

//! stream-path-engine CLI
//!
//! Reconstruct stream payment paths from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Reconstruct every stream of a transaction snapshot
//! stream-path-engine reconstruct --input tx.json
//!
//! # Output as JSON, rejecting decompositions that hit the path cap
//! stream-path-engine reconstruct --input tx.json --format json --cap-policy reject
//!
//! # Generate a random circular stream for testing
//! stream-path-engine generate --paths 8 --hops 5 --circular --seed 42
//! ```

use std::fs;
use std::process;
use stream_path_engine::core::config::{CapPolicy, ReconstructionConfig};
use stream_path_engine::reconstruction::engine::PathReconstructor;
use stream_path_engine::reconstruction::transaction::TransactionSnapshot;
use stream_path_engine::simulation::generator::{generate_stream, StreamConfig};

fn print_usage() {
    eprintln!(
        r#"stream-path-engine — reconstruct multi-hop payment paths of stream events

USAGE:
    stream-path-engine <COMMAND> [OPTIONS]

COMMANDS:
    reconstruct Reconstruct the paths of every stream in a transaction snapshot
    generate    Generate a random transaction snapshot (for testing)
    help        Show this message

OPTIONS (reconstruct):
    --input <FILE>        Path to JSON transaction snapshot
    --format <FORMAT>     Output format: text (default) or json
    --config <FILE>       Path to JSON reconstruction config
    --max-paths <N>       Maximum paths per stream (default: 100)
    --cap-policy <POLICY> partial (default) or reject

OPTIONS (generate):
    --paths <N>         Number of routes (default: 5)
    --hops <N>          Maximum hops per route (default: 4)
    --circular          Route the payment back into its sender
    --seed <N>          Seed for reproducible output
    --output <FILE>     Write to file instead of stdout

Set RUST_LOG=info (or debug) to see reconstruction progress.

EXAMPLES:
    stream-path-engine reconstruct --input tx.json
    stream-path-engine reconstruct --input tx.json --format json --max-paths 10
    stream-path-engine generate --paths 20 --hops 6 --output tx.json
    stream-path-engine generate --circular --seed 7"#
    );
}

fn required_value(args: &[String], i: usize, message: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{}", message);
        process::exit(1);
    })
}

fn required_number(args: &[String], i: usize, message: &str) -> usize {
    args.get(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("{}", message);
            process::exit(1);
        })
}

fn load_snapshot(path: &str) -> TransactionSnapshot {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected a transaction snapshot, e.g. the output of `generate`.");
        process::exit(1);
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    })
}

fn cmd_reconstruct(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut config_path = None;
    let mut max_paths = None;
    let mut cap_policy = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(required_value(args, i, "--input requires a file path"));
            }
            "--format" => {
                i += 1;
                format = required_value(args, i, "--format requires 'text' or 'json'");
            }
            "--config" => {
                i += 1;
                config_path = Some(required_value(args, i, "--config requires a file path"));
            }
            "--max-paths" => {
                i += 1;
                max_paths = Some(required_number(args, i, "--max-paths requires a number"));
            }
            "--cap-policy" => {
                i += 1;
                let value = required_value(args, i, "--cap-policy requires 'partial' or 'reject'");
                cap_policy = Some(value.parse::<CapPolicy>().unwrap_or_else(|e| {
                    eprintln!("{}", e);
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let mut config = match config_path {
        Some(path) => ReconstructionConfig::from_file(&path).unwrap_or_else(|e| {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }),
        None => ReconstructionConfig::default(),
    };
    if let Some(max_paths) = max_paths {
        config = config.with_max_paths(max_paths);
    }
    if let Some(cap_policy) = cap_policy {
        config = config.with_cap_policy(cap_policy);
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        process::exit(1);
    }

    let snapshot = load_snapshot(&path);
    let report = PathReconstructor::new(config).reconstruct_transaction(&snapshot);

    if format == "json" {
        println!("{}", to_json(&report));
    } else {
        println!("{}", report);
    }

    if !report.is_clean() {
        process::exit(2);
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = StreamConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--paths" => {
                i += 1;
                config.path_count = required_number(args, i, "--paths requires a number");
            }
            "--hops" => {
                i += 1;
                config.max_hops = required_number(args, i, "--hops requires a number");
            }
            "--circular" => config.circular = true,
            "--seed" => {
                i += 1;
                config.seed = Some(required_number(args, i, "--seed requires a number") as u64);
            }
            "--output" => {
                i += 1;
                output_path = Some(required_value(args, i, "--output requires a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let snapshot = generate_stream(&config);
    let json = to_json(&snapshot);

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} transfers across {} routes → {}",
            snapshot.transfers.len(),
            config.path_count,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "reconstruct" => cmd_reconstruct(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}

//! lzh: command-line front end for the hybrid codec.
//!
//! Reads and writes files, keeps the persisted usage counters and prints
//! summaries. All coding happens in `lzh_core`.

mod config;
mod input_gen;
mod logger;
mod stats;

use config::{Command, Config, InspectSource};
use lzh_core::introspect::{BitPreview, TreeExport};
use lzh_core::{Codec, Error, Introspection, Metrics, Result};
use std::fs;
use std::process;

/// Dictionary entries and code table rows shown by `inspect`.
const TRACE_PREVIEW: usize = 32;

/// Tree lines printed by `inspect`.
const TREE_PREVIEW: usize = 64;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("error: {msg}");
            eprintln!("run `lzh --help` for usage");
            process::exit(2);
        }
    };

    logger::init(config.verbose);

    if config.print_config {
        config.print();
    }

    let (_, outcome) = execute(&config);
    if let Err(err) = outcome {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Run the command and report its metrics, failed or not.
fn execute(config: &Config) -> (Metrics, Result<()>) {
    let mut metrics = Metrics::new();
    let outcome = run(config, &mut metrics);
    if outcome.is_err() {
        metrics.record_failure();
    }
    metrics.complete();

    if config.command.is_file_codec() {
        if config.print_metrics {
            metrics.print_summary();
        }
        if let Some(path) = &config.metrics_file {
            if let Err(err) = fs::write(path, metrics.export_text()) {
                log::warn!("could not write metrics to {}: {err}", path.display());
            }
        }
    }
    (metrics, outcome)
}

fn run(config: &Config, metrics: &mut Metrics) -> Result<()> {
    match config.command {
        Command::Compress => compress(config, metrics),
        Command::Decompress => decompress(config, metrics),
        Command::Inspect => inspect(config),
        Command::Stats => {
            let snapshot = stats::load(&config.stats_file)?;
            println!("Compressed:   {}", snapshot.compressed);
            println!("Decompressed: {}", snapshot.decompressed);
            Ok(())
        }
        Command::ResetStats => {
            let previous = stats::reset(&config.stats_file)?;
            println!(
                "Counters reset (were compressed={}, decompressed={})",
                previous.compressed, previous.decompressed
            );
            Ok(())
        }
        Command::Help => {
            config::print_help();
            Ok(())
        }
    }
}

/// Paths for a file-to-file command.
fn io_paths(config: &Config) -> Result<(&std::path::Path, std::path::PathBuf)> {
    let input = config
        .input_file
        .as_deref()
        .ok_or_else(|| Error::Config("--in is required".into()))?;
    let output = config
        .output_path()
        .ok_or_else(|| Error::Config("cannot derive output path".into()))?;
    Ok((input, output))
}

fn compress(config: &Config, metrics: &mut Metrics) -> Result<()> {
    let (input_path, output_path) = io_paths(config)?;
    let codec = Codec::new(config.codec)?;

    let input = fs::read(input_path)?;
    let compressed = codec.compress(&input)?;
    fs::write(&output_path, &compressed.container)?;
    metrics.record_compress(&compressed);

    stats::record(&config.stats_file, |counters| {
        counters.record_compress();
    })?;

    println!("✓ Compressed {} -> {}", input_path.display(), output_path.display());
    println!("  Original:  {} bytes", compressed.original_size);
    println!("  Processed: {} bytes", compressed.processed_size);
    println!("  Identity:  {}", if compressed.is_identity { "yes (stored raw)" } else { "no" });
    println!("  Ratio:     {:.1}%", compressed.ratio() * 100.0);
    Ok(())
}

fn decompress(config: &Config, metrics: &mut Metrics) -> Result<()> {
    let (input_path, output_path) = io_paths(config)?;
    let codec = Codec::new(config.codec)?;

    let container = fs::read(input_path)?;
    let restored = codec.decompress(&container)?;
    fs::write(&output_path, &restored)?;
    metrics.record_decompress(container.len() as u64, restored.len() as u64);

    stats::record(&config.stats_file, |counters| {
        counters.record_decompress();
    })?;

    println!("✓ Restored {} -> {}", input_path.display(), output_path.display());
    println!("  {} bytes from a {} byte container", restored.len(), container.len());
    Ok(())
}

fn inspect(config: &Config) -> Result<()> {
    let input = match config.inspect_source() {
        Some(InspectSource::File(path)) => fs::read(path)?,
        Some(InspectSource::Text(text)) => text.into_bytes(),
        Some(InspectSource::Sample { bytes, seed }) => {
            log::info!("generating {bytes} sample bytes with seed {seed}");
            input_gen::generate_sample_data(seed, bytes)
        }
        None => return Err(Error::Config("inspect needs an input".into())),
    };

    let codec = Codec::new(config.codec)?;
    let info = codec.introspect(&input)?;
    if config.json {
        let json = serde_json::to_string_pretty(&info).map_err(std::io::Error::from)?;
        println!("{json}");
    } else {
        print_report(&info);
    }
    Ok(())
}

fn print_report(info: &Introspection) {
    let sizes = &info.sizes;
    println!("=== Sizes ===");
    println!("Original:      {} bytes", sizes.original);
    println!("Identity:      {} bytes", sizes.identity);
    println!("Huffman only:  {} bytes", sizes.huffman_only);
    println!("LZW only:      {} bytes (fixed-width codes)", sizes.lzw_only);
    println!("Hybrid:        {} bytes", sizes.hybrid);
    println!("Best:          {}", sizes.best);
    println!(
        "Byte entropy:  {:.3} bits/byte ({} distinct)",
        info.byte_frequencies.entropy(),
        info.byte_frequencies.distinct()
    );
    println!();

    print_bits("Huffman-only bits", &info.huffman_bits);
    print_bits("Hybrid bits", &info.hybrid_bits);
    println!();

    println!("=== Dictionary ({} learned, {} codes emitted) ===", info.dictionary.len(), info.codes.len());
    for entry in info.dictionary.iter().take(TRACE_PREVIEW) {
        println!("{:>6} = {:>6} + {:<4} {:?}", entry.code, entry.parent, info.label(entry.byte as u32), info.label(entry.code));
    }
    if info.dictionary.len() > TRACE_PREVIEW {
        println!("   ... {} more", info.dictionary.len() - TRACE_PREVIEW);
    }
    println!();

    println!("=== Code table ({} symbols) ===", info.code_table.len());
    for (symbol, bits) in info.code_table.iter().take(TRACE_PREVIEW) {
        println!("{:>6} {:<12} {}", symbol, format!("{:?}", info.label(*symbol)), bits);
    }
    if info.code_table.len() > TRACE_PREVIEW {
        println!("   ... {} more", info.code_table.len() - TRACE_PREVIEW);
    }
    println!();

    println!("=== Byte tree (depth {}) ===", info.byte_tree.depth());
    print_tree(&info.byte_tree, info);
    println!();
    println!("=== Code tree (depth {}) ===", info.code_tree.depth());
    print_tree(&info.code_tree, info);
}

fn print_bits(title: &str, preview: &BitPreview) {
    println!("=== {title} ({} total) ===", preview.total_bits);
    for chunk in preview.bits.as_bytes().chunks(64) {
        println!("{}", String::from_utf8_lossy(chunk));
    }
    if preview.is_truncated() {
        println!("... {} more", preview.total_bits - preview.bits.len() as u64);
    }
}

/// Indented rendering, left branch first.
fn print_tree(tree: &TreeExport, info: &Introspection) {
    let mut stack = vec![(tree.root, 0usize, "")];
    let mut printed = 0;
    while let Some((index, depth, edge)) = stack.pop() {
        if printed == TREE_PREVIEW {
            println!("... {} nodes total", tree.nodes.len());
            break;
        }
        printed += 1;

        let node = &tree.nodes[index];
        let indent = "  ".repeat(depth);
        match node.symbol {
            Some(symbol) => println!("{indent}{edge}{:?} ({})", info.label(symbol), node.weight),
            None => println!("{indent}{edge}* ({})", node.weight),
        }
        if let [left, right] = node.children[..] {
            stack.push((right, depth + 1, "1: "));
            stack.push((left, depth + 1, "0: "));
        }
    }
}

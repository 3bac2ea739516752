//! Configuration for the lzh application.
//!
//! Handles parsing command-line arguments and deriving defaults (output
//! names, stats file, sample seed).
//!
//! # Philosophy
//!
//! Every option has a sensible default and the resolved configuration can be
//! printed, so runs are reproducible.

use lzh_core::{lzw, CodecConfig, IdentityRule};
use std::path::{Path, PathBuf};

/// What the tool was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Compress,
    Decompress,
    Inspect,
    Stats,
    ResetStats,
    Help,
}

impl Command {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "compress" => Some(Command::Compress),
            "decompress" => Some(Command::Decompress),
            "inspect" => Some(Command::Inspect),
            "stats" => Some(Command::Stats),
            "reset-stats" => Some(Command::ResetStats),
            "help" => Some(Command::Help),
            _ => None,
        }
    }

    /// Commands that run the codec over a file and produce run metrics.
    pub fn is_file_codec(self) -> bool {
        matches!(self, Command::Compress | Command::Decompress)
    }
}

/// Where `inspect` reads its bytes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectSource {
    File(PathBuf),
    Text(String),
    Sample { bytes: usize, seed: u64 },
}

/// Complete configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub command: Command,

    // === Files ===
    /// Input file path
    pub input_file: Option<PathBuf>,

    /// Output file path (None = derive from input)
    pub output_file: Option<PathBuf>,

    /// Persisted usage counters (JSON)
    pub stats_file: PathBuf,

    /// Where to write run metrics as `key=value` lines
    pub metrics_file: Option<PathBuf>,

    // === Inspect ===
    pub text: Option<String>,
    pub sample_bytes: Option<usize>,
    /// Seed for `--sample`
    pub seed: u64,
    /// Print the inspect report as JSON
    pub json: bool,

    // === Codec ===
    pub codec: CodecConfig,

    // === Behavior ===
    /// Whether to print the resolved configuration
    pub print_config: bool,

    /// Whether to print the run metrics summary
    pub print_metrics: bool,

    /// Debug logging to stderr
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command-line arguments (program name
    /// excluded). The first argument is the command.
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut command: Option<Command> = None;
        let mut input_file: Option<PathBuf> = None;
        let mut output_file: Option<PathBuf> = None;
        let mut stats_file: Option<PathBuf> = None;
        let mut metrics_file: Option<PathBuf> = None;
        let mut text: Option<String> = None;
        let mut sample_bytes: Option<usize> = None;
        let mut seed: Option<u64> = None;
        let mut json = false;
        let mut dictionary_limit: Option<u32> = None;
        let mut allow_equal = false;
        let mut print_config = false;
        let mut print_metrics = true;
        let mut verbose = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--in" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--in requires a path".to_string());
                    }
                    input_file = Some(PathBuf::from(&args[i]));
                }
                "--out" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--out requires a path".to_string());
                    }
                    output_file = Some(PathBuf::from(&args[i]));
                }
                "--stats-file" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--stats-file requires a path".to_string());
                    }
                    stats_file = Some(PathBuf::from(&args[i]));
                }
                "--metrics-file" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--metrics-file requires a path".to_string());
                    }
                    metrics_file = Some(PathBuf::from(&args[i]));
                }
                "--text" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--text requires a string".to_string());
                    }
                    text = Some(args[i].clone());
                }
                "--sample" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--sample requires a number".to_string());
                    }
                    sample_bytes = Some(args[i].parse().map_err(|_| "invalid sample size")?);
                }
                "--seed" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--seed requires a number".to_string());
                    }
                    seed = Some(args[i].parse().map_err(|_| "invalid seed")?);
                }
                "--dict-limit" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--dict-limit requires a number".to_string());
                    }
                    dictionary_limit = Some(args[i].parse().map_err(|_| "invalid dict-limit")?);
                }
                "--json" => {
                    json = true;
                }
                "--allow-equal" => {
                    allow_equal = true;
                }
                "--print-config" => {
                    print_config = true;
                }
                "--no-metrics" => {
                    print_metrics = false;
                }
                "--verbose" | "-v" => {
                    verbose = true;
                }
                "--help" | "-h" => {
                    command = Some(Command::Help);
                }
                word if command.is_none() && !word.starts_with('-') => {
                    command = Some(
                        Command::parse(word).ok_or_else(|| format!("unknown command: {word}"))?,
                    );
                }
                _ => {
                    return Err(format!("unknown argument: {}", args[i]));
                }
            }
            i += 1;
        }

        let command = command.ok_or("missing command")?;

        // Seed is explicit or time-based
        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

        let codec = CodecConfig {
            dictionary_limit: dictionary_limit.unwrap_or(lzw::DEFAULT_DICTIONARY_LIMIT),
            identity_rule: if allow_equal {
                IdentityRule::Larger
            } else {
                IdentityRule::NotSmaller
            },
        };
        codec.validate().map_err(|e| e.to_string())?;

        let config = Config {
            command,
            input_file,
            output_file,
            stats_file: stats_file.unwrap_or_else(|| PathBuf::from("./stats.json")),
            metrics_file,
            text,
            sample_bytes,
            seed,
            json,
            codec,
            print_config,
            print_metrics,
            verbose,
        };
        config.check()?;

        Ok(config)
    }

    /// Cross-option checks that depend on the command.
    fn check(&self) -> Result<(), String> {
        match self.command {
            Command::Compress | Command::Decompress if self.input_file.is_none() => {
                Err("--in is required".to_string())
            }
            _ if self.json && self.command != Command::Inspect => {
                Err("--json only applies to inspect".to_string())
            }
            Command::Inspect => {
                let sources = [
                    self.input_file.is_some(),
                    self.text.is_some(),
                    self.sample_bytes.is_some(),
                ];
                match sources.iter().filter(|&&set| set).count() {
                    1 => Ok(()),
                    0 => Err("inspect needs one of --in, --text or --sample".to_string()),
                    _ => Err("--in, --text and --sample are mutually exclusive".to_string()),
                }
            }
            _ => Ok(()),
        }
    }

    /// Input for `inspect`, if this is an inspect run.
    pub fn inspect_source(&self) -> Option<InspectSource> {
        if let Some(path) = &self.input_file {
            Some(InspectSource::File(path.clone()))
        } else if let Some(text) = &self.text {
            Some(InspectSource::Text(text.clone()))
        } else {
            self.sample_bytes.map(|bytes| InspectSource::Sample {
                bytes,
                seed: self.seed,
            })
        }
    }

    /// Explicit `--out`, or a name derived from the input file.
    pub fn output_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.output_file {
            return Some(path.clone());
        }
        let input = self.input_file.as_deref()?;
        match self.command {
            Command::Compress => Some(compressed_name(input)),
            Command::Decompress => Some(restored_name(input)),
            _ => None,
        }
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Command:     {:?}", self.command);
        println!("Input file:  {}", self.input_file.as_ref().map_or("(none)".into(), |p| p.display().to_string()));
        println!("Output file: {}", self.output_path().map_or("(none)".into(), |p| p.display().to_string()));
        println!("Stats file:  {}", self.stats_file.display());
        if let Some(path) = &self.metrics_file {
            println!("Metrics file: {}", path.display());
        }
        println!();
        println!("=== Codec ===");
        println!("Dictionary limit: {} codes", self.codec.dictionary_limit);
        println!("Identity rule: {:?}", self.codec.identity_rule);
        if self.command == Command::Inspect {
            println!("Seed: {}", self.seed);
        }
        println!();
    }
}

/// `name` -> `name.lzh`
pub fn compressed_name(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".lzh");
    PathBuf::from(name)
}

/// Strip `.lzh` or `.bin`; otherwise append `.restored`.
pub fn restored_name(input: &Path) -> PathBuf {
    match input.extension().and_then(|e| e.to_str()) {
        Some("lzh") | Some("bin") => input.with_extension(""),
        _ => {
            let mut name = input.as_os_str().to_owned();
            name.push(".restored");
            PathBuf::from(name)
        }
    }
}

pub fn print_help() {
    println!("lzh: hybrid LZW + Huffman compressor");
    println!();
    println!("USAGE:");
    println!("    lzh <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    compress                Compress --in into a container");
    println!("    decompress              Restore a container");
    println!("    inspect                 Show dictionary, code table and tree");
    println!("    stats                   Print usage counters");
    println!("    reset-stats             Zero usage counters");
    println!();
    println!("OPTIONS:");
    println!("    --in <PATH>             Input file");
    println!("    --out <PATH>            Output file (default: <in>.lzh / <in> without .lzh)");
    println!("    --dict-limit <N>        LZW dictionary limit, {}..={} (default: {})", lzw::SEED_CODES, lzw::MAX_DICTIONARY_LIMIT, lzw::DEFAULT_DICTIONARY_LIMIT);
    println!("    --allow-equal           Keep hybrid output when it equals the input size");
    println!();
    println!("    --text <STRING>         Inspect a literal string");
    println!("    --sample <BYTES>        Inspect generated sample data");
    println!("    --seed <N>              Seed for --sample (default: time-based)");
    println!("    --json                  Print the inspect report as JSON");
    println!();
    println!("    --stats-file <PATH>     Usage counter file (default: ./stats.json)");
    println!("    --metrics-file <PATH>   Write run metrics after compress/decompress");
    println!("    --print-config          Print resolved configuration");
    println!("    --no-metrics            Don't print metrics summary");
    println!("    --verbose, -v           Debug logging to stderr");
    println!("    --help, -h              Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    lzh compress --in notes.txt                    # Writes notes.txt.lzh");
    println!("    lzh decompress --in notes.txt.lzh              # Writes notes.txt");
    println!("    lzh inspect --text ABABABABAB                  # Show the learned phrases");
    println!("    lzh inspect --sample 4096 --seed 42            # Deterministic sample");
    println!("    lzh inspect --text hello --json                # Machine-readable report");
    println!();
}

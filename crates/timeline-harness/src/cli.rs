#![forbid(unsafe_code)]

//! Command-line argument parsing for the timeline harness.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable defaults via the `TIMELINE_HARNESS_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

use crate::scroll_storm::StormPattern;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Timeline Harness: replay scroll storms through the virtualized card list

USAGE:
    timeline-harness [OPTIONS] [DATA_FILE]

OPTIONS:
    --lane=ID            Only show cards of this lane
    --book=NAME          Only show cards of this book
    --query=TEXT         Case-insensitive search over title, summary and book
    --viewport=PX        Viewport height in pixels (default: 800)
    --pattern=NAME       Storm pattern: sweep (default), fling or jump
    --steps=N            Pattern size: sweep steps, flings or jumps (default: 120)
    --seed=N             Random seed (default: 0)
    --burst=N            Scroll events per frame (default: 4)
    --expand-every=N     Toggle expansion every N frames (default: 0, off)
    --help, -h           Show this help message
    --version, -V        Show version

DATA_FILE defaults to timeline-data.json.

ENVIRONMENT VARIABLES:
    TIMELINE_HARNESS_DATA       Override DATA_FILE
    TIMELINE_HARNESS_VIEWPORT   Override --viewport
    TIMELINE_HARNESS_PATTERN    Override --pattern
    TIMELINE_HARNESS_STEPS      Override --steps
    TIMELINE_HARNESS_SEED       Override --seed
    TIMELINE_LOG                Log filter (default: info)
    TIMELINE_CARD_HEIGHT, TIMELINE_CARD_GAP, TIMELINE_EXPANDED_EXTRA,
    TIMELINE_BOTTOM_MARGIN, TIMELINE_EMPTY_HEIGHT, TIMELINE_OVERSCAN
                                Layout overrides";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Timeline data file.
    pub data: PathBuf,
    pub lane: Option<String>,
    pub book: Option<String>,
    pub query: Option<String>,
    /// Viewport height in pixels.
    pub viewport: u32,
    /// Storm pattern name.
    pub pattern: String,
    /// Pattern size.
    pub steps: usize,
    pub seed: u64,
    /// Scroll events per frame.
    pub burst: usize,
    /// Expansion toggle period in frames (0 = disabled).
    pub expand_every: usize,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            data: PathBuf::from("timeline-data.json"),
            lane: None,
            book: None,
            query: None,
            viewport: 800,
            pattern: "sweep".into(),
            steps: 120,
            seed: 0,
            burst: 4,
            expand_every: 0,
        }
    }
}

/// Outcome of parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse process arguments and environment, exiting on `--help`,
    /// `--version` or invalid input.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args, |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("timeline-harness {VERSION}");
                process::exit(0);
            }
            Err(message) => {
                eprintln!("{message}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with environment lookups through `get`.
    ///
    /// Environment variables take precedence over defaults but are
    /// overridden by explicit command-line flags.
    pub fn parse_from<F>(args: &[String], get: F) -> Result<Command, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = get("TIMELINE_HARNESS_DATA") {
            opts.data = PathBuf::from(val);
        }
        if let Some(val) = get("TIMELINE_HARNESS_VIEWPORT")
            && let Ok(n) = val.parse()
        {
            opts.viewport = n;
        }
        if let Some(val) = get("TIMELINE_HARNESS_PATTERN") {
            opts.pattern = val;
        }
        if let Some(val) = get("TIMELINE_HARNESS_STEPS")
            && let Ok(n) = val.parse()
        {
            opts.steps = n;
        }
        if let Some(val) = get("TIMELINE_HARNESS_SEED")
            && let Ok(n) = val.parse()
        {
            opts.seed = n;
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                other => {
                    if let Some(val) = other.strip_prefix("--lane=") {
                        opts.lane = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--book=") {
                        opts.book = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--query=") {
                        opts.query = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--viewport=") {
                        opts.viewport = parse_number("--viewport", val)?;
                    } else if let Some(val) = other.strip_prefix("--pattern=") {
                        opts.pattern = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--steps=") {
                        opts.steps = parse_number("--steps", val)?;
                    } else if let Some(val) = other.strip_prefix("--seed=") {
                        opts.seed = parse_number("--seed", val)?;
                    } else if let Some(val) = other.strip_prefix("--burst=") {
                        opts.burst = parse_number("--burst", val)?;
                    } else if let Some(val) = other.strip_prefix("--expand-every=") {
                        opts.expand_every = parse_number("--expand-every", val)?;
                    } else if other.starts_with("--") {
                        return Err(format!("Unknown argument: {other}"));
                    } else {
                        opts.data = PathBuf::from(other);
                    }
                }
            }
        }

        if opts.storm_pattern().is_none() {
            return Err(format!("Invalid --pattern value: {}", opts.pattern));
        }
        if opts.viewport == 0 {
            return Err("Invalid --viewport value: 0".into());
        }
        Ok(Command::Run(opts))
    }

    /// The storm pattern named by `pattern`, sized by `steps`.
    pub fn storm_pattern(&self) -> Option<StormPattern> {
        StormPattern::from_name(&self.pattern, self.steps)
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, val: &str) -> Result<T, String> {
    val.parse()
        .map_err(|_| format!("Invalid {flag} value: {val}"))
}

#![forbid(unsafe_code)]

use std::io::{self, BufWriter};
use std::process::ExitCode;

use timeline_core::config::LayoutConfig;
use timeline_core::logging::init_json_subscriber;
use timeline_harness::cli::Opts;

fn main() -> ExitCode {
    let opts = Opts::parse();
    if let Err(err) = init_json_subscriber("info") {
        eprintln!("logging disabled: {err}");
    }

    let parsed = LayoutConfig::from_env_with_diagnostics();
    for error in &parsed.errors {
        tracing::warn!(field = error.field, value = %error.value, "{error}");
    }
    tracing::debug!(layout = %parsed.config.summary_short(), "layout configured");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match timeline_harness::run(&opts, parsed.config, &mut out) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "harness failed");
            eprintln!("timeline-harness: {err}");
            ExitCode::FAILURE
        }
    }
}

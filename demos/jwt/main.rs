//! # jwt viewer
//!
//! Prints the decoded header and claims of every JSON Web Token it reads, one
//! token per line. Signatures are shown but never verified.
//!
//! ```sh
//! cargo run --example jwt -- tokens.txt more-tokens.txt
//! echo "$TOKEN" | cargo run --example jwt
//! ```
//!
//! Input files are positional arguments; with none, tokens are read from stdin.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use multiconfig::{ConfigError, Env, Flags, Loader, Multi};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Serialize, Deserialize, Debug, Default)]
struct JwtConfig {
    files: Vec<String>,
}

multiconfig::record! {
    JwtConfig {
        files(json = "files", argtype = "positional"),
    }
}

/// Decode one base64url segment as a JSON value.
fn decode_segment(segment: &str) -> Result<Value, String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| format!("invalid base64: {e}"))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("invalid JSON: {e}"))
}

/// Decode an unverified token into its display form.
fn decode_token(token: &str) -> Result<Value, String> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    let [header, claims, signature] = parts.as_slice() else {
        return Err(format!(
            "token contains an invalid number of segments ({})",
            parts.len()
        ));
    };
    Ok(json!({
        "header": decode_segment(header)?,
        "claims": decode_segment(claims)?,
        "signature": signature,
    }))
}

fn print_tokens(name: &str, reader: impl BufRead) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(file = name, error = %e, "read failed");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match decode_token(&line).and_then(|v| {
            serde_json::to_string_pretty(&v).map_err(|e| e.to_string())
        }) {
            Ok(out) => println!("{out}"),
            Err(e) => println!("'{line}': {e}"),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut cfg = JwtConfig::default();
    let loader = Multi::new()
        .with(Env::new(""))
        .with(Flags::new().bin_name("jwt"));
    match loader.load(&mut cfg) {
        Ok(()) => {}
        Err(ConfigError::FlagParse(e)) => e.exit(),
        Err(e) => {
            eprintln!("Failed to load config:\n{e}");
            std::process::exit(1);
        }
    }

    if cfg.files.is_empty() {
        print_tokens("<stdin>", io::stdin().lock());
        return;
    }

    for file in &cfg.files {
        match File::open(file) {
            Ok(f) => print_tokens(file, BufReader::new(f)),
            Err(e) => warn!(file = %file, error = %e, "failed to open"),
        }
    }
}

//! # multiconfig test application
//!
//! Loads a record with a little of everything (nested records, every integer
//! width, booleans, lists, maps, positional arguments) from the environment
//! and the command line, then prints the result as JSON.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example testapp -- --help
//! cargo run --example testapp -- --port 9000 --bind 0.0.0.0:80 in.txt out.txt a b c
//! TEST_SERVER_NAME=web1 cargo run --example testapp -- --enable_logging
//! cargo run --example testapp -- --friends '{"ann": 3}' --names '["x","y"]'
//! RUST_LOG=multiconfig=debug cargo run --example testapp
//! ```
//!
//! Flags win over environment variables, which win over the compiled defaults.

mod config;

use multiconfig::{ConfigError, Env, Flags, Loader, Multi};
use tracing_subscriber::EnvFilter;

use config::TestConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut cfg = TestConfig::with_defaults();

    let loader = Multi::new()
        .with(Env::new(""))
        .with(Flags::new().bin_name("testapp"));

    match loader.load(&mut cfg) {
        Ok(()) => {}
        Err(ConfigError::FlagParse(e)) => e.exit(),
        Err(e) => {
            eprintln!("Failed to load config:\n{e}");
            std::process::exit(1);
        }
    }

    match serde_json::to_string_pretty(&cfg) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("Failed to encode config: {e}");
            std::process::exit(1);
        }
    }
}

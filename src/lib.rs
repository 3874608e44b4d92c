//! Bind configuration sources onto a plain struct. Describe the struct once,
//! then load it from the environment, command-line flags and JSON documents.
//!
//! ```ignore
//! #[derive(Default, Serialize, Deserialize)]
//! struct AppConfig {
//!     port: u16,
//!     #[serde(rename = "server_name")]
//!     name: String,
//!     database: Database,
//! }
//!
//! multiconfig::record! {
//!     AppConfig {
//!         port(usage = "port to listen on"),
//!         name(json = "server_name", env = "APP_SERVER_NAME"),
//!         database: record,
//!     }
//! }
//!
//! let mut config = AppConfig::default();
//! Multi::new()
//!     .with(JsonDirs::platform("myapp"))
//!     .with(Env::new("APP"))
//!     .with(Flags::new())
//!     .load(&mut config)?;
//! ```
//!
//! # Records
//!
//! A record lists its fields, in declaration order, through the [`Record`]
//! trait. Each field carries static tags (`json`, `env`, `arg`, `usage`,
//! `argtype`) and is reachable through a typed mutable accessor ([`FieldMut`]).
//! The [`record!`] macro writes the impl. Fields whose type is a nested record
//! are walked recursively; their names are prefixed with the parent's name.
//!
//! # Names
//!
//! A field's setting name comes from the first of its `env` or `json` tags
//! that is present (the command line uses `arg` then `json`), keeping only
//! the text before the first comma. An untagged field uses its lower-cased
//! identifier. A tag of `-` hides the field from name-driven sources. Nested
//! names are joined with `_`: with base `APP`, `database.url` is read from
//! `APP_database_url`.
//!
//! # Sources
//!
//! Every source implements [`Loader`] and mutates the record in place,
//! leaving fields it does not mention untouched.
//!
//! | Source | Reads | Field names |
//! |---|---|---|
//! | [`Env`] | environment variables | `env`, `json`, identifier |
//! | [`Flags`] | `--name=value` flags and positional arguments | `arg`, `json`, identifier |
//! | [`JsonFile`] | one JSON document | serde names |
//! | [`JsonDirs`] | every `*.conf` JSON document in some directories | serde names |
//!
//! Text sources parse numbers with base prefixes (`0x1f`, `0o17`, `0b101`),
//! reject values that do not fit the field's width, and decode lists and maps
//! as JSON.
//!
//! # Layering
//!
//! [`Multi`] runs loaders in order; later ones overwrite earlier ones. The
//! first error stops the load.
//!
//! # Errors
//!
//! Every operation returns [`ConfigError`]. [`ConfigError::kind`] sorts it
//! into one of the [`ErrorKind`]s: bad record description, unparseable input,
//! or a number outside the field's range.

mod convert;
pub mod env;
pub mod error;
pub mod flags;
pub mod json;
mod merge;
pub mod multi;
pub mod naming;
pub mod record;
pub mod walk;

#[cfg(test)]
mod fixtures;

pub use env::Env;
pub use error::{ConfigError, ErrorKind};
pub use flags::Flags;
pub use json::{JsonDirs, JsonFile};
pub use multi::{Loader, Multi};
pub use record::{
    Composite, Field, FieldMut, FieldSpec, FloatMut, Record, SignedMut, Tags, UnsignedMut,
};
pub use walk::{Leaf, Sink, StructuralPath, walk};

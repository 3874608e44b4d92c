use std::collections::HashMap;
use std::ffi::OsString;

use tracing::debug;

use crate::convert;
use crate::error::ConfigError;
use crate::multi::Loader;
use crate::record::Record;
use crate::walk::{self, Leaf, Sink};

type Lookup = Box<dyn Fn(&str) -> Option<OsString>>;

/// Populate leaves from environment variables named by their qualified name.
///
/// The variable for a leaf is the base name (if any) joined with every
/// ancestor's setting name by `_`: with base `APP`, field `website.title`
/// reads `APP_website_title`. Tag-supplied names keep their case; untagged
/// fields use their lower-cased identifier. Absent variables leave the field
/// untouched; a variable that is not valid Unicode is a parse error.
pub struct Env {
    base_name: String,
    lookup: Lookup,
}

impl Env {
    /// Read from the process environment.
    pub fn new(base_name: &str) -> Self {
        Env {
            base_name: base_name.to_string(),
            lookup: Box::new(|name: &str| std::env::var_os(name)),
        }
    }

    /// Read from a fixed set of variables instead of the process environment.
    ///
    /// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
    pub fn from_vars(base_name: &str, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self::from_os_vars(base_name, vars.into_iter().map(|(k, v)| (k, v.into())))
    }

    /// Like [`from_vars`](Env::from_vars), for values that need not be Unicode.
    pub fn from_os_vars(
        base_name: &str,
        vars: impl IntoIterator<Item = (String, OsString)>,
    ) -> Self {
        let vars: HashMap<String, OsString> = vars.into_iter().collect();
        Env {
            base_name: base_name.to_string(),
            lookup: Box::new(move |name: &str| vars.get(name).cloned()),
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }
}

impl<R: Record> Loader<R> for Env {
    fn load(&self, record: &mut R) -> Result<(), ConfigError> {
        let mut sink = EnvSink { env: self };
        walk::walk_root(&self.base_name, &mut sink, record)
    }
}

struct EnvSink<'e> {
    env: &'e Env,
}

impl<'r> Sink<'r> for EnvSink<'_> {
    fn process(&mut self, mut leaf: Leaf<'r>) -> Result<(), ConfigError> {
        let Some(raw) = (self.env.lookup)(&leaf.name) else {
            return Ok(());
        };
        let raw = raw.into_string().map_err(|raw| ConfigError::InvalidValue {
            name: leaf.name.clone(),
            raw: raw.to_string_lossy().into_owned(),
            reason: "not valid unicode".to_string(),
        })?;
        debug!(name = %leaf.name, kind = leaf.value.kind_name(), "assigning from environment");
        convert::assign_text(&leaf.name, &mut leaf.value, &raw)
    }
}

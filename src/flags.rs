//! Command-line flag source.
//!
//! Flags are bound in two passes over a single walk of the record:
//!
//! 1. **Registration.** Every leaf becomes a [`clap::Arg`] whose id is the
//!    leaf's structural path and whose `--long` name is its qualified name
//!    (tag priority `arg`, then `json`, then the lower-cased identifier). The
//!    field's current value is the flag's default. The leaf's accessor is
//!    kept in a per-load registry keyed by path.
//! 2. **Write-back.** After clap has parsed the arguments, the registry is
//!    drained in path order and each value given on the command line is
//!    stored through the accessor it was registered with. Flags that were not
//!    given leave their field alone.
//!
//! Fields tagged `argtype = "positional"` are not flags. A text field takes
//! the next leftover token; a `Vec<String>` field takes all remaining ones.
//! Path order equals declaration order, so positional tokens are handed out in
//! the order the fields are declared.

use std::collections::{BTreeMap, HashMap, VecDeque};

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::debug;

use crate::convert;
use crate::error::ConfigError;
use crate::multi::Loader;
use crate::naming;
use crate::record::{FieldMut, FieldSpec, Record};
use crate::walk::{self, Leaf, Sink, StructuralPath};

/// Tag keys for flag names, highest priority first.
pub const FLAG_KEYS: &[&str] = &["arg", "json"];

/// Help text for flags without a `usage` tag.
pub const DEFAULT_USAGE: &str = "undocumented option";

const POSITIONAL_ID: &str = "__positional";

/// Populate leaves from command-line flags and positional arguments.
#[derive(Debug, Clone)]
pub struct Flags {
    bin_name: String,
    args: Vec<String>,
}

impl Flags {
    /// Parse the arguments of the current process.
    pub fn new() -> Self {
        let mut argv = std::env::args_os().map(|a| a.to_string_lossy().into_owned());
        let bin_name = argv.next().unwrap_or_else(default_bin_name);
        Flags {
            bin_name,
            args: argv.collect(),
        }
    }

    /// Parse `args` instead of the process arguments. The program name must not be included.
    pub fn with_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Flags {
            bin_name: default_bin_name(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Program name shown in usage and error messages.
    pub fn bin_name(mut self, name: &str) -> Self {
        self.bin_name = name.to_string();
        self
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

fn default_bin_name() -> String {
    std::env::args_os()
        .next()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string())
}

fn usage(spec: &FieldSpec) -> &'static str {
    match spec.tags.lookup("usage") {
        Some(text) if !text.is_empty() => text,
        _ => DEFAULT_USAGE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Flag,
    PositionalText,
    PositionalList,
}

struct Entry<'r> {
    id: String,
    leaf: Leaf<'r>,
    slot: Slot,
}

/// Per-load scratch state shared by both passes.
struct Registry<'r> {
    entries: BTreeMap<StructuralPath, Entry<'r>>,
    args: Vec<Arg>,
    /// Flag name to the path key of the leaf that claimed it.
    claimed: HashMap<String, String>,
}

impl Registry<'_> {
    fn new() -> Self {
        let mut claimed = HashMap::new();
        claimed.insert("help".to_string(), "built-in help".to_string());
        Registry {
            entries: BTreeMap::new(),
            args: Vec::new(),
            claimed,
        }
    }

    fn claim(&mut self, flag: &str, id: &str) -> Result<(), ConfigError> {
        if let Some(first) = self.claimed.get(flag) {
            return Err(ConfigError::DuplicateFlag {
                flag: flag.to_string(),
                first: first.clone(),
                second: id.to_string(),
            });
        }
        self.claimed.insert(flag.to_string(), id.to_string());
        Ok(())
    }
}

impl<'r> Sink<'r> for Registry<'r> {
    fn setting_name(&self, spec: &FieldSpec) -> String {
        naming::resolve_name(spec, FLAG_KEYS)
    }

    fn process(&mut self, mut leaf: Leaf<'r>) -> Result<(), ConfigError> {
        let id = leaf.path.to_string();
        let positional = leaf.spec.is_positional();

        let slot = match &mut leaf.value {
            FieldMut::Text(_) if positional => Slot::PositionalText,
            FieldMut::Seq(seq) if positional && seq.is_text_list() => {
                Slot::PositionalList
            }
            value => {
                let arg = flag_arg(&id, &leaf.name, leaf.spec, value)?;
                self.claim(&leaf.name, &id)?;
                self.args.push(arg);
                Slot::Flag
            }
        };

        self.entries
            .insert(leaf.path.clone(), Entry { id, leaf, slot });
        Ok(())
    }
}

/// Build the flag for one leaf, defaulting to the field's current value.
fn flag_arg(
    id: &str,
    name: &str,
    spec: &FieldSpec,
    value: &FieldMut<'_>,
) -> Result<Arg, ConfigError> {
    let arg = Arg::new(id.to_string())
        .long(name.to_string())
        .help(usage(spec))
        .action(ArgAction::Set);

    let arg = match value {
        FieldMut::Signed(slot) => {
            let bits = slot.bits();
            arg.value_name("INT")
                .allow_negative_numbers(true)
                .value_parser(move |s: &str| {
                    convert::parse_signed(s, bits).map_err(|e| e.to_string())
                })
                .default_value(slot.get().to_string())
        }
        FieldMut::Unsigned(slot) => {
            let bits = slot.bits();
            arg.value_name("UINT")
                .allow_negative_numbers(true)
                .value_parser(move |s: &str| {
                    convert::parse_unsigned(s, bits).map_err(|e| e.to_string())
                })
                .default_value(slot.get().to_string())
        }
        FieldMut::Float(slot) => {
            let bits = slot.bits();
            arg.value_name("FLOAT")
                .allow_negative_numbers(true)
                .value_parser(move |s: &str| {
                    convert::parse_float(s, bits).map_err(|e| e.to_string())
                })
                .default_value(slot.get().to_string())
        }
        FieldMut::Bool(current) => arg
            .value_name("BOOL")
            .value_parser(|s: &str| convert::parse_bool(s).map_err(|e| e.to_string()))
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .default_value(current.to_string()),
        FieldMut::Text(current) => arg
            .value_name("STRING")
            .allow_hyphen_values(true)
            .default_value(current.to_string()),
        FieldMut::Seq(composite) | FieldMut::Map(composite) => {
            let encoded = composite
                .to_json()
                .map_err(|source| ConfigError::InvalidJson {
                    name: name.to_string(),
                    raw: String::new(),
                    source,
                })?;
            arg.value_name("JSON")
                .allow_hyphen_values(true)
                .default_value(encoded)
        }
        FieldMut::Record(_) | FieldMut::Unsupported(_) => {
            return Err(ConfigError::UnsupportedKind {
                name: name.to_string(),
                kind: value.kind_name(),
            });
        }
    };
    Ok(arg)
}

fn positional_arg() -> Arg {
    Arg::new(POSITIONAL_ID)
        .value_name("ARGS")
        .help("positional arguments")
        .num_args(0..)
        .action(ArgAction::Append)
}

/// The value given on the command line for `id`. Flags left at their
/// registered default yield `None`, so the field is not rewritten.
fn fetch<'m, T>(matches: &'m ArgMatches, id: &str) -> Option<&'m T>
where
    T: std::any::Any + Clone + Send + Sync + 'static,
{
    if matches.value_source(id) != Some(ValueSource::CommandLine) {
        return None;
    }
    matches.try_get_one::<T>(id).ok().flatten()
}

/// Store the parsed value for one registry entry.
fn write_back(
    matches: &ArgMatches,
    entry: &mut Entry<'_>,
    positional: &mut VecDeque<String>,
) -> Result<(), ConfigError> {
    let Entry { id, leaf, slot: kind } = entry;
    let name = leaf.name.as_str();
    let overflow = |raw: String| ConfigError::Overflow {
        name: name.to_string(),
        raw,
    };

    match kind {
        Slot::PositionalText => {
            if let FieldMut::Text(text) = &mut leaf.value
                && let Some(token) = positional.pop_front()
            {
                **text = token;
            }
        }
        Slot::PositionalList => {
            if let FieldMut::Seq(seq) = &mut leaf.value
                && let Some(list) = seq.as_text_list()
            {
                *list = positional.drain(..).collect();
            }
        }
        Slot::Flag => match &mut leaf.value {
            FieldMut::Signed(slot) => {
                if let Some(&v) = fetch::<i64>(matches, id) {
                    slot.set(v).map_err(|_| overflow(v.to_string()))?;
                }
            }
            FieldMut::Unsigned(slot) => {
                if let Some(&v) = fetch::<u64>(matches, id) {
                    slot.set(v).map_err(|_| overflow(v.to_string()))?;
                }
            }
            FieldMut::Float(slot) => {
                if let Some(&v) = fetch::<f64>(matches, id) {
                    slot.set(v);
                }
            }
            FieldMut::Bool(slot) => {
                if let Some(&v) = fetch::<bool>(matches, id) {
                    **slot = v;
                }
            }
            FieldMut::Text(slot) => {
                if let Some(v) = fetch::<String>(matches, id) {
                    **slot = v.clone();
                }
            }
            FieldMut::Seq(slot) | FieldMut::Map(slot) => {
                if let Some(raw) = fetch::<String>(matches, id) {
                    slot.set_json(raw)
                        .map_err(|source| ConfigError::InvalidJson {
                            name: name.to_string(),
                            raw: raw.clone(),
                            source,
                        })?;
                }
            }
            // Destinations without a flag representation are left alone.
            FieldMut::Record(_) | FieldMut::Unsupported(_) => {}
        },
    }
    Ok(())
}

impl<R: Record> Loader<R> for Flags {
    fn load(&self, record: &mut R) -> Result<(), ConfigError> {
        let mut registry = Registry::new();
        walk::walk_root("", &mut registry, record)?;

        let Registry { entries, args, .. } = registry;
        let flag_count = args.len();
        let command = Command::new(self.bin_name.clone())
            .no_binary_name(true)
            .args_override_self(true)
            .args(args)
            .arg(positional_arg());
        let matches = command.try_get_matches_from(&self.args)?;

        let mut positional: VecDeque<String> = matches
            .get_many::<String>(POSITIONAL_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        debug!(
            flags = flag_count,
            positional = positional.len(),
            "parsed command line"
        );

        for (_, mut entry) in entries {
            write_back(&matches, &mut entry, &mut positional)?;
        }
        if !positional.is_empty() {
            debug!(unused = ?positional, "positional arguments without a destination");
        }
        Ok(())
    }
}

//! Setting-name resolution from field tags.

use crate::record::FieldSpec;

/// Tag value that removes a field from every source.
pub const OPT_OUT: &str = "-";

/// Tag keys consulted by default, highest priority first.
pub const DEFAULT_KEYS: &[&str] = &["env", "json"];

/// Resolve the name of `spec` by trying `keys` in order.
///
/// The first key present wins even when its value is empty. Anything after
/// the first comma is an options segment and is not part of the name. With
/// no tag present the identifier is used, lower-cased. An empty result means
/// the field is skipped.
pub fn resolve_name(spec: &FieldSpec, keys: &[&str]) -> String {
    for key in keys {
        let Some(value) = spec.tags.lookup(key) else {
            continue;
        };
        if value == OPT_OUT {
            return String::new();
        }
        let name = value.split_once(',').map_or(value, |(name, _options)| name);
        return name.to_string();
    }
    spec.ident.to_lowercase()
}

/// Resolve with the default keys (`env`, then `json`).
pub fn setting_name(spec: &FieldSpec) -> String {
    resolve_name(spec, DEFAULT_KEYS)
}

/// Join a qualified prefix and a setting name with `_`.
pub fn qualify(prefix: &str, setting: &str) -> String {
    if prefix.is_empty() {
        setting.to_string()
    } else {
        format!("{prefix}_{setting}")
    }
}

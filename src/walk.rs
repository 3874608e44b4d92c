//! Recursive traversal of a record's fields.
//!
//! The walker turns a nested record into a flat stream of [`Leaf`]s. Each leaf
//! carries its qualified name (ancestor setting names joined with `_`), its
//! structural path (field indices from the root), and a mutable accessor.
//! Nested records are descended into; every other kind is handed to the sink.

use std::fmt;

use crate::error::ConfigError;
use crate::naming;
use crate::record::{FieldMut, FieldSpec, Record};

/// Field-index chain from the record root to a field.
///
/// Ordering compares component-wise, so sorting paths reproduces the order in
/// which the walker visits leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StructuralPath(Vec<usize>);

impl StructuralPath {
    pub fn root() -> Self {
        StructuralPath(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        StructuralPath(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for StructuralPath {
    fn from(indices: Vec<usize>) -> Self {
        StructuralPath(indices)
    }
}

impl fmt::Display for StructuralPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{index}")?;
        }
        f.write_str("]")
    }
}

/// A field a source can assign directly.
#[derive(Debug)]
pub struct Leaf<'r> {
    pub name: String,
    pub spec: &'static FieldSpec,
    pub path: StructuralPath,
    pub value: FieldMut<'r>,
}

/// Receiver of the leaves discovered by [`walk`].
pub trait Sink<'r> {
    /// Setting name for a field. Sources with their own tag priority override this.
    fn setting_name(&self, spec: &FieldSpec) -> String {
        naming::setting_name(spec)
    }

    fn process(&mut self, leaf: Leaf<'r>) -> Result<(), ConfigError>;
}

/// Walk `record`, extending `prefix` and `path` for each field, and hand every
/// leaf to `sink`.
///
/// Fields whose setting name resolves empty, and unexported fields, are
/// skipped. The walk stops at the first unsupported field or sink error.
pub fn walk<'r, S>(
    prefix: &str,
    path: &StructuralPath,
    sink: &mut S,
    record: &'r mut dyn Record,
) -> Result<(), ConfigError>
where
    S: Sink<'r> + ?Sized,
{
    let specs = record.schema();
    let fields = record.fields_mut();
    debug_assert_eq!(specs.len(), fields.len(), "record schema/accessor mismatch");

    for (index, (spec, field)) in specs.iter().zip(fields).enumerate() {
        let setting = sink.setting_name(spec);
        if setting.is_empty() || !spec.exported {
            continue;
        }

        let name = naming::qualify(prefix, &setting);
        let path = path.child(index);
        match field {
            FieldMut::Record(inner) => walk(&name, &path, sink, inner)?,
            FieldMut::Unsupported(kind) => {
                return Err(ConfigError::UnsupportedKind { name, kind });
            }
            value => sink.process(Leaf {
                name,
                spec,
                path,
                value,
            })?,
        }
    }
    Ok(())
}

/// Walk a record from its root with an optional base-name prefix.
pub fn walk_root<'r, S>(base: &str, sink: &mut S, record: &'r mut dyn Record) -> Result<(), ConfigError>
where
    S: Sink<'r> + ?Sized,
{
    walk(base, &StructuralPath::root(), sink, record)
}

use crate::error::ConfigError;

/// A source of values for a record of type `R`.
///
/// Loading mutates the record in place: fields the source recognizes are
/// overwritten, everything else keeps its current value.
pub trait Loader<R: ?Sized> {
    fn load(&self, record: &mut R) -> Result<(), ConfigError>;
}

impl<R: ?Sized, L: Loader<R> + ?Sized> Loader<R> for Box<L> {
    fn load(&self, record: &mut R) -> Result<(), ConfigError> {
        (**self).load(record)
    }
}

/// Apply several loaders to the same record, in order.
///
/// Later loaders overwrite what earlier ones set, so the order is the
/// precedence: `Multi::new().with(Env::new("")).with(Flags::new())` lets flags
/// win over the environment, which wins over the record's own defaults. The
/// first error stops the chain.
pub struct Multi<R: ?Sized> {
    loaders: Vec<Box<dyn Loader<R>>>,
}

impl<R: ?Sized> Multi<R> {
    pub fn new() -> Self {
        Multi {
            loaders: Vec::new(),
        }
    }

    /// Build a chain from already boxed loaders.
    pub fn from_loaders(loaders: Vec<Box<dyn Loader<R>>>) -> Self {
        Multi { loaders }
    }

    /// Append a loader with higher precedence than every loader added so far.
    pub fn with<L: Loader<R> + 'static>(mut self, loader: L) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl<R: ?Sized> Default for Multi<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ?Sized> Loader<R> for Multi<R> {
    fn load(&self, record: &mut R) -> Result<(), ConfigError> {
        for loader in &self.loaders {
            loader.load(record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Env;
    use crate::error::ErrorKind;
    use crate::fixtures::test::{PortConfig, TestConfig};
    use crate::flags::Flags;
    use crate::json::{JsonDirs, JsonFile};
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> Env {
        Env::from_vars(
            "",
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    /// Records that it ran, then optionally fails.
    struct Probe {
        label: &'static str,
        fail: bool,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Loader<PortConfig> for Probe {
        fn load(&self, _record: &mut PortConfig) -> Result<(), ConfigError> {
            self.log.borrow_mut().push(self.label);
            if self.fail {
                return Err(ConfigError::Overflow {
                    name: self.label.into(),
                    raw: String::new(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn flags_after_env_win() {
        let chain = Multi::new()
            .with(env(&[("port", "5")]))
            .with(Flags::with_args(["--port", "9"]));
        let mut cfg = PortConfig { port: 0 };
        chain.load(&mut cfg).unwrap();
        assert_eq!(cfg.port, 9);
    }

    #[test]
    fn env_after_flags_wins() {
        let chain = Multi::new()
            .with(Flags::with_args(["--port", "9"]))
            .with(env(&[("port", "5")]));
        let mut cfg = PortConfig { port: 0 };
        chain.load(&mut cfg).unwrap();
        assert_eq!(cfg.port, 5);
    }

    #[test]
    fn untouched_leaf_keeps_default_in_any_order() {
        let build = |flags_first: bool| -> Multi<TestConfig> {
            let env = env(&[("port", "5")]);
            let flags = Flags::with_args(["--website_title", "t"]);
            if flags_first {
                Multi::new().with(flags).with(env)
            } else {
                Multi::new().with(env).with(flags)
            }
        };
        for order in [true, false] {
            let mut cfg = TestConfig::with_defaults();
            build(order).load(&mut cfg).unwrap();
            assert_eq!(cfg.listen_addr, ":8080");
            assert_eq!(cfg.names, vec!["john", "nick"]);
            assert_eq!(cfg.port, 5);
            assert_eq!(cfg.website.title, "t");
        }
    }

    #[test]
    fn documents_then_env_then_flags() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("10-base.conf"), r#"{"port": 1, "user_missing": 0}"#).unwrap();
        let file = dir.path().join("override.json");
        fs::write(&file, r#"{"port": 2, "server_name": "doc"}"#).unwrap();

        let chain = Multi::new()
            .with(JsonDirs::new([dir.path()]))
            .with(JsonFile::new(&file))
            .with(env(&[("TEST_SERVER_NAME", "env")]))
            .with(Flags::with_args(["--pin", "4"]));
        assert_eq!(chain.len(), 4);

        let mut cfg = TestConfig::with_defaults();
        chain.load(&mut cfg).unwrap();
        assert_eq!(cfg.port, 2);
        assert_eq!(cfg.server_name, "env");
        assert_eq!(cfg.pin, 4);
    }

    #[test]
    fn first_error_stops_the_chain() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let probe = |label, fail| Probe {
            label,
            fail,
            log: Rc::clone(&log),
        };
        let chain = Multi::new()
            .with(probe("a", false))
            .with(probe("b", true))
            .with(probe("c", false));

        let err = chain.load(&mut PortConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn boxed_loaders_chain() {
        let loaders: Vec<Box<dyn Loader<PortConfig>>> = vec![
            Box::new(env(&[("port", "3")])),
            Box::new(Multi::new().with(env(&[("port", "4")]))),
        ];
        let mut cfg = PortConfig::default();
        Multi::from_loaders(loaders).load(&mut cfg).unwrap();
        assert_eq!(cfg.port, 4);
    }

    #[test]
    fn empty_chain_is_a_no_op() {
        let chain: Multi<PortConfig> = Multi::default();
        assert!(chain.is_empty());
        let mut cfg = PortConfig { port: 8 };
        chain.load(&mut cfg).unwrap();
        assert_eq!(cfg.port, 8);
    }
}

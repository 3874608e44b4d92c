#[cfg(test)]
pub mod test {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serialize};

    use crate::record::{Field, FieldMut, FieldSpec, Record};

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct Embedded {
        pub address: String,
        pub age: i32,
        #[serde(skip)]
        pub secret: String,
    }

    crate::record! {
        Embedded {
            address,
            age,
            secret: private,
        }
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct Website {
        pub title: String,
        pub counter: i32,
    }

    crate::record! {
        Website { title, counter }
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct TestConfig {
        pub embedded: Embedded,
        pub server_name: String,
        pub port: i32,
        pub pin: i8,
        #[serde(rename = "upin")]
        pub un_pin: u8,
        pub listen_addr: String,
        pub enable_logging: bool,
        pub ratio: f32,
        pub website: Website,
        pub names: Vec<String>,
        pub friends: BTreeMap<String, i32>,
        pub token: String,
        pub file: String,
        pub file2: String,
        pub args: Vec<String>,
    }

    crate::record! {
        TestConfig {
            embedded: record,
            server_name(json = "server_name", env = "TEST_SERVER_NAME"),
            port(json = "port"),
            pin(json = "pin"),
            un_pin(json = "upin"),
            listen_addr(json = "listen_addr", arg = "bind", usage = "the address to bind our listener to"),
            enable_logging(json = "enable_logging", usage = "enable logging"),
            ratio(json = "ratio"),
            website: record,
            names(json = "names", usage = "a list of names as a json array"),
            friends(json = "friends", usage = "a map of friends to how much I like them"),
            token(json = "-", env = "-"),
            file(json = "file", argtype = "positional"),
            file2(json = "file2", argtype = "positional"),
            args(json = "args", argtype = "positional"),
        }
    }

    impl TestConfig {
        /// Compiled-in defaults, the way an application would seed the record.
        pub fn with_defaults() -> Self {
            TestConfig {
                listen_addr: ":8080".into(),
                port: 22,
                names: vec!["john".into(), "nick".into()],
                ..Default::default()
            }
        }
    }

    /// Single-field record for precedence and directory scenarios.
    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct PortConfig {
        pub port: i32,
    }

    crate::record! {
        PortConfig { port(json = "port") }
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct Inner {
        pub value: u16,
        pub label: String,
    }

    crate::record! {
        Inner { value, label }
    }

    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct Middle {
        pub inner: Inner,
        pub value: u16,
    }

    crate::record! {
        Middle { inner: record, value }
    }

    /// Three levels of nesting, with a leaf name reused at two depths.
    #[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
    pub struct Deep {
        pub middle: Middle,
        pub value: u16,
    }

    crate::record! {
        Deep { middle: record, value }
    }

    /// Hand-written schema declaring a `callback` field no source can assign.
    #[derive(Debug, Default)]
    pub struct Broken {
        pub before: i32,
        pub after: i32,
    }

    impl Record for Broken {
        fn schema(&self) -> &'static [FieldSpec] {
            const FIELDS: &[FieldSpec] = &[
                FieldSpec::new("before", &[], true),
                FieldSpec::new("callback", &[], true),
                FieldSpec::new("after", &[], true),
            ];
            FIELDS
        }

        fn fields_mut(&mut self) -> Vec<FieldMut<'_>> {
            vec![
                self.before.field_mut(),
                FieldMut::Unsupported("fn pointer"),
                self.after.field_mut(),
            ]
        }
    }

    #[test]
    fn defaults_are_seeded() {
        let cfg = TestConfig::with_defaults();
        assert_eq!(cfg.port, 22);
        assert_eq!(cfg.listen_addr, ":8080");
        assert_eq!(cfg.names, vec!["john", "nick"]);
    }
}

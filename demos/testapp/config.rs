//! Configuration record for the test application.
//!
//! Setting names come from the tags in the `record!` block below:
//!
//! | Field                 | Environment           | Flag                  |
//! |-----------------------|-----------------------|-----------------------|
//! | `server_name`         | `TEST_SERVER_NAME`    | `--server_name`       |
//! | `listen_addr`         | `listen_addr`         | `--bind`              |
//! | `embedded.address`    | `embedded_address`    | `--embedded_address`  |
//! | `website.counter`     | `website_counter`     | `--website_counter`   |
//! | `file`, `file2`, `args` | `file`, `file2`, `args` | positional          |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Embedded {
    pub address: String,
    pub age: i64,
}

multiconfig::record! {
    Embedded {
        address,
        age,
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Website {
    pub title: String,
    pub counter: i64,
}

multiconfig::record! {
    Website {
        title,
        counter,
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct TestConfig {
    pub embedded: Embedded,
    pub server_name: String,
    pub port: i64,
    pub pin: i8,
    #[serde(rename = "upin")]
    pub un_pin: u8,
    pub listen_addr: String,
    pub root_dir: String,
    pub user: String,
    pub pass: String,
    pub enable_logging: bool,
    pub website: Website,
    pub names: Vec<String>,
    pub friends: BTreeMap<String, i64>,
    pub file: String,
    pub file2: String,
    pub args: Vec<String>,
}

multiconfig::record! {
    TestConfig {
        embedded: record,
        server_name(json = "server_name", env = "TEST_SERVER_NAME"),
        port(json = "port"),
        pin(json = "pin"),
        un_pin(json = "upin"),
        listen_addr(json = "listen_addr", arg = "bind", usage = "the address to bind our listener to"),
        root_dir(json = "root_dir"),
        user(json = "user"),
        pass(json = "pass"),
        enable_logging(json = "enable_logging", usage = "enable logging"),
        website: record,
        names(json = "names", usage = "a JSON list of names"),
        friends(json = "friends", usage = "a JSON object of friend names and how much I like them"),
        file(json = "file", argtype = "positional"),
        file2(json = "file2", argtype = "positional"),
        args(json = "args", argtype = "positional"),
    }
}

impl TestConfig {
    pub fn with_defaults() -> Self {
        TestConfig {
            listen_addr: ":8080".into(),
            port: 22,
            user: "testuser".into(),
            pass: "nopassword".into(),
            names: vec!["john".into(), "nick".into()],
            ..Default::default()
        }
    }
}

//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a small on-disk library, `repo1`, and a fixture
//! that places it in a temporary directory together with a `project.yaml`.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_library().with_config(configs::PROJECT);
//!     fixture.command().arg("build").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Definition files of the `repo1` test library.
///
/// ```text
/// repo1
/// ├── module1          template src/module1.hpp
/// ├── module2          template src/module2.hpp
/// │   └── submodule3   copies LICENSE
/// ├── other            options foo=123, bar=456
/// └── stm32            only available for target stm32
/// ```
#[allow(dead_code)]
pub mod configs {
    pub const REPOSITORY: &str = r#"
name: repo1
description: Test library
options:
  - name: target
    type: enumeration
    values: [hosted, stm32]
    default: hosted
    description: |
      Target platform

      Selects the platform the generated code runs on.
"#;

    pub const MODULE1: &str = r#"
name: module1
description: First module
files:
  - template: module1.hpp.in
    dest: src/module1.hpp
"#;

    pub const MODULE2: &str = r#"
name: module2
description: Second module
files:
  - template: module2.hpp.in
    dest: src/module2.hpp
"#;

    pub const SUBMODULE3: &str = r#"
name: submodule3
parent: module2
description: Nested module
files:
  - copy: LICENSE
"#;

    pub const OTHER: &str = r#"
name: other
description: Module with options
options:
  - name: foo
    type: numeric
    default: 123
  - name: bar
    type: numeric
    default: 456
files:
  - template: other.txt.in
"#;

    pub const STM32: &str = r#"
name: stm32
description: Hardware support
depends: ["repo1:module1"]
available:
  option: target
  equals: stm32
files:
  - template: stm32.hpp.in
    dest: src/stm32.hpp
"#;

    /// Project using the local `repo1`.
    pub const PROJECT: &str = r#"
repositories:
  - path: repo1/repo.yaml
"#;

    /// Project selecting `other` and overriding its options.
    pub const PROJECT_WITH_OPTIONS: &str = r#"
repositories:
  - path: repo1/repo.yaml
modules: ["repo1:other"]
options:
  "repo1::bar": 768
  "repo1:other:foo": 456
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "repositories: [unclosed";
}

/// A temporary project directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write the `repo1` library below `repo1/`.
    pub fn with_library(self) -> Self {
        self.with_file("repo1/repo.yaml", configs::REPOSITORY)
            .with_file("repo1/module1/module.yaml", configs::MODULE1)
            .with_file("repo1/module1/module1.hpp.in", "// module1 for ${target}\n")
            .with_file("repo1/module2/module.yaml", configs::MODULE2)
            .with_file("repo1/module2/module2.hpp.in", "// module2 costs $$5\n")
            .with_file("repo1/module2/submodule3/module.yaml", configs::SUBMODULE3)
            .with_file("repo1/module2/submodule3/LICENSE", "MIT\n")
            .with_file("repo1/other/module.yaml", configs::OTHER)
            .with_file("repo1/other/other.txt.in", "foo=${foo} bar=${bar}\n")
            .with_file("repo1/stm32/module.yaml", configs::STM32)
            .with_file("repo1/stm32/stm32.hpp.in", "// ${repo1:target}\n")
    }

    /// Add a `project.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file("project.yaml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        self.path().join("project.yaml")
    }

    #[allow(dead_code)]
    pub fn repository_path(&self) -> PathBuf {
        self.path().join("repo1/repo.yaml")
    }

    /// Contents of a file below the fixture, or `None` if it does not exist.
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.path().join(path)).ok()
    }

    /// Create a command configured to run in this fixture's directory,
    /// with an isolated cache.
    #[allow(dead_code)]
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("lbuild");
        cmd.current_dir(self.path())
            .env_remove("LBUILD_CONFIG")
            .env_remove("RUST_LOG")
            .env("LBUILD_CACHE", self.path().join(".cache"));
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

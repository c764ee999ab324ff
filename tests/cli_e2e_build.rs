//! End-to-end tests for the build command.

mod common;

use common::prelude::*;

/// Building writes every available module and the log next to the config.
#[test]
fn test_build_writes_files_and_log() {
    let fixture = TestFixture::new().with_library().with_config(configs::PROJECT);

    fixture
        .command()
        .args(["build", "-p", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 4 file(s)"));

    assert_eq!(
        fixture.read("out/src/module1.hpp").as_deref(),
        Some("// module1 for hosted\n")
    );
    assert_eq!(fixture.read("out/LICENSE").as_deref(), Some("MIT\n"));
    assert_eq!(
        fixture.read("out/other.txt").as_deref(),
        Some("foo=123 bar=456\n")
    );
    assert!(fixture.read("out/src/stm32.hpp").is_none());

    let log = fixture.read("project.yaml.log").expect("build log written");
    assert!(log.starts_with("<?xml"));
    assert!(log.contains("<module>repo1:other</module>"));
    assert!(log.contains("<destination>src/module2.hpp</destination>"));
}

/// Configured modules and options are used when the command line has none.
#[test]
fn test_build_uses_configured_modules_and_options() {
    let fixture = TestFixture::new()
        .with_library()
        .with_config(configs::PROJECT_WITH_OPTIONS);

    fixture.command().arg("build").assert().success();

    assert_eq!(
        fixture.read("other.txt").as_deref(),
        Some("foo=456 bar=768\n")
    );
    assert!(fixture.read("src/module1.hpp").is_none());
}

/// `-m` adds to the configured modules instead of replacing them.
#[test]
fn test_build_command_line_modules_extend_configured() {
    let fixture = TestFixture::new()
        .with_library()
        .with_config(configs::PROJECT_WITH_OPTIONS);

    fixture
        .command()
        .args(["build", "-m", "repo1:module1", "-m", "repo1:other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 2 file(s)"));

    assert_eq!(
        fixture.read("other.txt").as_deref(),
        Some("foo=456 bar=768\n")
    );
    assert_eq!(
        fixture.read("src/module1.hpp").as_deref(),
        Some("// module1 for hosted\n")
    );
    assert!(fixture.read("LICENSE").is_none());
}

/// `-D` overrides win over the configuration file.
#[test]
fn test_build_command_line_overrides() {
    let fixture = TestFixture::new()
        .with_library()
        .with_config(configs::PROJECT_WITH_OPTIONS);

    fixture
        .command()
        .args(["build", "-D", "repo1:other:foo=7"])
        .assert()
        .success();
    assert_eq!(fixture.read("other.txt").as_deref(), Some("foo=7 bar=768\n"));
}

/// A repository option makes a module available and pulls in its dependency.
#[test]
fn test_build_selected_module_with_dependencies() {
    let fixture = TestFixture::new().with_library().with_config(configs::PROJECT);

    fixture
        .command()
        .args(["build", "-D", "repo1:target=stm32", "-m", "repo1:stm32"])
        .assert()
        .success();

    assert_eq!(fixture.read("src/stm32.hpp").as_deref(), Some("// stm32\n"));
    assert_eq!(
        fixture.read("src/module1.hpp").as_deref(),
        Some("// module1 for stm32\n")
    );
    assert!(fixture.read("other.txt").is_none());
}

/// Repositories can be given with `-r` alone.
#[test]
fn test_build_with_repository_argument() {
    let fixture = TestFixture::new().with_library();

    fixture
        .command()
        .args(["build", "-r", "repo1/repo.yaml", "-m", "repo1:module2:*"])
        .assert()
        .success();

    assert_eq!(
        fixture.read("src/module2.hpp").as_deref(),
        Some("// module2 costs $5\n")
    );
    assert!(fixture.read("LICENSE").is_some());
    assert!(fixture.read("project.yaml.log").is_none());
}

/// A dry run lists the files but writes nothing.
#[test]
fn test_build_dry_run() {
    let fixture = TestFixture::new().with_library().with_config(configs::PROJECT);

    fixture
        .command()
        .args(["build", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("src/module1.hpp"))
        .stdout(predicate::str::contains("Dry run: 4 file(s) would be written"));

    assert!(fixture.read("src/module1.hpp").is_none());
    assert!(fixture.read("project.yaml.log").is_none());
}

/// `--no-log` writes the files but no build log.
#[test]
fn test_build_without_log() {
    let fixture = TestFixture::new().with_library().with_config(configs::PROJECT);

    fixture
        .command()
        .args(["build", "--no-log"])
        .assert()
        .success();

    assert!(fixture.read("other.txt").is_some());
    assert!(fixture.read("project.yaml.log").is_none());
}

/// The dependency graph is printed in dot format.
#[test]
fn test_dependencies_graph() {
    let fixture = TestFixture::new().with_library().with_config(configs::PROJECT);

    fixture
        .command()
        .args(["dependencies", "-m", "repo1:module2:submodule3"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph dependencies {"))
        .stdout(predicate::str::contains(
            "\"repo1:module2:submodule3\" -> \"repo1:module2\";",
        ));
}

/// Without `-m` the graph covers every available module, not the configured ones.
#[test]
fn test_dependencies_graph_ignores_configured_modules() {
    let fixture = TestFixture::new()
        .with_library()
        .with_config(configs::PROJECT_WITH_OPTIONS);

    fixture
        .command()
        .arg("dependencies")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"repo1:module1\";"))
        .stdout(predicate::str::contains("\"repo1:other\";"))
        .stdout(predicate::str::contains(
            "\"repo1:module2:submodule3\" -> \"repo1:module2\";",
        ));
}

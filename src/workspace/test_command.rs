use std::path::Path;

/// Marker files probed in priority order, each paired with its test command
///
/// The first marker present wins; later entries are never consulted.
pub const TEST_COMMAND_MARKERS: &[(&str, &str)] = &[
    ("package.json", "npm test"),
    ("pyproject.toml", "pytest"),
    ("setup.py", "pytest"),
    ("pytest.ini", "pytest"),
    ("tox.ini", "pytest"),
    ("Cargo.toml", "cargo test"),
    ("go.mod", "go test ./..."),
    ("pom.xml", "mvn test"),
    ("build.gradle", "gradle test"),
    ("build.gradle.kts", "gradle test"),
    ("Gemfile", "bundle exec rake test"),
    ("Makefile", "make test"),
];

/// Infer the project's test command from marker files in `dir`
pub fn detect_test_command(dir: &Path) -> Option<&'static str> {
    TEST_COMMAND_MARKERS
        .iter()
        .find(|(marker, _)| dir.join(marker).is_file())
        .map(|(_, command)| *command)
}

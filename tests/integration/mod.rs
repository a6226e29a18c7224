// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests
#![allow(dead_code)]

pub mod fixtures;

use contextmark::lexicon::loader::parse_delimited;
use contextmark::{Annotator, AnnotatorConfig, Lexicon};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use fixtures::{MODIFIERS_TSV, TARGETS_TSV};

/// Test fixture helper for creating temporary directories with lexicon and report files
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    /// Create a file with given content, making parent directories as needed
    pub fn create_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Write the standard target and modifier lexicons, returning their paths
    pub fn create_lexicons(&self) -> (PathBuf, PathBuf) {
        (
            self.create_file("lexicons/targets.tsv", TARGETS_TSV),
            self.create_file("lexicons/modifiers.tsv", MODIFIERS_TSV),
        )
    }
}

pub fn targets() -> Lexicon {
    parse_delimited(TARGETS_TSV, '\t', 1).expect("Target lexicon should parse")
}

pub fn modifiers() -> Lexicon {
    parse_delimited(MODIFIERS_TSV, '\t', 1).expect("Modifier lexicon should parse")
}

/// Annotator over the standard lexicons with default configuration
pub fn annotator() -> Annotator {
    Annotator::new(targets(), modifiers())
}

pub fn annotator_with(config: AnnotatorConfig) -> Annotator {
    annotator().with_config(config)
}

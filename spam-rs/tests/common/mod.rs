//! Shared fixtures: an on-disk corpus in a temporary directory

use spam_rs::config::{Config, CorpusConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SPAM_TRAINING: &[(&str, &str)] = &[
    ("s1.eml", "Subject: Win free money\r\n\r\nClaim your free prize now!\r\n"),
    ("s2.eml", "Subject: Cheap pills\r\n\r\nFree shipping on cheap pills.\r\n"),
];

const HAM_TRAINING: &[(&str, &str)] = &[
    ("h1.eml", "Subject: Meeting agenda\r\n\r\nThe agenda for tomorrow's meeting.\r\n"),
    ("h2.eml", "Subject: Lunch\r\n\r\nLunch after the meeting?\r\n"),
];

fn write_message(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Build a corpus with a manifest, two spam and two ham training messages,
/// and `tests` numbered test messages
pub fn setup_corpus(tests: &[&str]) -> (TempDir, Config) {
    let temp = TempDir::new().unwrap();
    let training_dir = temp.path().join("TRAINING");
    let testing_dir = temp.path().join("TESTING");
    fs::create_dir_all(&training_dir).unwrap();
    fs::create_dir_all(&testing_dir).unwrap();

    let mut manifest = String::new();
    for (name, content) in SPAM_TRAINING {
        write_message(&training_dir, name, content);
        manifest.push_str(&format!("0 {}\n", name));
    }
    for (name, content) in HAM_TRAINING {
        write_message(&training_dir, name, content);
        manifest.push_str(&format!("1 {}\n", name));
    }
    let labels_path = temp.path().join("SPAMTrain.label");
    fs::write(&labels_path, manifest).unwrap();

    for (i, content) in tests.iter().enumerate() {
        write_message(&testing_dir, &format!("TEST_{:05}.eml", i), content);
    }

    let config = Config {
        corpus: CorpusConfig {
            labels_path,
            training_dir,
            testing_dir,
            test_sample: 2,
            ..CorpusConfig::default()
        },
        ..Config::default()
    };

    (temp, config)
}

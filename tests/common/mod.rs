/*!
 * Common test utilities for the yasg test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

use yasg::subtitle_processor::Cue;
use yasg::transcript::Token;


/// Routes library logs through the test harness; safe to call repeatedly
pub fn init_test_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample Whisper-style transcript for testing
pub fn create_test_transcript(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"{
  "segments": [
    {
      "words": [
        {"word": "今日は", "start": 0.0, "end": 0.6},
        {"word": "いい", "start": 0.6, "end": 0.9},
        {"word": "天気", "start": 0.9, "end": 1.3},
        {"word": "ですね。", "start": 1.3, "end": 1.8}
      ]
    },
    {
      "words": [
        {"word": "散歩に", "start": 4.0, "end": 4.5},
        {"word": "行きましょう", "start": 4.5, "end": 5.4},
        {"word": "か。", "start": 5.4, "end": 5.9}
      ]
    }
  ]
}"#;
    create_test_file(dir, filename, content)
}

/// Shorthand for a token
pub fn token(text: &str, start: f64, end: f64) -> Token {
    Token::new(text, start, end)
}

/// Shorthand for a cue
pub fn cue(text: &str, start: f64, end: f64) -> Cue {
    Cue::new(text, start, end)
}

/// Deterministic pseudo-random sequence for property-style tests
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    /// Value in `0..bound`
    pub fn below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }
}

/// Ordered tokens of Japanese text with occasional sentence marks and pauses
pub fn generate_tokens(seed: u64, count: usize) -> Vec<Token> {
    const WORDS: [&str; 10] = ["私", "は", "東京", "に", "住んで", "います", "けど", "昨日", "雨", "でした"];
    const MARKS: [&str; 4] = ["。", "！", "？", "、"];

    let mut rng = Lcg::new(seed);
    let mut clock = 0.0;
    let mut tokens = Vec::with_capacity(count);

    for _ in 0..count {
        let mut text = WORDS[rng.below(WORDS.len() as u32) as usize].to_string();
        if rng.below(5) == 0 {
            text.push_str(MARKS[rng.below(MARKS.len() as u32) as usize]);
        }

        let start = clock + f64::from(rng.below(4)) * 0.25;
        let end = start + 0.1 + f64::from(rng.below(8)) * 0.1;
        clock = end;

        tokens.push(Token::new(text, start, end));
    }

    tokens
}

use log::{debug, trace};

use crate::app_config::SegmentationConfig;
use crate::errors::SubtitleError;
use crate::subtitle_processor::{check_time_range, Cue};
use crate::transcript::Token;

// @const: Marks that may close a cue early
const SENTENCE_ENDINGS: [char; 4] = ['。', '！', '？', '、'];

// @const: A sentence mark only closes a cue longer than this many characters...
const SENTENCE_MIN_CHARS: usize = 10;

// @const: ...or lasting longer than this many seconds
const SENTENCE_MIN_DURATION: f64 = 1.0;

/// Why a draft cue was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeRule {
    /// The cue reached the maximum duration
    MaxDuration,
    /// The cue reached the maximum character count
    MaxChars,
    /// The cue ends on sentence punctuation and is long enough to stand alone
    SentenceEnd,
}

/// Groups a token stream into draft cues
///
/// Token texts are concatenated without separators, which suits languages
/// written without spaces between words.
#[derive(Debug, Clone)]
pub struct WordGrouper {
    max_duration: f64,
    max_chars: usize,
}

// @struct: Tokens buffered for the next cue
#[derive(Debug, Default)]
struct Pending {
    text: String,
    chars: usize,
    start: Option<f64>,
    end: f64,
}

impl Pending {
    fn push(mut self, token: &Token) -> Self {
        self.start.get_or_insert(token.start);
        self.text.push_str(&token.text);
        self.chars += token.text.chars().count();
        self.end = token.end;
        self
    }

    fn duration(&self) -> f64 {
        self.start.map_or(0.0, |start| self.end - start)
    }

    // Empty buffers never become cues
    fn into_cue(self) -> Option<Cue> {
        match self.start {
            Some(start) if !self.text.is_empty() => Some(Cue::new(self.text, start, self.end)),
            _ => None,
        }
    }
}

// @struct: Fold state
#[derive(Debug, Default)]
struct GroupState {
    pending: Pending,
    previous_start: Option<f64>,
    cues: Vec<Cue>,
}

impl WordGrouper {
    pub fn new(max_duration: f64, max_chars: usize) -> Self {
        Self { max_duration, max_chars }
    }

    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self::new(config.max_segment_duration, config.max_chars_per_segment)
    }

    /// Group tokens into draft cues
    ///
    /// Tokens must be ordered by start time and carry valid time ranges.
    /// Trailing tokens that met no cut condition are flushed as a last cue.
    pub fn group(&self, tokens: &[Token]) -> Result<Vec<Cue>, SubtitleError> {
        let state = tokens
            .iter()
            .enumerate()
            .try_fold(GroupState::default(), |state, (index, token)| self.step(state, index, token))?;

        let mut cues = state.cues;
        if let Some(cue) = state.pending.into_cue() {
            trace!("Flushing trailing cue at {:.3}s", cue.start);
            cues.push(cue);
        }

        debug!("Grouped {} tokens into {} draft cues", tokens.len(), cues.len());
        Ok(cues)
    }

    fn step(&self, state: GroupState, index: usize, token: &Token) -> Result<GroupState, SubtitleError> {
        check_time_range(index, token.start, token.end)?;
        if let Some(previous_start) = state.previous_start {
            if token.start < previous_start {
                return Err(SubtitleError::OutOfOrder {
                    index,
                    start: token.start,
                    previous_start,
                });
            }
        }

        let GroupState { pending, mut cues, .. } = state;
        let pending = pending.push(token);

        let pending = match self.rule_for(&pending.text, pending.chars, pending.duration()) {
            Some(rule) => {
                trace!("Closing cue at token {} ({:?})", index, rule);
                cues.extend(pending.into_cue());
                Pending::default()
            }
            None => pending,
        };

        Ok(GroupState {
            pending,
            previous_start: Some(token.start),
            cues,
        })
    }

    /// The first cut condition a buffered cue meets, in priority order
    pub fn finalize_rule(&self, text: &str, duration: f64) -> Option<FinalizeRule> {
        self.rule_for(text, text.chars().count(), duration)
    }

    fn rule_for(&self, text: &str, chars: usize, duration: f64) -> Option<FinalizeRule> {
        if duration >= self.max_duration {
            Some(FinalizeRule::MaxDuration)
        } else if chars >= self.max_chars {
            Some(FinalizeRule::MaxChars)
        } else if text.ends_with(SENTENCE_ENDINGS)
            && (chars > SENTENCE_MIN_CHARS || duration > SENTENCE_MIN_DURATION)
        {
            Some(FinalizeRule::SentenceEnd)
        } else {
            None
        }
    }
}

impl Default for WordGrouper {
    fn default() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }
}

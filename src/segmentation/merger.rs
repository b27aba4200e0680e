use log::debug;

use crate::app_config::SegmentationConfig;
use crate::errors::SubtitleError;
use crate::subtitle_processor::Cue;

/// Merges draft cues that are too short, or close enough to share a line
#[derive(Debug, Clone)]
pub struct SegmentMerger {
    min_duration: f64,
    max_chars: usize,
    min_gap: f64,
}

impl SegmentMerger {
    pub fn new(min_duration: f64, max_chars: usize, min_gap: f64) -> Self {
        Self {
            min_duration,
            max_chars,
            min_gap,
        }
    }

    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self::new(
            config.min_segment_duration,
            config.max_chars_per_segment,
            config.min_gap_between_subtitles,
        )
    }

    /// Merge cues in one left-to-right pass
    ///
    /// Merged texts are joined with a single space. Cues are never reordered
    /// or dropped; the count only shrinks through merges.
    pub fn merge(&self, cues: &[Cue]) -> Result<Vec<Cue>, SubtitleError> {
        validate_order(cues)?;

        let Some((first, rest)) = cues.split_first() else {
            return Ok(Vec::new());
        };

        let (current, mut merged) = rest.iter().fold(
            (first.clone(), Vec::with_capacity(cues.len())),
            |(current, mut merged), cue| {
                if self.should_merge(&current, cue) {
                    (join(current, cue), merged)
                } else {
                    merged.push(current);
                    (cue.clone(), merged)
                }
            },
        );
        merged.push(current);

        debug!("Merged {} segments into {} segments", cues.len(), merged.len());
        Ok(merged)
    }

    /// Whether `next` should be folded into `current`
    ///
    /// A cue shorter than the minimum duration absorbs its successor whatever
    /// the resulting length. Otherwise the two merge only when the joined text
    /// fits and the gap between them is under the adjacency threshold.
    pub fn should_merge(&self, current: &Cue, next: &Cue) -> bool {
        let combined_chars = current.char_count() + 1 + next.char_count();
        let gap = next.start - current.end;

        current.duration() < self.min_duration
            || (combined_chars <= self.max_chars && gap < self.min_gap)
    }
}

impl Default for SegmentMerger {
    fn default() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }
}

fn join(mut current: Cue, next: &Cue) -> Cue {
    current.text.push(' ');
    current.text.push_str(&next.text);
    current.end = next.end;
    current
}

fn validate_order(cues: &[Cue]) -> Result<(), SubtitleError> {
    for (index, cue) in cues.iter().enumerate() {
        cue.check_timing(index)?;
    }
    for (index, pair) in cues.windows(2).enumerate() {
        if pair[1].start < pair[0].start {
            return Err(SubtitleError::OutOfOrder {
                index: index + 1,
                start: pair[1].start,
                previous_start: pair[0].start,
            });
        }
    }
    Ok(())
}

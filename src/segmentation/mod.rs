/*!
 * Cue segmentation.
 *
 * Recognized tokens become subtitle cues in two passes:
 *
 * - `grouper`: accumulates tokens into draft cues, cutting on duration,
 *   length and sentence punctuation
 * - `merger`: folds draft cues that are too short or too close together
 *   into their predecessor, within the length limit
 */

pub use self::grouper::{FinalizeRule, WordGrouper};
pub use self::merger::SegmentMerger;

pub mod grouper;
pub mod merger;

use crate::app_config::SegmentationConfig;
use crate::errors::SubtitleError;
use crate::subtitle_processor::Cue;
use crate::transcript::Token;

/// Group tokens into draft cues, then merge them into final cues
pub fn segment(tokens: &[Token], config: &SegmentationConfig) -> Result<Vec<Cue>, SubtitleError> {
    let drafts = WordGrouper::from_config(config).group(tokens)?;
    SegmentMerger::from_config(config).merge(&drafts)
}

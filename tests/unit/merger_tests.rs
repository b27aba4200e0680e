/*!
 * Tests for merging draft cues
 */

use yasg::errors::SubtitleError;
use yasg::segmentation::{SegmentMerger, WordGrouper};
use yasg::subtitle_processor::Cue;
use crate::common::{self, cue};

/// Test a short cue is merged with its neighbour, and a distant one is kept apart
#[test]
fn test_merge_withShortCue_shouldJoinWithSpace() {
    let cues = vec![
        cue("短い", 0.0, 0.5),
        cue("文章", 0.6, 1.0),
        cue("これは長い文章です", 2.5, 4.0),
    ];

    let merged = SegmentMerger::default().merge(&cues).unwrap();

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].text, "短い 文章");
    assert_eq!((merged[0].start, merged[0].end), (0.0, 1.0));
    assert_eq!(merged[1], cues[2]);
}

/// Test adjacent cues merge only while the text fits
#[test]
fn test_merge_withAdjacentCues_shouldRespectMaxChars() {
    let cues = vec![
        cue("これは短い文章", 0.0, 1.0),
        cue("これは別の短い文章", 1.1, 2.0),
        cue("三番目", 2.1, 3.0),
    ];

    let merged = SegmentMerger::new(1.0, 20, 1.0).merge(&cues).unwrap();

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].text, "これは短い文章 これは別の短い文章");
    assert_eq!(merged[1].text, "三番目");
    assert!(merged.iter().all(|c| c.char_count() <= 20));
}

/// Test a cue under the minimum duration absorbs its successor regardless of length or gap
#[test]
fn test_merge_withTooShortCue_shouldIgnoreCharLimit() {
    let long_text = "x".repeat(20);
    let cues = vec![cue("あ", 0.0, 0.5), cue(&long_text, 5.0, 8.0)];

    let merged = SegmentMerger::new(1.0, 10, 1.0).merge(&cues).unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].text, format!("あ {}", long_text));
    assert_eq!((merged[0].start, merged[0].end), (0.0, 8.0));
}

/// Test a gap of exactly the threshold keeps cues apart
#[test]
fn test_merge_withGapAtThreshold_shouldNotMerge() {
    let cues = vec![cue("a", 0.0, 1.5), cue("b", 2.5, 4.0)];

    let merged = SegmentMerger::default().merge(&cues).unwrap();

    assert_eq!(merged, cues);
}

/// Test the merge decision on its own
#[test]
fn test_should_merge_withVariousPairs_shouldFollowThresholds() {
    let merger = SegmentMerger::new(1.0, 10, 1.0);

    assert!(merger.should_merge(&cue("a", 0.0, 0.9), &cue("b", 9.0, 10.0)));
    assert!(merger.should_merge(&cue("abcd", 0.0, 1.0), &cue("efgh", 1.5, 2.5)));
    assert!(!merger.should_merge(&cue("abcde", 0.0, 1.0), &cue("fghij", 1.5, 2.5)));
    assert!(!merger.should_merge(&cue("a", 0.0, 1.0), &cue("b", 2.0, 3.0)));
}

/// Test empty and single-cue input
#[test]
fn test_merge_withNoneOrOneCue_shouldReturnInput() {
    let merger = SegmentMerger::default();
    assert!(merger.merge(&[]).unwrap().is_empty());

    let single = vec![Cue::with_confidence("一つだけ", 0.0, 0.3, 0.8)];
    assert_eq!(merger.merge(&single).unwrap(), single);
}

/// Test a merged cue keeps the confidence of its first part
#[test]
fn test_merge_withConfidence_shouldKeepFirstConfidence() {
    let cues = vec![
        Cue::with_confidence("a", 0.0, 0.5, 0.7),
        Cue::with_confidence("b", 0.5, 2.0, 0.9),
    ];

    let merged = SegmentMerger::default().merge(&cues).unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].confidence, 0.7);
}

/// Test malformed input is rejected
#[test]
fn test_merge_withMalformedCues_shouldFail() {
    let merger = SegmentMerger::default();

    let inverted = merger.merge(&[cue("a", 2.0, 1.0)]);
    assert!(matches!(inverted, Err(SubtitleError::InvalidTimeRange { index: 0, .. })));

    let unordered = merger.merge(&[cue("a", 3.0, 4.0), cue("b", 1.0, 2.0)]);
    assert!(matches!(unordered, Err(SubtitleError::OutOfOrder { index: 1, .. })));
}

/// Test merging never drops text, never grows the list and is idempotent
#[test]
fn test_merge_withGeneratedCues_shouldPreserveTextAndBeIdempotent() {
    let grouper = WordGrouper::new(5.0, 20);
    let merger = SegmentMerger::new(1.0, 20, 1.0);

    for seed in 1..=20 {
        let drafts = grouper.group(&common::generate_tokens(seed, 300)).unwrap();
        let merged = merger.merge(&drafts).unwrap();

        assert!(merged.len() <= drafts.len());
        assert_eq!(
            merged.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" "),
            drafts.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" "),
            "seed {}",
            seed
        );
        assert_eq!(merged.first().map(|c| c.start), drafts.first().map(|c| c.start));
        assert_eq!(merged.last().map(|c| c.end), drafts.last().map(|c| c.end));

        assert_eq!(merger.merge(&merged).unwrap(), merged, "seed {}", seed);
    }
}

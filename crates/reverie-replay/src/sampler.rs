//! Down-sampling and pagination of step sequences.
//!
//! Sampling bounds how many frames a replay materializes; pagination
//! windows the sampled sequence. Both preserve order and only ever return
//! elements of their input.

use reverie_types::Step;

/// Step sequences at or below this length are never down-sampled.
pub const SAMPLING_THRESHOLD: usize = 100;

/// Every `SAMPLING_STRIDE`-th step is kept when down-sampling.
pub const SAMPLING_STRIDE: usize = 10;

/// One window of a sampled step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    /// Steps inside the window.
    pub steps: &'a [Step],
    /// Whether steps remain after this window.
    pub has_more: bool,
}

/// Down-sample `steps`.
///
/// Returns the input unchanged when `all_frames` is set or it has at most
/// [`SAMPLING_THRESHOLD`] elements; otherwise every
/// [`SAMPLING_STRIDE`]-th element, starting with the first.
pub fn sample(steps: &[Step], all_frames: bool) -> Vec<Step> {
    if all_frames || steps.len() <= SAMPLING_THRESHOLD {
        return steps.to_vec();
    }
    steps.iter().step_by(SAMPLING_STRIDE).copied().collect()
}

/// The window `[offset, offset + limit)` of `sampled`, clipped to bounds.
pub fn paginate(sampled: &[Step], offset: usize, limit: usize) -> Page<'_> {
    let end = offset.saturating_add(limit);
    let start = offset.min(sampled.len());
    let steps = sampled.get(start..end.min(sampled.len())).unwrap_or_default();
    Page {
        steps,
        has_more: end < sampled.len(),
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn steps(n: u64) -> Vec<Step> {
        (0..n).collect()
    }

    #[test]
    fn short_sequences_are_untouched() {
        assert_eq!(sample(&steps(100), false), steps(100));
        assert_eq!(sample(&[], false), Vec::<Step>::new());
    }

    #[test]
    fn long_sequences_keep_every_tenth() {
        let sampled = sample(&steps(101), false);
        assert_eq!(sampled.len(), 11);
        assert_eq!(sampled.first(), Some(&0));
        assert_eq!(sampled.get(1), Some(&10));
        assert_eq!(sampled.last(), Some(&100));
    }

    #[test]
    fn all_frames_disables_sampling() {
        assert_eq!(sample(&steps(500), true), steps(500));
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let data = steps(5);
        let page = paginate(&data, 10, 3);
        assert!(page.steps.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn page_is_clipped() {
        let data = steps(5);
        let page = paginate(&data, 3, 10);
        assert_eq!(page.steps, &[3, 4]);
        assert!(!page.has_more);

        let page = paginate(&data, 0, 2);
        assert_eq!(page.steps, &[0, 1]);
        assert!(page.has_more);
    }

    #[test]
    fn huge_limit_does_not_overflow() {
        let data = steps(5);
        let page = paginate(&data, 2, usize::MAX);
        assert_eq!(page.steps, &[2, 3, 4]);
        assert!(!page.has_more);
    }

    fn arb_steps() -> impl Strategy<Value = Vec<Step>> {
        proptest::collection::btree_set(0u64..100_000, 0..400)
            .prop_map(|set| set.into_iter().collect())
    }

    proptest! {
        #[test]
        fn sampling_is_an_ordered_subset(input in arb_steps()) {
            let sampled = sample(&input, false);
            prop_assert!(sampled.len() <= input.len());
            prop_assert!(sampled.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(sampled.iter().all(|s| input.contains(s)));
            if input.len() <= SAMPLING_THRESHOLD {
                prop_assert_eq!(&sampled, &input);
            } else {
                let expected: Vec<Step> = input.iter().step_by(SAMPLING_STRIDE).copied().collect();
                prop_assert_eq!(&sampled, &expected);
            }
        }

        #[test]
        fn pages_reconstruct_the_sample(input in arb_steps(), limit in 1usize..50) {
            let sampled = sample(&input, false);
            let mut rebuilt = Vec::new();
            let mut offset = 0;
            loop {
                let page = paginate(&sampled, offset, limit);
                rebuilt.extend_from_slice(page.steps);
                offset += limit;
                if !page.has_more {
                    break;
                }
                prop_assert_eq!(page.steps.len(), limit);
            }
            prop_assert_eq!(rebuilt, sampled);
        }
    }
}

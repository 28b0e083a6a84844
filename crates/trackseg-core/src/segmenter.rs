// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{ExecutionContext, SegError, SegmentationResult};

/// Segmentation driver contract: full measurement sequence in, full result out.
///
/// Implementations only read `values` and allocate their own scratch state, so
/// one driver may be shared across threads when it is `Sync`.
pub trait Segmenter<T> {
    fn segment(
        &self,
        values: &[T],
        ctx: &ExecutionContext<'_>,
    ) -> Result<SegmentationResult, SegError>;
}

impl<T, S> Segmenter<T> for &S
where
    S: Segmenter<T> + ?Sized,
{
    fn segment(
        &self,
        values: &[T],
        ctx: &ExecutionContext<'_>,
    ) -> Result<SegmentationResult, SegError> {
        (**self).segment(values, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::Segmenter;
    use crate::{Diagnostics, ExecutionContext, SegError, SegmentationResult};

    struct SingleSegment;

    impl Segmenter<f64> for SingleSegment {
        fn segment(
            &self,
            values: &[f64],
            _ctx: &ExecutionContext<'_>,
        ) -> Result<SegmentationResult, SegError> {
            let boundaries = values.len().checked_sub(1).into_iter().collect();
            SegmentationResult::new(values.len(), boundaries, Diagnostics::default())
        }
    }

    #[test]
    fn trait_objects_and_references_dispatch() {
        let driver = SingleSegment;
        let dyn_driver: &dyn Segmenter<f64> = &driver;
        let ctx = ExecutionContext::new();

        let direct = driver.segment(&[1.0, 2.0, 3.0], &ctx).expect("segment");
        let via_ref = (&dyn_driver)
            .segment(&[1.0, 2.0, 3.0], &ctx)
            .expect("segment");
        assert_eq!(direct.boundaries, vec![2]);
        assert_eq!(direct, via_ref);

        let empty = driver.segment(&[], &ctx).expect("empty input is defined");
        assert!(empty.is_empty());
    }
}

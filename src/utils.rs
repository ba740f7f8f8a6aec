use std::iter::{Map, StepBy};
use std::ops;
use super::half::Half;

/// Inclusive range of half-integers, stepping by one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RangeInclusive<T> {
    pub start: T,
    pub end: T,
}

impl IntoIterator for RangeInclusive<Half<i32>> {
    type Item = Half<i32>;
    type IntoIter = Map<StepBy<ops::RangeInclusive<i32>>, fn(i32) -> Half<i32>>;
    fn into_iter(self) -> Self::IntoIter {
        (self.start.twice() ..= self.end.twice())
            .step_by(2)
            .map(Half as fn(i32) -> Half<i32>)
    }
}

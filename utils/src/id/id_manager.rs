use num::{Bounded, FromPrimitive, Integer, ToPrimitive};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, PartialOrd, Ord)]
pub struct RoadMarker;
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, PartialOrd, Ord)]
pub struct PointMarker;
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SegmentMarker;
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, PartialOrd, Ord)]
pub struct JunctionMarker;
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EndpointMarker;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Id<A, Int: Integer + Bounded + FromPrimitive + ToPrimitive> {
    id: Int,
    marker: PhantomData<A>,
}

/// All behaviour regarding id's should only be contained within this module. The conversions
/// are public because the compute engine stores objects in vectors indexed by their id.
pub trait IdBehaviour: Copy {
    fn from_usize(val: usize) -> Self;
    fn to_usize(&self) -> usize;
}

impl<A: Copy, Int: Integer + Bounded + FromPrimitive + ToPrimitive + Copy> IdBehaviour
    for Id<A, Int>
{
    /// # Panics
    /// Panics if `val` does not fit in the underlying integer type.
    fn from_usize(val: usize) -> Self {
        Self {
            id: Int::from_usize(val).expect("id space exhausted"),
            marker: PhantomData,
        }
    }

    fn to_usize(&self) -> usize {
        self.id.to_usize().expect("ids are never negative")
    }
}

impl<A, Int: Integer + Bounded + FromPrimitive + ToPrimitive + fmt::Display> fmt::Display
    for Id<A, Int>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Hands out consecutive ids starting from zero, such that ids can be used as indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdManager<A: IdBehaviour> {
    counter: usize,
    state: PhantomData<A>,
}

impl<A: IdBehaviour> Default for IdManager<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: IdBehaviour> IdManager<A> {
    pub fn new() -> Self {
        IdManager {
            counter: 0,
            state: PhantomData::<A>,
        }
    }

    pub fn gen(&mut self) -> A {
        let id = A::from_usize(self.counter);
        self.update_state();
        id
    }

    /// Number of ids handed out so far.
    pub fn count(&self) -> usize {
        self.counter
    }

    fn update_state(&mut self) {
        self.counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SegmentId;

    #[test]
    fn ids_are_consecutive_indices() {
        let mut manager: IdManager<SegmentId> = IdManager::new();
        let a = manager.gen();
        let b = manager.gen();
        assert_eq!(a.to_usize(), 0);
        assert_eq!(b.to_usize(), 1);
        assert_eq!(manager.count(), 2);
        assert_eq!(SegmentId::from_usize(1), b);
        assert_eq!(format!("{}", b), "1");
    }
}

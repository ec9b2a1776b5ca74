//! Ensemble coordinates.

use serde::{Deserialize, Serialize};

use super::{sort_and_coalesce, Coordinate, UnionCoordinate};

/// An ensemble coordinate: the member numbers present in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsCoord {
    name: String,
    members: Vec<i32>,
}

impl EnsCoord {
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = i32>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().collect(),
        }
    }

    pub fn members(&self) -> &[i32] {
        &self.members
    }

    pub fn contains(&self, member: i32) -> bool {
        self.members.contains(&member)
    }
}

impl Coordinate for EnsCoord {
    const AXIS: &'static str = "ensemble";

    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.members.len()
    }

    fn equals_data(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl UnionCoordinate for EnsCoord {
    fn union_into(&mut self, extras: &[&Self]) {
        if extras.is_empty() {
            return;
        }

        self.members
            .extend(extras.iter().flat_map(|c| c.members.iter().copied()));
        sort_and_coalesce(&mut self.members, |m| *m, |_, _| {});
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_members() {
        let mut base = EnsCoord::new("ens", [0, 1, 2]);
        let a = EnsCoord::new("ens", [2, 3]);
        let b = EnsCoord::new("ens", [5, 0]);
        base.union_into(&[&a, &b]);
        assert_eq!(base.members(), &[0, 1, 2, 3, 5]);
        assert!(base.contains(5));
    }

    #[test]
    fn test_equals_data() {
        let a = EnsCoord::new("ens", [0, 1]);
        let b = EnsCoord::new("ensemble", [0, 1]);
        assert!(a.equals_data(&b));
        assert!(!a.equals_data(&EnsCoord::new("ens", [1, 0])));
    }

    #[test]
    fn test_empty_coord_is_not_absent() {
        let empty = EnsCoord::new("ens", []);
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
    }
}

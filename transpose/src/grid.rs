/// Extent of a work-group: how many units run side by side along each axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dim2 {
    pub x: usize,
    pub y: usize,
}

impl Dim2 {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn count(self) -> usize {
        self.x * self.y
    }

    /// Every unit of a work-group of this extent, `x` varying fastest.
    pub fn units(self) -> impl Iterator<Item = UnitId> {
        (0..self.y).flat_map(move |y| (0..self.x).map(move |x| UnitId { x, y }))
    }
}

/// Extent of a launch grid in work-groups.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dim3 {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Dim3 {
    #[must_use]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn count(self) -> usize {
        self.x * self.y * self.z
    }

    /// The group at position `flat` when the grid is enumerated `x` fastest, then `y`, then `z`.
    #[must_use]
    #[inline]
    pub const fn group(self, flat: usize) -> GroupId {
        GroupId {
            x: flat % self.x,
            y: (flat / self.x) % self.y,
            z: flat / (self.x * self.y),
        }
    }

    pub fn groups(self) -> impl Iterator<Item = GroupId> {
        (0..self.count()).map(move |flat| self.group(flat))
    }
}

/// Position of a work-group in the launch grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GroupId {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// Position of a unit inside its work-group.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UnitId {
    pub x: usize,
    pub y: usize,
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn units_are_row_major() {
        let units: Vec<_> = Dim2::new(3, 2).units().collect();
        assert_eq!(units.len(), 6);
        assert_eq!(units[0], UnitId { x: 0, y: 0 });
        assert_eq!(units[2], UnitId { x: 2, y: 0 });
        assert_eq!(units[3], UnitId { x: 0, y: 1 });
    }

    #[test]
    fn groups_enumerate_every_cell_once() {
        let grid = Dim3::new(3, 4, 5);
        let mut seen: Vec<_> = grid.groups().map(|g| (g.z, g.y, g.x)).collect();
        assert_eq!(seen.len(), 60);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 60);
        assert_eq!(grid.group(0), GroupId { x: 0, y: 0, z: 0 });
        assert_eq!(grid.group(59), GroupId { x: 2, y: 3, z: 4 });
        assert_eq!(grid.group(13), GroupId { x: 1, y: 0, z: 1 });
    }
}

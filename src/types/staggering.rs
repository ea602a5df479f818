//! Staggered grid locations.
//!
//! Scalars live at cell centres, momentum components on the faces normal to
//! their direction (Arakawa C-grid), and terrain heights on nodes.

use std::fmt;

/// Coordinate direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// First horizontal direction (index i).
    X,
    /// Second horizontal direction (index j).
    Y,
    /// Vertical direction (index k).
    Z,
}

impl Direction {
    /// All directions in index order.
    pub const ALL: [Direction; 3] = [Direction::X, Direction::Y, Direction::Z];

    /// Array index of this direction (0, 1, 2).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Direction::X => 0,
            Direction::Y => 1,
            Direction::Z => 2,
        }
    }

    /// Unit offset `(di, dj, dk)` along this direction.
    #[inline]
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::X => (1, 0, 0),
            Direction::Y => (0, 1, 0),
            Direction::Z => (0, 0, 1),
        }
    }
}

/// Location of a field's degrees of freedom within a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Staggering {
    /// Cell centres.
    #[default]
    CellCentered,
    /// Faces normal to x (ρu lives here).
    XFace,
    /// Faces normal to y (ρv lives here).
    YFace,
    /// Faces normal to z (ρw and Ω live here).
    ZFace,
    /// Cell corners (terrain heights live here).
    Node,
}

impl Staggering {
    /// Face location normal to the given direction.
    #[inline]
    pub const fn face(dir: Direction) -> Self {
        match dir {
            Direction::X => Staggering::XFace,
            Direction::Y => Staggering::YFace,
            Direction::Z => Staggering::ZFace,
        }
    }

    /// Whether the location is nodal in each direction.
    #[inline]
    pub const fn nodal(self) -> [bool; 3] {
        match self {
            Staggering::CellCentered => [false, false, false],
            Staggering::XFace => [true, false, false],
            Staggering::YFace => [false, true, false],
            Staggering::ZFace => [false, false, true],
            Staggering::Node => [true, true, true],
        }
    }
}

impl fmt::Display for Staggering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Staggering::CellCentered => "cell",
            Staggering::XFace => "x-face",
            Staggering::YFace => "y-face",
            Staggering::ZFace => "z-face",
            Staggering::Node => "node",
        };
        f.write_str(name)
    }
}

//! Shape catalog: the seven piece kinds, their rotation masks and colours.
//!
//! Masks are written as 4 rows of 5 characters (`*` occupied, `.` empty) and parsed once
//! into a process-wide [`Catalog`].

use crate::error::EngineError;
use crate::grid::Rgb;
use std::sync::OnceLock;

/// Mask width in sub-cells.
pub const MASK_COLS: usize = 5;
/// Mask height in sub-cells.
pub const MASK_ROWS: usize = 4;

/// The seven piece kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    S,
    Z,
    I,
    O,
    J,
    L,
    T,
}

impl ShapeKind {
    pub const ALL: [Self; 7] = [Self::S, Self::Z, Self::I, Self::O, Self::J, Self::L, Self::T];

    pub fn glyph(self) -> char {
        match self {
            Self::S => 'S',
            Self::Z => 'Z',
            Self::I => 'I',
            Self::O => 'O',
            Self::J => 'J',
            Self::L => 'L',
            Self::T => 'T',
        }
    }

    fn index(self) -> usize {
        match self {
            Self::S => 0,
            Self::Z => 1,
            Self::I => 2,
            Self::O => 3,
            Self::J => 4,
            Self::L => 5,
            Self::T => 6,
        }
    }
}

/// Text form of one shape kind, as stored in the static table.
#[derive(Debug, Clone, Copy)]
pub struct ShapeDef {
    pub kind: ShapeKind,
    pub rotations: &'static [[&'static str; MASK_ROWS]],
    pub color: Rgb,
}

#[rustfmt::skip]
pub const STANDARD_SHAPES: [ShapeDef; 7] = [
    ShapeDef {
        kind: ShapeKind::S,
        rotations: &[
            [".....", ".....", "..**.", ".**.."],
            [".....", "..*..", "..**.", "...*."],
        ],
        color: Rgb(0, 255, 0),
    },
    ShapeDef {
        kind: ShapeKind::Z,
        rotations: &[
            [".....", ".....", ".**..", "..**."],
            [".....", "..*..", ".**..", ".*..."],
        ],
        color: Rgb(255, 0, 0),
    },
    ShapeDef {
        kind: ShapeKind::I,
        rotations: &[
            ["..*..", "..*..", "..*..", "..*.."],
            [".....", ".....", ".....", "****."],
        ],
        color: Rgb(0, 255, 255),
    },
    ShapeDef {
        kind: ShapeKind::O,
        rotations: &[
            [".....", ".....", ".**..", ".**.."],
        ],
        color: Rgb(255, 255, 0),
    },
    ShapeDef {
        kind: ShapeKind::J,
        rotations: &[
            [".....", ".....", ".*...", ".***."],
            [".....", "..**.", "..*..", "..*.."],
            [".....", ".....", ".***.", "...*."],
            [".....", "..*..", "..*..", ".**.."],
        ],
        color: Rgb(255, 165, 0),
    },
    ShapeDef {
        kind: ShapeKind::L,
        rotations: &[
            [".....", ".....", "...*.", ".***."],
            [".....", "..*..", "..*..", "..**."],
            [".....", ".....", ".***.", ".*..."],
            [".....", ".**..", "..*..", "..*.."],
        ],
        color: Rgb(0, 0, 255),
    },
    ShapeDef {
        kind: ShapeKind::T,
        rotations: &[
            [".....", ".....", "..*..", ".***."],
            [".....", "..*..", "..**.", "..*.."],
            [".....", ".....", ".***.", "..*.."],
            [".....", "..*..", ".**..", "..*.."],
        ],
        color: Rgb(128, 0, 128),
    },
];

/// One rotation state: occupied (column, row) positions inside the 5x4 mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    cells: Vec<(usize, usize)>,
}

impl Mask {
    fn parse(rows: &[&str; MASK_ROWS], shape: char, rotation: usize) -> Result<Self, EngineError> {
        let bad_size = || EngineError::MaskSize {
            shape,
            rotation,
            expected_rows: MASK_ROWS,
            expected_cols: MASK_COLS,
        };
        let mut cells = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != MASK_COLS {
                return Err(bad_size());
            }
            for (col, ch) in line.chars().enumerate() {
                match ch {
                    '*' => cells.push((col, row)),
                    '.' => {}
                    _ => return Err(bad_size()),
                }
            }
        }
        if cells.is_empty() {
            return Err(EngineError::EmptyMask { shape, rotation });
        }
        Ok(Self { cells })
    }

    /// Occupied (column, row) positions.
    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }
}

/// A parsed shape kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub color: Rgb,
    rotations: Vec<Mask>,
}

impl Shape {
    pub fn rotation_count(&self) -> usize {
        self.rotations.len()
    }

    /// Mask for `rotation`, taken modulo the number of states.
    pub fn mask(&self, rotation: usize) -> &Mask {
        &self.rotations[rotation % self.rotations.len()]
    }
}

/// All seven shapes, indexed by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    shapes: Vec<Shape>,
}

impl Catalog {
    /// Parse and validate a full set of definitions (one per kind, any order).
    pub fn parse(defs: &[ShapeDef]) -> Result<Self, EngineError> {
        let mut slots: [Option<Shape>; 7] = Default::default();
        for def in defs {
            let glyph = def.kind.glyph();
            if def.rotations.is_empty() {
                return Err(EngineError::NoRotations(glyph));
            }
            let rotations = def
                .rotations
                .iter()
                .enumerate()
                .map(|(i, rows)| Mask::parse(rows, glyph, i))
                .collect::<Result<Vec<_>, _>>()?;
            slots[def.kind.index()] = Some(Shape {
                kind: def.kind,
                color: def.color,
                rotations,
            });
        }
        let mut shapes = Vec::with_capacity(slots.len());
        for (kind, slot) in ShapeKind::ALL.iter().zip(slots) {
            shapes.push(slot.ok_or(EngineError::MissingShape(kind.glyph()))?);
        }
        Ok(Self { shapes })
    }

    pub fn shape(&self, kind: ShapeKind) -> &Shape {
        &self.shapes[kind.index()]
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }
}

static CATALOG: OnceLock<Catalog> = OnceLock::new();

/// The standard catalog, parsed on first use and shared for the life of the process.
pub fn catalog() -> Result<&'static Catalog, EngineError> {
    if let Some(c) = CATALOG.get() {
        return Ok(c);
    }
    let parsed = Catalog::parse(&STANDARD_SHAPES)?;
    Ok(CATALOG.get_or_init(|| parsed))
}

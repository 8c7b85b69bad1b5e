//! Hexagonal ring tiling around a center point.
//!
//! Rings are walked edge by edge. Ring `r` starts `r` column-steps east of the
//! center and visits the six hexagon sides (NE, N, NW, SW, S, SE) with `r`
//! steps each, ending back on its own start point. The output order is
//! therefore fully determined by the inputs.
//!
//! ```text
//!          N side
//!        * * * *
//!   NW  *       *  NE
//!      *    c    *  <- ring start (east vertex)
//!   SW  *       *  SE
//!        * * * *
//!          S side
//! ```

use super::{destination_point, Coordinate, GeoError};

/// Largest honeycomb that will be generated.
pub const MAX_HONEYCOMB_CELLS: usize = 10_000_000;

/// Compass bearings in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bearing {
    North,
    East,
    South,
    West,
}

impl Bearing {
    /// Bearing in degrees clockwise from north.
    pub fn degrees(self) -> f64 {
        match self {
            Bearing::North => 0.0,
            Bearing::East => 90.0,
            Bearing::South => 180.0,
            Bearing::West => 270.0,
        }
    }
}

/// Number of rings produced for the given radius and cell spacing.
///
/// The column spacing is `√3 · spacing`; ring indices run from 1 up to (but
/// excluding) `ceil(radius / column_spacing)`, so a radius shorter than one
/// column step yields zero rings.
pub fn ring_count(radius_m: f64, spacing_m: f64) -> usize {
    let dx = 3f64.sqrt() * spacing_m;
    let limit = (radius_m / dx).ceil();
    if limit.is_finite() && limit > 1.0 {
        limit as usize - 1
    } else {
        0
    }
}

/// Total cells in `rings` rings, `3r(r + 1)`, or `None` on overflow.
fn cell_count(rings: usize) -> Option<usize> {
    rings
        .checked_add(1)
        .and_then(|n| n.checked_mul(rings))
        .and_then(|n| n.checked_mul(3))
}

/// Generates concentric hexagonal rings of coordinates around `center`.
///
/// The center itself is not part of the output. Ring `r` contributes exactly
/// `6r` points. Every point keeps the altitude and accuracy of `center`.
///
/// # Errors
///
/// Returns [`GeoError`] for a non-positive spacing, a negative radius, or a
/// radius so large the tiling would exceed [`MAX_HONEYCOMB_CELLS`].
pub fn generate_honeycomb(
    center: &Coordinate,
    radius_m: f64,
    spacing_m: f64,
) -> Result<Vec<Coordinate>, GeoError> {
    if !spacing_m.is_finite() || spacing_m <= 0.0 {
        return Err(GeoError::InvalidSpacing(spacing_m));
    }
    if !radius_m.is_finite() || radius_m < 0.0 {
        return Err(GeoError::InvalidRadius(radius_m));
    }

    let dx = 3f64.sqrt() * spacing_m; // between column centers
    let dy = 1.5 * spacing_m; // between row centers
    let rings = ring_count(radius_m, spacing_m);
    let total = cell_count(rings)
        .filter(|&n| n <= MAX_HONEYCOMB_CELLS)
        .ok_or(GeoError::TooManyCells {
            radius_m,
            spacing_m,
        })?;

    let mut cells = Vec::with_capacity(total);
    let mut cursor = *center;

    let step = |from: &Coordinate, moves: &[(f64, Bearing)]| {
        moves.iter().fold(*from, |at, &(distance, bearing)| {
            destination_point(&at, distance, bearing.degrees())
        })
    };

    // Each side is a fixed sequence of moves repeated `ring` times.
    let sides: [&[(f64, Bearing)]; 6] = [
        &[(dy, Bearing::North), (dx / 2.0, Bearing::West)], // NE
        &[(dx, Bearing::West)],                             // N
        &[(dx / 2.0, Bearing::West), (dy, Bearing::South)], // NW
        &[(dy, Bearing::South), (dx / 2.0, Bearing::East)], // SW
        &[(dx, Bearing::East)],                             // S
        &[(dx / 2.0, Bearing::East), (dy, Bearing::North)], // SE
    ];

    for ring in 1..=rings {
        cursor = destination_point(&cursor, dx, Bearing::East.degrees());
        for moves in sides {
            for _ in 0..ring {
                cursor = step(&cursor, moves);
                cells.push(cursor);
            }
        }
    }

    Ok(cells)
}

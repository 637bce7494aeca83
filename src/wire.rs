//! External grid formats: the per-tick `(char, color)` snapshot handed in by
//! the harness, and the textual round-trip format used by tests.
use crate::error::ObserveError;
use crate::grid::Grid;
use crate::types::{Cell, CellKind};

fn glyph_to_kind(glyph: char) -> Option<CellKind> {
    match glyph {
        // '_' is accepted as a visually-distinguishable alias for a void
        // cell in literal test fixtures; the canonical glyph is a space.
        ' ' | '_' => Some(CellKind::Void),
        '#' => Some(CellKind::Stone),
        '@' => Some(CellKind::Head),
        '*' => Some(CellKind::Body),
        '$' => Some(CellKind::Tail),
        'x' => Some(CellKind::DeadHead),
        '+' => Some(CellKind::DeadBody),
        '%' => Some(CellKind::DeadTail),
        '1'..='9' => CellKind::from_u8(glyph.to_digit(10).unwrap() as u8),
        _ => None,
    }
}

fn kind_to_glyph(kind: CellKind) -> char {
    match kind {
        CellKind::Void => ' ',
        CellKind::Stone => '#',
        CellKind::Head => '@',
        CellKind::Body => '*',
        CellKind::Tail => '$',
        CellKind::DeadHead => 'x',
        CellKind::DeadBody => '+',
        CellKind::DeadTail => '%',
        CellKind::Food1 => '1',
        CellKind::Food2 => '2',
        CellKind::Food3 => '3',
        CellKind::Food4 => '4',
        CellKind::Food5 => '5',
        CellKind::Food6 => '6',
        CellKind::Food7 => '7',
        CellKind::Food8 => '8',
        CellKind::Food9 => '9',
    }
}

/// Encodes a raw per-tick snapshot — a row-major `[y][x]` matrix of
/// `(glyph, color)` pairs, exactly as the harness delivers it — into a
/// [`Grid`]. Rejects ragged rows and unrecognized glyphs before any state is
/// built, per `spec.md` §7's "detect before installing" propagation policy.
pub fn encode_snapshot(
    rows: &[Vec<(char, u8)>],
    width: usize,
    height: usize,
) -> Result<Grid, ObserveError> {
    if rows.len() != height {
        return Err(ObserveError::RowWidthMismatch {
            row: rows.len(),
            expected: height,
            actual: rows.len(),
        });
    }
    let mut cells = Vec::with_capacity(width * height);
    for (row_idx, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(ObserveError::RowWidthMismatch {
                row: row_idx,
                expected: width,
                actual: row.len(),
            });
        }
        for (col_idx, &(glyph, color)) in row.iter().enumerate() {
            let kind = glyph_to_kind(glyph).ok_or(ObserveError::UnknownGlyph {
                row: row_idx,
                col: col_idx,
                glyph,
            })?;
            cells.push(Cell::new(kind, color));
        }
    }
    Ok(Grid::from_cells(width as i32, height as i32, &cells))
}

/// Parses the textual round-trip format: each row is `2*width` characters,
/// the first of each pair a kind glyph, the second a color digit or space.
/// Rejects rows of the wrong or inconsistent width.
pub fn parse_grid(rows: &[&str]) -> Result<Grid, ObserveError> {
    let height = rows.len();
    let width = rows.first().map(|r| r.chars().count() / 2).unwrap_or(0);
    let mut cells = Vec::with_capacity(width * height);
    for (row_idx, row) in rows.iter().enumerate() {
        let chars: Vec<char> = row.chars().collect();
        if chars.len() != width * 2 {
            return Err(ObserveError::RowWidthMismatch {
                row: row_idx,
                expected: width * 2,
                actual: chars.len(),
            });
        }
        for col_idx in 0..width {
            let glyph = chars[col_idx * 2];
            let color_ch = chars[col_idx * 2 + 1];
            let kind = glyph_to_kind(glyph).ok_or(ObserveError::UnknownGlyph {
                row: row_idx,
                col: col_idx,
                glyph,
            })?;
            let color = color_ch.to_digit(10).unwrap_or(0) as u8;
            cells.push(Cell::new(kind, color));
        }
    }
    Ok(Grid::from_cells(width as i32, height as i32, &cells))
}

/// Serializes a grid to the textual round-trip format. Inverse of [`parse_grid`].
pub fn serialize_grid(grid: &Grid) -> Vec<String> {
    let mut rows = Vec::with_capacity(grid.height() as usize);
    for y in 0..grid.height() {
        let mut row = String::with_capacity((grid.width() * 2) as usize);
        for x in 0..grid.width() {
            let cell = grid.get(crate::types::Position::new(x, y));
            row.push(kind_to_glyph(cell.kind));
            if (1..=9).contains(&cell.color) {
                row.push((b'0' + cell.color) as char);
            } else {
                row.push(' ');
            }
        }
        rows.push(row);
    }
    rows
}

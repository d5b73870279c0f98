//! Composing several equally-sized textures into one grid image.

use super::pixels::{Layout, PixelGrid, Size};

/// Cells per row of a mosaic always come in multiples of this.
const COLUMN_STEP: usize = 4;

/// Grid `(columns, rows)` for `count` cells.
///
/// Up to four cells go in a single row. Beyond that the column count is the
/// smallest multiple of four that is at least the resulting row count, which
/// gives the tallest grid that is still no taller than it is wide.
pub fn grid_dimensions(count: usize) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    if count <= COLUMN_STEP {
        return (count, 1);
    }
    let mut columns = COLUMN_STEP;
    while columns * columns < count {
        columns += COLUMN_STEP;
    }
    (columns, count.div_ceil(columns))
}

/// Trailing decimal digits of `name`, if there are any.
pub fn numeric_suffix(name: &str) -> Option<u32> {
    let digits = name.len() - name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    name[name.len() - digits..].parse().ok()
}

/// Cell order for a set of names.
///
/// Names with a numeric suffix come first, sorted by suffix; the rest
/// follow in their original order.
pub fn order_by_suffix<S: AsRef<str>>(names: &[S]) -> Vec<usize> {
    let suffixes: Vec<Option<u32>> = names.iter().map(|n| numeric_suffix(n.as_ref())).collect();
    let mut order: Vec<usize> = (0..names.len()).collect();
    order.sort_by_key(|&i| (suffixes[i].is_none(), suffixes[i]));
    order
}

/// Paste `cells` into a `columns × rows` grid of `cell`-sized slots, row-major.
///
/// [`None`] cells are left as index 0. Cells larger than the slot are
/// clipped; smaller ones leave the remainder at index 0.
pub fn compose(cells: &[Option<&PixelGrid>], columns: usize, rows: usize, cell: Size) -> PixelGrid {
    let bits = cells
        .iter()
        .flatten()
        .map(|g| g.bits_per_pixel)
        .max()
        .unwrap_or(4);
    let mut out = PixelGrid::new(
        Size::new(columns * cell.width, rows * cell.height),
        bits,
        Layout::Linear,
    );

    for (slot, grid) in cells.iter().enumerate() {
        let Some(grid) = grid else { continue };
        let ox = (slot % columns.max(1)) * cell.width;
        let oy = (slot / columns.max(1)) * cell.height;
        for y in 0..cell.height.min(grid.height) {
            for x in 0..cell.width.min(grid.width) {
                if let Some(v) = grid.get(x, y) {
                    out.set(ox + x, oy + y, v);
                }
            }
        }
    }
    out
}

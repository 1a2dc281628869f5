//! Assembling independently computed frames into one mosaic, and the inverse.
//!
//! Frames are listed row-major: the first `frames_per_row` frames form the top
//! row-group (lowest row-axis values), left to right. `stitch` trusts that
//! order. Shapes alone cannot reveal a transposed arrangement, so the order
//! used to generate the frames must be the order passed here; `FrameLayout`
//! produces frames in exactly that order.

use tracing::{debug, warn};

use super::{Axis, Grid};
use crate::core::error::{HenonError, HenonResult};

fn touches(upper: f64, lower: f64, width: f64) -> bool {
    (upper - lower).abs() <= 1e-9 * width.abs().max(1.0)
}

/// Concatenates frames along columns within each row-group, then stacks the
/// row-groups.
pub fn stitch(frames: &[Grid], frames_per_row: usize) -> HenonResult<Grid> {
    if frames.is_empty() {
        return Err(HenonError::precondition("no frames to stitch"));
    }
    if frames_per_row == 0 || frames.len() % frames_per_row != 0 {
        return Err(HenonError::precondition(format!(
            "{} frames cannot be arranged {} per row",
            frames.len(),
            frames_per_row
        )));
    }
    let shape = frames[0].shape();
    if let Some((i, f)) = frames.iter().enumerate().find(|(_, f)| f.shape() != shape) {
        return Err(HenonError::precondition(format!(
            "frame {i} has shape {:?}, expected {:?}",
            f.shape(),
            shape
        )));
    }

    let (fr, fc) = shape;
    let groups: Vec<&[Grid]> = frames.chunks(frames_per_row).collect();
    check_contiguity(&groups);

    let mut cells = Vec::with_capacity(frames.len() * fr * fc);
    for group in &groups {
        for r in 0..fr {
            for frame in group.iter() {
                cells.extend_from_slice(frame.row(r));
            }
        }
    }

    let first = &frames[0];
    let last_group = groups[groups.len() - 1];
    let rows = Axis::new(
        first.rows().name.clone(),
        first.rows().min,
        last_group[0].rows().max,
        fr * groups.len(),
    );
    let cols = Axis::new(
        first.cols().name.clone(),
        first.cols().min,
        groups[0][frames_per_row - 1].cols().max,
        fc * frames_per_row,
    );
    debug!(
        frames = frames.len(),
        frames_per_row,
        rows = rows.len,
        cols = cols.len,
        "stitched mosaic"
    );
    Grid::from_cells(rows, cols, cells)
}

fn check_contiguity(groups: &[&[Grid]]) {
    for (g, group) in groups.iter().enumerate() {
        for (k, pair) in group.windows(2).enumerate() {
            let (left, right) = (pair[0].cols(), pair[1].cols());
            if !touches(left.max, right.min, left.width()) {
                warn!(
                    row_group = g,
                    frame = k + 1,
                    left_max = left.max,
                    right_min = right.min,
                    "adjacent frames do not share a column boundary; check frame order"
                );
            }
        }
    }
    for (g, pair) in groups.windows(2).enumerate() {
        let (above, below) = (pair[0][0].rows(), pair[1][0].rows());
        if !touches(above.max, below.min, above.width()) {
            warn!(
                row_group = g + 1,
                above_max = above.max,
                below_min = below.min,
                "adjacent row-groups do not share a row boundary; check frame order"
            );
        }
    }
}

/// Cuts a grid into `frames_down × frames_across` equal frames, row-major.
pub fn split(grid: &Grid, frames_down: usize, frames_across: usize) -> HenonResult<Vec<Grid>> {
    let (rows, cols) = grid.shape();
    if frames_down == 0
        || frames_across == 0
        || rows % frames_down != 0
        || cols % frames_across != 0
    {
        return Err(HenonError::precondition(format!(
            "a {rows}x{cols} grid cannot be split into {frames_down}x{frames_across} frames"
        )));
    }
    let (fr, fc) = (rows / frames_down, cols / frames_across);
    let mut frames = Vec::with_capacity(frames_down * frames_across);
    for d in 0..frames_down {
        for a in 0..frames_across {
            frames.push(grid.sub_grid(d * fr, a * fc, fr, fc)?);
        }
    }
    Ok(frames)
}

/// Division of a full sweep into frames, in stitching order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    pub rows: Axis,
    pub cols: Axis,
    pub frames_down: usize,
    pub frames_across: usize,
}

impl FrameLayout {
    pub fn new(
        rows: Axis,
        cols: Axis,
        frames_down: usize,
        frames_across: usize,
    ) -> HenonResult<Self> {
        rows.validate()?;
        cols.validate()?;
        rows.split(frames_down)?;
        cols.split(frames_across)?;
        Ok(Self {
            rows,
            cols,
            frames_down,
            frames_across,
        })
    }

    /// Square layout of `frames × frames`.
    pub fn square(rows: Axis, cols: Axis, frames: usize) -> HenonResult<Self> {
        Self::new(rows, cols, frames, frames)
    }

    pub fn frames_per_row(&self) -> usize {
        self.frames_across
    }

    pub fn frame_count(&self) -> usize {
        self.frames_down * self.frames_across
    }

    pub fn frame_shape(&self) -> (usize, usize) {
        (self.rows.len / self.frames_down, self.cols.len / self.frames_across)
    }

    /// (row axis, column axis) of every frame, row-major.
    pub fn frames(&self) -> HenonResult<Vec<(Axis, Axis)>> {
        let row_parts = self.rows.split(self.frames_down)?;
        let col_parts = self.cols.split(self.frames_across)?;
        Ok(row_parts
            .iter()
            .flat_map(|r| col_parts.iter().map(move |c| (r.clone(), c.clone())))
            .collect())
    }
}

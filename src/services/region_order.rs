// Reading order for regions inside one panel
//
// Regions are banded into rows by vertical center (a region stays on the
// current row while its center is within half the previous region's height),
// and each row is read right to left.

use tracing::trace;

use crate::core::types::{Region, RegionLabel};

/// Order regions top-to-bottom by row, right-to-left within a row
pub fn order_regions(regions: Vec<Region>, row_height_ratio: f64) -> Vec<Region> {
    if regions.len() <= 1 {
        return regions;
    }

    let mut by_center = regions;
    by_center.sort_by(|a, b| a.bbox.center_y().total_cmp(&b.bbox.center_y()));

    let mut rows: Vec<Vec<Region>> = Vec::new();
    let mut current: Vec<Region> = Vec::new();

    for region in by_center {
        let same_row = current.last().map_or(true, |last: &Region| {
            (region.bbox.center_y() - last.bbox.center_y()).abs()
                < last.bbox.height() * row_height_ratio
        });

        if !same_row {
            rows.push(close_row(std::mem::take(&mut current)));
        }
        current.push(region);
    }
    rows.push(close_row(current));

    trace!("Region order: {} rows", rows.len());
    rows.into_iter().flatten().collect()
}

fn close_row(mut row: Vec<Region>) -> Vec<Region> {
    row.sort_by(|a, b| b.bbox.center_x().total_cmp(&a.bbox.center_x()));
    row
}

/// Split ordered regions into `(bubbles, outside_text)`, keeping order and
/// numbering each list from 1
pub fn split_by_label(ordered: Vec<Region>) -> (Vec<Region>, Vec<Region>) {
    let (mut bubbles, mut outside): (Vec<Region>, Vec<Region>) = ordered
        .into_iter()
        .partition(|r| r.label == RegionLabel::Bubble);

    renumber_regions(&mut bubbles);
    renumber_regions(&mut outside);
    (bubbles, outside)
}

/// Assign contiguous 1-based local ids in current order
pub fn renumber_regions(regions: &mut [Region]) {
    for (i, region) in regions.iter_mut().enumerate() {
        region.local_id = i + 1;
    }
}

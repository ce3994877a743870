// IoU-based duplicate removal for regions inside one panel
//
// Bubbles and outside text are deduplicated together: the detector may label
// the same text both ways, and only the coordinates decide.

use tracing::{debug, trace};

use crate::core::types::Region;
use crate::utils::geometry::iou;

/// Keep regions largest-first, dropping any whose IoU with an already kept
/// region exceeds `iou_threshold`
pub fn dedup_regions(regions: Vec<Region>, iou_threshold: f64) -> Vec<Region> {
    if regions.len() <= 1 {
        return regions;
    }

    let total = regions.len();
    let mut by_area = regions;
    by_area.sort_by(|a, b| b.bbox.area().total_cmp(&a.bbox.area()));

    let mut kept: Vec<Region> = Vec::with_capacity(by_area.len());
    for region in by_area {
        let duplicate_of = kept
            .iter()
            .find(|k| iou(&region.bbox, &k.bbox) > iou_threshold);

        match duplicate_of {
            Some(k) => trace!(
                "Region dedup: dropped {} {:?} (duplicate of {} {:?})",
                region.label.as_str(),
                region.bbox,
                k.label.as_str(),
                k.bbox
            ),
            None => kept.push(region),
        }
    }

    debug!("Region dedup: kept {}/{} regions", kept.len(), total);
    kept
}

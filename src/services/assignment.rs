// Region-to-panel assignment
//
// Every bubble/outside-text detection is attached to exactly one panel: the
// panel covering most of it when that coverage is significant, otherwise the
// panel whose center is nearest.

use tracing::{debug, trace, warn};

use crate::core::errors::{LayoutError, LayoutResult};
use crate::core::types::{BoundingBox, Panel, Region, RegionLabel};
use crate::utils::geometry::{area, centroid_distance_sq, intersection_area};

/// How a region found its panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    /// Overlap ratio above the threshold
    Overlap,
    /// Nearest panel center
    NearestCentroid,
}

/// Pick the panel for one region box.
///
/// Returns `None` only when `panels` is empty. Ties resolve to the earliest
/// panel for both criteria.
pub fn select_panel(
    region: &BoundingBox,
    panels: &[Panel],
    overlap_threshold: f64,
) -> Option<(usize, AssignmentKind)> {
    let region_area = area(region);

    let mut best_overlap: Option<usize> = None;
    let mut best_ratio = 0.0;
    let mut closest: Option<usize> = None;
    let mut best_distance = f64::INFINITY;

    for (index, panel) in panels.iter().enumerate() {
        let ratio = if region_area > 0.0 {
            intersection_area(region, &panel.bbox) / region_area
        } else {
            0.0
        };
        if ratio > best_ratio {
            best_ratio = ratio;
            best_overlap = Some(index);
        }

        let distance = centroid_distance_sq(region, &panel.bbox);
        if distance < best_distance || closest.is_none() {
            best_distance = distance;
            closest = Some(index);
        }
    }

    match best_overlap {
        Some(index) if best_ratio > overlap_threshold => Some((index, AssignmentKind::Overlap)),
        _ => closest.map(|index| (index, AssignmentKind::NearestCentroid)),
    }
}

/// Attach every region to a panel, appending to the panel's bubble or
/// outside-text list by label.
///
/// Returns the number of regions placed by the nearest-centroid fallback.
/// Regions without any panel to go to are reported as
/// [`LayoutError::NoPanels`] instead of being dropped.
pub fn assign_regions(
    panels: &mut [Panel],
    regions: Vec<Region>,
    overlap_threshold: f64,
) -> LayoutResult<usize> {
    if regions.is_empty() {
        return Ok(0);
    }
    if panels.is_empty() {
        warn!("{} regions detected on a page without panels", regions.len());
        return Err(LayoutError::NoPanels {
            region_count: regions.len(),
        });
    }

    let total = regions.len();
    let mut fallbacks = 0;

    for region in regions {
        let Some((index, kind)) = select_panel(&region.bbox, panels, overlap_threshold) else {
            return Err(LayoutError::NoPanels { region_count: total });
        };

        if kind == AssignmentKind::NearestCentroid {
            fallbacks += 1;
            trace!(
                "Region {:?} ({}) assigned to panel {} by nearest centroid",
                region.bbox,
                region.label.as_str(),
                index
            );
        }

        let panel = &mut panels[index];
        match region.label {
            RegionLabel::Bubble => panel.bubbles.push(region),
            RegionLabel::Outside => panel.outside_text.push(region),
        }
    }

    debug!(
        "Assigned {} regions to {} panels ({} by fallback)",
        total,
        panels.len(),
        fallbacks
    );
    Ok(fallbacks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x1: f64, y1: f64, x2: f64, y2: f64) -> BoundingBox {
        BoundingBox { x1, y1, x2, y2 }
    }

    fn panel(x1: f64, y1: f64, x2: f64, y2: f64) -> Panel {
        Panel {
            panel_id: 0,
            bbox: bbox(x1, y1, x2, y2),
            confidence: 0.9,
            bubbles: Vec::new(),
            outside_text: Vec::new(),
        }
    }

    #[test]
    fn test_overlap_assignment() {
        let panels = vec![panel(0.0, 0.0, 100.0, 100.0), panel(100.0, 0.0, 200.0, 100.0)];
        // 80% inside the second panel
        let region = bbox(80.0, 10.0, 180.0, 30.0);
        assert_eq!(
            select_panel(&region, &panels, 0.3),
            Some((1, AssignmentKind::Overlap))
        );
    }

    #[test]
    fn test_low_overlap_falls_back_to_centroid() {
        let panels = vec![panel(0.0, 0.0, 200.0, 200.0)];
        // 2500 of 10000 region area inside the panel: ratio 0.25
        let region = bbox(150.0, 150.0, 250.0, 250.0);
        assert_eq!(
            select_panel(&region, &panels, 0.3),
            Some((0, AssignmentKind::NearestCentroid))
        );
    }

    #[test]
    fn test_fallback_picks_nearest_panel_not_most_overlapping() {
        let panels = vec![panel(0.0, 0.0, 1000.0, 1000.0), panel(0.0, 1000.0, 100.0, 1100.0)];
        // 40% inside the first panel, 33% inside the second, centered near the second
        let region = bbox(0.0, 880.0, 100.0, 1180.0);
        let (index, kind) = select_panel(&region, &panels, 0.5).unwrap();
        assert_eq!(kind, AssignmentKind::NearestCentroid);
        assert_eq!(index, 1);
    }

    #[test]
    fn test_degenerate_region_uses_centroid() {
        let panels = vec![panel(0.0, 0.0, 100.0, 100.0), panel(200.0, 0.0, 300.0, 100.0)];
        let point = bbox(250.0, 50.0, 250.0, 50.0);
        assert_eq!(
            select_panel(&point, &panels, 0.3),
            Some((1, AssignmentKind::NearestCentroid))
        );
        assert_eq!(select_panel(&point, &[], 0.3), None);
    }

    #[test]
    fn test_assign_regions_splits_by_label() {
        let mut panels = vec![panel(0.0, 0.0, 100.0, 100.0), panel(100.0, 0.0, 200.0, 100.0)];
        let regions = vec![
            Region::new(bbox(10.0, 10.0, 40.0, 40.0), RegionLabel::Bubble, 0.9),
            Region::new(bbox(110.0, 10.0, 140.0, 40.0), RegionLabel::Outside, 0.8),
            Region::new(bbox(500.0, 500.0, 510.0, 510.0), RegionLabel::Bubble, 0.7),
        ];

        let fallbacks = assign_regions(&mut panels, regions, 0.3).unwrap();
        assert_eq!(fallbacks, 1);
        assert_eq!(panels[0].bubbles.len(), 1);
        assert_eq!(panels[1].outside_text.len(), 1);
        assert_eq!(panels[1].bubbles.len(), 1);
    }

    #[test]
    fn test_no_panels_is_reported() {
        let regions = vec![Region::new(bbox(0.0, 0.0, 10.0, 10.0), RegionLabel::Bubble, 0.9)];
        assert_eq!(
            assign_regions(&mut [], regions, 0.3),
            Err(LayoutError::NoPanels { region_count: 1 })
        );
        assert_eq!(assign_regions(&mut [], Vec::new(), 0.3), Ok(0));
    }
}

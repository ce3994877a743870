// Containment-based non-maximum suppression for panel detections
//
// The panel detector often reports the same physical frame twice at
// different scales. IoU between a frame and a slightly smaller copy of it can
// be low, so the duplicate signal here is how much of the weaker box lies
// inside the stronger one.

use tracing::{debug, trace};

use crate::core::types::Panel;
use crate::utils::geometry::containment_ratio;

/// Suppress panels largely contained in a more confident kept panel.
///
/// Panels are visited by descending confidence (ties keep input order). Each
/// visited panel is kept, and every remaining panel whose area is covered by
/// it at `containment_threshold` or more is discarded. The returned order
/// carries no reading-order meaning.
pub fn dedup_panels(panels: Vec<Panel>, containment_threshold: f64) -> Vec<Panel> {
    if panels.is_empty() {
        debug!("Panel NMS: No panels to filter");
        return Vec::new();
    }

    let total = panels.len();
    let mut remaining = panels;
    remaining.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Panel> = Vec::new();

    while !remaining.is_empty() {
        let mut candidates = remaining.into_iter();
        let Some(current) = candidates.next() else {
            break;
        };

        let next: Vec<Panel> = candidates
            .filter(|other| {
                let ratio = containment_ratio(&current.bbox, &other.bbox);
                if ratio >= containment_threshold {
                    trace!(
                        "Panel NMS: Suppressed panel {:?} (conf={:.3}, contained {:.3} in kept panel conf={:.3})",
                        other.bbox, other.confidence, ratio, current.confidence
                    );
                    false
                } else {
                    true
                }
            })
            .collect();

        kept.push(current);
        remaining = next;
    }

    debug!(
        "Panel NMS: Kept {}/{} panels (suppressed {})",
        kept.len(),
        total,
        total - kept.len()
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BoundingBox;

    fn panel(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f32) -> Panel {
        Panel {
            panel_id: 0,
            bbox: BoundingBox { x1, y1, x2, y2 },
            confidence,
            bubbles: Vec::new(),
            outside_text: Vec::new(),
        }
    }

    #[test]
    fn test_contained_panel_is_suppressed() {
        let a = panel(0.0, 0.0, 100.0, 100.0, 0.9);
        let b = panel(10.0, 10.0, 90.0, 90.0, 0.5);

        let kept = dedup_panels(vec![b, a.clone()], 0.75);
        assert_eq!(kept, vec![a]);
    }

    #[test]
    fn test_larger_less_confident_panel_survives() {
        // The big box is only 64% covered by the small confident one
        let small = panel(10.0, 10.0, 90.0, 90.0, 0.9);
        let big = panel(0.0, 0.0, 100.0, 100.0, 0.5);

        let kept = dedup_panels(vec![big.clone(), small.clone()], 0.75);
        assert_eq!(kept, vec![small, big]);
    }

    #[test]
    fn test_threshold_boundary_discards() {
        // Exactly 75% of the candidate lies inside the kept panel
        let kept_panel = panel(0.0, 0.0, 100.0, 100.0, 0.9);
        let candidate = panel(25.0, 0.0, 125.0, 100.0, 0.4);

        let kept = dedup_panels(vec![kept_panel.clone(), candidate], 0.75);
        assert_eq!(kept, vec![kept_panel]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let first = panel(0.0, 0.0, 100.0, 100.0, 0.8);
        let second = panel(0.0, 0.0, 100.0, 100.0, 0.8);
        let other = panel(200.0, 0.0, 300.0, 100.0, 0.8);

        let mut first_marked = first.clone();
        first_marked.panel_id = 1;

        let kept = dedup_panels(vec![first_marked.clone(), second, other.clone()], 0.75);
        assert_eq!(kept, vec![first_marked, other]);
    }

    #[test]
    fn test_disjoint_panels_all_kept() {
        let panels = vec![
            panel(0.0, 0.0, 100.0, 100.0, 0.3),
            panel(120.0, 0.0, 220.0, 100.0, 0.9),
            panel(0.0, 120.0, 100.0, 220.0, 0.6),
        ];
        assert_eq!(dedup_panels(panels, 0.75).len(), 3);
        assert!(dedup_panels(Vec::new(), 0.75).is_empty());
    }
}

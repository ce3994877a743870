// Panel reading order
//
// Manga reads right-to-left, top-to-bottom. Panels are banded into rows by
// vertical center, each row is split into vertical stacks by horizontal
// center, stacks are read in reading direction and panels inside a stack top
// to bottom. Two-page spreads read the whole right page before the left one.

use tracing::{debug, trace};

use crate::core::config::{PanelConfig, PanelOrderStrategy, SpreadConfig};
use crate::core::types::Panel;
use crate::utils::geometry::horizontal_overlap;

/// Result of ordering one page's panels
#[derive(Debug, Clone)]
pub struct PanelOrdering {
    pub panels: Vec<Panel>,
    pub spread: bool,
}

/// Order a page's panels, switching to spread mode for landscape pages
pub fn order_panels(
    panels: Vec<Panel>,
    page_width: f64,
    page_height: f64,
    panel_cfg: &PanelConfig,
    spread_cfg: &SpreadConfig,
) -> PanelOrdering {
    let spread = is_spread(page_width, page_height, spread_cfg);

    let panels = if spread {
        let (right, left) = split_spread(panels, page_width, spread_cfg);
        debug!(
            "Spread page {}x{}: {} right-page panels, {} left-page panels",
            page_width,
            page_height,
            right.len(),
            left.len()
        );

        let mut ordered = order_single_page(right, panel_cfg, true);
        ordered.extend(order_single_page(left, panel_cfg, true));
        ordered
    } else {
        order_single_page(panels, panel_cfg, panel_cfg.right_to_left)
    };

    PanelOrdering { panels, spread }
}

/// A page at least as wide as it is tall is treated as a two-page spread
pub fn is_spread(page_width: f64, page_height: f64, cfg: &SpreadConfig) -> bool {
    cfg.enabled && page_width >= page_height
}

/// Split spread panels into `(right_page, left_page)`.
///
/// A panel starting past `right_tolerance * mid` is on the right page, one
/// ending before `left_tolerance * mid` is on the left page (the right test
/// wins when both hold). Anything else goes to the side holding its center.
pub fn split_spread(panels: Vec<Panel>, page_width: f64, cfg: &SpreadConfig) -> (Vec<Panel>, Vec<Panel>) {
    let mid = page_width / 2.0;
    panels.into_iter().partition(|panel| {
        if panel.bbox.x1 >= cfg.right_tolerance * mid {
            true
        } else if panel.bbox.x2 <= cfg.left_tolerance * mid {
            false
        } else {
            let right = panel.bbox.center_x() >= mid;
            trace!(
                "Panel {:?} straddles the gutter, assigned to {} page",
                panel.bbox,
                if right { "right" } else { "left" }
            );
            right
        }
    })
}

/// Order panels of a single page with the configured strategy
pub fn order_single_page(panels: Vec<Panel>, cfg: &PanelConfig, right_to_left: bool) -> Vec<Panel> {
    if panels.len() <= 1 {
        return panels;
    }

    match cfg.strategy {
        PanelOrderStrategy::RowBands => order_row_bands(panels, cfg, right_to_left),
        PanelOrderStrategy::ColumnGroups => {
            order_column_groups(panels, cfg.column_overlap_ratio, right_to_left)
        }
    }
}

/// Assign contiguous 1-based panel ids in current order
pub fn renumber_panels(panels: &mut [Panel]) {
    for (i, panel) in panels.iter_mut().enumerate() {
        panel.panel_id = i + 1;
    }
}

struct RowBand {
    panels: Vec<Panel>,
    sum_cy: f64,
    min_cy: f64,
}

impl RowBand {
    fn new(panel: Panel) -> Self {
        let cy = panel.bbox.center_y();
        Self {
            panels: vec![panel],
            sum_cy: cy,
            min_cy: cy,
        }
    }

    fn avg_cy(&self) -> f64 {
        self.sum_cy / self.panels.len() as f64
    }

    fn push(&mut self, panel: Panel) {
        let cy = panel.bbox.center_y();
        self.sum_cy += cy;
        self.min_cy = self.min_cy.min(cy);
        self.panels.push(panel);
    }
}

fn order_row_bands(panels: Vec<Panel>, cfg: &PanelConfig, right_to_left: bool) -> Vec<Panel> {
    let avg_height = panels.iter().map(|p| p.bbox.height()).sum::<f64>() / panels.len() as f64;
    let tolerance = avg_height * cfg.row_overlap_ratio;

    let mut by_center = panels;
    by_center.sort_by(|a, b| a.bbox.center_y().total_cmp(&b.bbox.center_y()));

    let mut rows: Vec<RowBand> = Vec::new();
    for panel in by_center {
        let cy = panel.bbox.center_y();
        match rows.last_mut() {
            Some(row) if (cy - row.avg_cy()).abs() <= tolerance => row.push(panel),
            _ => rows.push(RowBand::new(panel)),
        }
    }

    rows.sort_by(|a, b| a.min_cy.total_cmp(&b.min_cy));
    debug!(
        "Row bands: {} rows (avg panel height {:.1}, tolerance {:.1})",
        rows.len(),
        avg_height,
        tolerance
    );

    rows.into_iter()
        .flat_map(|row| order_row_stacks(row.panels, cfg.stack_width_ratio, right_to_left))
        .collect()
}

struct Stack {
    anchor_cx: f64,
    panels: Vec<Panel>,
}

/// Group one row's panels into vertical stacks and flatten them in reading
/// direction, top to bottom inside each stack
pub fn order_row_stacks(row: Vec<Panel>, stack_width_ratio: f64, right_to_left: bool) -> Vec<Panel> {
    let mut stacks: Vec<Stack> = Vec::new();

    for panel in row {
        let cx = panel.bbox.center_x();
        let threshold = panel.bbox.width() * stack_width_ratio;

        let nearest = stacks
            .iter_mut()
            .map(|stack| ((cx - stack.anchor_cx).abs(), stack))
            .filter(|(distance, _)| *distance <= threshold)
            .min_by(|(a, _), (b, _)| a.total_cmp(b));

        match nearest {
            Some((_, stack)) => stack.panels.push(panel),
            None => stacks.push(Stack {
                anchor_cx: cx,
                panels: vec![panel],
            }),
        }
    }

    if right_to_left {
        stacks.sort_by(|a, b| b.anchor_cx.total_cmp(&a.anchor_cx));
    } else {
        stacks.sort_by(|a, b| a.anchor_cx.total_cmp(&b.anchor_cx));
    }

    stacks
        .into_iter()
        .flat_map(|mut stack| {
            stack
                .panels
                .sort_by(|a, b| a.bbox.center_y().total_cmp(&b.bbox.center_y()));
            stack.panels
        })
        .collect()
}

fn same_column(a: &Panel, b: &Panel, column_overlap_ratio: f64) -> bool {
    let min_width = a.bbox.width().min(b.bbox.width());
    horizontal_overlap(&a.bbox, &b.bbox) > min_width * column_overlap_ratio
}

/// Column-group ordering: grow columns by horizontal overlap from the
/// top-most (then outer-most) remaining panel, read columns by the position
/// of their top panel
fn order_column_groups(panels: Vec<Panel>, column_overlap_ratio: f64, right_to_left: bool) -> Vec<Panel> {
    let seed_order = |a: &Panel, b: &Panel| {
        let by_x = if right_to_left {
            b.bbox.x1.total_cmp(&a.bbox.x1)
        } else {
            a.bbox.x1.total_cmp(&b.bbox.x1)
        };
        a.bbox.y1.total_cmp(&b.bbox.y1).then(by_x)
    };

    let mut remaining = panels;
    let mut columns: Vec<Vec<Panel>> = Vec::new();

    while !remaining.is_empty() {
        remaining.sort_by(seed_order);
        let mut rest = remaining.into_iter();
        let Some(seed) = rest.next() else {
            break;
        };

        let mut column = vec![seed];
        let mut unassigned: Vec<Panel> = rest.collect();

        // Grow transitively until a pass adds nothing
        loop {
            let (joined, left_over): (Vec<Panel>, Vec<Panel>) = unassigned
                .into_iter()
                .partition(|p| column.iter().any(|c| same_column(p, c, column_overlap_ratio)));
            unassigned = left_over;
            if joined.is_empty() {
                break;
            }
            column.extend(joined);
        }

        column.sort_by(|a, b| a.bbox.y1.total_cmp(&b.bbox.y1));
        columns.push(column);
        remaining = unassigned;
    }

    // Columns are sorted top-to-bottom, so the first panel is the top one
    columns.sort_by(|a, b| {
        let (ta, tb) = (&a[0].bbox, &b[0].bbox);
        let by_x = if right_to_left {
            tb.x1.total_cmp(&ta.x1)
        } else {
            ta.x1.total_cmp(&tb.x1)
        };
        by_x.then(ta.y1.total_cmp(&tb.y1))
    });

    debug!("Column groups: {} columns", columns.len());
    columns.into_iter().flatten().collect()
}

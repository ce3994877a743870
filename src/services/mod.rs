pub mod assignment;
pub mod panel_dedup;
pub mod panel_order; // Row bands, stacks, spreads and column groups
pub mod region_dedup;
pub mod region_order;
pub mod text_order;
pub mod translation;

// Re-export commonly used services
pub use assignment::{assign_regions, select_panel, AssignmentKind};
pub use panel_dedup::dedup_panels;
pub use panel_order::{order_panels, PanelOrdering};
pub use region_dedup::dedup_regions;
pub use region_order::{order_regions, split_by_label};
pub use text_order::{detect_direction, ordered_text, TextDirection};
pub use translation::{build_export, merge_translation_json, merge_translations, MergeOutcome};

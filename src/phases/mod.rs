pub mod phase1; // Panels: validate, dedup, order
pub mod phase2; // Regions: assign, dedup, order
pub mod phase3; // Export for translation
pub mod phase4; // Merge translations

pub use phase1::Phase1Pipeline;
pub use phase2::Phase2Pipeline;
pub use phase3::Phase3Pipeline;
pub use phase4::Phase4Pipeline;

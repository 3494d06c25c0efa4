//! Component registry, tag grammar and dependency validation
//!
//! Components are named markup fragments stored in their own files. Pages and
//! other components reference them with tags:
//!
//! ```text
//! <curvature-navbar></curvature-navbar>
//! <curvature-navbar/>
//! ```

mod cycle;
mod registry;
mod tag;

pub use cycle::{
    detect_cycle, detect_cycle_from, detect_cycles_in_dir, validate_registry, CycleDetector,
    CycleResult,
};
pub use registry::ComponentRegistry;
pub use tag::{leading_spaces, Tag, TagForm, TagReference, TagSyntax, DEFAULT_PREFIX};

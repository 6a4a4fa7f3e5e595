//! Page-transition and layout-animation controller for a catalog site.
//!
//! The crate models one page's interaction behavior: a catalog grid that is
//! reorganized into two columns with a velocity-driven scroll offset on the
//! second column, and shared-element (FLIP) transitions between the catalog
//! and product pages.  Everything runs against an arena document and a
//! logical clock, so a host can drive it from real navigation events while
//! tests drive it frame by frame.

pub mod app;
pub mod config;
pub mod core;
pub mod motion;
pub mod ui;

pub use crate::app::state::PageState;
pub use crate::app::transition::{self, TransitionData};
pub use crate::config::{MotionConfig, Namespace};
pub use crate::core::dom::{Document, NodeId};
pub use crate::core::geometry::{Rect, Viewport};

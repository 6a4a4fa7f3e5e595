//! Page-level control: state, hover machine, catalog reorganization,
//! lifecycle orchestration, and the observability sink.

pub mod hover;
pub mod log;
pub mod reorganize;
pub mod state;
pub mod transition;

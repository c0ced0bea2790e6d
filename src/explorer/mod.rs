//! The selection and token-aggregation engine behind the tree view.

pub mod selection;
pub mod session;
pub mod tokens;

pub use session::ExplorerSession;

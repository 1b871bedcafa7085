mod check;
mod edit;
mod plan;

pub use check::cmd_check;
pub use edit::cmd_edit;
pub use plan::cmd_plan;

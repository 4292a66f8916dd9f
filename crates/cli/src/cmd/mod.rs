mod build;
mod info;
mod plan;
mod stage;

pub use build::cmd_build;
pub use info::cmd_info;
pub use plan::cmd_plan;
pub use stage::cmd_stage;

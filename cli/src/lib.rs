mod filter_cmd;
mod logging;

pub use filter_cmd::FilterArgs;
pub use filter_cmd::PositionArg;
pub use filter_cmd::build_store;
pub use filter_cmd::run;
pub use logging::init_subscriber;

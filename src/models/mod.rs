pub mod account;
pub mod metrics_snapshot;
pub mod operator;
pub mod user_record;

pub use account::*;
pub use metrics_snapshot::*;
pub use operator::*;
pub use user_record::*;

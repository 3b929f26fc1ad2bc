mod bootstrap;
mod election;
mod join_record;

pub use bootstrap::{Bootstrap, BootstrapPhase};
pub use election::{is_oldest, oldest};
pub use join_record::PeerJoinRecord;

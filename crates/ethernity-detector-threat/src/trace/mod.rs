mod types;
mod walk;

pub use types::{
    word_to_address, AccountState, AuxiliaryContext, CallRecord, Log, StateSnapshot, Trace,
    Transaction,
};
pub use walk::{any_call, collect_calls, walk_calls};

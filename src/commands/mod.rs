mod convert;
mod inspect;

pub use convert::run_convert;
pub use inspect::run_inspect;

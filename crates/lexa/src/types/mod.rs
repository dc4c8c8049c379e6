mod snapshot;
mod value;

pub use snapshot::ParamSnapshot;
pub use value::Value;

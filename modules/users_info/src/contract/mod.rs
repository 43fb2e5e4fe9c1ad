pub mod descriptor;
pub mod model;
pub mod outcome;

pub use descriptor::{Payload, ResultDescriptor};
pub use model::{NewUser, User};
pub use outcome::{Creation, Lookup, Removal, UniqueField};

//! Fan-in reducers shared by composites, adapters and forms.

mod array;
mod validity;
mod value;

pub use array::StatefulArrayReducer;
pub use validity::ValidityReducer;
pub use value::ValueReducer;

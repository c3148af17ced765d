// Core modules implementing the value model, comparison, sweep, and error modeling.
pub mod compare;
pub mod error;
pub mod sweep;
pub mod value;

//! Hooks previos y posteriores a un run.
//!
//! Los listeners se ejecutan exactamente una vez por run, fuera de los
//! límites de chunk, en el orden en que se registraron.

pub mod composite;
pub mod fn_listener;
pub mod run_listener;

pub use composite::CompositeListener;
pub use fn_listener::FnListener;
pub use run_listener::RunListener;

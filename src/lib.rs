pub mod aggregate;
pub mod classify;
pub mod output;
pub mod record;
pub mod source;
pub mod state;
pub mod store;

pub mod cancel;
pub mod models;
pub mod numeric;

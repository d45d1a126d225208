pub mod api;
pub mod config;
pub mod confirm;
pub mod deprovision;
pub mod errors;
pub mod importer;
pub mod logging;
pub mod run;
pub mod sync;
pub mod user_type;

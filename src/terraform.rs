pub mod state;

pub use state::{LoadError, TerraformState};

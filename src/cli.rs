mod args;

pub use args::{Cli, DiagramArgs, ProviderCommand};

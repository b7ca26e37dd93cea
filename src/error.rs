use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error(transparent)]
    Load(#[from] crate::terraform::LoadError),

    #[error("no resources left to draw after classification; check the state file and provider")]
    EmptyGraph,

    #[error(transparent)]
    Render(#[from] crate::render::RenderError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Provider(#[from] crate::providers::ProviderError),
}

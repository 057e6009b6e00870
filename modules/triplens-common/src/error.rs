use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriplensError {
    #[error("Could not understand input: {0}")]
    ContentAnalysis(String),

    #[error("Nothing to search for: {0}")]
    NothingToSearch(String),

    #[error("Inventory provider error: {0}")]
    Inventory(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Project(#[from] af_project::ProjectError),

    #[error(transparent)]
    Sim(#[from] af_sim::SimError),

    #[error(transparent)]
    Control(#[from] af_controls::ControlError),

    #[error("{0}")]
    Usage(String),
}

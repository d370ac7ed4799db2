use thiserror::Error;

use crate::model::PhaseParseError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    PhaseParse(#[from] PhaseParseError),
}

//! [`Command`] for generating a [`LearningPlan`].

use common::operations::Perform;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{plan, LearningPlan},
    infra::{api, Api},
    Service,
};

use super::Command;

/// [`Command`] for generating a [`LearningPlan`] for a [`plan::Interest`].
#[derive(Clone, Debug)]
pub struct GeneratePlan {
    /// [`plan::Interest`] to generate the [`LearningPlan`] for.
    pub interest: plan::Interest,
}

impl<A, St, Clk> Command<GeneratePlan> for Service<A, St, Clk>
where
    A: Api<
        Perform<plan::Generate>,
        Ok = LearningPlan,
        Err = Traced<api::Error>,
    >,
{
    type Ok = LearningPlan;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: GeneratePlan,
    ) -> Result<Self::Ok, Self::Err> {
        self.api()
            .execute(Perform(plan::Generate(cmd.interest)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`GeneratePlan`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Generation request failed.
    #[display("Failed to generate a learning plan: {_0}")]
    Api(api::Error),
}

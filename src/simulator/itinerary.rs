use super::actor::{Action, ActorContext, Outcome, Script};
use crate::input_modeling::ContinuousRandomVariable;
use crate::models::{GateId, JunctionId, QueueId, ResourceId, RouteId, SinkId, TransportId};
use crate::utils::errors::SimulationError;

/// One stage of an itinerary.
#[derive(Debug, Clone)]
pub enum Step {
    Hold(ContinuousRandomVariable),
    Utilize(ResourceId),
    Release(ResourceId),
    WaitIn(QueueId),
    PassGate(GateId),
    Jump(JunctionId),
    Move(TransportId),
    MoveOn(RouteId),
    Leave(SinkId),
}

/// A data-driven actor body: the steps run in order, and the actor retires
/// after the last one.  An actor turned away by a full queue balks,
/// leaving through the balk sink when there is one.
#[derive(Debug, Clone)]
pub struct Itinerary {
    steps: Vec<Step>,
    next: usize,
    balk_to: Option<SinkId>,
}

impl Itinerary {
    pub fn new(steps: Vec<Step>, balk_to: Option<SinkId>) -> Self {
        Self {
            steps,
            next: 0,
            balk_to,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl Script for Itinerary {
    fn act(&mut self, ctx: &mut ActorContext<'_>) -> Result<Action, SimulationError> {
        if let Outcome::Rejected(_) = ctx.outcome() {
            self.next = self.steps.len();
            return Ok(self.balk_to.map_or(Action::Done, Action::Leave));
        }
        let step = match self.steps.get_mut(self.next) {
            Some(step) => step,
            None => return Ok(Action::Done),
        };
        self.next += 1;
        Ok(match step {
            Step::Hold(delay) => Action::Hold(ctx.draw(delay)?),
            Step::Utilize(resource) => Action::Utilize(*resource),
            Step::Release(resource) => Action::Release(*resource),
            Step::WaitIn(queue) => Action::WaitIn(*queue),
            Step::PassGate(gate) => Action::PassGate(*gate),
            Step::Jump(junction) => Action::Jump(*junction),
            Step::Move(transport) => Action::Move(*transport),
            Step::MoveOn(route) => Action::MoveOn(*route),
            Step::Leave(sink) => Action::Leave(*sink),
        })
    }
}

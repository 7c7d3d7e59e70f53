use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandKind {
    CreateNode,
    CreateEdge,
    CreateToken,
    MoveToken,
    SetColor,
    DestroyToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Shape {
    Rectangle,
    Circle,
    Line,
}

/// A drawing instruction for an external animation engine.  `at` holds
/// the geometry: `[x, y, w, h]` for nodes, `[x, y]` for tokens and
/// `[x1, y1, x2, y2]` for edges and moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationCommand {
    pub time: f64,
    pub kind: CommandKind,
    pub component: String,
    pub actor: Option<String>,
    pub color: String,
    pub shape: Shape,
    pub at: Vec<f64>,
}

/// The animation hook.  Implementations must return promptly; the run
/// never waits on rendering.
pub trait Animator {
    fn animate(&mut self, command: AnimationCommand);
}

/// Collects animation commands in memory.  Clones share the same log, so
/// a host can keep a handle while the `Director` owns the animator.
#[derive(Debug, Clone, Default)]
pub struct AnimationLog {
    commands: Rc<RefCell<Vec<AnimationCommand>>>,
}

impl AnimationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<AnimationCommand> {
        self.commands.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }
}

impl Animator for AnimationLog {
    fn animate(&mut self, command: AnimationCommand) {
        self.commands.borrow_mut().push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_log() {
        let log = AnimationLog::new();
        let mut animator = log.clone();
        animator.animate(AnimationCommand {
            time: 0.0,
            kind: CommandKind::CreateToken,
            component: String::from("entry"),
            actor: Some(String::from("entry-1")),
            color: String::from("yellow"),
            shape: Shape::Circle,
            at: vec![1.0, 2.0],
        });
        assert_eq!(log.len(), 1);
        assert_eq!(log.commands()[0].kind, CommandKind::CreateToken);
    }
}

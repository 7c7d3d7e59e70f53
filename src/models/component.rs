use serde::{Deserialize, Serialize};

use crate::output_analysis::{StatReport, Statistic};

/// The declared location of a component, for an external animator.  The
/// kernel never interprets positions beyond handing them to the animator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub w: f64,
    #[serde(default)]
    pub h: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn at(x: f64, y: f64) -> Self {
        Self { x, y, w: 0.0, h: 0.0 }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.x, self.y, self.w, self.h]
    }
}

pub trait Identifiable {
    fn name(&self) -> &str;
}

pub trait Positioned {
    fn position(&self) -> &Position;
}

pub trait StatTracked {
    fn tally(&mut self, value: f64);
    fn init_stats(&mut self, name: &str);
    fn statistic(&self) -> &Statistic;
}

/// The additional status and statistics methods of `Reportable` provide
/// improved simulation reasoning, reporting, and debugging, but do not
/// impact simulation execution or results.
pub trait Reportable {
    fn status(&self) -> String;
    fn statistics(&self, now: f64) -> Vec<StatReport>;
}

/// State shared by every component: name, position and the primary sample
/// statistic.  Components embed it as `core` and derive `Component`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCore {
    name: String,
    position: Position,
    statistic: Statistic,
}

impl ComponentCore {
    pub fn new(name: &str, position: Position, statistic_name: &str) -> Self {
        Self {
            name: name.to_string(),
            position,
            statistic: Statistic::new(&format!["{} {}", name, statistic_name]),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn tally(&mut self, value: f64) {
        self.statistic.tally(value);
    }

    pub fn init_stats(&mut self, name: &str) {
        self.statistic.reset(name);
    }

    pub fn statistic(&self) -> &Statistic {
        &self.statistic
    }
}

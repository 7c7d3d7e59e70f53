use wasm_bindgen::prelude::*;

use super::animation::AnimationLog;
use super::config::ModelConfig;
use super::{Director, Phase};
use crate::utils::errors::SimulationError;
use crate::utils::set_panic_hook;

fn to_js(error: SimulationError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// The `WebDirector` provides JS/WASM-compatible interfaces to the core
/// `Director`.  For additional insight on these methods, refer to the
/// associated `Director` methods.  Models are posted as YAML or JSON, and
/// results are returned as JSON strings.  Errors are returned as strings.
#[wasm_bindgen]
pub struct WebDirector {
    director: Director,
    animation: AnimationLog,
}

impl WebDirector {
    fn from_config(config: ModelConfig) -> Result<WebDirector, SimulationError> {
        let mut director = config.build()?;
        let animation = AnimationLog::new();
        if config.animate {
            director.set_animator(Box::new(animation.clone()));
        }
        Ok(Self {
            director,
            animation,
        })
    }

    fn ensure_started(&mut self) -> Result<(), SimulationError> {
        if self.director.phase() == Phase::Building {
            self.director.start()?;
        }
        Ok(())
    }

    /// The wrapped `Director`, for Rust callers.
    pub fn director(&self) -> &Director {
        &self.director
    }
}

#[wasm_bindgen]
impl WebDirector {
    /// Build a model from its YAML description.
    pub fn post_yaml(model: &str) -> Result<WebDirector, JsValue> {
        set_panic_hook();
        ModelConfig::from_yaml(model)
            .and_then(Self::from_config)
            .map_err(to_js)
    }

    /// Build a model from its JSON description.
    pub fn post_json(model: &str) -> Result<WebDirector, JsValue> {
        set_panic_hook();
        ModelConfig::from_json(model)
            .and_then(Self::from_config)
            .map_err(to_js)
    }

    /// Run the model to completion.
    pub fn simulate(&mut self) -> Result<(), JsValue> {
        self.ensure_started().map_err(to_js)?;
        self.director.wait_finished().map_err(to_js)
    }

    pub fn step(&mut self) -> Result<bool, JsValue> {
        self.ensure_started().map_err(to_js)?;
        self.director.step().map_err(to_js)
    }

    pub fn step_n(&mut self, n: usize) -> Result<usize, JsValue> {
        self.ensure_started().map_err(to_js)?;
        self.director.step_n(n).map_err(to_js)
    }

    pub fn step_until(&mut self, until: f64) -> Result<usize, JsValue> {
        self.ensure_started().map_err(to_js)?;
        self.director.step_until(until).map_err(to_js)
    }

    pub fn clock(&self) -> f64 {
        self.director.clock()
    }

    pub fn phase(&self) -> String {
        self.director.phase().as_str().to_string()
    }

    pub fn report_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.director.report())
            .map_err(|error| to_js(error.into()))
    }

    pub fn records_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.director.records()).map_err(|error| to_js(error.into()))
    }

    pub fn animation_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.animation.commands()).map_err(|error| to_js(error.into()))
    }

    /// Discard everything outstanding, returning the number of actors
    /// dropped.
    pub fn shutdown(&mut self) -> usize {
        self.director.shutdown()
    }
}

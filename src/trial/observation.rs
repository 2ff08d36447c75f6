//! Observation records and the on-demand observation builder
//!
//! Observations are role-agnostic: every step produces exactly one
//! [`Observation`] that is broadcast identically to all roles. Rendering is
//! costly, so a frame is only materialized when the session requested one.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SessionConfig;
use super::error::EnvResult;
use crate::env::Environment;

/// A rendered snapshot of the environment state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Encoded image bytes; encoding is the environment's concern
    pub data: Vec<u8>,
}

/// One step's observation, broadcast identically to all roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Structured state payload
    pub value: Value,
    /// Rendered snapshot, present only when the session requested rendering
    pub rendered_frame: Option<RenderedFrame>,
    /// Names of actors whose submitted action was replaced this step;
    /// always empty on the initial (reset) observation
    pub overridden_actors: BTreeSet<String>,
}

/// Builds observations from raw environment state
///
/// Holds the trial-lifetime render settings so the decision to render is
/// fixed at session start and never consulted per call site.
#[derive(Debug, Clone)]
pub struct ObservationBuilder {
    render: bool,
    render_width: u32,
}

impl ObservationBuilder {
    /// Create a builder from the session configuration
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            render: config.render,
            render_width: config.render_width,
        }
    }

    /// Build an observation from raw state and the overridden-actor set.
    ///
    /// Calls the environment's renderer only when the session requested
    /// rendering; a render failure is fatal like any collaborator failure.
    pub fn build<E: Environment>(
        &self,
        env: &mut E,
        value: Value,
        overridden_actors: BTreeSet<String>,
    ) -> EnvResult<Observation> {
        let rendered_frame = if self.render {
            Some(env.render(self.render_width)?)
        } else {
            None
        };

        Ok(Observation {
            value,
            rendered_frame,
            overridden_actors,
        })
    }

    /// Build the initial (reset) observation; the overridden set is empty
    /// since no action has been submitted yet.
    pub fn build_initial<E: Environment>(&self, env: &mut E, value: Value) -> EnvResult<Observation> {
        self.build(env, value, BTreeSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EnvStep, Environment};
    use crate::trial::error::EnvironmentError;
    use serde_json::json;

    struct FrameEnv;

    impl Environment for FrameEnv {
        fn reset(&mut self) -> EnvResult<Value> {
            Ok(json!(0))
        }

        fn step(&mut self, _action: &Value) -> EnvResult<EnvStep> {
            Ok(EnvStep {
                state: json!(0),
                reward: None,
                done: false,
            })
        }

        fn render(&mut self, width: u32) -> EnvResult<RenderedFrame> {
            Ok(RenderedFrame {
                width,
                data: vec![0xff],
            })
        }
    }

    struct NoRenderEnv;

    impl Environment for NoRenderEnv {
        fn reset(&mut self) -> EnvResult<Value> {
            Ok(json!(0))
        }

        fn step(&mut self, _action: &Value) -> EnvResult<EnvStep> {
            Ok(EnvStep {
                state: json!(0),
                reward: None,
                done: false,
            })
        }

        fn render(&mut self, _width: u32) -> EnvResult<RenderedFrame> {
            Err(EnvironmentError::Render("render must not be called".into()))
        }
    }

    #[test]
    fn test_render_requested() {
        let builder = ObservationBuilder::new(&SessionConfig {
            render: true,
            render_width: 64,
        });

        let obs = builder.build_initial(&mut FrameEnv, json!([1, 2])).unwrap();
        assert_eq!(obs.rendered_frame.unwrap().width, 64);
        assert!(obs.overridden_actors.is_empty());
    }

    #[test]
    fn test_render_not_requested_is_not_computed() {
        let builder = ObservationBuilder::new(&SessionConfig {
            render: false,
            render_width: 64,
        });

        // NoRenderEnv errors if render is invoked at all
        let obs = builder.build_initial(&mut NoRenderEnv, json!(null)).unwrap();
        assert!(obs.rendered_frame.is_none());
    }

    #[test]
    fn test_overridden_set_carried_through() {
        let builder = ObservationBuilder::new(&SessionConfig::default());
        let overridden: BTreeSet<String> = ["alice".to_string()].into_iter().collect();

        let obs = builder
            .build(&mut NoRenderEnv, json!(3), overridden.clone())
            .unwrap();
        assert_eq!(obs.overridden_actors, overridden);
    }
}

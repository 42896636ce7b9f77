//! Scenario files for the simulated world.
//!
//! A scenario describes where the player starts, which NPCs exist, the initial
//! counter values, and the talk tasks and dynamic requirements to run against
//! them. Scenarios are a harness for the simulator; they do not author quests.

use std::collections::BTreeSet;
use std::path::Path;

use quest_core::{
    CounterId, DynamicRequirement, ItemRequirement, NameFilter, NarratedStep, Narrator,
    TalkToNpcTask, Task, TaskConfig, WorldPoint,
};
use serde::{Deserialize, Serialize};

use crate::api::ScenarioError;
use crate::oracle::{SimNpc, SimWorld};

/// NPC placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcSpec {
    pub name: String,
    pub location: WorldPoint,

    /// Delay between arrival and the conversation opening.
    #[serde(default = "default_reply_delay")]
    pub reply_delay_ms: u64,

    /// The conversation window never opens.
    #[serde(default)]
    pub silent: bool,

    /// Choice lists that resolve the conversation.
    #[serde(default)]
    pub accepts: Vec<Vec<String>>,

    /// `(counter, delta)` applied when a conversation resolves.
    #[serde(default)]
    pub effects: Vec<(u32, i32)>,
}

/// A talk-to-NPC objective.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub npc: String,
    pub location: WorldPoint,

    /// Match the NPC name exactly instead of by substring.
    #[serde(default)]
    pub exact: bool,

    #[serde(default)]
    pub verb: Option<String>,

    pub choices: Vec<String>,

    #[serde(default)]
    pub backup_choices: Option<Vec<String>>,
}

/// A requirement whose quantity follows a counter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementSpec {
    pub counter: u32,
    pub goal: i32,
    pub item: ItemRequirement,
    /// Instruction text; `{quantity}` is replaced by the remaining quantity.
    pub text: String,

    /// Step location; when set the requirement is narrated as a step.
    #[serde(default)]
    pub location: Option<WorldPoint>,

    /// Static requirements listed after the dynamic one.
    #[serde(default)]
    pub also_requires: Vec<ItemRequirement>,
}

/// Scenario configuration for the simulated world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub player: WorldPoint,

    #[serde(default = "default_run_enabled")]
    pub run_enabled: bool,

    #[serde(default)]
    pub npcs: Vec<NpcSpec>,

    /// Initial `(counter, value)` pairs.
    #[serde(default)]
    pub counters: Vec<(u32, i32)>,

    #[serde(default)]
    pub tasks: Vec<TaskSpec>,

    #[serde(default)]
    pub requirements: Vec<RequirementSpec>,
}

fn default_reply_delay() -> u64 {
    SimNpc::DEFAULT_REPLY_DELAY_MS
}

fn default_run_enabled() -> bool {
    true
}

impl Scenario {
    /// Load and validate a scenario from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let scenario = Self::from_ron_str(&content)?;
        tracing::info!(
            path = %path.display(),
            npcs = scenario.npcs.len(),
            tasks = scenario.tasks.len(),
            requirements = scenario.requirements.len(),
            "Loaded scenario"
        );
        Ok(scenario)
    }

    /// Parse and validate a scenario from RON text.
    pub fn from_ron_str(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(content).map_err(ScenarioError::Parse)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        let mut names = BTreeSet::new();
        for npc in &self.npcs {
            if npc.name.trim().is_empty() {
                return Err(ScenarioError::Invalid("npc with empty name".to_string()));
            }
            if !names.insert(npc.name.as_str()) {
                return Err(ScenarioError::Invalid(format!(
                    "duplicate npc `{}`",
                    npc.name
                )));
            }
        }

        for (index, task) in self.tasks.iter().enumerate() {
            if task.npc.trim().is_empty() {
                return Err(ScenarioError::Invalid(format!(
                    "task {index} has an empty npc name"
                )));
            }
            if task.choices.is_empty() {
                return Err(ScenarioError::Invalid(format!(
                    "task {index} ({}) has no dialogue choices",
                    task.npc
                )));
            }
        }

        for (index, requirement) in self.requirements.iter().enumerate() {
            if requirement.text.trim().is_empty() {
                return Err(ScenarioError::Invalid(format!(
                    "requirement {index} has empty text"
                )));
            }
        }
        Ok(())
    }

    /// Initialize the simulated world from this scenario.
    pub fn build_world(&self) -> SimWorld {
        let mut world = SimWorld::new(self.player).with_run_enabled(self.run_enabled);

        for npc in &self.npcs {
            let mut sim_npc = SimNpc::new(npc.name.clone(), npc.location);
            sim_npc = if npc.silent {
                sim_npc.silent()
            } else {
                sim_npc.reply_delay(npc.reply_delay_ms)
            };
            for choices in &npc.accepts {
                sim_npc = sim_npc.accepting(choices.iter().cloned());
            }
            for &(counter, delta) in &npc.effects {
                sim_npc = sim_npc.with_effect(CounterId(counter), delta);
            }
            world = world.with_npc(sim_npc);
        }

        for &(counter, value) in &self.counters {
            world = world.with_counter(CounterId(counter), value);
        }
        world
    }

    /// Build the talk tasks in file order.
    ///
    /// Each task gets its own jitter context so tasks sharing `seed` still
    /// draw independent timing.
    pub fn build_tasks(&self, config: &TaskConfig, seed: u64) -> Vec<Box<dyn Task>> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let context = u32::try_from(index).unwrap_or(u32::MAX);
                let mut builder = TalkToNpcTask::builder(spec.npc.clone(), spec.location)
                    .choices(spec.choices.iter().cloned())
                    .config(config.clone())
                    .seed(seed, context);
                if spec.exact {
                    builder = builder.filter(NameFilter::Exact(spec.npc.clone()));
                }
                if let Some(verb) = &spec.verb {
                    builder = builder.verb(verb.clone());
                }
                if let Some(backup) = &spec.backup_choices {
                    builder = builder.backup_choices(backup.iter().cloned());
                }
                Box::new(builder.build()) as Box<dyn Task>
            })
            .collect()
    }

    /// Build one narrator per requirement.
    pub fn build_narrators(&self) -> Vec<Box<dyn Narrator>> {
        self.requirements
            .iter()
            .map(|spec| {
                let requirement = DynamicRequirement::new(
                    CounterId(spec.counter),
                    spec.goal,
                    spec.item.clone(),
                    spec.text.clone(),
                );
                match spec.location {
                    Some(location) => {
                        let step = spec
                            .also_requires
                            .iter()
                            .cloned()
                            .fold(NarratedStep::new(location, requirement), |step, extra| {
                                step.with_requirement(extra)
                            });
                        Box::new(step) as Box<dyn Narrator>
                    }
                    None => Box::new(requirement) as Box<dyn Narrator>,
                }
            })
            .collect()
    }
}

//! Requirements derived from live world counters.
//!
//! A [`Narrator`] is refreshed on every host tick, regardless of what the
//! active task is doing, so the displayed quantity and instruction text always
//! match the current world state.
use std::fmt;

use tracing::trace;

use crate::env::WorldOracle;
use crate::state::{CounterId, WorldPoint};

/// Placeholder replaced by the remaining quantity when rendering text.
pub const QUANTITY_PLACEHOLDER: &str = "{quantity}";

/// An item the player must bring or use.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRequirement {
    pub name: String,
    pub item_id: u32,
    pub quantity: u32,
    pub highlight_in_inventory: bool,
}

impl ItemRequirement {
    pub fn new(name: impl Into<String>, item_id: u32, quantity: u32) -> Self {
        Self {
            name: name.into(),
            item_id,
            quantity,
            highlight_in_inventory: false,
        }
    }

    pub fn highlighted(mut self) -> Self {
        self.highlight_in_inventory = true;
        self
    }
}

impl fmt::Display for ItemRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.quantity, self.name)
    }
}

/// Something re-evaluated on every world tick.
pub trait Narrator: Send {
    fn on_tick(&mut self, world: &dyn WorldOracle);

    /// Current instruction text.
    fn text(&self) -> &str;

    /// Requirements as of the last tick.
    fn requirements(&self) -> &[ItemRequirement];
}

/// Quantity `goal - counter`, clamped at zero, kept in sync with a counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicRequirement {
    counter: CounterId,
    goal: i32,
    requirement: ItemRequirement,
    template: String,
    text: String,
}

impl DynamicRequirement {
    /// `template` may contain [`QUANTITY_PLACEHOLDER`]. Until the first tick
    /// the requirement shows the full goal.
    pub fn new(
        counter: CounterId,
        goal: i32,
        requirement: ItemRequirement,
        template: impl Into<String>,
    ) -> Self {
        let template = template.into();
        let quantity = clamp(goal);
        let text = render(&template, quantity);
        Self {
            counter,
            goal,
            requirement: ItemRequirement {
                quantity,
                ..requirement
            },
            template,
            text,
        }
    }

    pub fn counter(&self) -> CounterId {
        self.counter
    }

    pub fn goal(&self) -> i32 {
        self.goal
    }

    pub fn quantity(&self) -> u32 {
        self.requirement.quantity
    }

    pub fn requirement(&self) -> &ItemRequirement {
        &self.requirement
    }

    /// Remaining quantity for a counter value, never negative.
    pub fn remaining(&self, counter_value: i32) -> u32 {
        clamp(self.goal.saturating_sub(counter_value))
    }

    /// Recomputes quantity and text from the world; returns the new quantity.
    pub fn refresh(&mut self, world: &dyn WorldOracle) -> u32 {
        let value = world.counter(self.counter);
        let quantity = self.remaining(value);
        if quantity != self.requirement.quantity {
            trace!(
                target: "quest::requirement",
                counter = self.counter.0,
                value,
                quantity,
                "Requirement quantity changed"
            );
        }
        self.requirement.quantity = quantity;
        self.text = render(&self.template, quantity);
        quantity
    }
}

impl Narrator for DynamicRequirement {
    fn on_tick(&mut self, world: &dyn WorldOracle) {
        self.refresh(world);
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn requirements(&self) -> &[ItemRequirement] {
        std::slice::from_ref(&self.requirement)
    }
}

/// A located step whose description and requirement list follow a counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarratedStep {
    location: WorldPoint,
    driver: DynamicRequirement,
    extra: Vec<ItemRequirement>,
    requirements: Vec<ItemRequirement>,
}

impl NarratedStep {
    pub fn new(location: WorldPoint, driver: DynamicRequirement) -> Self {
        let requirements = vec![driver.requirement().clone()];
        Self {
            location,
            driver,
            extra: Vec::new(),
            requirements,
        }
    }

    /// Static requirement listed after the dynamic one.
    pub fn with_requirement(mut self, requirement: ItemRequirement) -> Self {
        self.requirements.push(requirement.clone());
        self.extra.push(requirement);
        self
    }

    pub fn location(&self) -> WorldPoint {
        self.location
    }

    pub fn driver(&self) -> &DynamicRequirement {
        &self.driver
    }
}

impl Narrator for NarratedStep {
    fn on_tick(&mut self, world: &dyn WorldOracle) {
        self.driver.on_tick(world);
        self.requirements.clear();
        self.requirements.push(self.driver.requirement().clone());
        self.requirements.extend(self.extra.iter().cloned());
    }

    fn text(&self) -> &str {
        self.driver.text()
    }

    fn requirements(&self) -> &[ItemRequirement] {
        &self.requirements
    }
}

fn clamp(quantity: i32) -> u32 {
    u32::try_from(quantity).unwrap_or(0)
}

fn render(template: &str, quantity: u32) -> String {
    template.replace(QUANTITY_PLACEHOLDER, &quantity.to_string())
}

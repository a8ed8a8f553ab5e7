use std::fmt::Write as _;

use shared::{domain::Objective, money::format_brl};

use crate::{
    step::{DataKey, StepData, StepValue},
    validate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    pub label: &'static str,
    pub key: DataKey,
}

impl StepDescriptor {
    pub fn validate(&self, data: &StepData) -> bool {
        validate::validate(self.key, data)
    }

    pub fn render(&self, data: &StepData, view: &dyn StepView) -> String {
        view.render(self, &data.get(self.key))
    }
}

/// The only place step order is written down.
#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: Vec<StepDescriptor>,
}

impl StepRegistry {
    /// `None` for an empty list; a wizard needs at least one step.
    pub fn new(steps: Vec<StepDescriptor>) -> Option<Self> {
        (!steps.is_empty()).then_some(Self { steps })
    }

    pub fn campaign() -> Self {
        Self {
            steps: vec![
                StepDescriptor {
                    label: "Choose the campaign objective",
                    key: DataKey::Objective,
                },
                StepDescriptor {
                    label: "Budget and Schedule",
                    key: DataKey::Budget,
                },
                StepDescriptor {
                    label: "Media",
                    key: DataKey::Medias,
                },
                StepDescriptor {
                    label: "Localization",
                    key: DataKey::Localization,
                },
                StepDescriptor {
                    label: "Resume",
                    key: DataKey::Resume,
                },
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepDescriptor> {
        self.steps.get(index)
    }

    /// Like [`Self::get`] but clamped to the last step.
    pub fn at(&self, index: usize) -> &StepDescriptor {
        &self.steps[index.min(self.last_index())]
    }

    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn position(&self, key: DataKey) -> Option<usize> {
        self.steps.iter().position(|s| s.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDescriptor> {
        self.steps.iter()
    }
}

/// Presents one step's slice. Front ends plug their own rendering in here.
pub trait StepView {
    fn render(&self, step: &StepDescriptor, value: &StepValue) -> String;
}

/// Plain-text rendering used by the command line front end.
pub struct TextStepView;

impl StepView for TextStepView {
    fn render(&self, step: &StepDescriptor, value: &StepValue) -> String {
        let mut out = format!("== {} ==\n", step.label);
        match value {
            StepValue::Objective(objective) => {
                for option in Objective::ALL {
                    let mark = if *objective == Some(option) { "x" } else { " " };
                    let _ = writeln!(out, "[{mark}] {option}");
                }
            }
            StepValue::Budget(Some(budget)) => {
                let _ = writeln!(out, "Ad name: {}", budget.name);
                let _ = writeln!(out, "Budget type: {}", budget.kind.label());
                let _ = writeln!(out, "Budget value: {}", format_brl(budget.amount));
                let _ = writeln!(out, "Start: {}", budget.schedule_start);
                let _ = writeln!(out, "End: {}", budget.schedule_end);
            }
            StepValue::Budget(None) => out.push_str("(no budget yet)\n"),
            StepValue::Medias(Some(media)) => {
                let _ = writeln!(
                    out,
                    "{} [{}] {} bytes",
                    media.file_name,
                    media.mime_type,
                    media.size()
                );
            }
            StepValue::Medias(None) => out.push_str("(no media selected)\n"),
            StepValue::Localization(selected) if selected.is_empty() => {
                out.push_str("(no locations selected)\n");
            }
            StepValue::Localization(selected) => {
                for placement in selected {
                    let _ = writeln!(
                        out,
                        "* {} ({:.4}, {:.4})",
                        placement.name, placement.latitude, placement.longitude
                    );
                }
            }
            StepValue::Resume(Some(resume)) => out.push_str(&resume.summary),
            StepValue::Resume(None) => out.push_str("(nothing to review)\n"),
        }
        out
    }
}

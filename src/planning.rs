//! Clarification plans collected by the planning form
//!
//! A plan lives only long enough to be turned into one instruction message
//! for the outgoing request; it is never stored in the conversation.

use serde::{Deserialize, Serialize};

/// Scope shown when the user picks no focus area
pub const GENERAL_OVERVIEW: &str = "General Overview";

/// Focus areas offered by the form, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    CoreDefinitions,
    StepByStepProcess,
    ConcreteExample,
    CommonMisconceptions,
}

impl FocusArea {
    pub const ALL: [FocusArea; 4] = [
        FocusArea::CoreDefinitions,
        FocusArea::StepByStepProcess,
        FocusArea::ConcreteExample,
        FocusArea::CommonMisconceptions,
    ];

    /// Tag used inside the synthesized instruction
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CoreDefinitions => "Core Definitions",
            Self::StepByStepProcess => "Step-by-Step Process",
            Self::ConcreteExample => "Concrete Example",
            Self::CommonMisconceptions => "Common Misconceptions",
        }
    }

    /// Checkbox label shown on the form
    pub fn label(&self) -> &'static str {
        match self {
            Self::CoreDefinitions => "Core Definitions",
            Self::StepByStepProcess => "The Step-by-Step Process",
            Self::ConcreteExample => "A Concrete Example",
            Self::CommonMisconceptions => "Common Misconceptions",
        }
    }
}

/// How the user intends to use the answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningGoal {
    #[default]
    QuickSummary,
    DetailedExplanation,
    ApplicationPractice,
}

impl LearningGoal {
    pub const ALL: [LearningGoal; 3] = [
        LearningGoal::QuickSummary,
        LearningGoal::DetailedExplanation,
        LearningGoal::ApplicationPractice,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::QuickSummary => "Quick Summary (I just need the big picture or a refresher)",
            Self::DetailedExplanation => {
                "Detailed Explanation (I need to understand the \"why\" and \"how\" deeply)"
            }
            Self::ApplicationPractice => {
                "Application Practice (Give me a new scenario to solve to test my understanding)"
            }
        }
    }
}

/// Scope, depth and prior confusion for one planned answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClarificationPlan {
    focus: Vec<FocusArea>,
    other: Option<String>,
    depth: LearningGoal,
    confusion: Option<String>,
}

impl ClarificationPlan {
    pub fn new(depth: LearningGoal) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    /// Add a focus area; duplicates are ignored and form order is kept
    pub fn with_focus(mut self, area: FocusArea) -> Self {
        if !self.focus.contains(&area) {
            self.focus.push(area);
            self.focus.sort();
        }
        self
    }

    /// Free-text scope; blank text is ignored
    pub fn with_other(mut self, other: impl Into<String>) -> Self {
        self.other = non_blank(other.into());
        self
    }

    /// Prior confusion; blank text is ignored
    pub fn with_confusion(mut self, confusion: impl Into<String>) -> Self {
        self.confusion = non_blank(confusion.into());
        self
    }

    pub fn focus(&self) -> &[FocusArea] {
        &self.focus
    }

    pub fn depth(&self) -> LearningGoal {
        self.depth
    }

    pub fn confusion(&self) -> Option<&str> {
        self.confusion.as_deref()
    }

    /// Scope text: selected tags, then `Other: ...`, or the general overview
    pub fn scope_text(&self) -> String {
        let mut parts: Vec<String> = self.focus.iter().map(|f| f.tag().to_string()).collect();
        if let Some(other) = &self.other {
            parts.push(format!("Other: {}", other));
        }

        if parts.is_empty() {
            GENERAL_OVERVIEW.to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Build the single instruction message sent ahead of the planned answer
    pub fn synthesize_instruction(&self, question: &str) -> String {
        format!(
            "User Question: '{}'. Constraints -> Scope: {}. Depth: {}. Confusion: {}. \
             Answer strictly based on this plan.",
            question,
            self.scope_text(),
            self.depth.label(),
            self.confusion.as_deref().unwrap_or("")
        )
    }
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

//! Supported agent variants.
//!
//! Each variant maps to one template asset (`spec-kit-template-{key}`) and
//! optionally to a command-line tool that must be installed to use it.

use crate::template::error::{TemplateError, TemplateResult};
use crate::tools::{self, ToolRequirement};

/// Variant selected when the user just presses Enter.
pub const DEFAULT_VARIANT: &str = "copilot";

/// An agent the template can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentVariant {
    /// Key used in asset names and `--ai`.
    pub key: &'static str,
    /// Display name.
    pub label: &'static str,
    /// Tool checked before install unless `--ignore-agent-tools`.
    pub required_tool: Option<ToolRequirement>,
    /// How to start using the generated project.
    pub usage: &'static [&'static str],
}

/// All variants, in menu order.
pub const VARIANTS: [AgentVariant; 3] = [
    AgentVariant {
        key: "copilot",
        label: "GitHub Copilot",
        // Ships with the IDE, nothing to probe
        required_tool: None,
        usage: &["Open in VS Code and use /specify, /plan, /tasks with GitHub Copilot"],
    },
    AgentVariant {
        key: "claude",
        label: "Claude Code",
        required_tool: Some(tools::CLAUDE),
        usage: &[
            "Open in Visual Studio Code and start using / commands with Claude Code",
            "  - Type / in any file to see available commands",
            "  - Use /specify to create specifications",
            "  - Use /plan to create implementation plans",
            "  - Use /tasks to generate tasks",
        ],
    },
    AgentVariant {
        key: "gemini",
        label: "Gemini CLI",
        required_tool: Some(tools::GEMINI),
        usage: &[
            "Use / commands with Gemini CLI",
            "  - Run gemini /specify to create specifications",
            "  - Run gemini /plan to create implementation plans",
            "  - See GEMINI.md for all available commands",
        ],
    },
];

/// Look up a variant by key.
pub fn find_variant(key: &str) -> Option<&'static AgentVariant> {
    VARIANTS.iter().find(|v| v.key == key)
}

/// Look up a variant, failing with the list of valid keys.
pub fn parse_variant(key: &str) -> TemplateResult<&'static AgentVariant> {
    find_variant(key).ok_or_else(|| {
        TemplateError::Validation(format!(
            "Invalid AI assistant '{}'. Choose from: {}",
            key,
            variant_keys().join(", ")
        ))
    })
}

/// Variant keys in menu order.
pub fn variant_keys() -> Vec<&'static str> {
    VARIANTS.iter().map(|v| v.key).collect()
}

/// `(key, label)` pairs for the selector.
pub fn menu_options() -> Vec<(String, String)> {
    VARIANTS
        .iter()
        .map(|v| (v.key.to_string(), v.label.to_string()))
        .collect()
}

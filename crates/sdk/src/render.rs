//! Render instruction API.
//!
//! The kernel hands renderers structured instructions (never markup).
//! A renderer picks its widget by `variant` and paints `children` in order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Props;

/// One node of the instruction tree handed to the render collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderInstruction {
    /// Renderer variant name, e.g. `page:home`, `component:hero`, `unknown`.
    pub variant: String,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub children: Vec<RenderInstruction>,
}

impl RenderInstruction {
    /// Variant name of the fallback instruction.
    pub const UNKNOWN: &'static str = "unknown";

    /// Prop on an `unknown` instruction carrying the unmatched type tag.
    /// Underscored so it never collides with a content prop.
    pub const TYPE_TAG_PROP: &'static str = "_typeTag";

    /// Prop on an `unknown` instruction carrying the serialized fault, if any.
    pub const FAULT_PROP: &'static str = "_fault";

    pub fn is_unknown(&self) -> bool {
        self.variant == Self::UNKNOWN
    }

    /// Depth-first iterator over this instruction and all descendants.
    pub fn walk(&self) -> impl Iterator<Item = &RenderInstruction> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

/// Builder for constructing render instructions.
pub struct InstructionBuilder {
    variant: String,
    props: Props,
    children: Vec<RenderInstruction>,
}

impl InstructionBuilder {
    pub fn new(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn props(mut self, props: Props) -> Self {
        self.props.extend(props);
        self
    }

    pub fn child(mut self, child: RenderInstruction) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = RenderInstruction>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn build(self) -> RenderInstruction {
        RenderInstruction {
            variant: self.variant,
            props: self.props,
            children: self.children,
        }
    }
}

/// Start a page instruction for the given template variant.
pub fn page(template: &str) -> InstructionBuilder {
    InstructionBuilder::new(format!("page:{template}"))
}

/// Start a component instruction for the given component variant.
pub fn component(kind: &str) -> InstructionBuilder {
    InstructionBuilder::new(format!("component:{kind}"))
}

/// Start a fallback instruction.
pub fn unknown() -> InstructionBuilder {
    InstructionBuilder::new(RenderInstruction::UNKNOWN)
}

use std::collections::HashMap;

use crate::domain::types::ToolDescriptor;

/// Wire name of the built-in calculator tool.
pub const ONE_PLUS_ONE: &str = "onePlusOne";

/// Immutable set of tool descriptors advertised to the remote model.
///
/// Built once at startup; lookups are case-insensitive on the tool name.
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    index: HashMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new(descriptors: Vec<ToolDescriptor>) -> Self {
        let index = descriptors
            .iter()
            .cloned()
            .map(|descriptor| (descriptor.name.to_lowercase(), descriptor))
            .collect();
        Self { descriptors, index }
    }

    /// The registry this system ships with: the zero-argument calculator.
    pub fn builtin() -> Self {
        Self::new(vec![ToolDescriptor::new(
            ONE_PLUS_ONE,
            "Returns the result of 1 + 1",
        )])
    }

    pub fn describe(&self) -> Vec<ToolDescriptor> {
        self.descriptors.clone()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_exposes_the_calculator() {
        let registry = ToolRegistry::builtin();
        let descriptors = registry.describe();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, ONE_PLUS_ONE);
        assert!(descriptors[0].parameters.is_empty());
    }

    #[test]
    fn lookup_ignores_case() {
        let registry = ToolRegistry::builtin();
        assert!(registry.contains("onePlusOne"));
        assert!(registry.contains("oneplusone"));
        assert!(!registry.contains("subtract"));
    }

    #[test]
    fn describe_is_stable_across_calls() {
        let registry = ToolRegistry::builtin();
        assert_eq!(registry.describe(), registry.describe());
    }
}

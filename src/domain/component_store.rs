// Configuration store - the widget list of a single dashboard
use super::widget::WidgetConfig;
use crate::error::ValidationError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentStore {
    components: Vec<WidgetConfig>,
}

impl ComponentStore {
    pub fn new(components: Vec<WidgetConfig>) -> Self {
        Self { components }
    }

    pub fn as_slice(&self) -> &[WidgetConfig] {
        &self.components
    }

    pub fn into_vec(self) -> Vec<WidgetConfig> {
        self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&WidgetConfig> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn add(&mut self, component: WidgetConfig) -> Result<(), ValidationError> {
        if self.get(&component.id).is_some() {
            return Err(ValidationError::DuplicateComponent(component.id));
        }
        self.components.push(component);
        Ok(())
    }

    /// Replace the component with the same id, keeping its display slot.
    /// Returns false when no such component exists.
    pub fn replace(&mut self, component: WidgetConfig) -> bool {
        match self.components.iter_mut().find(|c| c.id == component.id) {
            Some(slot) => {
                *slot = component;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<WidgetConfig> {
        let index = self.components.iter().position(|c| c.id == id)?;
        Some(self.components.remove(index))
    }

    /// Swap in a full list emitted by the grid.
    pub fn replace_all(&mut self, components: Vec<WidgetConfig>) {
        self.components = components;
    }
}

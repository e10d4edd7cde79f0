use crate::error::CommandError;
use crate::handler::CommandHandler;
use std::collections::HashMap;
use std::sync::Arc;

pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Fails if `name` already has a handler; the existing one is kept.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<&mut Self, CommandError> {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            return Err(CommandError::DuplicateHandler(name));
        }
        self.handlers.insert(name, handler);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Registered operation names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

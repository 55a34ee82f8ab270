use log::debug;

use crate::error::ScenarioError;
use crate::ids::IdGenerator;

/// State shared by every step of one scenario construction.
///
/// Owns the identity generator, so two scenarios built with separate
/// contexts never share id space and nothing is kept in process globals.
#[derive(Debug, Default)]
pub struct ScenarioContext {
    ids: IdGenerator,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generator(ids: IdGenerator) -> Self {
        ScenarioContext { ids }
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    /// Allocate the identity of the broker that owns the application
    pub fn allocate_user_id(&self) -> Result<u32, ScenarioError> {
        let id = self.ids.next_id()?;
        debug!("Allocated broker/user id {}", id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_shares_device_id_space() {
        let ctx = ScenarioContext::new();
        let user = ctx.allocate_user_id().unwrap();
        let next = ctx.ids().next_id().unwrap();
        assert!(next > user);
    }

    #[test]
    fn test_exhausted_context() {
        let ctx = ScenarioContext::with_generator(IdGenerator::starting_at(u32::MAX));
        assert!(matches!(ctx.allocate_user_id(), Err(ScenarioError::IdsExhausted)));
    }
}

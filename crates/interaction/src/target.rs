use dwellspace_common::EntityId;
use std::fmt;

/// Handle of a registered interactive target. Registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub usize);

/// A zero-argument side effect run when a dwell on its target completes.
pub struct Invocable(Box<dyn FnMut()>);

impl Invocable {
    pub fn new(action: impl FnMut() + 'static) -> Self {
        Self(Box::new(action))
    }

    /// Action that does nothing.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn invoke(&mut self) {
        (self.0)()
    }
}

impl<F: FnMut() + 'static> From<F> for Invocable {
    fn from(action: F) -> Self {
        Self::new(action)
    }
}

impl fmt::Debug for Invocable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Invocable(..)")
    }
}

/// A mesh that can be selected by dwelling on it, plus what selecting it does.
#[derive(Debug)]
pub struct InteractiveTarget {
    /// Mesh whose volume is hit-tested.
    pub mesh: EntityId,
    action: Invocable,
    invocations: u64,
}

impl InteractiveTarget {
    /// How many times the action has fired.
    pub fn invocations(&self) -> u64 {
        self.invocations
    }
}

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    #[error("target {0:?} is not registered")]
    UnknownTarget(TargetId),
}

/// The set of interactive targets, filled in by scene setup.
///
/// Append-only: targets are never removed, so a `TargetId` stays valid for
/// the lifetime of the registry.
#[derive(Debug, Default)]
pub struct InteractionRegistry {
    targets: Vec<InteractiveTarget>,
}

impl InteractionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mesh` as selectable, running `action` on each completed dwell.
    pub fn register(&mut self, mesh: EntityId, action: impl Into<Invocable>) -> TargetId {
        let id = TargetId(self.targets.len());
        self.targets.push(InteractiveTarget {
            mesh,
            action: action.into(),
            invocations: 0,
        });
        tracing::debug!(target_id = id.0, mesh = %mesh.short(), "interactive target registered");
        id
    }

    pub fn get(&self, id: TargetId) -> Option<&InteractiveTarget> {
        self.targets.get(id.0)
    }

    /// Registered target for a mesh, if any. First registration wins.
    pub fn find_by_mesh(&self, mesh: EntityId) -> Option<TargetId> {
        self.targets
            .iter()
            .position(|t| t.mesh == mesh)
            .map(TargetId)
    }

    /// Targets in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TargetId, &InteractiveTarget)> {
        self.targets
            .iter()
            .enumerate()
            .map(|(i, t)| (TargetId(i), t))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Run a target's action.
    pub fn invoke(&mut self, id: TargetId) -> Result<(), InteractionError> {
        let target = self
            .targets
            .get_mut(id.0)
            .ok_or(InteractionError::UnknownTarget(id))?;
        target.action.invoke();
        target.invocations += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn register_assigns_sequential_ids() {
        let mut reg = InteractionRegistry::new();
        let a = reg.register(EntityId::new(), Invocable::noop());
        let b = reg.register(EntityId::new(), || {});
        assert_eq!(a, TargetId(0));
        assert_eq!(b, TargetId(1));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn invoke_runs_action_and_counts() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let mut reg = InteractionRegistry::new();
        let id = reg.register(EntityId::new(), move || counter.set(counter.get() + 1));

        reg.invoke(id).unwrap();
        reg.invoke(id).unwrap();
        assert_eq!(hits.get(), 2);
        assert_eq!(reg.get(id).unwrap().invocations(), 2);
    }

    #[test]
    fn invoke_unknown_target_fails() {
        let mut reg = InteractionRegistry::new();
        assert!(matches!(
            reg.invoke(TargetId(3)),
            Err(InteractionError::UnknownTarget(TargetId(3)))
        ));
    }

    #[test]
    fn find_by_mesh() {
        let mut reg = InteractionRegistry::new();
        let mesh = EntityId::new();
        reg.register(EntityId::new(), Invocable::noop());
        let id = reg.register(mesh, Invocable::noop());
        assert_eq!(reg.find_by_mesh(mesh), Some(id));
        assert!(reg.find_by_mesh(EntityId::new()).is_none());
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut reg = InteractionRegistry::new();
        let meshes: Vec<EntityId> = (0..5).map(|_| EntityId::new()).collect();
        for m in &meshes {
            reg.register(*m, Invocable::noop());
        }
        let seen: Vec<EntityId> = reg.iter().map(|(_, t)| t.mesh).collect();
        assert_eq!(seen, meshes);
    }
}

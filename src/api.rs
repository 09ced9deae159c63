use crate::types::{ActionContext, CollisionEvent};

// --- Agent -----------------------------------------------------------------

/// Read-only view of the agent's locomotion, queried per contact resolution.
pub trait AgentActionState {
    fn is_sliding(&self) -> bool;
    fn is_crouching(&self) -> bool;
    fn is_jumping(&self) -> bool;

    /// Snapshot all three flags.
    fn action_context(&self) -> ActionContext {
        ActionContext {
            sliding: self.is_sliding(),
            crouching: self.is_crouching(),
            jumping: self.is_jumping(),
        }
    }
}

/// Lifecycle commands the engine issues on the agent.
pub trait AgentLifecycle {
    /// Called exactly once per lethal obstacle resolution.
    fn die(&mut self);
}

/// An agent the engine can both query and command.
pub trait Agent: AgentActionState + AgentLifecycle {}

impl<T: AgentActionState + AgentLifecycle> Agent for T {}

// --- Optional capabilities ---------------------------------------------------

pub trait ShieldCapability {
    /// Returns true when a shield charge absorbed the hit.
    fn try_absorb_damage(&mut self) -> bool;
}

/// Attached per proxy by the world.
pub trait BreakableCapability {
    /// Returns true when the obstacle was broken by the agent's current action.
    fn handle_special_break(&mut self, action: &ActionContext) -> bool;
}

pub trait CameraFeedback {
    fn shake(&mut self, intensity: f32, duration: f32);
}

// --- Observers ---------------------------------------------------------------

/// Receives orchestrator events in registration order.
pub trait CollisionObserver {
    fn on_event(&mut self, event: &CollisionEvent);
}

impl<F> CollisionObserver for F
where
    F: FnMut(&CollisionEvent),
{
    fn on_event(&mut self, event: &CollisionEvent) {
        self(event)
    }
}

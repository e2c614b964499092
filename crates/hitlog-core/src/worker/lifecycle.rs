use std::fmt;

/// Controller lifecycle, mirroring a service worker's states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; this controller will never serve requests.
    Redundant,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Parsed => "parsed",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Activated => "activated",
            LifecycleState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub(crate) struct Lifecycle {
    pub state: LifecycleState,
    /// Set once install succeeds: activate without waiting for old controllers.
    pub skip_waiting: bool,
    /// Set once activate finishes: already-open pages are controlled.
    pub clients_claimed: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Parsed,
            skip_waiting: false,
            clients_claimed: false,
        }
    }
}

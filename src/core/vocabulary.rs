//! The closed event and state vocabularies shared by every integration machine.

crate::closed_enum! {
    /// Triggers delivered to a machine.
    ///
    /// `NoOp` is the sentinel an action returns when it requests no further
    /// transition.
    pub enum EventType {
        Discovery => "discovery",
        Register => "register",
        Connect => "connect",
        Disconnect => "disconnect",
        Ignore => "ignore",
        NoOp => "noop",
    }
}

crate::closed_enum! {
    /// Lifecycle states of an integration instance.
    ///
    /// `Initial` is where a freshly constructed machine starts. `Default` is
    /// the "no previous state yet" marker and is never a transition target.
    pub enum StateType {
        Initial => "initial",
        Discovered => "discovered",
        Registered => "registered",
        Connected => "connected",
        Disconnected => "disconnected",
        Ignored => "ignored",
        Default => "default",
    }
}

impl EventType {
    /// True for the sentinel that requests nothing.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self::NoOp
    }
}

impl Default for StateType {
    fn default() -> Self {
        Self::Default
    }
}

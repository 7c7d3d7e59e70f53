//! The models module provides the prebuilt components that actors move
//! through: resources and their wait queues, gates, junctions, sources,
//! sinks, transports and routes.  Every component embeds a
//! `ComponentCore` (identity, position, statistic), and exposes those
//! capabilities through the `Identifiable`, `Positioned` and `StatTracked`
//! traits, derived with `#[derive(Component)]`.
//!
//! Components hold state only.  The `Director` owns every component and
//! mediates all interaction between them and the actors.

use serde::{Deserialize, Serialize};

pub mod component;
pub mod gate;
pub mod junction;
pub mod resource;
pub mod route;
pub mod sink;
pub mod source;
pub mod transport;
pub mod wait_queue;

pub use self::component::{ComponentCore, Identifiable, Position, Positioned, Reportable, StatTracked};
pub use self::gate::Gate;
pub use self::junction::Junction;
pub use self::resource::Resource;
pub use self::route::{LaneChoice, Route};
pub use self::sink::Sink;
pub use self::source::{ScriptFactory, Source};
pub use self::transport::Transport;
pub use self::wait_queue::{Discipline, WaitQueue};

macro_rules! component_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub(crate) usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

component_id!(
    /// Handle of a `Resource` registered with a `Director`.
    ResourceId
);
component_id!(
    /// Handle of a `WaitQueue` registered with a `Director`.
    QueueId
);
component_id!(
    /// Handle of a `Gate` registered with a `Director`.
    GateId
);
component_id!(
    /// Handle of a `Junction` registered with a `Director`.
    JunctionId
);
component_id!(
    /// Handle of a `Source` registered with a `Director`.
    SourceId
);
component_id!(
    /// Handle of a `Sink` registered with a `Director`.
    SinkId
);
component_id!(
    /// Handle of a `Transport` registered with a `Director`.
    TransportId
);
component_id!(
    /// Handle of a `Route` registered with a `Director`.
    RouteId
);

/// Any registered component, as resolved from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentId {
    Resource(ResourceId),
    WaitQueue(QueueId),
    Gate(GateId),
    Junction(JunctionId),
    Source(SourceId),
    Sink(SinkId),
    Transport(TransportId),
    Route(RouteId),
}

impl ComponentId {
    pub fn kind(&self) -> &'static str {
        match self {
            ComponentId::Resource(_) => "Resource",
            ComponentId::WaitQueue(_) => "WaitQueue",
            ComponentId::Gate(_) => "Gate",
            ComponentId::Junction(_) => "Junction",
            ComponentId::Source(_) => "Source",
            ComponentId::Sink(_) => "Sink",
            ComponentId::Transport(_) => "Transport",
            ComponentId::Route(_) => "Route",
        }
    }
}

/// A record of a state change during a run, kept when the `Director` is
/// configured to store records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    pub time: f64,
    pub action: String,
    pub subject: String,
}

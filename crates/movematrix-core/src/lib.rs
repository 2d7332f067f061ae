pub mod composition;
pub mod connection;
pub mod error;
pub mod id;
pub mod param;
pub mod primitive;
pub mod registry;

// Re-export commonly used types
pub use composition::{Composition, RemovedPrimitive};
pub use connection::Connection;
pub use error::CoreError;
pub use id::{CompositionId, ConnectionId, IdAllocator, PortId, PrimitiveId};
pub use param::{ConstraintViolation, Constraints, Literal, ParamError, ParamType, ParamValue, ParameterDef};
pub use primitive::{Direction, Port, Position, Primitive, PrimitiveKind, PrimitivePatch};
pub use registry::{PortSpec, PrimitiveTemplate, Registry};

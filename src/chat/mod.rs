//! Chat core: session registry, message log, room fanout, and the event
//! router that ties them together.

mod events;
mod log;
mod registry;
mod room;
mod router;

pub use events::{ClientEvent, ServerEvent};
pub use log::{DeliveryStatus, Message, MessageKind, MessageLog, ROOM_ID};
pub use registry::{Session, SessionRegistry, UserStatus};
pub use room::{EventSender, Room};
pub use router::{ConnectionState, EventRouter};

mod connection;
mod protocol;
mod stats;

pub use connection::{
    Connection, ConnectionState, HostListener, NetError, SEND_QUEUE_CAPACITY, connect,
};
pub use protocol::{
    DEFAULT_PORT, Envelope, FRAME_HEADER_SIZE, GameState, MAX_FRAME_SIZE, Message, PacketError,
    ProjectileState, TankState,
};
pub use stats::NetworkStats;

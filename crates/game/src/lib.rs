pub mod client;
pub mod input;
pub mod map;
pub mod net;
pub mod session;
pub mod simulation;

pub use client::{Interpolator, LocalPredictor, interpolation_ratio};
pub use input::{Controls, InputQueue, InputSnapshot, KeyBindings, key};
pub use map::{Rect, TileMap, WallMap};
pub use net::{
    Connection, ConnectionState, DEFAULT_PORT, Envelope, GameState, HostListener, Message,
    NetError, NetworkStats, PacketError, ProjectileState, TankState, connect,
};
pub use session::{
    ChatSink, ClientSession, Frame, HostSession, LocalAction, LocalEvent, LogChat, LogRenderer,
    NullRenderer, Renderer, Session, SessionEnd, SessionTiming, run_session,
};
pub use simulation::{
    Direction, Hit, MatchState, Projectile, Side, Simulation, SimulationConfig, SpawnError,
    Tank, TickReport,
};

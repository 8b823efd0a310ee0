use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize, rancor};

use crate::input::InputSnapshot;
use crate::simulation::{Direction, Side};

pub const DEFAULT_PORT: u16 = 8881;
pub const MAX_FRAME_SIZE: usize = 64 * 1024;
pub const FRAME_HEADER_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct TankState {
    pub position: [i32; 2],
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct ProjectileState {
    pub id: u32,
    pub owner: Side,
    pub position: [i32; 2],
    pub direction: Direction,
}

/// Authoritative snapshot of the match as seen by the host.
///
/// `winner` stays `None` while the match is being played; the host sends a
/// single final snapshot carrying the winner before it stops broadcasting.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct GameState {
    pub host: TankState,
    pub peer: TankState,
    pub projectiles: Vec<ProjectileState>,
    pub winner: Option<Side>,
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum Message {
    FireRequest,
    PlayerInput(InputSnapshot),
    ChatMessage(String),
    GameState(GameState),
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::FireRequest => "FIRE_REQUEST",
            Message::PlayerInput(_) => "PLAYER_INPUT",
            Message::ChatMessage(_) => "CHAT_MESSAGE",
            Message::GameState(_) => "GAME_STATE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Envelope {
    pub sequence: u32,
    pub message: Message,
}

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("malformed message: {0}")]
    Malformed(rancor::Error),
    #[error("frame of {0} bytes exceeds the {MAX_FRAME_SIZE} byte limit")]
    FrameTooLarge(usize),
}

impl Envelope {
    pub fn new(sequence: u32, message: Message) -> Self {
        Self { sequence, message }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, PacketError> {
        rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(PacketError::Serialize)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, PacketError> {
        // Frames come off the socket at arbitrary alignment.
        let mut aligned = AlignedVec::<16>::with_capacity(data.len());
        aligned.extend_from_slice(data);
        let mut envelope = rkyv::from_bytes::<Self, rancor::Error>(&aligned)
            .map_err(PacketError::Malformed)?;
        if let Message::PlayerInput(snapshot) = &mut envelope.message {
            snapshot.normalize();
        }
        Ok(envelope)
    }

    /// Serializes the envelope behind a big-endian length prefix.
    pub fn to_frame(&self) -> Result<Vec<u8>, PacketError> {
        let body = self.serialize()?;
        if body.len() > MAX_FRAME_SIZE {
            return Err(PacketError::FrameTooLarge(body.len()));
        }

        let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + body.len());
        frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
        frame.extend_from_slice(&body);
        Ok(frame)
    }
}

use std::io::{self, BufRead};
use std::thread;

use tankwar::{ChatSink, Frame, KeyBindings, LocalEvent, Renderer, Side, key};
use tokio::sync::mpsc::{self, UnboundedReceiver};

pub const HELP: &str = "\
commands:
  :press <key>     hold a key (left, right, up, down, a, d, w, s, q, slash or a code)
  :release <key>   release a held key
  :fire            tap the fire key
  :restart         start a rematch (host only, after a match)
  :decline         refuse a rematch (host only, after a match)
  :quit            leave
anything else is sent as chat";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("`{0}` needs a key")]
    MissingKey(&'static str),
}

pub fn key_code(name: &str) -> Option<u16> {
    let code = match name.to_ascii_lowercase().as_str() {
        "left" => key::LEFT,
        "right" => key::RIGHT,
        "up" => key::UP,
        "down" => key::DOWN,
        "slash" | "/" => key::SLASH,
        "enter" => key::ENTER,
        "a" => key::A,
        "d" => key::D,
        "q" => key::Q,
        "s" => key::S,
        "w" => key::W,
        other => return other.parse().ok(),
    };
    Some(code)
}

/// Turns one console line into local events for a player using `bindings`.
pub fn parse_line(line: &str, bindings: &KeyBindings) -> Result<Vec<LocalEvent>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }

    let Some(command) = line.strip_prefix(':') else {
        return Ok(vec![LocalEvent::Chat(line.to_string())]);
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    let events = match name {
        "press" => vec![LocalEvent::KeyDown(parse_key(arg, "press")?)],
        "release" => vec![LocalEvent::KeyUp(parse_key(arg, "release")?)],
        "fire" => vec![
            LocalEvent::KeyDown(bindings.fire),
            LocalEvent::KeyUp(bindings.fire),
        ],
        "restart" => vec![LocalEvent::Restart],
        "decline" => vec![LocalEvent::Decline],
        "quit" | "q" => vec![LocalEvent::Quit],
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(events)
}

fn parse_key(arg: Option<&str>, command: &'static str) -> Result<u16, ParseError> {
    let arg = arg.ok_or(ParseError::MissingKey(command))?;
    key_code(arg).ok_or_else(|| ParseError::UnknownKey(arg.to_string()))
}

/// Reads stdin on a dedicated thread. The channel closes at end of input.
pub fn spawn(bindings: KeyBindings) -> UnboundedReceiver<LocalEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::error!("Failed to read console input: {}", e);
                    break;
                }
            };

            match parse_line(&line, &bindings) {
                Ok(events) => {
                    for event in events {
                        if tx.send(event).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => eprintln!("{}\n{}", e, HELP),
            }
        }
        log::debug!("Console input closed");
    });

    rx
}

/// Prints chat from the other side.
pub struct ConsoleChat {
    from: Side,
}

impl ConsoleChat {
    pub fn new(local: Side) -> Self {
        Self {
            from: local.opponent(),
        }
    }
}

impl ChatSink for ConsoleChat {
    fn on_chat(&mut self, text: &str) {
        println!("<{}> {}", self.from, text);
    }
}

/// Announces match results on stdout and traces every frame.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    winner: Option<Side>,
}

impl Renderer for ConsoleRenderer {
    fn redraw(&mut self, frame: &Frame) {
        let state = &frame.state;
        log::trace!(
            "host {:?} peer {:?} projectiles {}",
            state.host.position,
            state.peer.position,
            state.projectiles.len()
        );

        if state.winner == self.winner {
            return;
        }
        self.winner = state.winner;

        match state.winner {
            Some(winner) if winner == frame.local => println!("*** You win! ***"),
            Some(winner) => println!("*** {} wins ***", winner),
            None => println!("*** New match ***"),
        }
        if state.winner.is_some() && frame.local == Side::Host {
            println!("Play again? :restart or :decline");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(
            parse_line("  gg wp ", &KeyBindings::PEER),
            Ok(vec![LocalEvent::Chat("gg wp".to_string())])
        );
        assert_eq!(parse_line("   ", &KeyBindings::PEER), Ok(Vec::new()));
    }

    #[test]
    fn test_press_and_release() {
        assert_eq!(
            parse_line(":press left", &KeyBindings::PEER),
            Ok(vec![LocalEvent::KeyDown(37)])
        );
        assert_eq!(
            parse_line(":release 87", &KeyBindings::HOST),
            Ok(vec![LocalEvent::KeyUp(87)])
        );
        assert_eq!(
            parse_line(":press", &KeyBindings::HOST),
            Err(ParseError::MissingKey("press"))
        );
        assert_eq!(
            parse_line(":press banana", &KeyBindings::HOST),
            Err(ParseError::UnknownKey("banana".to_string()))
        );
    }

    #[test]
    fn test_fire_taps_the_bound_key() {
        assert_eq!(
            parse_line(":fire", &KeyBindings::HOST),
            Ok(vec![LocalEvent::KeyDown(key::Q), LocalEvent::KeyUp(key::Q)])
        );
        assert_eq!(
            parse_line(":fire", &KeyBindings::PEER),
            Ok(vec![
                LocalEvent::KeyDown(key::SLASH),
                LocalEvent::KeyUp(key::SLASH)
            ])
        );
    }

    #[test]
    fn test_match_commands() {
        assert_eq!(
            parse_line(":restart", &KeyBindings::HOST),
            Ok(vec![LocalEvent::Restart])
        );
        assert_eq!(
            parse_line(":decline", &KeyBindings::HOST),
            Ok(vec![LocalEvent::Decline])
        );
        assert_eq!(
            parse_line(":quit", &KeyBindings::HOST),
            Ok(vec![LocalEvent::Quit])
        );
        assert_eq!(
            parse_line(":dance", &KeyBindings::HOST),
            Err(ParseError::UnknownCommand("dance".to_string()))
        );
    }
}

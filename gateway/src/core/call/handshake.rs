//! Greeting handshake with the remote agent.
//!
//! Once the control channel opens, three events are sent in order:
//!
//! 1. `session.update` - persona, voice, server VAD with auto-response off
//! 2. `response.create` - one immediate greeting
//! 3. `session.update` - auto-response back on for every later turn
//!
//! The sequence is tracked as `Configuring -> Greeting -> Conversational`.
//! If the channel closes or a send fails, the handshake stops in `Aborted`
//! and remembers the state it failed in; no later step is sent.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use super::base::DataChannel;
use crate::core::realtime::{ClientEvent, Modality, ResponseConfig, SessionConfig, TurnDetection};

/// Default agent persona.
pub const SANTA_INSTRUCTIONS: &str = "You are Santa Claus answering the North Pole hotline. \
Speak warmly and playfully, keep answers short, ask the caller about their wishes \
and how they have behaved this year, and never break character.";

/// Default opening line request.
pub const SANTA_GREETING: &str =
    "Say in Santa Claus's voice: 'Ho-ho-ho, I am Santa Claus, and what is your name?'";

/// Number of events in a complete handshake.
pub const HANDSHAKE_STEPS: usize = 3;

/// Instructions for the remote agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPersona {
    /// Session-wide system instructions
    pub instructions: String,
    /// Instructions for the one-off opening response
    pub greeting: String,
}

impl Default for AgentPersona {
    fn default() -> Self {
        Self {
            instructions: SANTA_INSTRUCTIONS.to_string(),
            greeting: SANTA_GREETING.to_string(),
        }
    }
}

/// Handshake progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Persona not yet configured
    Configuring,
    /// Greeting requested, auto-response still off
    Greeting,
    /// Auto-response re-enabled
    Conversational,
    /// Stopped after a failure
    Aborted,
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeState::Configuring => write!(f, "configuring"),
            HandshakeState::Greeting => write!(f, "greeting"),
            HandshakeState::Conversational => write!(f, "conversational"),
            HandshakeState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Handshake failures.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("data channel closed while {0}")]
    ChannelClosed(HandshakeState),

    #[error("failed to send {event} while {state}: {reason}")]
    SendFailed {
        state: HandshakeState,
        event: &'static str,
        reason: String,
    },

    #[error("failed to encode {event}: {reason}")]
    Encode { event: &'static str, reason: String },

    #[error("handshake cannot run from the {0} state")]
    NotRunnable(HandshakeState),
}

/// Three-step greeting sequence for one call.
#[derive(Debug, Clone)]
pub struct GreetingHandshake {
    persona: AgentPersona,
    voice: String,
    sent: usize,
    aborted_at: Option<HandshakeState>,
}

impl GreetingHandshake {
    pub fn new(persona: AgentPersona, voice: impl Into<String>) -> Self {
        Self {
            persona,
            voice: voice.into(),
            sent: 0,
            aborted_at: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> HandshakeState {
        if self.aborted_at.is_some() {
            return HandshakeState::Aborted;
        }
        match self.sent {
            0 => HandshakeState::Configuring,
            n if n < HANDSHAKE_STEPS => HandshakeState::Greeting,
            _ => HandshakeState::Conversational,
        }
    }

    /// State the handshake was in when it aborted.
    pub fn aborted_at(&self) -> Option<HandshakeState> {
        self.aborted_at
    }

    /// Number of events successfully sent.
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Event for the next step, if any.
    pub fn next_event(&self) -> Option<ClientEvent> {
        if self.aborted_at.is_some() {
            return None;
        }
        match self.sent {
            0 => Some(ClientEvent::SessionUpdate {
                session: SessionConfig {
                    modalities: Some(vec![Modality::Audio, Modality::Text]),
                    instructions: Some(self.persona.instructions.clone()),
                    voice: Some(self.voice.clone()),
                    turn_detection: Some(TurnDetection::server_vad(false)),
                },
            }),
            1 => Some(ClientEvent::ResponseCreate {
                response: Some(ResponseConfig {
                    modalities: Some(vec![Modality::Audio, Modality::Text]),
                    instructions: Some(self.persona.greeting.clone()),
                }),
            }),
            2 => Some(ClientEvent::SessionUpdate {
                session: SessionConfig {
                    turn_detection: Some(TurnDetection::server_vad(true)),
                    ..Default::default()
                },
            }),
            _ => None,
        }
    }

    fn abort(&mut self) -> HandshakeState {
        let at = self.state();
        self.aborted_at = Some(at);
        at
    }

    /// Drive the remaining steps over `channel`.
    pub async fn run(&mut self, channel: &dyn DataChannel) -> Result<(), HandshakeError> {
        match self.state() {
            HandshakeState::Conversational => return Ok(()),
            HandshakeState::Aborted => return Err(HandshakeError::NotRunnable(self.state())),
            _ => {}
        }

        while let Some(event) = self.next_event() {
            let event_type = event.event_type();

            if !channel.is_open() {
                let at = self.abort();
                warn!(state = %at, "Data channel closed during greeting handshake");
                return Err(HandshakeError::ChannelClosed(at));
            }

            let text = match event.to_json() {
                Ok(text) => text,
                Err(e) => {
                    self.abort();
                    return Err(HandshakeError::Encode {
                        event: event_type,
                        reason: e.to_string(),
                    });
                }
            };

            if let Err(e) = channel.send_text(text).await {
                let at = self.abort();
                warn!(state = %at, event = event_type, error = %e, "Handshake send failed");
                return Err(HandshakeError::SendFailed {
                    state: at,
                    event: event_type,
                    reason: e.to_string(),
                });
            }

            self.sent += 1;
            debug!(event = event_type, state = %self.state(), "Handshake step sent");
        }

        Ok(())
    }
}

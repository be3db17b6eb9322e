use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;
use uuid::Uuid;

use crate::input::{Control, KeyState};
use crate::sim::{Snapshot, VisualSink};
use crate::track::TrackGeometry;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage<'a> {
    Welcome {
        client_id: Uuid,
        track: &'a TrackGeometry,
    },
    Pong,
    Snapshot(&'a Snapshot),
}

impl ServerMessage<'_> {
    pub fn to_json(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(json) => Some(json),
            Err(err) => {
                warn!(%err, "failed to encode server message");
                None
            }
        }
    }
}

/// State shared between the frame loop and the socket tasks.
pub struct SharedGameState {
    pub clients: HashMap<Uuid, UnboundedSender<String>>,
    /// Union of every client's held controls; what the frame loop samples.
    pub keys: KeyState,
    held: HashMap<Uuid, KeyState>,
}

impl SharedGameState {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
            keys: KeyState::default(),
            held: HashMap::new(),
        }
    }

    pub fn register_client(&mut self, tx: UnboundedSender<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.clients.insert(id, tx);
        id
    }

    pub fn set_key(&mut self, id: &Uuid, control: Control, active: bool) {
        self.held.entry(*id).or_default().set(control, active);
        self.refresh_keys();
    }

    /// Drops the client and releases whatever it was holding.
    pub fn remove_client(&mut self, id: &Uuid) {
        self.clients.remove(id);
        if self.held.remove(id).is_some() {
            self.refresh_keys();
        }
    }

    fn refresh_keys(&mut self) {
        self.keys = self.held.values().fold(KeyState::default(), |acc, k| acc.union(*k));
    }

    /// Build and send a snapshot to all clients.
    pub fn broadcast_snapshot(&mut self, snapshot: &Snapshot) {
        let Some(json) = ServerMessage::Snapshot(snapshot).to_json() else {
            return;
        };

        // closed channels belong to sockets that are already gone
        self.clients.retain(|_, tx| tx.send(json.clone()).is_ok());

        let before = self.held.len();
        self.held.retain(|id, _| self.clients.contains_key(id));
        if self.held.len() != before {
            self.refresh_keys();
        }
    }
}

impl VisualSink for SharedGameState {
    fn publish(&mut self, snapshot: &Snapshot) {
        self.broadcast_snapshot(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::input::InputSource;
    use crate::sim::Simulation;
    use crate::track::{TrackParams, generate};
    use crate::vehicle::ARCADE;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn snapshot() -> Snapshot {
        let track = Arc::new(generate(&TrackParams::default()).unwrap());
        let mut sim = Simulation::new(track, 1, 180.0, &ARCADE);
        sim.tick(&KeyState::default(), &mut FixedClock(0.016))
    }

    #[test]
    fn broadcast_reaches_every_client_and_prunes_closed() {
        let mut game = SharedGameState::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();
        game.register_client(tx_a);
        game.register_client(tx_b);
        drop(rx_b);

        game.publish(&snapshot());

        let msg = rx_a.try_recv().unwrap();
        let v: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(v["type"], "snapshot");
        assert_eq!(v["tick"], 1);
        assert_eq!(game.clients.len(), 1);
    }

    #[test]
    fn last_client_leaving_releases_keys() {
        let mut game = SharedGameState::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = game.register_client(tx);
        game.set_key(&id, Control::ThrottleForward, true);

        game.remove_client(&id);
        assert!(!game.keys.is_active(Control::ThrottleForward));
    }

    #[test]
    fn driver_leaving_releases_its_keys_while_others_stay() {
        let mut game = SharedGameState::new();
        let (tx_driver, _rx_driver) = mpsc::unbounded_channel();
        let (tx_watch, _rx_watch) = mpsc::unbounded_channel();
        let driver = game.register_client(tx_driver);
        let watcher = game.register_client(tx_watch);

        game.set_key(&driver, Control::ThrottleForward, true);
        game.set_key(&driver, Control::SteerLeft, true);
        game.set_key(&watcher, Control::Boost, true);

        game.remove_client(&driver);
        assert_eq!(game.clients.len(), 1);
        assert!(!game.keys.is_active(Control::ThrottleForward));
        assert!(!game.keys.is_active(Control::SteerLeft));
        assert!(game.keys.is_active(Control::Boost));
    }

    #[test]
    fn key_stays_held_while_any_client_holds_it() {
        let mut game = SharedGameState::new();
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        let a = game.register_client(tx_a);
        let b = game.register_client(tx_b);

        game.set_key(&a, Control::Handbrake, true);
        game.set_key(&b, Control::Handbrake, true);
        game.set_key(&a, Control::Handbrake, false);
        assert!(game.keys.is_active(Control::Handbrake));

        game.set_key(&b, Control::Handbrake, false);
        assert!(!game.keys.is_active(Control::Handbrake));
    }

    #[test]
    fn pruned_client_releases_its_keys() {
        let mut game = SharedGameState::new();
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();
        game.register_client(tx_a);
        let gone = game.register_client(tx_b);
        game.set_key(&gone, Control::ThrottleForward, true);
        drop(rx_b);

        game.publish(&snapshot());
        assert!(!game.keys.is_active(Control::ThrottleForward));
    }

    #[test]
    fn welcome_carries_track() {
        let track = generate(&TrackParams::default()).unwrap();
        let json = ServerMessage::Welcome { client_id: Uuid::nil(), track: &track }
            .to_json()
            .unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["type"], "welcome");
        assert_eq!(v["track"]["centerline"].as_array().unwrap().len(), 32);
    }
}

//! Lobby state: users, seats, readiness
//!
//! A user logs in as an observer, takes a seat to become a waiting player,
//! and flags ready. When all four seats are filled and ready the round
//! starts and every seated player moves to `Playing`. Round end puts them
//! back to `Waiting { is_ready: false }`.

use std::collections::BTreeMap;

use protocol::SeatRequest;
use types::prelude::*;

use crate::fanout::ConnectionId;

/// Where a seated player is in the round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Waiting { is_ready: bool },
    Playing,
}

/// A user's role within the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Observer,
    Player { seat: Seat, phase: Phase },
}

/// One logged-in user.
#[derive(Debug, Clone)]
pub struct User {
    pub username: Username,
    pub conn: ConnectionId,
    pub is_connected: bool,
    pub role: Role,
    /// Cumulative score across rounds.
    pub score: Cash,
}

/// Lobby state for one room.
#[derive(Debug, Default)]
pub struct Room {
    pub users: BTreeMap<Username, User>,
    pub seating: BTreeMap<Seat, Username>,
}

impl Room {
    pub fn user_for_conn(&self, conn: ConnectionId) -> Option<&User> {
        self.users
            .values()
            .find(|u| u.conn == conn && u.is_connected)
    }

    pub fn username_for_conn(&self, conn: ConnectionId) -> Option<Username> {
        self.user_for_conn(conn).map(|u| u.username.clone())
    }

    /// Admit a new observer.
    pub fn login(
        &mut self,
        username: Username,
        conn: ConnectionId,
        max_users: usize,
    ) -> Result<(), GameError> {
        if self.users.contains_key(&username) {
            return Err(GameError::AlreadyLoggedIn);
        }
        if self.users.len() >= max_users {
            return Err(GameError::GameIsFull);
        }
        self.users.insert(
            username.clone(),
            User {
                username,
                conn,
                is_connected: true,
                role: Role::Observer,
                score: Cash::ZERO,
            },
        );
        Ok(())
    }

    /// Seat an observer, honoring an explicit seat choice.
    pub fn sit(
        &mut self,
        username: &Username,
        request: SeatRequest,
        round_running: bool,
    ) -> Result<Seat, GameError> {
        if round_running {
            return Err(GameError::GameAlreadyStarted);
        }
        let user = self.users.get(username).ok_or(GameError::NotLoggedIn)?;
        if matches!(user.role, Role::Player { .. }) {
            return Err(GameError::YoureAlreadyPlaying);
        }

        let seat = match request {
            SeatRequest::SitIn(seat) => {
                if self.seating.contains_key(&seat) {
                    return Err(GameError::SeatOccupied);
                }
                seat
            }
            SeatRequest::SitAnywhere => Seat::ALL
                .into_iter()
                .find(|s| !self.seating.contains_key(s))
                .ok_or(GameError::SeatOccupied)?,
        };

        self.seating.insert(seat, username.clone());
        self.users.get_mut(username).expect("checked above").role = Role::Player {
            seat,
            phase: Phase::Waiting { is_ready: false },
        };
        Ok(seat)
    }

    /// Flip a waiting player's ready flag.
    pub fn set_ready(
        &mut self,
        username: &Username,
        is_ready: bool,
        round_running: bool,
    ) -> Result<(), GameError> {
        let user = self.users.get_mut(username).ok_or(GameError::NotLoggedIn)?;
        match &mut user.role {
            Role::Observer => Err(GameError::YoureNotPlaying),
            Role::Player { phase, .. } => match phase {
                Phase::Playing => Err(GameError::AlreadyPlaying),
                Phase::Waiting { .. } if round_running => Err(GameError::GameAlreadyStarted),
                Phase::Waiting { is_ready: flag } => {
                    *flag = is_ready;
                    Ok(())
                }
            },
        }
    }

    /// True when four players are seated and every one is ready.
    pub fn can_start(&self) -> bool {
        self.seating.len() == Seat::ALL.len()
            && self.seating.values().all(|username| {
                matches!(
                    self.users.get(username).map(|u| u.role),
                    Some(Role::Player {
                        phase: Phase::Waiting { is_ready: true },
                        ..
                    })
                )
            })
    }

    /// Seated players in seat order (the deal order).
    pub fn seated_players(&self) -> Vec<Username> {
        Seat::ALL
            .into_iter()
            .filter_map(|s| self.seating.get(&s).cloned())
            .collect()
    }

    /// Move every seated player into the round.
    pub fn begin_round(&mut self) {
        for username in self.seating.values() {
            if let Some(user) = self.users.get_mut(username) {
                if let Role::Player { phase, .. } = &mut user.role {
                    *phase = Phase::Playing;
                }
            }
        }
    }

    /// Reset phases after a round and evict users that disconnected
    /// mid-round. Returns the evicted usernames so their names can be
    /// released server-wide.
    pub fn end_round(&mut self) -> Vec<Username> {
        for user in self.users.values_mut() {
            if let Role::Player { phase, .. } = &mut user.role {
                *phase = Phase::Waiting { is_ready: false };
            }
        }
        let gone: Vec<Username> = self
            .users
            .values()
            .filter(|u| !u.is_connected)
            .map(|u| u.username.clone())
            .collect();
        for username in &gone {
            self.remove_user(username);
        }
        gone
    }

    /// Remove a user entirely, freeing any seat.
    pub fn remove_user(&mut self, username: &Username) {
        if let Some(user) = self.users.remove(username) {
            if let Role::Player { seat, .. } = user.role {
                self.seating.remove(&seat);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn username(s: &str) -> Username {
        Username::new(s).unwrap()
    }

    fn room_with(users: &[&str]) -> Room {
        let mut room = Room::default();
        for (i, name) in users.iter().enumerate() {
            room.login(username(name), i as ConnectionId, 16).unwrap();
        }
        room
    }

    #[test]
    fn test_login_rejects_duplicates_and_overflow() {
        let mut room = room_with(&["alice"]);
        assert_eq!(
            room.login(username("alice"), 9, 16),
            Err(GameError::AlreadyLoggedIn)
        );

        let mut tiny = Room::default();
        tiny.login(username("a"), 0, 1).unwrap();
        assert_eq!(tiny.login(username("b"), 1, 1), Err(GameError::GameIsFull));
    }

    #[test]
    fn test_sit_anywhere_fills_in_seat_order() {
        let mut room = room_with(&["a", "b", "c", "d"]);
        assert_eq!(
            room.sit(&username("a"), SeatRequest::SitAnywhere, false),
            Ok(Seat::North)
        );
        assert_eq!(
            room.sit(&username("b"), SeatRequest::SitAnywhere, false),
            Ok(Seat::East)
        );
    }

    #[test]
    fn test_sit_in_occupied_seat_rejected() {
        let mut room = room_with(&["a", "b"]);
        room.sit(&username("a"), SeatRequest::SitIn(Seat::South), false)
            .unwrap();
        assert_eq!(
            room.sit(&username("b"), SeatRequest::SitIn(Seat::South), false),
            Err(GameError::SeatOccupied)
        );
    }

    #[test]
    fn test_sit_twice_rejected() {
        let mut room = room_with(&["a"]);
        room.sit(&username("a"), SeatRequest::SitAnywhere, false)
            .unwrap();
        assert_eq!(
            room.sit(&username("a"), SeatRequest::SitAnywhere, false),
            Err(GameError::YoureAlreadyPlaying)
        );
    }

    #[test]
    fn test_sit_during_round_rejected() {
        let mut room = room_with(&["a"]);
        assert_eq!(
            room.sit(&username("a"), SeatRequest::SitAnywhere, true),
            Err(GameError::GameAlreadyStarted)
        );
    }

    #[test]
    fn test_observer_cannot_ready() {
        let mut room = room_with(&["a"]);
        assert_eq!(
            room.set_ready(&username("a"), true, false),
            Err(GameError::YoureNotPlaying)
        );
    }

    #[test]
    fn test_can_start_requires_four_ready() {
        let mut room = room_with(&["a", "b", "c", "d"]);
        for name in ["a", "b", "c", "d"] {
            room.sit(&username(name), SeatRequest::SitAnywhere, false)
                .unwrap();
        }
        for name in ["a", "b", "c"] {
            room.set_ready(&username(name), true, false).unwrap();
        }
        assert!(!room.can_start());

        room.set_ready(&username("d"), true, false).unwrap();
        assert!(room.can_start());

        // Un-readying takes it back
        room.set_ready(&username("d"), false, false).unwrap();
        assert!(!room.can_start());
    }

    #[test]
    fn test_round_transitions() {
        let mut room = room_with(&["a", "b", "c", "d"]);
        for name in ["a", "b", "c", "d"] {
            room.sit(&username(name), SeatRequest::SitAnywhere, false)
                .unwrap();
            room.set_ready(&username(name), true, false).unwrap();
        }

        room.begin_round();
        assert!(matches!(
            room.users[&username("a")].role,
            Role::Player {
                phase: Phase::Playing,
                ..
            }
        ));
        // Mid-round readiness is rejected
        assert_eq!(
            room.set_ready(&username("a"), true, true),
            Err(GameError::AlreadyPlaying)
        );

        room.users.get_mut(&username("b")).unwrap().is_connected = false;
        let gone = room.end_round();
        assert_eq!(gone, vec![username("b")]);
        assert!(!room.users.contains_key(&username("b")));
        assert!(matches!(
            room.users[&username("a")].role,
            Role::Player {
                phase: Phase::Waiting { is_ready: false },
                ..
            }
        ));
        // b's seat is free again
        assert_eq!(room.seating.len(), 3);
    }

    #[test]
    fn test_remove_user_frees_seat() {
        let mut room = room_with(&["a"]);
        room.sit(&username("a"), SeatRequest::SitIn(Seat::West), false)
            .unwrap();
        room.remove_user(&username("a"));
        assert!(room.seating.is_empty());
        assert!(room.users.is_empty());
    }
}

#![allow(dead_code)]

use herald_bus::{Event, SourcedEvent};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Event)]
pub struct TestEvent {
    pub value: i64,
    canceled: bool,
}

impl TestEvent {
    pub const fn new(value: i64) -> Self {
        Self { value, canceled: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Event)]
pub struct OtherEvent {
    pub value: i64,
    canceled: bool,
}

impl OtherEvent {
    pub const fn new(value: i64) -> Self {
        Self { value, canceled: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerId(pub u32);

#[derive(Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: &'static str,
    position: Cell<(i32, i32, i32)>,
}

impl Player {
    pub fn new(id: u32, name: &'static str) -> Rc<Self> {
        Rc::new(Self { id: PlayerId(id), name, position: Cell::new((0, 0, 0)) })
    }

    pub fn position(&self) -> (i32, i32, i32) {
        self.position.get()
    }

    pub fn set_position(&self, position: (i32, i32, i32)) {
        self.position.set(position);
    }
}

#[derive(Debug, Event)]
pub struct PlayerMoveEvent {
    pub player: Rc<Player>,
    pub old: (i32, i32, i32),
    canceled: bool,
}

impl PlayerMoveEvent {
    pub fn new(player: &Rc<Player>, old: (i32, i32, i32)) -> Self {
        Self { player: Rc::clone(player), old, canceled: false }
    }
}

impl SourcedEvent for PlayerMoveEvent {
    type Source = PlayerId;

    fn source(&self) -> &PlayerId {
        &self.player.id
    }
}

#[derive(Debug, Event)]
pub struct PlayerChatEvent {
    pub player: Rc<Player>,
    pub message: String,
    canceled: bool,
}

impl PlayerChatEvent {
    pub fn new(player: &Rc<Player>, message: impl Into<String>) -> Self {
        Self { player: Rc::clone(player), message: message.into(), canceled: false }
    }
}

impl SourcedEvent for PlayerChatEvent {
    type Source = PlayerId;

    fn source(&self) -> &PlayerId {
        &self.player.id
    }
}

/// Shared, append-only record of what handlers observed.
pub type Log<T> = Rc<RefCell<Vec<T>>>;

pub fn log<T>() -> Log<T> {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn snapshot<T: Clone>(log: &Log<T>) -> Vec<T> {
    log.borrow().clone()
}

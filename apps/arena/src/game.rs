use crate::config::{ArenaConfig, BorderConfig, MovementConfig};
use crate::error::{ArenaError, ArenaErrorExt};
use herald_bus::{Event, EventBus, EventBusError, EventHandler, SourcedEvent, Subscription};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    name: String,
    position: Cell<Position>,
}

impl Player {
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self { id: PlayerId(id), name: name.into(), position: Cell::new(Position::default()) })
    }

    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position.get()
    }

    pub fn set_position(&self, position: Position) {
        self.position.set(position);
    }
}

/// Published after a player's position changed; `from` is where they were.
#[derive(Debug, Event)]
pub struct PlayerMoveEvent {
    pub player: Rc<Player>,
    pub from: Position,
    canceled: bool,
}

impl PlayerMoveEvent {
    #[must_use]
    pub fn new(player: &Rc<Player>, from: Position) -> Self {
        Self { player: Rc::clone(player), from, canceled: false }
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
    #[must_use]
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

/// Cancels moves that end outside a square border around the origin.
#[derive(Debug, Clone, Copy)]
pub struct BorderGuard {
    size: i32,
}

impl BorderGuard {
    #[must_use]
    pub const fn new(border: BorderConfig) -> Self {
        Self { size: border.size }
    }

    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        let size = self.size.unsigned_abs();
        position.x.unsigned_abs() <= size && position.z.unsigned_abs() <= size
    }
}

impl EventHandler<PlayerMoveEvent> for BorderGuard {
    fn on(&self, event: &mut PlayerMoveEvent) {
        let to = event.player.position();
        if !self.contains(to) {
            warn!(player = event.player.name(), from = %event.from, to = %to, "Move crosses the border");
            event.cancel();
        }
    }
}

/// Records every chat line it hears.
#[derive(Debug, Default)]
pub struct ChatLog {
    lines: RefCell<Vec<String>>,
}

impl ChatLog {
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl EventHandler<PlayerChatEvent> for ChatLog {
    fn on(&self, event: &mut PlayerChatEvent) {
        info!(player = event.player.name(), message = %event.message, "Chat");
        self.lines.borrow_mut().push(format!("{}: {}", event.player.name(), event.message));
    }
}

/// Moves `player` to `to`, publishes the move, and reverts it if a handler canceled it.
///
/// Returns whether the player ended up at `to`.
///
/// # Errors
/// Propagates [`EventBusError`] from the publish; the move is reverted in that case too.
pub fn set_position_with_event(
    bus: &EventBus,
    player: &Rc<Player>,
    to: Position,
) -> Result<bool, EventBusError> {
    let from = player.position();
    player.set_position(to);

    let mut event = PlayerMoveEvent::new(player, from);
    if let Err(err) = bus.publish(&mut event) {
        player.set_position(from);
        return Err(err);
    }

    if event.is_canceled() {
        player.set_position(from);
        return Ok(false);
    }
    Ok(true)
}

/// Outcome of [`Arena::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaReport {
    /// Final position of each player, in join order.
    pub positions: Vec<(String, Position)>,
    /// Chat lines the listener received before it unsubscribed.
    pub chat: Vec<String>,
    /// Handlers that ran for the message sent after unsubscribing.
    pub late_chat_handlers: usize,
}

/// Players on a shared bus, with the border enforced for the first of them.
#[derive(Debug)]
pub struct Arena {
    bus: EventBus,
    players: Vec<Rc<Player>>,
    movement: MovementConfig,
    guard: BorderGuard,
}

impl Arena {
    /// Builds the arena and registers the border guard for the first player.
    ///
    /// # Errors
    /// Returns [`ArenaError::InvalidConfiguration`] if `cfg` fails validation.
    pub fn new(cfg: &ArenaConfig) -> Result<Self, ArenaError> {
        cfg.validate()?;

        let players: Vec<Rc<Player>> =
            (1..).zip(&cfg.players).map(|(id, name)| Player::new(id, name.as_str())).collect();

        let arena = Self {
            bus: EventBus::new(),
            players,
            movement: cfg.movement,
            guard: BorderGuard::new(cfg.border),
        };

        if let Some(first) = arena.players.first() {
            let guard = arena.guard;
            let guarded = first.id();
            arena.bus.subscribe_filtered(
                move |e: &mut PlayerMoveEvent| guard.on(e),
                move |e: &PlayerMoveEvent| *e.source() == guarded && !e.is_canceled(),
            );
            info!(player = first.name(), size = cfg.border.size, "Border enforced");
        }

        Ok(arena)
    }

    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn players(&self) -> &[Rc<Player>] {
        &self.players
    }

    /// Walks `player` along the x axis until the limit or the first refused move.
    ///
    /// # Errors
    /// Returns [`ArenaError::Bus`] if publishing a move fails.
    pub fn walk(&self, player: &Rc<Player>) -> Result<Position, ArenaError> {
        let step = usize::try_from(self.movement.step).unwrap_or(1);

        for x in (0..=self.movement.limit).step_by(step) {
            let to = Position::new(x, 0, 0);
            let moved = set_position_with_event(&self.bus, player, to)
                .context(format!("moving {} to {to}", player.name()))?;
            if !moved {
                info!(player = player.name(), at = %player.position(), "Move refused, stopping");
                break;
            }
            info!(player = player.name(), at = %to, "Moved");
        }

        Ok(player.position())
    }

    /// Subscribes `log` to chat that no earlier handler canceled.
    pub fn listen_to_chat(&self, log: &Rc<ChatLog>) -> Subscription {
        let log = Rc::clone(log);
        self.bus.subscribe_filtered(
            move |e: &mut PlayerChatEvent| log.on(e),
            |e: &PlayerChatEvent| !e.is_canceled(),
        )
    }

    /// Walks every player, then exchanges chat before and after unsubscribing the listener.
    ///
    /// # Errors
    /// Returns [`ArenaError::Bus`] if any publish fails.
    pub fn run(&self) -> Result<ArenaReport, ArenaError> {
        let mut positions = Vec::with_capacity(self.players.len());
        for player in &self.players {
            positions.push((player.name().to_owned(), self.walk(player)?));
        }

        let chat_log = Rc::new(ChatLog::default());
        let listener = self.listen_to_chat(&chat_log);

        let (first, last) = match (self.players.first(), self.players.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ArenaError::InvalidConfiguration {
                message: "arena has no players".into(),
                context: None,
            }),
        };

        self.bus
            .publish(&mut PlayerChatEvent::new(first, format!("Hello I am {}!", first.name())))?;
        self.bus.publish(&mut PlayerChatEvent::new(last, format!("Hello I am {}!", last.name())))?;

        listener.unsubscribe();

        let late_chat_handlers = self
            .bus
            .publish(&mut PlayerChatEvent::new(last, "This chat message will not be serviced"))?;
        info!(handlers = late_chat_handlers, "Chat after unsubscribe");

        Ok(ArenaReport { positions, chat: chat_log.lines(), late_chat_handlers })
    }
}

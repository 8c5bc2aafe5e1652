//! One actor task per room.
//!
//! The actor owns the room's [`TimerState`] and its tick interval. Commands
//! and ticks are handled by the same task, so a Reset or Pause can never
//! interleave with a decrement. The interval exists iff the state is running.

use super::state::{StartOutcome, TimerSnapshot, TimerState};
use crate::error::{Result, SignageError};
use crate::log_error;
use crate::log_timer_operation;
use crate::message::ControlAction;
use crate::publisher::Publisher;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

const TICK_PERIOD: Duration = Duration::from_secs(1);

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomCommand {
    SetSeconds(u64),
    Control(ControlAction),
    #[cfg(test)]
    Snapshot,
}

struct Request {
    command: RoomCommand,
    reply: oneshot::Sender<TimerSnapshot>,
}

/// Cheap handle to a room actor. The actor stops once every handle is dropped.
#[derive(Clone)]
pub struct RoomHandle {
    room: String,
    tx: mpsc::Sender<Request>,
}

impl RoomHandle {
    pub fn spawn(room: String, publisher: Publisher) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let actor = RoomActor {
            room: room.clone(),
            state: TimerState::new(),
            ticker: None,
            publisher,
            commands: rx,
        };
        tokio::spawn(actor.run());
        Self { room, tx }
    }

    /// Apply a command and wait for the resulting state.
    pub async fn send(&self, command: RoomCommand) -> Result<TimerSnapshot> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Request { command, reply })
            .await
            .map_err(|_| SignageError::TimerStopped(self.room.clone()))?;
        response
            .await
            .map_err(|_| SignageError::TimerStopped(self.room.clone()))
    }
}

struct RoomActor {
    room: String,
    state: TimerState,
    ticker: Option<Interval>,
    publisher: Publisher,
    commands: mpsc::Receiver<Request>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::debug!(room = %self.room, "Room timer started");
        loop {
            tokio::select! {
                request = self.commands.recv() => match request {
                    Some(Request { command, reply }) => {
                        self.handle(command);
                        let _ = reply.send(self.state.snapshot());
                    },
                    None => break,
                },
                _ = next_tick(&mut self.ticker) => self.on_tick(),
            }
            debug_assert_eq!(self.state.is_running(), self.ticker.is_some());
        }
        tracing::debug!(room = %self.room, "Room timer stopped");
    }

    fn handle(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::SetSeconds(value) => {
                self.ticker = None;
                let seconds = self.state.set_seconds(value);
                log_timer_operation!("set_seconds", self.room, seconds);
                self.publish(seconds);
            },
            RoomCommand::Control(ControlAction::Start) => match self.state.start() {
                StartOutcome::Ignored => {
                    log_timer_operation!("start_ignored", self.room);
                },
                outcome => {
                    // Replacing the interval drops the previous one
                    self.ticker = Some(new_ticker());
                    let operation = match outcome {
                        StartOutcome::Restarted => "restart",
                        _ => "start",
                    };
                    log_timer_operation!(
                        operation,
                        self.room,
                        self.state.snapshot().seconds_remaining
                    );
                },
            },
            RoomCommand::Control(ControlAction::Reset) => {
                self.ticker = None;
                let seconds = self.state.reset();
                log_timer_operation!("reset", self.room, seconds);
                self.publish(seconds);
            },
            RoomCommand::Control(ControlAction::Pause) => {
                self.ticker = None;
                self.state.pause();
                log_timer_operation!("pause", self.room, self.state.snapshot().seconds_remaining);
            },
            #[cfg(test)]
            RoomCommand::Snapshot => {},
        }
    }

    fn on_tick(&mut self) {
        if let Some(seconds) = self.state.tick() {
            self.publish(seconds);
            if !self.state.is_running() {
                self.ticker = None;
                log_timer_operation!("finished", self.room);
            }
        }
    }

    fn publish(&self, seconds: u64) {
        if let Err(e) = self.publisher.timer_seconds(&self.room, seconds) {
            log_error!(e, "publish timer seconds");
        }
    }
}

fn new_ticker() -> Interval {
    let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        },
        None => std::future::pending().await,
    }
}

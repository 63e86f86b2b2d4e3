//! Session coordination: schedule, trial fan-out, barrier and timers.
//!
//! The coordinator owns the single active `GameSession` behind an async
//! mutex. Opening a trial and deciding whether to advance both run under
//! that lock, so a trial is opened at most once and only after every round
//! of the previous trial has closed.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Weak};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::GameConfig;
use crate::domain::round::IgnoreReason;
use crate::domain::{
    build_pair_schedule, ChannelId, PlayerId, RoundId, SubmitEffect, TrialSchedule,
};
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::messaging::{Messenger, SessionEvent};
use crate::repos::RecordSink;
use crate::services::ledger::{ScoreLedger, Standing};
use crate::services::round_lifecycle::RoundEngine;

/// Knobs for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionParams {
    pub trial_count: u32,
    pub neighbor_size: usize,
    pub seed: u64,
    pub resample_cap: u32,
}

impl SessionParams {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            trial_count: config.trials,
            neighbor_size: config.neighbor_size,
            seed: config.seed,
            resample_cap: config.resample_cap,
        }
    }
}

/// Observable progress, published on every trial change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionProgress {
    /// Bumped on each successful start.
    pub generation: u64,
    pub current_trial: u32,
    pub trial_count: u32,
    pub finished: bool,
}

/// What a call to [`SessionCoordinator::maybe_advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    NoSession,
    AlreadyFinished,
    /// No rounds are recorded for the current trial.
    Idle,
    /// Rounds of the current trial are still open.
    Waiting,
    Opened(u32),
    Completed,
}

pub struct GameSession {
    channel: ChannelId,
    players: Vec<PlayerId>,
    params: SessionParams,
    schedule: TrialSchedule,
    current_trial: u32,
    rounds_by_trial: BTreeMap<u32, Vec<RoundId>>,
    finished: bool,
}

impl GameSession {
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn params(&self) -> SessionParams {
        self.params
    }

    pub fn schedule(&self) -> &TrialSchedule {
        &self.schedule
    }

    pub fn current_trial(&self) -> u32 {
        self.current_trial
    }

    pub fn rounds(&self, trial: u32) -> &[RoundId] {
        self.rounds_by_trial
            .get(&trial)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

pub struct SessionCoordinator {
    engine: RoundEngine,
    ledger: Arc<ScoreLedger>,
    messenger: Arc<dyn Messenger>,
    sink: Arc<dyn RecordSink>,
    round_timeout: Duration,
    session: Mutex<Option<GameSession>>,
    progress: watch::Sender<SessionProgress>,
}

impl SessionCoordinator {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        sink: Arc<dyn RecordSink>,
        round_timeout: Duration,
    ) -> Arc<Self> {
        let ledger = Arc::new(ScoreLedger::new());
        let engine = RoundEngine::new(Arc::clone(&ledger), Arc::clone(&messenger), Arc::clone(&sink));
        let (progress, _) = watch::channel(SessionProgress::default());
        Arc::new(Self {
            engine,
            ledger,
            messenger,
            sink,
            round_timeout,
            session: Mutex::new(None),
            progress,
        })
    }

    pub fn engine(&self) -> &RoundEngine {
        &self.engine
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionProgress> {
        self.progress.subscribe()
    }

    pub fn progress(&self) -> SessionProgress {
        *self.progress.borrow()
    }

    /// A session is active from its start until it completes, and while
    /// any round is still open.
    pub fn is_active(&self) -> bool {
        let progress = *self.progress.borrow();
        let unfinished = progress.generation > 0 && !progress.finished;
        unfinished || self.engine.any_open()
    }

    /// Run `f` against the current session, if any.
    pub async fn with_session<R>(&self, f: impl FnOnce(&GameSession) -> R) -> Option<R> {
        self.session.lock().await.as_ref().map(f)
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.ledger.standings()
    }

    pub fn top(&self, n: usize) -> Vec<Standing> {
        self.ledger.top(n)
    }

    /// Build the schedule for `players`, replace any previous session and
    /// open trial 1.
    ///
    /// Fails without side effects while a session is active, when the
    /// roster is unusable, or when sampling or the record log fail.
    pub async fn start_session(
        self: &Arc<Self>,
        channel: ChannelId,
        players: Vec<PlayerId>,
        params: SessionParams,
    ) -> Result<SessionProgress, AppError> {
        let mut guard = self.session.lock().await;

        let unfinished = guard.as_ref().is_some_and(|s| !s.finished);
        if unfinished || self.engine.any_open() {
            return Err(DomainError::conflict(
                ConflictKind::SessionActive,
                "A session is already running",
            )
            .into());
        }
        ensure_distinct(&players)?;

        let edges = build_pair_schedule(
            &players,
            params.seed,
            params.trial_count,
            params.neighbor_size,
            params.resample_cap,
        )?;
        let schedule = TrialSchedule::from_edges(edges);

        self.sink.begin_session(OffsetDateTime::now_utc())?;

        for player in &players {
            self.ledger.ensure_tracked(player);
        }
        self.engine.reset();

        info!(
            %channel,
            players = players.len(),
            trials = params.trial_count,
            neighbor_size = params.neighbor_size,
            seed = params.seed,
            "Session starting"
        );

        let session = guard.insert(GameSession {
            channel: channel.clone(),
            players,
            params,
            schedule,
            current_trial: 0,
            rounds_by_trial: BTreeMap::new(),
            finished: false,
        });

        self.progress.send_modify(|p| {
            *p = SessionProgress {
                generation: p.generation + 1,
                current_trial: 0,
                trial_count: params.trial_count,
                finished: false,
            };
        });

        self.broadcast(
            &channel,
            SessionEvent::Started {
                players: session.players.len(),
                trials: params.trial_count,
            },
        )
        .await;

        self.open_trial(session, 1).await;
        Ok(self.progress())
    }

    /// Open every pairing of `trial` concurrently and arm their timers.
    async fn open_trial(self: &Arc<Self>, session: &mut GameSession, trial: u32) {
        let pairings = session.schedule.pairings(trial).to_vec();
        let ids: Vec<RoundId> = pairings.iter().map(|_| RoundId::generate()).collect();

        self.broadcast(&session.channel, SessionEvent::TrialOpened { trial })
            .await;

        let mut tasks = JoinSet::new();
        for (id, pairing) in ids.iter().copied().zip(pairings) {
            let coordinator = Arc::clone(self);
            let channel = session.channel.clone();
            tasks.spawn(async move {
                let timer = coordinator
                    .engine
                    .open_round(id, trial, channel, pairing.first, pairing.second)
                    .await;
                coordinator.arm_timeout(id, timer);
            });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(trial, error = %e, "Round open task failed");
            }
        }

        info!(trial, rounds = ids.len(), "Trial opened");
        session.rounds_by_trial.insert(trial, ids);
        session.current_trial = trial;
        self.progress.send_modify(|p| p.current_trial = trial);
    }

    fn arm_timeout(self: &Arc<Self>, id: RoundId, timer: CancellationToken) {
        let coordinator: Weak<Self> = Arc::downgrade(self);
        let timeout = self.round_timeout;
        tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => {
                    debug!(round_id = %id, "Round timer disarmed");
                }
                _ = tokio::time::sleep(timeout) => {
                    if let Some(coordinator) = coordinator.upgrade() {
                        coordinator.on_round_timeout(id).await;
                    }
                }
            }
        });
    }

    async fn on_round_timeout(self: &Arc<Self>, id: RoundId) {
        if self.engine.expire(id).await.is_some() {
            debug!(round_id = %id, "Round timed out");
        }
        self.maybe_advance().await;
    }

    /// Route a player's tag to its round. A submission that closed the
    /// round, or lost the race to a close, runs the advancement check.
    pub async fn submit(
        self: &Arc<Self>,
        round: RoundId,
        player: &PlayerId,
        raw_tag: &str,
    ) -> SubmitEffect {
        let effect = self.engine.submit(round, player, raw_tag).await;
        if matches!(
            effect,
            SubmitEffect::Closed(_) | SubmitEffect::Ignored(IgnoreReason::AlreadyClosed)
        ) {
            self.maybe_advance().await;
        }
        effect
    }

    /// Open the next trial once every round of the current one has closed,
    /// or finish the session after the last trial. Safe to call any number
    /// of times.
    pub async fn maybe_advance(self: &Arc<Self>) -> Advance {
        let mut guard = self.session.lock().await;
        let Some(session) = guard.as_mut() else {
            return Advance::NoSession;
        };
        if session.finished {
            return Advance::AlreadyFinished;
        }
        let current = session.rounds(session.current_trial);
        if current.is_empty() {
            return Advance::Idle;
        }
        if !self.engine.all_closed(current) {
            return Advance::Waiting;
        }

        let next = session.current_trial + 1;
        if next <= session.params.trial_count {
            self.open_trial(session, next).await;
            return Advance::Opened(next);
        }

        session.finished = true;
        info!(channel = %session.channel, "Session complete");
        self.broadcast(&session.channel, SessionEvent::Completed).await;
        self.progress.send_modify(|p| p.finished = true);
        Advance::Completed
    }

    async fn broadcast(&self, channel: &ChannelId, event: SessionEvent) {
        if let Err(e) = self.messenger.broadcast_session_event(channel, &event).await {
            warn!(%channel, ?event, error = %e, "Failed to broadcast session event");
        }
    }
}

fn ensure_distinct(players: &[PlayerId]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(players.len());
    if let Some(dup) = players.iter().find(|p| !seen.insert(*p)) {
        return Err(DomainError::validation(
            ValidationKind::InvalidPlayerCount,
            format!("Player {dup} appears more than once"),
        )
        .into());
    }
    Ok(())
}

//! Tournament actor implementation with async message handling.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::{
    errors::{ServiceError, ServiceResult},
    messages::{ChangeNotification, SnapshotResponse, TournamentMessage},
};
use crate::store::SnapshotStore;
use crate::tournament::{
    AdvanceOutcome, Match, MatchId, MatchResult, MatchStatus, Player, Round, RoundId, Team,
    TeamId, TournamentEngine, TournamentResult,
};

const INBOX_CAPACITY: usize = 100;
const SUBSCRIBER_CAPACITY: usize = 32;

/// Tournament actor handle for sending messages
#[derive(Debug, Clone)]
pub struct TournamentHandle {
    sender: mpsc::Sender<TournamentMessage>,
}

impl TournamentHandle {
    pub fn new(sender: mpsc::Sender<TournamentMessage>) -> Self {
        Self { sender }
    }

    /// Send a raw message to the actor
    pub async fn send(&self, message: TournamentMessage) -> ServiceResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| ServiceError::Closed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> TournamentMessage,
    ) -> ServiceResult<T> {
        let (response, reply) = oneshot::channel();
        self.send(build(response)).await?;
        reply.await.map_err(|_| ServiceError::Closed)
    }

    pub async fn add_team(
        &self,
        name: impl Into<String>,
        players: [Player; 2],
    ) -> ServiceResult<Team> {
        let name = name.into();
        self.request(|response| TournamentMessage::AddTeam {
            name,
            players,
            response,
        })
        .await
    }

    pub async fn update_team(&self, team: Team) -> ServiceResult<bool> {
        self.request(|response| TournamentMessage::UpdateTeam { team, response })
            .await
    }

    pub async fn delete_team(&self, team_id: TeamId) -> ServiceResult<bool> {
        self.request(|response| TournamentMessage::DeleteTeam { team_id, response })
            .await
    }

    pub async fn reregister_team(&self, team_id: TeamId) -> ServiceResult<Team> {
        Ok(self
            .request(|response| TournamentMessage::ReregisterTeam { team_id, response })
            .await??)
    }

    pub async fn create_round(&self) -> ServiceResult<Round> {
        self.request(|response| TournamentMessage::CreateRound { response })
            .await
    }

    pub async fn complete_round(&self, round_id: RoundId) -> ServiceResult<()> {
        Ok(self
            .request(|response| TournamentMessage::CompleteRound { round_id, response })
            .await??)
    }

    pub async fn advance_round(&self) -> ServiceResult<AdvanceOutcome> {
        Ok(self
            .request(|response| TournamentMessage::AdvanceRound { response })
            .await??)
    }

    pub async fn delete_round(&self, round_id: RoundId) -> ServiceResult<Round> {
        Ok(self
            .request(|response| TournamentMessage::DeleteRound { round_id, response })
            .await??)
    }

    pub async fn create_match(
        &self,
        team_one_id: Option<TeamId>,
        team_two_id: Option<TeamId>,
        round_id: RoundId,
    ) -> ServiceResult<Match> {
        Ok(self
            .request(|response| TournamentMessage::CreateMatch {
                team_one_id,
                team_two_id,
                round_id,
                response,
            })
            .await??)
    }

    pub async fn update_match_status(
        &self,
        match_id: MatchId,
        status: MatchStatus,
    ) -> ServiceResult<Match> {
        Ok(self
            .request(|response| TournamentMessage::UpdateMatchStatus {
                match_id,
                status,
                response,
            })
            .await??)
    }

    pub async fn update_match_score(
        &self,
        match_id: MatchId,
        team_one_score: i32,
        team_two_score: i32,
    ) -> ServiceResult<Match> {
        Ok(self
            .request(|response| TournamentMessage::UpdateMatchScore {
                match_id,
                team_one_score,
                team_two_score,
                response,
            })
            .await??)
    }

    pub async fn finish_match(
        &self,
        match_id: MatchId,
        team_one_score: i32,
        team_two_score: i32,
    ) -> ServiceResult<MatchResult> {
        Ok(self
            .request(|response| TournamentMessage::FinishMatch {
                match_id,
                team_one_score,
                team_two_score,
                response,
            })
            .await??)
    }

    pub async fn reverse_match_result(&self, match_id: MatchId) -> ServiceResult<Match> {
        Ok(self
            .request(|response| TournamentMessage::ReverseMatchResult { match_id, response })
            .await??)
    }

    pub async fn delete_match(&self, match_id: MatchId) -> ServiceResult<Match> {
        Ok(self
            .request(|response| TournamentMessage::DeleteMatch { match_id, response })
            .await??)
    }

    pub async fn available_teams(&self, round_id: RoundId) -> ServiceResult<Vec<Team>> {
        self.request(|response| TournamentMessage::AvailableTeams { round_id, response })
            .await
    }

    pub async fn snapshot(&self) -> ServiceResult<SnapshotResponse> {
        self.request(|response| TournamentMessage::GetSnapshot { response })
            .await
    }

    /// Register for change notifications.
    ///
    /// Returns the id to unsubscribe with and the receiving end.
    pub async fn subscribe(&self) -> ServiceResult<(Uuid, mpsc::Receiver<ChangeNotification>)> {
        let subscriber_id = Uuid::new_v4();
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.send(TournamentMessage::Subscribe {
            subscriber_id,
            sender,
        })
        .await?;
        Ok((subscriber_id, receiver))
    }

    pub async fn unsubscribe(&self, subscriber_id: Uuid) -> ServiceResult<()> {
        self.send(TournamentMessage::Unsubscribe { subscriber_id })
            .await
    }

    pub async fn close(&self) -> ServiceResult<()> {
        self.request(|response| TournamentMessage::Close { response })
            .await
    }
}

/// Actor owning one tournament engine.
///
/// All operations from every handle go through the inbox one at a time, so
/// concurrent surfaces never interleave writes to the snapshot.
pub struct TournamentActor<S: SnapshotStore> {
    engine: TournamentEngine<S>,

    /// Message inbox
    inbox: mpsc::Receiver<TournamentMessage>,

    /// Subscribers for change notifications
    subscribers: HashMap<Uuid, mpsc::Sender<ChangeNotification>>,

    is_closed: bool,
}

impl<S: SnapshotStore + Send + 'static> TournamentActor<S> {
    /// Create an actor around a store. The snapshot is loaded when
    /// [`run`](Self::run) starts.
    pub fn new(store: S, storage_key: impl Into<String>) -> (Self, TournamentHandle) {
        Self::from_engine(TournamentEngine::new(store, storage_key))
    }

    /// Wrap an existing engine
    pub fn from_engine(engine: TournamentEngine<S>) -> (Self, TournamentHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let actor = Self {
            engine,
            inbox,
            subscribers: HashMap::new(),
            is_closed: false,
        };

        (actor, TournamentHandle::new(sender))
    }

    /// Spawn the actor on the current runtime and return its handle
    pub fn spawn(store: S, storage_key: impl Into<String>) -> TournamentHandle {
        let (actor, handle) = Self::new(store, storage_key);
        tokio::spawn(actor.run());
        handle
    }

    /// Run the actor event loop until closed or every handle is dropped
    pub async fn run(mut self) {
        if self.engine.is_loading() {
            self.engine.load();
        }
        log::info!("Tournament '{}' service starting", self.engine.tournament().name);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);

            if self.is_closed {
                break;
            }
        }

        log::info!("Tournament '{}' service stopped", self.engine.tournament().name);
    }

    fn handle_message(&mut self, message: TournamentMessage) {
        match message {
            TournamentMessage::AddTeam {
                name,
                players,
                response,
            } => {
                let team = self.engine.add_team(name, players);
                self.notify(ChangeNotification::TeamsChanged);
                let _ = response.send(team);
            }

            TournamentMessage::UpdateTeam { team, response } => {
                let updated = self.engine.update_team(team);
                if updated {
                    self.notify(ChangeNotification::TeamsChanged);
                }
                let _ = response.send(updated);
            }

            TournamentMessage::DeleteTeam { team_id, response } => {
                let deleted = self.engine.delete_team(team_id);
                if deleted {
                    self.notify(ChangeNotification::TeamsChanged);
                }
                let _ = response.send(deleted);
            }

            TournamentMessage::ReregisterTeam { team_id, response } => {
                let result = self.engine.reregister_team(team_id);
                self.reply(result, response, |_| ChangeNotification::TeamsChanged);
            }

            TournamentMessage::CreateRound { response } => {
                let round = self.engine.create_round();
                self.notify(ChangeNotification::RoundsChanged);
                let _ = response.send(round);
            }

            TournamentMessage::CompleteRound { round_id, response } => {
                let result = self.engine.complete_round(round_id);
                self.reply(result, response, |_| ChangeNotification::RoundsChanged);
            }

            TournamentMessage::AdvanceRound { response } => {
                let result = self.engine.advance_round();
                self.reply(result, response, |_| ChangeNotification::RoundsChanged);
            }

            TournamentMessage::DeleteRound { round_id, response } => {
                let teams = self.engine.tournament().teams.clone();
                let result = self.engine.delete_round(round_id);
                self.reply_moving_lives(&teams, result, response, |_| {
                    ChangeNotification::RoundsChanged
                });
            }

            TournamentMessage::CreateMatch {
                team_one_id,
                team_two_id,
                round_id,
                response,
            } => {
                let result = self.engine.create_match(team_one_id, team_two_id, round_id);
                self.reply(result, response, |game| {
                    ChangeNotification::MatchChanged(game.id)
                });
            }

            TournamentMessage::UpdateMatchStatus {
                match_id,
                status,
                response,
            } => {
                let result = self.engine.update_match_status(match_id, status);
                self.reply(result, response, |game| {
                    ChangeNotification::MatchChanged(game.id)
                });
            }

            TournamentMessage::UpdateMatchScore {
                match_id,
                team_one_score,
                team_two_score,
                response,
            } => {
                let result = self
                    .engine
                    .update_match_score(match_id, team_one_score, team_two_score);
                self.reply(result, response, |game| {
                    ChangeNotification::MatchChanged(game.id)
                });
            }

            TournamentMessage::FinishMatch {
                match_id,
                team_one_score,
                team_two_score,
                response,
            } => {
                let teams = self.engine.tournament().teams.clone();
                let result = self
                    .engine
                    .finish_match(match_id, team_one_score, team_two_score);
                self.reply_moving_lives(&teams, result, response, |result| {
                    ChangeNotification::MatchChanged(result.match_id)
                });
            }

            TournamentMessage::ReverseMatchResult { match_id, response } => {
                let teams = self.engine.tournament().teams.clone();
                let result = self.engine.reverse_match_result(match_id);
                self.reply_moving_lives(&teams, result, response, |game| {
                    ChangeNotification::MatchChanged(game.id)
                });
            }

            TournamentMessage::DeleteMatch { match_id, response } => {
                let teams = self.engine.tournament().teams.clone();
                let result = self.engine.delete_match(match_id);
                self.reply_moving_lives(&teams, result, response, |game| {
                    ChangeNotification::MatchChanged(game.id)
                });
            }

            TournamentMessage::AvailableTeams { round_id, response } => {
                let teams = self
                    .engine
                    .available_teams(round_id)
                    .into_iter()
                    .cloned()
                    .collect();
                let _ = response.send(teams);
            }

            TournamentMessage::GetSnapshot { response } => {
                let _ = response.send(SnapshotResponse {
                    tournament: self.engine.tournament().clone(),
                    loading: self.engine.is_loading(),
                });
            }

            TournamentMessage::Subscribe {
                subscriber_id,
                sender,
            } => {
                self.subscribers.insert(subscriber_id, sender);
                log::debug!("Subscriber {} registered", subscriber_id);
            }

            TournamentMessage::Unsubscribe { subscriber_id } => {
                self.subscribers.remove(&subscriber_id);
                log::debug!("Subscriber {} removed", subscriber_id);
            }

            TournamentMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    /// Notify subscribers on success, then answer the caller
    fn reply<T>(
        &mut self,
        result: TournamentResult<T>,
        response: oneshot::Sender<TournamentResult<T>>,
        notification: impl FnOnce(&T) -> ChangeNotification,
    ) {
        if let Ok(value) = &result {
            self.notify(notification(value));
        }
        let _ = response.send(result);
    }

    /// Like [`reply`](Self::reply), also announcing the roster when a result
    /// moved lives
    fn reply_moving_lives<T>(
        &mut self,
        before: &[Team],
        result: TournamentResult<T>,
        response: oneshot::Sender<TournamentResult<T>>,
        notification: impl FnOnce(&T) -> ChangeNotification,
    ) {
        if let Ok(value) = &result {
            self.notify(notification(value));
            if self.engine.tournament().teams != before {
                self.notify(ChangeNotification::TeamsChanged);
            }
        }
        let _ = response.send(result);
    }

    /// Broadcast a change notification to all subscribers
    fn notify(&mut self, notification: ChangeNotification) {
        self.subscribers.retain(|subscriber_id, sender| {
            match sender.try_send(notification) {
                Ok(_) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Subscriber {} channel full, dropping notification",
                        subscriber_id
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", subscriber_id);
                    false
                }
            }
        });
    }
}

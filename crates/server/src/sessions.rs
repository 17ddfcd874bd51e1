//! In-memory viewer sessions: one game, its navigation state, the latest
//! analysis and the chat conversation.

use std::collections::HashMap;
use std::sync::Arc;

use analysis_engine::{AnalysisTicket, AnalysisTracker, EvaluationLine};
use chess_core::pgn::ImportedGame;
use chess_core::{rules, GameMetadata, Intent, MoveRecord, Navigator};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use shakmaty::{Position, Role, Square};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::clients::openai::{self, ChatContext, PromptMessage};
use crate::error::AppError;

/// Moves of context handed to the chat assistant.
const CHAT_MOVE_WINDOW: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: openai::Role,
    pub content: String,
    #[serde(rename = "isError")]
    pub is_error: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self::new(openai::Role::User, content.to_string(), false)
    }

    pub fn assistant(content: String) -> Self {
        Self::new(openai::Role::Assistant, content, false)
    }

    pub fn failure(reason: &str) -> Self {
        Self::new(
            openai::Role::Assistant,
            format!("Sorry, I couldn't analyse this position right now: {reason}"),
            true,
        )
    }

    fn new(role: openai::Role, content: String, is_error: bool) -> Self {
        Self {
            role,
            content,
            is_error,
            created_at: Utc::now(),
        }
    }
}

/// Engine output published for a position.
#[derive(Debug, Clone)]
pub struct PublishedAnalysis {
    pub ticket: AnalysisTicket,
    pub lines: Vec<EvaluationLine>,
}

pub struct Session {
    pub navigator: Navigator,
    pub metadata: GameMetadata,
    pub chat: Vec<ChatMessage>,
    tracker: AnalysisTracker,
    analysis: Option<PublishedAnalysis>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let navigator = Navigator::new();
        let mut tracker = AnalysisTracker::new();
        tracker.position_changed(&navigator.displayed_fen());
        Self {
            navigator,
            metadata: GameMetadata::default(),
            chat: Vec::new(),
            tracker,
            analysis: None,
        }
    }

    fn position_changed(&mut self) {
        let fen = self.navigator.displayed_fen();
        self.tracker.position_changed(&fen);
    }

    pub fn new_game(&mut self) {
        self.navigator.new_game();
        self.metadata = GameMetadata::default();
        self.position_changed();
    }

    pub fn load_game(&mut self, game: ImportedGame) {
        self.navigator.load(game.line);
        self.metadata = game.metadata;
        self.position_changed();
    }

    pub fn navigate(&mut self, intent: Intent) -> bool {
        let moved = self.navigator.apply(intent);
        if moved {
            self.position_changed();
        }
        moved
    }

    pub fn play_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Result<MoveRecord, AppError> {
        let record = self.navigator.play_move(from, to, promotion)?.clone();
        self.position_changed();
        Ok(record)
    }

    /// Tag an analysis request for the displayed position.
    pub fn issue_analysis(&mut self) -> AnalysisTicket {
        let fen = self.navigator.displayed_fen();
        self.tracker.issue(&fen)
    }

    /// Store engine output unless the user has navigated away since the
    /// ticket was issued. Returns whether the result was kept.
    pub fn publish_analysis(&mut self, ticket: AnalysisTicket, lines: Vec<EvaluationLine>) -> bool {
        if !self.tracker.is_current(&ticket) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.tracker.generation(),
                "Discarding stale analysis"
            );
            return false;
        }
        self.analysis = Some(PublishedAnalysis { ticket, lines });
        true
    }

    /// Analysis of the displayed position, if any is current.
    pub fn current_analysis(&self) -> Option<&PublishedAnalysis> {
        self.analysis
            .as_ref()
            .filter(|a| self.tracker.is_current(&a.ticket))
    }

    pub fn chat_context(&self, question: &str) -> ChatContext {
        let path = self.navigator.moves_to_cursor();
        let skip = path.len().saturating_sub(CHAT_MOVE_WINDOW);
        let fen = self.navigator.displayed_fen();

        ChatContext {
            evaluation: self
                .current_analysis()
                .and_then(|a| summarize_analysis(&fen, &a.lines)),
            fen,
            recent_moves: path.iter().skip(skip).map(|m| m.san.clone()).collect(),
            question: question.to_string(),
            history: prompt_history(&self.chat),
        }
    }

    /// Full board view returned by every navigation endpoint.
    pub fn view(&self, id: Uuid) -> JsonValue {
        let nav = &self.navigator;
        let branch = nav.branch().map(|b| {
            json!({
                "base": b.base(),
                "length": b.len(),
                "moves": b.moves().iter().map(MoveRecord::to_json).collect::<Vec<_>>(),
            })
        });

        json!({
            "id": id,
            "fen": nav.displayed_fen(),
            "index": nav.index(),
            "status": nav.status(),
            "onBranch": branch.is_some(),
            "branch": branch,
            "moveList": nav.move_list(),
            "lastMove": nav.moves_to_cursor().last().map(|m| m.to_json()),
            "canGoBack": nav.can_go_back(),
            "canGoForward": nav.can_go_forward(),
            "startFen": nav.line().start_fen(),
            "mainLineLength": nav.line().len(),
            "metadata": self.metadata,
        })
    }
}

/// Evaluation lines as JSON with White-relative display strings and SAN
/// principal variations.
pub fn analysis_json(fen: &str, lines: &[EvaluationLine]) -> Vec<JsonValue> {
    let position = rules::position_from_fen(fen).ok();
    let white_to_move = position.as_ref().map(|p| p.turn().is_white()).unwrap_or(true);

    lines
        .iter()
        .map(|line| {
            let san = position
                .as_ref()
                .map(|p| rules::uci_line_to_san(p, &line.pv))
                .unwrap_or_default();
            json!({
                "multipv": line.multipv,
                "depth": line.depth,
                "score": line.score,
                "eval": line.score.white_pov(white_to_move).display(),
                "pv": line.pv,
                "san": san,
            })
        })
        .collect()
}

/// Conversation turns worth replaying to the model. A question whose answer
/// failed goes out together with the failure notice, so the history never
/// holds an unanswered user turn.
fn prompt_history(chat: &[ChatMessage]) -> Vec<PromptMessage> {
    let mut history = Vec::with_capacity(chat.len());
    let mut turns = chat.iter().peekable();
    while let Some(message) = turns.next() {
        if message.is_error {
            continue;
        }
        if message.role == openai::Role::User && turns.peek().is_some_and(|next| next.is_error) {
            turns.next();
            continue;
        }
        history.push(PromptMessage {
            role: message.role,
            content: message.content.clone(),
        });
    }
    history
}

/// One-line evaluation for the chat prompt, e.g. `+0.35 (best line: Nf3 Nc6 Bb5)`.
fn summarize_analysis(fen: &str, lines: &[EvaluationLine]) -> Option<String> {
    let best = lines.first()?;
    let position = rules::position_from_fen(fen).ok()?;
    let eval = best.score.white_pov(position.turn().is_white()).display();
    let san = rules::uci_line_to_san(&position, &best.pv);
    if san.is_empty() {
        return Some(format!("{eval} (from White's point of view)"));
    }
    let shown: Vec<&str> = san.iter().take(6).map(String::as_str).collect();
    Some(format!(
        "{eval} from White's point of view (best line: {})",
        shown.join(" ")
    ))
}

/// Shared session map. Closures run under the lock and cannot await, so no
/// lock is ever held across an engine search or HTTP call.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> (Uuid, JsonValue) {
        let id = Uuid::new_v4();
        let session = Session::new();
        let view = session.view(id);
        self.inner.write().await.insert(id, session);
        tracing::info!(%id, "Session created");
        (id, view)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn read<R>(&self, id: Uuid, f: impl FnOnce(&Session) -> R) -> Result<R, AppError> {
        let sessions = self.inner.read().await;
        let session = sessions.get(&id).ok_or_else(AppError::session_not_found)?;
        Ok(f(session))
    }

    pub async fn write<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, AppError> {
        let mut sessions = self.inner.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(AppError::session_not_found)?;
        Ok(f(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_engine::Score;
    use chess_core::pgn::parse_pgn;

    fn line(multipv: u32, cp: i32, pv: &[&str]) -> EvaluationLine {
        EvaluationLine {
            multipv,
            score: Score::Centipawns(cp),
            depth: 12,
            pv: pv.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn loaded() -> Session {
        let mut session = Session::new();
        session.load_game(parse_pgn("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6").unwrap());
        session
    }

    #[test]
    fn test_stale_analysis_is_discarded() {
        let mut session = loaded();
        session.navigate(Intent::Jump(2));
        let ticket = session.issue_analysis();

        // User steps forward before the engine answers.
        session.navigate(Intent::Next);
        assert!(!session.publish_analysis(ticket, vec![line(1, 30, &["b8c6"])]));
        assert!(session.current_analysis().is_none());

        let fresh = session.issue_analysis();
        assert!(session.publish_analysis(fresh, vec![line(1, 25, &["f1b5"])]));
        let published = session.current_analysis().unwrap();
        assert_eq!(published.lines[0].pv, vec!["f1b5"]);
    }

    #[test]
    fn test_stale_result_does_not_replace_newer_analysis() {
        let mut session = loaded();
        let old = session.issue_analysis();
        session.navigate(Intent::Last);
        let newer = session.issue_analysis();
        assert!(session.publish_analysis(newer, vec![line(1, 40, &["f1a4"])]));
        assert!(!session.publish_analysis(old, vec![line(1, 0, &["e2e4"])]));
        assert_eq!(session.current_analysis().unwrap().lines[0].pv, vec!["f1a4"]);
    }

    #[test]
    fn test_navigation_hides_previous_analysis() {
        let mut session = loaded();
        let ticket = session.issue_analysis();
        assert!(session.publish_analysis(ticket, vec![line(1, 20, &["e2e4"])]));
        session.navigate(Intent::Next);
        assert!(session.current_analysis().is_none());
    }

    #[test]
    fn test_chat_context_uses_moves_to_cursor_and_eval() {
        let mut session = loaded();
        session.navigate(Intent::Jump(3));
        let ticket = session.issue_analysis();
        session.publish_analysis(ticket, vec![line(1, 35, &["f1b5", "a7a6"])]);
        session.chat.push(ChatMessage::user("hi"));
        session.chat.push(ChatMessage::failure("timeout"));

        let ctx = session.chat_context("Why Bb5?");
        assert_eq!(ctx.recent_moves, vec!["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(
            ctx.evaluation.as_deref(),
            Some("+0.35 from White's point of view (best line: Bb5 a6)")
        );
        assert!(ctx.history.is_empty());
        assert_eq!(ctx.question, "Why Bb5?");
    }

    #[test]
    fn test_chat_history_drops_failed_exchanges_only() {
        let mut session = loaded();
        session.chat.push(ChatMessage::user("first"));
        session.chat.push(ChatMessage::assistant("answer".to_string()));
        session.chat.push(ChatMessage::user("second"));
        session.chat.push(ChatMessage::failure("timeout"));
        session.chat.push(ChatMessage::user("third"));
        session.chat.push(ChatMessage::assistant("another".to_string()));

        let history = session.chat_context("next").history;
        let turns: Vec<(openai::Role, &str)> = history
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            turns,
            vec![
                (openai::Role::User, "first"),
                (openai::Role::Assistant, "answer"),
                (openai::Role::User, "third"),
                (openai::Role::Assistant, "another"),
            ]
        );
    }

    #[test]
    fn test_analysis_json_flips_score_for_black() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let json = analysis_json(fen, &[line(1, 30, &["e7e5", "g1f3"])]);
        assert_eq!(json[0]["eval"], "-0.30");
        assert_eq!(json[0]["san"], json!(["e5", "Nf3"]));
        assert_eq!(json[0]["score"], json!({ "type": "centipawn", "value": 30 }));
    }

    #[test]
    fn test_view_reports_branch() {
        let mut session = loaded();
        session.navigate(Intent::Jump(2));
        session.play_move(Square::G8, Square::F6, None).unwrap();
        let view = session.view(Uuid::nil());
        assert_eq!(view["onBranch"], true);
        assert_eq!(view["branch"]["base"], 2);
        assert_eq!(view["index"], 3);
        assert_eq!(view["mainLineLength"], 6);
        assert_eq!(view["lastMove"]["san"], "Nf6");
        assert_eq!(view["status"], "Move 3, White to move");
    }

    #[tokio::test]
    async fn test_store_create_and_remove() {
        let store = SessionStore::new();
        let (id, view) = store.create().await;
        assert_eq!(view["index"], -1);
        assert_eq!(store.len().await, 1);
        assert!(store.read(id, |s| s.navigator.index()).await.is_ok());
        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.read(id, |_| ()).await.is_err());
    }
}

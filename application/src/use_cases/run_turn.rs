//! Run Turn use case.
//!
//! Executes one chat turn end to end: visibility gate, tool planning,
//! plan filter, the primary tool-use loop under a wall-clock budget, the
//! degenerate-output guard, and normalization of tool results for
//! presentation.
//!
//! A turn issues at most four generation calls: the planner call, the
//! primary call, one database-relevance nudge retry, and one narration
//! retry from the guard.

use std::sync::Arc;
use std::time::{Duration, Instant};

use mongochat_domain::{
    CategoryTable, DomainError, Execution, LlmResponse, Model, PromptTemplate, SplitReply,
    ToolCatalog, ToolDescriptor, ToolResultRecord, Turn, fallback_summary, filter_plan,
    is_degenerate, normalize_payload, render, visible_tools,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession, ToolResultMessage};
use crate::ports::progress::ChatProgress;
use crate::ports::tool_provider::{ProviderError, ToolSession};
use crate::session_manager::SessionManager;
use crate::use_cases::plan_tools::PlanToolsUseCase;

/// Errors that can occur while running a turn.
///
/// Planning failures, normalizer failures, and narration failures never
/// appear here; they are absorbed and degrade the answer instead.
#[derive(Error, Debug)]
pub enum RunTurnError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Turn timed out")]
    TimedOut,

    #[error("Turn cancelled")]
    Cancelled,

    #[error("Execution failed: {0}")]
    Execution(String),
}

impl From<GatewayError> for RunTurnError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Timeout => RunTurnError::TimedOut,
            GatewayError::Cancelled => RunTurnError::Cancelled,
            other => RunTurnError::Execution(other.to_string()),
        }
    }
}

impl From<DomainError> for RunTurnError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidQuery(message) => RunTurnError::InvalidQuery(message),
            DomainError::InvalidRole(role) => {
                RunTurnError::InvalidQuery(format!("unsupported history role '{role}'"))
            }
        }
    }
}

impl From<ProviderError> for RunTurnError {
    fn from(e: ProviderError) -> Self {
        RunTurnError::Execution(e.to_string())
    }
}

/// Input for the [`RunTurnUseCase`].
#[derive(Debug, Clone)]
pub struct RunTurnInput {
    pub turn: Turn,
    pub model: Model,
    /// External cancellation (e.g. the client disconnected).
    pub cancel: CancellationToken,
}

impl RunTurnInput {
    pub fn new(turn: Turn, model: Model) -> Self {
        Self {
            turn,
            model,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// The outcome of one completed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Final answer, split into content and optional explanation.
    pub reply: SplitReply,
    /// Raw record of what the model did.
    pub execution: Execution,
    /// Normalized rendering of each tool result, for presentation.
    pub tool_summaries: Vec<String>,
}

/// Use case for running one chat turn.
pub struct RunTurnUseCase {
    gateway: Arc<dyn LlmGateway>,
    sessions: Arc<SessionManager>,
    planner: PlanToolsUseCase,
    params: crate::config::ExecutionParams,
    categories: CategoryTable,
    guidance: Option<String>,
}

impl RunTurnUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        sessions: Arc<SessionManager>,
        params: crate::config::ExecutionParams,
    ) -> Self {
        let planner = PlanToolsUseCase::new(Arc::clone(&gateway));
        Self {
            gateway,
            sessions,
            planner,
            params,
            categories: CategoryTable::default(),
            guidance: None,
        }
    }

    /// Attach operator-supplied guidance appended to the system prompt.
    pub fn with_guidance(mut self, guidance: Option<String>) -> Self {
        self.guidance = guidance;
        self
    }

    /// Execute one turn with progress callbacks.
    pub async fn execute(
        &self,
        input: RunTurnInput,
        progress: &dyn ChatProgress,
    ) -> Result<TurnOutcome, RunTurnError> {
        let turn = &input.turn;
        turn.validate()?;

        info!("Starting turn: {}", preview(&turn.query, 100));

        let tool_session = self.sessions.acquire().await?;
        let catalog = tool_session.catalog();

        let visible = visible_tools(&catalog, &turn.query);
        debug!(
            "Visibility gate: {} of {} tools visible",
            visible.len(),
            catalog.len()
        );

        let plan = self.planner.execute(&input.model, &turn.query, &visible).await;
        let exec_tools = filter_plan(&visible, &plan);
        let selected: Vec<String> = exec_tools.names().map(String::from).collect();
        progress.on_tools_selected(&selected);

        let cancel = input.cancel.clone();
        let started = Instant::now();
        let timer = tokio::time::sleep(self.params.timeout);
        tokio::pin!(timer);
        let loop_future = self.drive_loop(turn, &input.model, &exec_tools, &tool_session, progress);
        tokio::pin!(loop_future);

        let execution = tokio::select! {
            result = &mut loop_future => result?,
            _ = &mut timer => {
                cancel.cancel();
                warn!("Turn exceeded {:?} budget, aborting", self.params.timeout);
                return Err(RunTurnError::TimedOut);
            }
            _ = cancel.cancelled() => {
                return Err(RunTurnError::Cancelled);
            }
        };

        // The guard's narration call shares the turn's wall-clock
        // budget; it may only spend what the loop left over.
        let remaining = self.params.timeout.saturating_sub(started.elapsed());
        let final_text = self
            .guard_output(
                &input.model,
                &turn.query,
                execution.text.clone(),
                &execution,
                remaining,
            )
            .await;

        let as_table = turn.wants_table();
        let tool_summaries = execution
            .tool_results
            .iter()
            .map(|result| {
                let category = self.categories.classify(&result.name);
                render(&normalize_payload(category, &result.payload), as_table)
            })
            .collect();

        info!(
            "Turn completed: {} tool call(s), {} chars of answer",
            execution.tool_calls.len(),
            final_text.len()
        );

        Ok(TurnOutcome {
            reply: SplitReply::from_text(&final_text),
            execution,
            tool_summaries,
        })
    }

    /// The primary generation call with automatic tool-call handling,
    /// plus the single database-relevance nudge retry.
    async fn drive_loop(
        &self,
        turn: &Turn,
        model: &Model,
        exec_tools: &ToolCatalog,
        tool_session: &Arc<dyn ToolSession>,
        progress: &dyn ChatProgress,
    ) -> Result<Execution, RunTurnError> {
        let system = PromptTemplate::chat_system(self.guidance.as_deref());
        let session = self
            .gateway
            .create_session_with_history(model, &system, &turn.history)
            .await?;

        let tools: Vec<ToolDescriptor> = exec_tools.iter().cloned().collect();
        let response = session.send_with_tools(&turn.query, &tools).await?;
        let mut execution = self
            .roundtrips(session.as_ref(), response, tool_session, progress)
            .await?;

        // A database-looking question answered without any tool activity
        // gets one reminder to actually use the tools.
        if execution.tool_calls.is_empty() && !tools.is_empty() && turn.looks_database_related() {
            debug!("Database-looking query used no tools, nudging once");
            let response = session
                .send_with_tools(&PromptTemplate::database_nudge(&turn.query), &tools)
                .await?;
            let retry = self
                .roundtrips(session.as_ref(), response, tool_session, progress)
                .await?;
            if !retry.text.is_empty() || !retry.tool_calls.is_empty() {
                let original_text = execution.text;
                execution = retry;
                if execution.text.is_empty() {
                    execution.text = original_text;
                }
            }
        }

        Ok(execution)
    }

    /// Drive tool-call/tool-result round trips until the model stops
    /// requesting tools or the round-trip cap is reached.
    async fn roundtrips(
        &self,
        session: &dyn LlmSession,
        mut response: LlmResponse,
        tool_session: &Arc<dyn ToolSession>,
        progress: &dyn ChatProgress,
    ) -> Result<Execution, RunTurnError> {
        let mut texts = Vec::new();
        let mut all_calls = Vec::new();
        let mut all_results = Vec::new();

        let text = response.text_content();
        if !text.is_empty() {
            progress.on_text(&text);
            texts.push(text);
        }

        let mut roundtrip = 0;
        loop {
            let calls = response.tool_calls();
            if calls.is_empty() {
                break;
            }

            roundtrip += 1;
            if roundtrip > self.params.max_roundtrips {
                warn!(
                    "Tool loop exceeded max_roundtrips ({})",
                    self.params.max_roundtrips
                );
                break;
            }

            let mut futures = Vec::new();
            for call in &calls {
                progress.on_tool_call(&call.name);
                futures.push(tool_session.call(&call.name, call.arguments.clone()));
            }
            let results = futures::future::join_all(futures).await;

            let mut messages = Vec::new();
            for (call, result) in calls.iter().zip(results) {
                let (output, payload, is_error) = match result {
                    Ok(payload) => (payload.to_string(), payload, false),
                    Err(e) => {
                        let message = e.to_string();
                        let payload = serde_json::json!({"error": message});
                        (message, payload, true)
                    }
                };
                progress.on_tool_result(&call.name, !is_error);
                if is_error {
                    warn!("Tool '{}' failed: {output}", call.name);
                }
                all_results.push(ToolResultRecord {
                    name: call.name.clone(),
                    payload,
                });
                messages.push(ToolResultMessage {
                    tool_use_id: call.call_id.clone(),
                    tool_name: call.name.clone(),
                    output,
                    is_error,
                });
            }
            all_calls.extend(calls);

            debug!(
                "Tool round trip {}/{}: sending {} result(s)",
                roundtrip,
                self.params.max_roundtrips,
                messages.len()
            );
            response = session.send_tool_results(&messages).await?;

            let text = response.text_content();
            if !text.is_empty() {
                progress.on_text(&text);
                texts.push(text);
            }
        }

        // The last text block is the answer; intermediate blocks
        // ("Let me check...") are discarded.
        Ok(Execution {
            text: texts.pop().unwrap_or_default(),
            tool_calls: all_calls,
            tool_results: all_results,
        })
    }

    /// Replace a minimal final answer with a narration of the tool
    /// results, falling back to a deterministic template. Never fails.
    async fn guard_output(
        &self,
        model: &Model,
        query: &str,
        text: String,
        execution: &Execution,
        budget: Duration,
    ) -> String {
        if !is_degenerate(&text) || execution.tool_results.is_empty() {
            return text;
        }

        debug!("Final answer is degenerate, retrying as narration");
        let narrated =
            match tokio::time::timeout(budget, self.narrate(model, query, &execution.tool_results))
                .await
            {
                Ok(narrated) => narrated,
                Err(_) => {
                    warn!("Narration retry exceeded the turn budget, using fallback");
                    None
                }
            };
        if let Some(narrated) = narrated {
            if !is_degenerate(&narrated) {
                return narrated;
            }
        }

        match fallback_summary(&execution.tool_results) {
            Some(summary) => summary,
            None => text,
        }
    }

    async fn narrate(
        &self,
        model: &Model,
        query: &str,
        results: &[ToolResultRecord],
    ) -> Option<String> {
        let session = match self
            .gateway
            .create_session(model, PromptTemplate::narration_system())
            .await
        {
            Ok(session) => session,
            Err(e) => {
                warn!("Narration session failed: {e}");
                return None;
            }
        };
        match session
            .send(&PromptTemplate::narration_query(query, results))
            .await
        {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                warn!("Narration call failed: {e}");
                None
            }
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionParams;
    use crate::ports::llm_gateway::GatewayError;
    use crate::ports::progress::NoChatProgress;
    use crate::ports::tool_provider::ToolProvider;
    use async_trait::async_trait;
    use mongochat_domain::{ChatMessage, ContentBlock, StopReason};
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    // ==================== Test Mocks ====================

    struct MockSession {
        model: Model,
        responses: Mutex<VecDeque<LlmResponse>>,
    }

    impl MockSession {
        fn new(responses: Vec<LlmResponse>) -> Self {
            Self {
                model: Model::default(),
                responses: Mutex::new(VecDeque::from(responses)),
            }
        }

        fn next(&self) -> Result<LlmResponse, GatewayError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GatewayError::Other("No more responses".to_string()))
        }
    }

    #[async_trait]
    impl LlmSession for MockSession {
        fn model(&self) -> &Model {
            &self.model
        }

        async fn send(&self, _content: &str) -> Result<String, GatewayError> {
            Ok(self.next()?.text_content())
        }

        async fn send_with_tools(
            &self,
            _content: &str,
            _tools: &[ToolDescriptor],
        ) -> Result<LlmResponse, GatewayError> {
            self.next()
        }

        async fn send_tool_results(
            &self,
            _results: &[ToolResultMessage],
        ) -> Result<LlmResponse, GatewayError> {
            self.next()
        }
    }

    /// Session whose tool call never resolves.
    struct HangingSession {
        model: Model,
    }

    #[async_trait]
    impl LlmSession for HangingSession {
        fn model(&self) -> &Model {
            &self.model
        }

        async fn send(&self, _content: &str) -> Result<String, GatewayError> {
            futures::future::pending().await
        }

        async fn send_with_tools(
            &self,
            _content: &str,
            _tools: &[ToolDescriptor],
        ) -> Result<LlmResponse, GatewayError> {
            futures::future::pending().await
        }

        async fn send_tool_results(
            &self,
            _results: &[ToolResultMessage],
        ) -> Result<LlmResponse, GatewayError> {
            futures::future::pending().await
        }
    }

    /// Hands out sessions in order: first the planner's, then the chat
    /// session, then (if reached) the narration session.
    struct MockGateway {
        sessions: Mutex<VecDeque<Box<dyn LlmSession>>>,
    }

    impl MockGateway {
        fn new(sessions: Vec<Box<dyn LlmSession>>) -> Self {
            Self {
                sessions: Mutex::new(VecDeque::from(sessions)),
            }
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        async fn create_session_with_history(
            &self,
            _model: &Model,
            _system_prompt: &str,
            _history: &[ChatMessage],
        ) -> Result<Box<dyn LlmSession>, GatewayError> {
            self.sessions
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GatewayError::Other("No more sessions".to_string()))
        }
    }

    struct FakeToolSession {
        catalog: ToolCatalog,
        payloads: Mutex<std::collections::HashMap<String, Value>>,
    }

    #[async_trait]
    impl ToolSession for FakeToolSession {
        fn catalog(&self) -> ToolCatalog {
            self.catalog.clone()
        }

        async fn call(&self, name: &str, _arguments: Value) -> Result<Value, ProviderError> {
            self.payloads
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .ok_or_else(|| ProviderError::ToolFailed {
                    name: name.to_string(),
                    message: "no canned payload".to_string(),
                })
        }

        async fn close(&self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    struct FakeToolProvider {
        session: Mutex<Option<Arc<dyn ToolSession>>>,
    }

    #[async_trait]
    impl ToolProvider for FakeToolProvider {
        async fn connect(&self) -> Result<Arc<dyn ToolSession>, ProviderError> {
            self.session
                .lock()
                .unwrap()
                .take()
                .ok_or(ProviderError::Closed)
        }
    }

    fn tool(name: &str) -> ToolDescriptor {
        ToolDescriptor::new(name, format!("{name} tool"), json!({"type": "object"}))
    }

    fn text_response(text: &str) -> LlmResponse {
        LlmResponse {
            content: vec![ContentBlock::Text(text.to_string())],
            stop_reason: Some(StopReason::EndTurn),
        }
    }

    fn tool_use_response(tool_name: &str, call_id: &str) -> LlmResponse {
        LlmResponse {
            content: vec![ContentBlock::ToolUse {
                id: call_id.to_string(),
                name: tool_name.to_string(),
                input: std::collections::HashMap::new(),
            }],
            stop_reason: Some(StopReason::ToolUse),
        }
    }

    fn sessions_for(
        tools: Vec<&str>,
        payloads: Vec<(&str, Value)>,
        llm_sessions: Vec<Box<dyn LlmSession>>,
    ) -> (Arc<dyn LlmGateway>, Arc<SessionManager>) {
        let catalog: ToolCatalog = tools.into_iter().map(tool).collect();
        let tool_session = Arc::new(FakeToolSession {
            catalog,
            payloads: Mutex::new(
                payloads
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            ),
        });
        let provider = Arc::new(FakeToolProvider {
            session: Mutex::new(Some(tool_session)),
        });
        let manager = Arc::new(SessionManager::new(provider, ExecutionParams::default()));
        let gateway = Arc::new(MockGateway::new(llm_sessions));
        (gateway, manager)
    }

    fn planner_session(reply: &str) -> Box<dyn LlmSession> {
        Box::new(MockSession::new(vec![text_response(reply)]))
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn simple_turn_without_tool_calls() {
        let (gateway, sessions) = sessions_for(
            vec!["mongodb.list-databases"],
            vec![],
            vec![
                planner_session(r#"{"tools": []}"#),
                Box::new(MockSession::new(vec![text_response(
                    "There is nothing I need the tools for here.",
                )])),
            ],
        );
        let use_case = RunTurnUseCase::new(gateway, sessions, ExecutionParams::default());

        let input = RunTurnInput::new(Turn::new("hello there, who are you?", vec![]), Model::default());
        let outcome = use_case.execute(input, &NoChatProgress).await.unwrap();

        assert_eq!(
            outcome.reply.content,
            "There is nothing I need the tools for here."
        );
        assert!(outcome.execution.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn tool_roundtrip_produces_records_and_summaries() {
        let (gateway, sessions) = sessions_for(
            vec!["mongodb.list-databases"],
            vec![(
                "mongodb.list-databases",
                json!({"databases": [{"name": "app", "sizeOnDisk": 2048}]}),
            )],
            vec![
                planner_session(r#"{"tools": [{"name": "mongodb.list-databases", "why": "listing"}]}"#),
                Box::new(MockSession::new(vec![
                    tool_use_response("mongodb.list-databases", "call_1"),
                    text_response("You have one database named app, about 2 KB on disk."),
                ])),
            ],
        );
        let use_case = RunTurnUseCase::new(gateway, sessions, ExecutionParams::default());

        let input = RunTurnInput::new(Turn::new("list databases", vec![]), Model::default());
        let outcome = use_case.execute(input, &NoChatProgress).await.unwrap();

        assert_eq!(outcome.execution.tool_calls.len(), 1);
        assert_eq!(outcome.execution.tool_results.len(), 1);
        assert_eq!(outcome.tool_summaries.len(), 1);
        assert!(outcome.tool_summaries[0].contains("app"));
        assert!(outcome.reply.content.contains("app"));
    }

    #[tokio::test]
    async fn hanging_generation_call_times_out() {
        let (gateway, sessions) = sessions_for(
            vec!["mongodb.find"],
            vec![],
            vec![
                planner_session(r#"{"tools": []}"#),
                Box::new(HangingSession {
                    model: Model::default(),
                }),
            ],
        );
        let params = ExecutionParams::default().with_timeout(Duration::from_millis(10));
        let use_case = RunTurnUseCase::new(gateway, sessions, params);

        let input = RunTurnInput::new(Turn::new("find all users", vec![]), Model::default());
        let result = use_case.execute(input, &NoChatProgress).await;

        assert!(matches!(result, Err(RunTurnError::TimedOut)));
    }

    #[tokio::test]
    async fn degenerate_answer_falls_back_to_document_summary() {
        // The narration retry has no session to use (the gateway queue is
        // exhausted), so the deterministic fallback kicks in.
        let (gateway, sessions) = sessions_for(
            vec!["mongodb.find"],
            vec![(
                "mongodb.find",
                json!({"documents": [{"_id": 1, "name": "ada"}, {"_id": 2, "name": "belen"}]}),
            )],
            vec![
                planner_session(r#"{"tools": [{"name": "mongodb.find", "why": "fetching"}]}"#),
                Box::new(MockSession::new(vec![
                    tool_use_response("mongodb.find", "call_1"),
                    text_response("Done."),
                ])),
            ],
        );
        let use_case = RunTurnUseCase::new(gateway, sessions, ExecutionParams::default());

        let input = RunTurnInput::new(Turn::new("find all users", vec![]), Model::default());
        let outcome = use_case.execute(input, &NoChatProgress).await.unwrap();

        assert_ne!(outcome.reply.content, "Done.");
        assert!(outcome.reply.content.contains("2 document(s)"));
    }

    #[tokio::test]
    async fn degenerate_answer_prefers_narration_when_available() {
        let (gateway, sessions) = sessions_for(
            vec!["mongodb.count"],
            vec![("mongodb.count", json!({"count": 42}))],
            vec![
                planner_session(r#"{"tools": [{"name": "mongodb.count", "why": "counting"}]}"#),
                Box::new(MockSession::new(vec![
                    tool_use_response("mongodb.count", "call_1"),
                    text_response("ok"),
                ])),
                Box::new(MockSession::new(vec![text_response(
                    "The users collection currently holds 42 documents.",
                )])),
            ],
        );
        let use_case = RunTurnUseCase::new(gateway, sessions, ExecutionParams::default());

        let input = RunTurnInput::new(Turn::new("count the users", vec![]), Model::default());
        let outcome = use_case.execute(input, &NoChatProgress).await.unwrap();

        assert_eq!(
            outcome.reply.content,
            "The users collection currently holds 42 documents."
        );
    }

    #[tokio::test]
    async fn hanging_narration_is_cut_off_by_the_turn_budget() {
        // The narration session never answers; the turn must still
        // finish inside its budget with the deterministic fallback.
        let (gateway, sessions) = sessions_for(
            vec!["mongodb.find"],
            vec![("mongodb.find", json!({"documents": [{"_id": 1, "name": "ada"}]}))],
            vec![
                planner_session(r#"{"tools": [{"name": "mongodb.find", "why": "fetching"}]}"#),
                Box::new(MockSession::new(vec![
                    tool_use_response("mongodb.find", "call_1"),
                    text_response("Done."),
                ])),
                Box::new(HangingSession {
                    model: Model::default(),
                }),
            ],
        );
        let params = ExecutionParams::default().with_timeout(Duration::from_millis(50));
        let use_case = RunTurnUseCase::new(gateway, sessions, params);

        let input = RunTurnInput::new(Turn::new("find all users", vec![]), Model::default());
        let outcome = use_case.execute(input, &NoChatProgress).await.unwrap();

        assert!(outcome.reply.content.contains("1 document(s)"));
    }

    #[tokio::test]
    async fn database_query_without_tool_use_is_nudged_once() {
        let (gateway, sessions) = sessions_for(
            vec!["mongodb.list-collections"],
            vec![(
                "mongodb.list-collections",
                json!({"collections": ["orders", "users"]}),
            )],
            vec![
                planner_session(r#"{"tools": []}"#),
                Box::new(MockSession::new(vec![
                    // First answer ignores the tools entirely.
                    text_response("A MongoDB deployment usually has several collections."),
                    // Nudge retry actually uses them.
                    tool_use_response("mongodb.list-collections", "call_1"),
                    text_response("Your database has two collections, orders and users."),
                ])),
            ],
        );
        let use_case = RunTurnUseCase::new(gateway, sessions, ExecutionParams::default());

        let input = RunTurnInput::new(Turn::new("what collections exist?", vec![]), Model::default());
        let outcome = use_case.execute(input, &NoChatProgress).await.unwrap();

        assert_eq!(outcome.execution.tool_calls.len(), 1);
        assert!(outcome.reply.content.contains("orders and users"));
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_the_pipeline() {
        let (gateway, sessions) = sessions_for(vec![], vec![], vec![]);
        let use_case = RunTurnUseCase::new(gateway, sessions, ExecutionParams::default());

        let input = RunTurnInput::new(Turn::new("   ", vec![]), Model::default());
        let result = use_case.execute(input, &NoChatProgress).await;

        assert!(matches!(result, Err(RunTurnError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn respects_max_roundtrips() {
        let mut responses = vec![tool_use_response("mongodb.find", "call_0")];
        for i in 1..10 {
            responses.push(tool_use_response("mongodb.find", &format!("call_{i}")));
        }
        responses.push(text_response("Finally, here is the answer you wanted."));

        let (gateway, sessions) = sessions_for(
            vec!["mongodb.find"],
            vec![("mongodb.find", json!({"documents": [{"_id": 1}]}))],
            vec![
                planner_session(r#"{"tools": [{"name": "mongodb.find", "why": "fetching"}]}"#),
                Box::new(MockSession::new(responses)),
            ],
        );
        let params = ExecutionParams::default().with_max_roundtrips(3);
        let use_case = RunTurnUseCase::new(gateway, sessions, params);

        let input = RunTurnInput::new(Turn::new("find the thing", vec![]), Model::default());
        let outcome = use_case.execute(input, &NoChatProgress).await.unwrap();

        // 3 round trips were sent; the cap stopped the loop afterwards.
        assert_eq!(outcome.execution.tool_results.len(), 3);
    }
}

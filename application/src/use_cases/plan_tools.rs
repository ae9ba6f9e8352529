//! Plan Tools use case.
//!
//! One constrained generation call that asks the model to pick, from the
//! visible tool set, which named tools are relevant to the request. No
//! tools are attached to the call itself. Planning failures never reach
//! the caller: malformed output and gateway errors both degrade to an
//! empty plan, which the plan filter treats as "expose everything".

use std::sync::Arc;

use mongochat_domain::{Model, Plan, PromptTemplate, ToolCatalog, parse_planner_reply};
use tracing::{debug, warn};

use crate::ports::llm_gateway::LlmGateway;

/// Use case for planning the tool subset for a turn.
pub struct PlanToolsUseCase {
    gateway: Arc<dyn LlmGateway>,
}

impl PlanToolsUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    /// Ask the model which visible tools matter for this query.
    pub async fn execute(&self, model: &Model, query: &str, visible: &ToolCatalog) -> Plan {
        if visible.is_empty() {
            return Plan::empty();
        }

        let session = match self
            .gateway
            .create_session(model, PromptTemplate::planner_system())
            .await
        {
            Ok(session) => session,
            Err(e) => {
                warn!("Planner session failed, using empty plan: {e}");
                return Plan::empty();
            }
        };

        let names: Vec<String> = visible.names().map(String::from).collect();
        let reply = match session
            .send(&PromptTemplate::planner_query(query, &names))
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Planner call failed, using empty plan: {e}");
                return Plan::empty();
            }
        };

        let plan = parse_planner_reply(&reply, visible);
        debug!(
            "Planner chose {} of {} visible tools",
            plan.len(),
            visible.len()
        );
        plan
    }
}

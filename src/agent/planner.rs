//! Working Backwards planning/execution engine
//!
//! Builds a backward chain of steps from the goal to the initial state,
//! reverses it into a forward plan, then executes the plan step by step,
//! dispatching to tools when a step names one and delegating to the
//! reasoning collaborator otherwise.

use std::sync::Arc;

use crate::agent::extractor::{ActionExtractor, MarkerExtractor};
use crate::agent::plan::{BackwardStep, ExecutionCursor};
use crate::agent::Agent;
use crate::core::{AgentStatus, Config, Message, Result, ToolCall, WorkbackError};
use crate::llm::{GenerateOptions, LlmProvider};
use crate::tools::{ToolRegistry, TERMINATE_MARKER};

use async_trait::async_trait;

/// Bounded retry policy for failing steps
///
/// `max_attempts` counts the initial attempt plus recovery passes. The
/// default of 2 gives exactly one recovery delegation and no backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per step (initial + recoveries)
    pub max_attempts: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

/// Truncate on a char boundary, appending an ellipsis when cut
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are an agent that solves problems with the Working \
Backwards methodology: start from the goal state, repeatedly identify what must happen \
immediately before it until the initial state is reached, then execute the steps in forward \
order. Be concrete and specific.";

/// Agent that plans backward from a goal and executes forward
pub struct PlanningAgent {
    /// Name of this agent
    name: String,
    /// Reasoning collaborator
    provider: Arc<dyn LlmProvider>,
    /// Tools available during execution
    tools: ToolRegistry,
    /// Strategy for spotting tool requests in collaborator replies
    extractor: Box<dyn ActionExtractor>,
    /// Step failure policy
    retry: RetryPolicy,
    /// Cap on think/act iterations per run
    max_steps: usize,
    /// Cap on backward-chaining queries, independent of max_steps
    backward_cap: usize,
    /// System prompt seeding the memory
    system_prompt: String,

    /// Goal text, recorded verbatim
    goal: String,
    /// Current frontier state of the backward chain
    frontier: String,
    /// Agent memory
    messages: Vec<Message>,
    /// Steps in discovery order (goal first, initial state last)
    backward_steps: Vec<BackwardStep>,
    /// Reversed chain, in execution order
    forward_plan: Vec<BackwardStep>,
    /// Execution position
    cursor: ExecutionCursor,
    /// Run status
    status: AgentStatus,
    /// Human-readable progress line
    progress: String,
    /// Last unrecovered error
    last_error: Option<String>,
    /// Tool request extracted from the latest collaborator reply
    pending_call: Option<ToolCall>,
}

impl PlanningAgent {
    /// Create a planning agent from configuration
    pub fn new(name: impl Into<String>, provider: Arc<dyn LlmProvider>, config: &Config) -> Self {
        Self {
            name: name.into(),
            provider,
            tools: ToolRegistry::new(),
            extractor: Box::new(MarkerExtractor::new()),
            retry: RetryPolicy {
                max_attempts: config.agent.retry_attempts,
            },
            max_steps: config.agent.max_steps,
            backward_cap: config.agent.backward_cap,
            system_prompt: config
                .agent
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            goal: String::new(),
            frontier: String::new(),
            messages: Vec::new(),
            backward_steps: Vec::new(),
            forward_plan: Vec::new(),
            cursor: ExecutionCursor::new(),
            status: AgentStatus::Idle,
            progress: "No progress yet. Planning phase.".to_string(),
            last_error: None,
            pending_call: None,
        }
    }

    /// Replace the tool registry
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Replace the action extractor
    pub fn with_extractor(mut self, extractor: Box<dyn ActionExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the agent name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the goal text
    pub fn goal(&self) -> &str {
        &self.goal
    }

    /// Get the run status
    pub fn status(&self) -> AgentStatus {
        self.status
    }

    /// Steps in discovery order
    pub fn backward_steps(&self) -> &[BackwardStep] {
        &self.backward_steps
    }

    /// Steps in execution order
    pub fn forward_plan(&self) -> &[BackwardStep] {
        &self.forward_plan
    }

    /// Resolved steps with results
    pub fn completed_steps(&self) -> &[BackwardStep] {
        &self.cursor.completed_steps
    }

    /// Current execution index
    pub fn current_step_index(&self) -> usize {
        self.cursor.current_step_index
    }

    /// Whether the forward plan is ready
    pub fn plan_ready(&self) -> bool {
        self.cursor.plan_ready
    }

    /// The agent's memory
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Set the goal, resetting all plan state
    pub fn set_goal(&mut self, goal: &str) -> String {
        self.goal = goal.to_string();
        self.frontier = goal.to_string();
        self.backward_steps.clear();
        self.forward_plan.clear();
        self.cursor.reset();
        self.status = AgentStatus::Idle;
        self.last_error = None;
        self.pending_call = None;
        self.progress = "No progress yet. Planning phase.".to_string();

        if self.messages.is_empty() {
            self.messages.push(Message::system(&self.system_prompt));
        }
        self.messages
            .push(Message::system(format!("Goal set: {}", goal)));
        self.messages.push(Message::user(format!(
            "My goal is: {}\n\nClarify this goal in concrete terms and begin the Working \
             Backwards analysis to determine how to achieve it.",
            goal
        )));

        format!(
            "Goal set to: {}. I will now work backwards to create a plan.",
            goal
        )
    }

    /// Record a message in memory
    fn update_memory(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Perform one backward-chaining query
    ///
    /// Returns false when the collaborator failed and the phase degraded.
    async fn backward_query_once(&mut self) -> bool {
        let prompt = format!(
            "Target state: {}\nCurrent frontier: {}\n\nWhat must happen immediately before this \
             frontier state? Reply with:\nSTEP: <description>\nREQUIRES: <comma-separated \
             prerequisites>\nTOOLS: <comma-separated tool names, if any>\nARGS: <JSON object of \
             tool arguments, if any>\nIf nothing must happen because we are already at the \
             initial state, say so.",
            self.goal, self.frontier
        );
        self.update_memory(Message::user(prompt));

        let reply = match self.provider.complete(&self.messages, None).await {
            Ok(reply) => reply,
            Err(e) => {
                self.update_memory(Message::system(format!("Error during planning: {}", e)));
                return false;
            }
        };

        self.update_memory(Message::assistant(&reply));

        if let Some(request) = self.extractor.extract(&reply) {
            self.pending_call = Some(request.into_call());
        }

        let step = BackwardStep::parse(&reply);
        self.frontier = format!("the state before: {}", step.description);
        self.backward_steps.push(step);

        // The marker check is a deliberately loose substring match on the
        // raw reply, applied after the step is recorded.
        if BackwardStep::signals_initial_state(&reply)
            || self.backward_steps.len() >= self.backward_cap
        {
            self.organize_plan();
        }

        true
    }

    /// Reverse the backward chain into the forward plan
    ///
    /// Pure transformation; no re-querying.
    fn organize_plan(&mut self) {
        self.forward_plan = self.backward_steps.iter().rev().cloned().collect();
        self.cursor.plan_ready = true;
        self.progress = format!("Plan created with {} steps.", self.forward_plan.len());
        self.update_memory(Message::system(format!(
            "Forward execution plan ready with {} steps.",
            self.forward_plan.len()
        )));
    }

    /// Run backward chaining to completion without executing anything
    pub async fn build_plan(&mut self) -> Result<()> {
        if self.goal.is_empty() {
            return Err(WorkbackError::config(
                "Goal must be set before planning",
            ));
        }

        while !self.cursor.plan_ready {
            if !self.backward_query_once().await {
                // Collaborator failure: degrade to whatever chain exists.
                self.organize_plan();
                break;
            }
        }

        Ok(())
    }

    /// The tool name this step resolves to, if any
    fn step_tool(&self, step: &BackwardStep) -> Option<String> {
        step.tools_needed
            .iter()
            .find(|name| self.tools.contains(name))
            .cloned()
    }

    /// Execute the step at the cursor, with bounded recovery
    async fn execute_current_step(&mut self) -> Result<String> {
        let step = self.forward_plan[self.cursor.current_step_index].clone();

        let outcome = match self.step_tool(&step) {
            Some(tool_name) => {
                let args = if step.tool_args.is_null() {
                    serde_json::json!({})
                } else {
                    step.tool_args.clone()
                };
                self.invoke_tool(&tool_name, &args).await
            }
            None => self.delegate_step(&step).await,
        };

        match outcome {
            Ok(result) => Ok(self.resolve_step(step, result)),
            Err(e) => match self.attempt_recovery(&step, &e).await {
                Some(result) => Ok(self.resolve_step(step, result)),
                None => {
                    let error = format!(
                        "Error executing step '{}': {}",
                        step.description, e
                    );
                    self.last_error = Some(error.clone());
                    self.status = AgentStatus::Failed;
                    self.update_memory(Message::system(error.clone()));
                    Ok(error)
                }
            },
        }
    }

    /// Invoke a registered tool directly, surfacing its failure
    async fn invoke_tool(&self, name: &str, args: &serde_json::Value) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| WorkbackError::tool(format!("tool '{}' not found", name)))?;
        tool.invoke(args).await
    }

    /// Delegate a tool-free step to the collaborator
    async fn delegate_step(&mut self, step: &BackwardStep) -> Result<String> {
        let prompt = format!(
            "Execute this step: {}. Available tools: {}",
            step.description,
            self.available_tool_names()
        );
        let messages = vec![Message::system(&self.system_prompt), Message::user(prompt)];
        let result = self.provider.complete(&messages, None).await?;
        self.update_memory(Message::assistant(&result));
        Ok(result)
    }

    /// One recovery delegation per remaining attempt; None when exhausted
    async fn attempt_recovery(&mut self, step: &BackwardStep, error: &WorkbackError) -> Option<String> {
        for _ in 1..self.retry.max_attempts {
            let prompt = format!(
                "Executing step \"{}\" failed: {}\nAvailable tools: {}\nPropose an alternative \
                 way to complete the step and carry it out, replying with the outcome.",
                step.description,
                error,
                self.available_tool_names()
            );
            self.update_memory(Message::user(prompt.clone()));

            match self.provider.complete(&self.messages, None).await {
                Ok(result) => {
                    self.update_memory(Message::assistant(&result));
                    return Some(result);
                }
                Err(e) => {
                    self.update_memory(Message::system(format!(
                        "Recovery attempt failed: {}",
                        e
                    )));
                }
            }
        }
        None
    }

    /// Record a resolved step and advance the cursor
    fn resolve_step(&mut self, step: BackwardStep, result: String) -> String {
        self.update_memory(Message::system(format!("Step result: {}", result)));
        self.cursor.resolve(step, result.clone());
        self.progress = format!(
            "Completed step {}/{}",
            self.cursor.current_step_index,
            self.forward_plan.len()
        );
        result
    }

    fn available_tool_names(&self) -> String {
        let names = self.tools.names();
        if names.is_empty() {
            "None".to_string()
        } else {
            names.join(", ")
        }
    }

    /// Generate the final run summary
    ///
    /// Degrades to a locally formatted line when the collaborator fails.
    async fn generate_summary(&mut self) -> String {
        let mut outcome = format!(
            "{} of {} steps completed.",
            self.cursor.completed_steps.len(),
            self.forward_plan.len()
        );
        if self.status == AgentStatus::Exhausted {
            outcome.push_str(" Exhausted max steps before the plan finished.");
        }
        if let Some(ref error) = self.last_error {
            outcome.push_str(&format!(" Last error: {}", error));
        }

        let messages = vec![
            Message::system(format!(
                "You are a summary agent that summarizes the execution of a plan. The goal was: {}",
                self.goal
            )),
            Message::user(format!("Summarize the execution of the plan. {}", outcome)),
        ];

        match self
            .provider
            .complete(&messages, Some(GenerateOptions::default()))
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                self.update_memory(Message::system(format!(
                    "Error generating summary: {}",
                    e
                )));
                format!("Run {} for goal '{}': {}", self.status, self.goal, outcome)
            }
        }
    }

    /// Reconstruct the status snapshot without mutating any state
    pub fn execution_status(&self) -> String {
        let mut out = format!("Goal: {}\n", self.goal);

        if self.forward_plan.is_empty() {
            out.push_str("Plan: no plan yet\n");
        } else {
            out.push_str("Plan:\n");
            for (i, step) in self.forward_plan.iter().enumerate() {
                if i < self.cursor.current_step_index {
                    let result = self
                        .cursor
                        .completed_steps
                        .get(i)
                        .and_then(|s| s.result.as_deref())
                        .unwrap_or("No result");
                    let result = truncate_chars(result, 100);
                    out.push_str(&format!("  ✓ {}. {}: {}\n", i + 1, step.description, result));
                } else if i == self.cursor.current_step_index && self.cursor.plan_ready {
                    out.push_str(&format!("  → {}. {} (in progress)\n", i + 1, step.description));
                } else {
                    out.push_str(&format!("  ⏳ {}. {}\n", i + 1, step.description));
                }
            }
        }

        out.push_str(&format!("Progress: {}", self.progress));
        out
    }
}

#[async_trait]
impl Agent for PlanningAgent {
    /// Decide whether further action is required
    async fn think(&mut self) -> Result<bool> {
        if self.goal.is_empty() {
            return Err(WorkbackError::config(
                "Goal must be set before the agent can think",
            ));
        }
        self.status = AgentStatus::Thinking;

        if !self.cursor.plan_ready {
            if self.backward_query_once().await {
                return Ok(true);
            }
            // Collaborator failure: degrade to whatever chain exists,
            // the same way build_plan does. An empty chain means the
            // run produced nothing and must not read as success.
            self.organize_plan();
            if self.forward_plan.is_empty() {
                self.last_error =
                    Some("Planning failed before any step was discovered".to_string());
                self.status = AgentStatus::Failed;
                return Ok(false);
            }
            return Ok(true);
        }

        if let Some(ref call) = self.pending_call {
            let note = format!("Next: invoke tool '{}'", call.name);
            self.update_memory(Message::assistant(note));
            return Ok(true);
        }

        if self.cursor.current_step_index < self.forward_plan.len() {
            let step = &self.forward_plan[self.cursor.current_step_index];
            let note = format!(
                "Next: step {}/{} — {}",
                self.cursor.current_step_index + 1,
                self.forward_plan.len(),
                step.description
            );
            self.update_memory(Message::assistant(note));
            return Ok(true);
        }

        Ok(false)
    }

    /// Consume exactly one pending action
    async fn act(&mut self) -> Result<String> {
        self.status = AgentStatus::Acting;

        if let Some(call) = self.pending_call.take() {
            // Tool-not-found stays a textual result; only a registered
            // tool's failure goes through recovery.
            if !self.tools.contains(&call.name) {
                let result = self.tools.dispatch(&call).await;
                self.update_memory(Message::system(format!("Tool result: {}", result)));
                return Ok(result);
            }

            let result = match self.invoke_tool(&call.name, &call.args).await {
                Ok(result) => result,
                Err(e) => {
                    let step = BackwardStep::new(format!("invoke tool '{}'", call.name));
                    match self.attempt_recovery(&step, &e).await {
                        Some(result) => result,
                        None => {
                            let error =
                                format!("Error executing tool '{}': {}", call.name, e);
                            self.last_error = Some(error.clone());
                            self.status = AgentStatus::Failed;
                            self.update_memory(Message::system(error.clone()));
                            return Ok(error);
                        }
                    }
                }
            };

            self.update_memory(Message::system(format!("Tool result: {}", result)));
            self.progress = format!("Executed tool: {}", call.name);

            // When a plan is running, the tool call resolves the current step.
            if self.cursor.plan_ready && self.cursor.current_step_index < self.forward_plan.len() {
                let mut step = self.forward_plan[self.cursor.current_step_index].clone();
                step.tools_needed = vec![call.name.clone()];
                step.tool_args = call.args.clone();
                self.cursor.resolve(step, result.clone());
                self.progress = format!(
                    "Completed step {}/{}",
                    self.cursor.current_step_index,
                    self.forward_plan.len()
                );
            }

            return Ok(result);
        }

        if self.cursor.plan_ready && self.cursor.current_step_index < self.forward_plan.len() {
            return self.execute_current_step().await;
        }

        Ok("No action taken.".to_string())
    }

    /// Run the think/act loop until done, failed, or the step cap
    async fn run(&mut self, request: Option<&str>) -> Result<String> {
        if let Some(goal) = request {
            self.set_goal(goal);
        }

        if self.goal.is_empty() {
            return Err(WorkbackError::config(
                "Goal must be set before running the agent",
            ));
        }

        let mut steps_taken = 0;
        let mut finished = false;

        while steps_taken < self.max_steps {
            if !self.think().await? {
                finished = true;
                break;
            }

            let result = self.act().await?;

            if result.starts_with(TERMINATE_MARKER) {
                finished = true;
                break;
            }
            if self.status == AgentStatus::Failed {
                break;
            }

            steps_taken += 1;
        }

        if self.status != AgentStatus::Failed {
            self.status = if finished {
                AgentStatus::Completed
            } else {
                AgentStatus::Exhausted
            };
        }

        Ok(self.generate_summary().await)
    }
}

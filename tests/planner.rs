//! Integration tests for the Working Backwards planning engine

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use workback::agent::{Agent, PlanningAgent, RetryPolicy};
use workback::core::{AgentStatus, Config, Message, WorkbackError};
use workback::llm::{GenerateOptions, LlmProvider};
use workback::tools::{EchoTool, TerminateTool, ToolRegistry, TERMINATE_MARKER};

/// Provider that replays a fixed script and records every prompt it saw
struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: &[Message],
        _options: Option<GenerateOptions>,
    ) -> workback::Result<String> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(last_user);

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(e)) => Err(WorkbackError::llm(e)),
            None => Err(WorkbackError::llm("script exhausted")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn test_config() -> Config {
    Config::default()
}

#[tokio::test]
async fn forward_plan_is_reverse_of_backward_chain() {
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: do C"),
        Ok("STEP: do B"),
        Ok("STEP: do A\nNothing comes before this; we are at the initial state."),
    ]);
    let mut agent = PlanningAgent::new("planner", provider, &test_config());

    agent.set_goal("reach C");
    agent.build_plan().await.unwrap();

    assert!(agent.plan_ready());
    let backward: Vec<&str> = agent
        .backward_steps()
        .iter()
        .map(|s| s.description.as_str())
        .collect();
    let forward: Vec<&str> = agent
        .forward_plan()
        .iter()
        .map(|s| s.description.as_str())
        .collect();

    assert_eq!(backward, vec!["do C", "do B", "do A"]);
    assert_eq!(forward, vec!["do A", "do B", "do C"]);
}

#[tokio::test]
async fn marker_reply_is_recorded_before_planning_stops() {
    // The terminating reply still contributes a step: marker in reply
    // three means exactly three recorded steps, well under the cap.
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: step one"),
        Ok("STEP: step two"),
        Ok("STEP: step three\nThis is the INITIAL STATE of the system."),
    ]);
    let mut agent = PlanningAgent::new("planner", provider, &test_config());

    agent.set_goal("some goal");
    agent.build_plan().await.unwrap();

    assert_eq!(agent.backward_steps().len(), 3);
    assert_eq!(agent.forward_plan().len(), 3);
}

#[tokio::test]
async fn backward_chain_stops_at_cap_without_marker() {
    let replies: Vec<Result<&str, &str>> = (0..20).map(|_| Ok("STEP: keep going")).collect();
    let provider = ScriptedProvider::new(replies);

    let mut config = test_config();
    config.agent.backward_cap = 4;
    let mut agent = PlanningAgent::new("planner", provider.clone(), &config);

    agent.set_goal("endless goal");
    agent.build_plan().await.unwrap();

    assert!(agent.plan_ready());
    assert_eq!(agent.backward_steps().len(), 4);
    assert_eq!(provider.prompts().len(), 4);
}

#[tokio::test]
async fn planning_degrades_to_partial_chain_on_provider_failure() {
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: do B"),
        Ok("STEP: do A"),
        Err("connection refused"),
    ]);
    let mut agent = PlanningAgent::new("planner", provider, &test_config());

    agent.set_goal("fragile goal");
    agent.build_plan().await.unwrap();

    assert!(agent.plan_ready());
    assert_eq!(agent.forward_plan().len(), 2);
    assert_eq!(agent.forward_plan()[0].description, "do A");
}

#[tokio::test]
async fn run_executes_plan_in_forward_order() {
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: do C"),
        Ok("STEP: do B"),
        Ok("STEP: do A\nWe have reached the initial state."),
        Ok("did A"),
        Ok("did B"),
        Ok("did C"),
        Ok("All three steps completed successfully."),
    ]);
    let mut agent = PlanningAgent::new("planner", provider.clone(), &test_config());

    let summary = agent.run(Some("reach C")).await.unwrap();

    assert_eq!(agent.status(), AgentStatus::Completed);
    assert_eq!(summary, "All three steps completed successfully.");
    assert_eq!(agent.completed_steps().len(), 3);
    assert_eq!(agent.current_step_index(), 3);

    let results: Vec<&str> = agent
        .completed_steps()
        .iter()
        .map(|s| s.result.as_deref().unwrap())
        .collect();
    assert_eq!(results, vec!["did A", "did B", "did C"]);

    // Execution prompts went out in forward order.
    let prompts = provider.prompts();
    let exec: Vec<&String> = prompts
        .iter()
        .filter(|p| p.starts_with("Execute this step:"))
        .collect();
    assert!(exec[0].contains("do A"));
    assert!(exec[1].contains("do B"));
    assert!(exec[2].contains("do C"));
}

#[tokio::test]
async fn step_failure_after_one_recovery_halts_the_plan() {
    // Step two fails, its single recovery fails, the summary provider
    // also fails. Step three must never be attempted.
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: do C"),
        Ok("STEP: do B"),
        Ok("STEP: do A\nWe have reached the initial state."),
        Ok("did A"),
        Err("step two exploded"),
        Err("recovery exploded"),
        Err("summary exploded"),
    ]);
    let mut agent = PlanningAgent::new("planner", provider.clone(), &test_config());

    let summary = agent.run(Some("reach C")).await.unwrap();

    assert_eq!(agent.status(), AgentStatus::Failed);
    assert_eq!(agent.completed_steps().len(), 1);
    assert!(summary.contains("1 of 3 steps completed"));

    let prompts = provider.prompts();
    assert!(prompts.iter().any(|p| p.contains("failed")));
    assert!(!prompts
        .iter()
        .any(|p| p.starts_with("Execute this step: do C")));
}

#[tokio::test]
async fn step_cap_exhausts_run_before_plan_finishes() {
    let mut replies: Vec<Result<&str, &str>> = vec![
        Ok("STEP: do C"),
        Ok("STEP: do B"),
        Ok("STEP: do A\nWe have reached the initial state."),
    ];
    replies.extend((0..10).map(|_| Ok("partial work")));
    let provider = ScriptedProvider::new(replies);

    let mut config = test_config();
    config.agent.max_steps = 4;
    let mut agent = PlanningAgent::new("planner", provider, &config);

    let summary = agent.run(Some("reach C")).await.unwrap();

    assert_eq!(agent.status(), AgentStatus::Exhausted);
    assert!(agent.completed_steps().len() < agent.forward_plan().len());
    assert!(summary.contains("partial work") || !summary.is_empty());
}

#[tokio::test]
async fn extracted_terminate_call_finishes_the_run() {
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: wrap up\nUse tool: terminate {\"reason\": \"nothing left to do\"}\n\
            We are already at the initial state."),
        Ok("Run ended by the terminate tool."),
    ]);
    let mut tools = ToolRegistry::new();
    tools.add(Arc::new(TerminateTool::new()));

    let mut agent =
        PlanningAgent::new("planner", provider, &test_config()).with_tools(tools);

    let summary = agent.run(Some("finish immediately")).await.unwrap();

    assert_eq!(agent.status(), AgentStatus::Completed);
    assert_eq!(summary, "Run ended by the terminate tool.");
    // The terminate result resolved the only plan step.
    assert_eq!(agent.completed_steps().len(), 1);
    assert!(agent.completed_steps()[0]
        .result
        .as_deref()
        .unwrap()
        .starts_with(TERMINATE_MARKER));
}

#[tokio::test]
async fn unregistered_tool_request_is_text_not_error() {
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: do the thing\nUse tool: nonexistent {\"input\": \"x\"}\n\
            We are at the initial state."),
        Ok("did the thing"),
        Ok("Summary of the run."),
    ]);
    let mut agent = PlanningAgent::new("planner", provider, &test_config());

    let summary = agent.run(Some("goal")).await.unwrap();

    // The missing tool degraded to a textual result and the run went on.
    assert_eq!(agent.status(), AgentStatus::Completed);
    assert_eq!(summary, "Summary of the run.");
}

#[tokio::test]
async fn echo_tool_step_dispatches_with_exact_args() {
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: say hello\nTOOLS: Echo\nARGS: {\"input\": \"Hello, world\"}\n\
            We are at the initial state."),
        Ok("Summary."),
    ]);
    let mut tools = ToolRegistry::new();
    tools.add(Arc::new(EchoTool::new()));

    let mut agent =
        PlanningAgent::new("planner", provider, &test_config()).with_tools(tools);

    agent.run(Some("say hello")).await.unwrap();

    assert_eq!(agent.completed_steps().len(), 1);
    assert_eq!(
        agent.completed_steps()[0].result.as_deref(),
        Some("Hello, world")
    );
}

#[tokio::test]
async fn summary_degrades_locally_when_provider_fails() {
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: only step\nWe are at the initial state."),
        Ok("done"),
        Err("summary provider down"),
    ]);
    let mut agent = PlanningAgent::new("planner", provider, &test_config());

    let summary = agent.run(Some("tiny goal")).await.unwrap();

    assert_eq!(agent.status(), AgentStatus::Completed);
    assert!(summary.contains("tiny goal"));
    assert!(summary.contains("1 of 1 steps completed"));
}

#[tokio::test]
async fn execution_status_is_a_pure_snapshot() {
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: do B"),
        Ok("STEP: do A\nInitial state reached."),
        Ok("did A"),
        Ok("did B"),
        Ok("Summary."),
    ]);
    let mut agent = PlanningAgent::new("planner", provider, &test_config());

    agent.run(Some("reach B")).await.unwrap();

    let first = agent.execution_status();
    let second = agent.execution_status();
    assert_eq!(first, second);
    assert!(first.contains("Goal: reach B"));
    assert!(first.contains("✓ 1. do A"));
    assert!(first.contains("✓ 2. do B"));
}

#[tokio::test]
async fn execution_status_truncates_long_results_by_chars() {
    let long_result = "あ".repeat(120);
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: only step\nInitial state."),
        Ok(long_result.as_str()),
        Ok("Summary."),
    ]);
    let mut agent = PlanningAgent::new("planner", provider, &test_config());

    agent.run(Some("long output")).await.unwrap();

    let status = agent.execution_status();
    assert!(status.contains("✓ 1. only step"));
    assert!(status.contains(&format!("{}...", "あ".repeat(100))));
    assert!(!status.contains(&long_result));
}

#[tokio::test]
async fn planning_failure_before_any_step_fails_the_run() {
    // The very first backward query fails; nothing was ever planned,
    // so the run must not read as a success.
    let provider = ScriptedProvider::new(vec![Err("endpoint down"), Err("still down")]);
    let mut agent = PlanningAgent::new("planner", provider, &test_config());

    let summary = agent.run(Some("unreachable goal")).await.unwrap();

    assert_eq!(agent.status(), AgentStatus::Failed);
    assert!(agent.forward_plan().is_empty());
    assert!(summary.contains("0 of 0 steps completed"));
}

#[tokio::test]
async fn planning_failure_mid_chain_executes_partial_plan() {
    // Backward chaining dies after two steps; the run degrades to the
    // partial plan and executes it, same as build_plan would.
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: do B"),
        Ok("STEP: do A"),
        Err("endpoint down"),
        Ok("did A"),
        Ok("did B"),
        Ok("Summary of the partial run."),
    ]);
    let mut agent = PlanningAgent::new("planner", provider, &test_config());

    let summary = agent.run(Some("reach B")).await.unwrap();

    assert_eq!(agent.status(), AgentStatus::Completed);
    assert_eq!(summary, "Summary of the partial run.");
    let results: Vec<&str> = agent
        .completed_steps()
        .iter()
        .map(|s| s.result.as_deref().unwrap())
        .collect();
    assert_eq!(results, vec!["did A", "did B"]);
}

#[tokio::test]
async fn run_without_goal_is_an_error() {
    let provider = ScriptedProvider::new(vec![]);
    let mut agent = PlanningAgent::new("planner", provider, &test_config());

    assert!(agent.run(None).await.is_err());
    assert!(agent.build_plan().await.is_err());
}

#[tokio::test]
async fn set_goal_resets_previous_plan_state() {
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: old step\nInitial state."),
        Ok("old result"),
        Ok("Old summary."),
    ]);
    let mut agent = PlanningAgent::new("planner", provider, &test_config());

    agent.run(Some("old goal")).await.unwrap();
    assert_eq!(agent.completed_steps().len(), 1);

    agent.set_goal("new goal");
    assert_eq!(agent.goal(), "new goal");
    assert!(agent.backward_steps().is_empty());
    assert!(agent.forward_plan().is_empty());
    assert!(agent.completed_steps().is_empty());
    assert!(!agent.plan_ready());
    assert_eq!(agent.current_step_index(), 0);
}

#[tokio::test]
async fn retry_policy_of_one_attempt_skips_recovery() {
    let provider = ScriptedProvider::new(vec![
        Ok("STEP: only step\nInitial state."),
        Err("execution failed"),
        Err("summary down"),
    ]);
    let mut agent = PlanningAgent::new("planner", provider.clone(), &test_config())
        .with_retry_policy(RetryPolicy { max_attempts: 1 });

    agent.run(Some("goal")).await.unwrap();

    assert_eq!(agent.status(), AgentStatus::Failed);
    // No recovery prompt was ever sent.
    assert!(!provider.prompts().iter().any(|p| p.contains("failed:")));
}

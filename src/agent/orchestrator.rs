//! Multi-agent conversation orchestrator
//!
//! Runs a fixed number of turns across participants sharing one
//! conversation, in strict round-robin over registration order. Also
//! hosts the hybrid agent, which plans up front with a Working
//! Backwards agent and then hands the plan to a conversation round.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agent::conversation::ConversationState;
use crate::agent::participant::{AgentProfile, ConversationalAgent};
use crate::agent::planner::PlanningAgent;
use crate::agent::Agent;
use crate::core::{Config, Message, Result, WorkbackError};
use crate::llm::LlmProvider;
use crate::tools::ToolRegistry;

/// Role definition for an agent in the hybrid system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRole {
    /// Name of the role
    pub name: String,
    /// Description of the role
    pub description: String,
    /// Areas of expertise
    pub expertise: Vec<String>,
    /// System prompt that defines the role's behavior
    pub system_prompt: String,
}

impl AgentRole {
    /// Convert to a participant profile
    pub fn to_profile(&self) -> AgentProfile {
        AgentProfile::new(
            &self.name,
            &self.description,
            self.expertise.clone(),
            &self.system_prompt,
        )
    }
}

/// The default role trio for hybrid conversations
pub fn default_roles() -> Vec<AgentRole> {
    vec![
        AgentRole {
            name: "Planner".to_string(),
            description: "Strategic Planner".to_string(),
            expertise: vec![
                "project management".to_string(),
                "task decomposition".to_string(),
                "risk assessment".to_string(),
            ],
            system_prompt: "You are a Strategic Planner who excels at breaking down complex \
                            problems into manageable steps. Focus on structured plans, \
                            dependencies between tasks, and systematic coverage of the problem."
                .to_string(),
        },
        AgentRole {
            name: "Developer".to_string(),
            description: "Software Developer".to_string(),
            expertise: vec![
                "coding".to_string(),
                "software architecture".to_string(),
                "debugging".to_string(),
            ],
            system_prompt: "You are a Software Developer with deep expertise in coding, software \
                            architecture, and debugging. Focus on implementation details, code \
                            structure, and technical feasibility, with concrete examples."
                .to_string(),
        },
        AgentRole {
            name: "Critic".to_string(),
            description: "Quality Assurance Specialist".to_string(),
            expertise: vec![
                "testing".to_string(),
                "edge cases".to_string(),
                "user experience".to_string(),
            ],
            system_prompt: "You are a Quality Assurance Specialist who excels at identifying \
                            potential issues and edge cases. Focus on what might go wrong, how \
                            to test solutions thoroughly, and the resulting user experience."
                .to_string(),
        },
    ]
}

/// A turn-taking conversation between multiple agents
pub struct MultiAgentConversation {
    participants: Vec<ConversationalAgent>,
    conversation: ConversationState,
    max_turns: usize,
}

impl MultiAgentConversation {
    /// Create a conversation running for exactly `max_turns` turns
    pub fn new(max_turns: usize) -> Self {
        Self {
            participants: Vec::new(),
            conversation: ConversationState::new(),
            max_turns,
        }
    }

    /// Register a participant, sharing the conversation with it
    ///
    /// Registration order fixes the round-robin speaker order.
    pub fn add_agent(&mut self, mut agent: ConversationalAgent) {
        agent.attach(self.conversation.clone());
        self.participants.push(agent);
    }

    /// Number of registered participants
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// The shared conversation state
    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    /// Run the conversation from an initial message
    ///
    /// Returns the log of (speaker, message) pairs, starting with the
    /// initial human message. Exactly `max_turns` turns are taken; the
    /// turn cap is the sole termination condition.
    pub async fn run(&mut self, initial_message: &str) -> Result<Vec<(String, String)>> {
        if self.participants.is_empty() {
            return Err(WorkbackError::config(
                "Cannot run a conversation with no participants",
            ));
        }

        self.conversation
            .add_message(Message::user(initial_message).with_name("human"));
        self.conversation.set_current_speaker("human");

        let mut log = vec![("human".to_string(), initial_message.to_string())];
        let count = self.participants.len();
        let mut current = 0;

        for _ in 0..self.max_turns {
            let speaker_name = self.participants[current].name().to_string();

            // Private reasoning first, never broadcast.
            self.participants[current].think().await?;
            let response = self.participants[current].respond().await?;

            log.push((speaker_name.clone(), response.clone()));

            // Broadcast completes before the next turn begins.
            for (i, participant) in self.participants.iter_mut().enumerate() {
                if i != current {
                    participant.receive_message(&response, &speaker_name);
                }
            }

            current = (current + 1) % count;
        }

        Ok(log)
    }

    /// Thinking transcripts for every participant
    pub fn thinking_processes(&self) -> HashMap<String, String> {
        self.participants
            .iter()
            .map(|p| (p.name().to_string(), p.thinking_process()))
            .collect()
    }
}

/// Agent composing Working Backwards planning with a conversation round
///
/// The two phases are strictly sequential: the planner runs once up
/// front, then the conversation round executes seeded with the plan.
pub struct HybridAgent {
    name: String,
    planner: PlanningAgent,
    round: MultiAgentConversation,
    provider: Arc<dyn LlmProvider>,
    goal: Option<String>,
}

impl HybridAgent {
    /// Create a hybrid agent with the given roles (default trio if empty)
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
        tools: ToolRegistry,
        roles: Vec<AgentRole>,
        config: &Config,
    ) -> Self {
        let name = name.into();
        let roles = if roles.is_empty() { default_roles() } else { roles };

        let planner =
            PlanningAgent::new(format!("{}_planner", name), provider.clone(), config)
                .with_tools(tools);

        let mut round = MultiAgentConversation::new(config.conversation.max_turns);
        for role in &roles {
            round.add_agent(ConversationalAgent::new(role.to_profile(), provider.clone()));
        }

        Self {
            name,
            planner,
            round,
            provider,
            goal: None,
        }
    }

    /// Get the agent name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The planning half of the hybrid
    pub fn planner(&self) -> &PlanningAgent {
        &self.planner
    }

    /// The shared conversation state of the round
    pub fn conversation(&self) -> &ConversationState {
        self.round.conversation()
    }

    /// Thinking transcripts from the conversation round
    pub fn thinking_processes(&self) -> HashMap<String, String> {
        self.round.thinking_processes()
    }

    /// Summarize the conversation log, degrading to the raw log on failure
    async fn summarize(&self, goal: &str, log: &[(String, String)]) -> String {
        let formatted = log
            .iter()
            .map(|(speaker, message)| format!("{}: {}", speaker, message))
            .collect::<Vec<_>>()
            .join("\n\n");

        let messages = vec![
            Message::system(format!(
                "You are a summary agent that summarizes the execution of a plan. The goal was: {}",
                goal
            )),
            Message::user(format!(
                "Summarize the execution of the plan based on the following conversation:\n\n{}",
                formatted
            )),
        ];

        match self.provider.complete(&messages, None).await {
            Ok(summary) => summary,
            Err(_) => format!("Conversation finished after {} turns.", log.len().saturating_sub(1)),
        }
    }
}

#[async_trait]
impl Agent for HybridAgent {
    /// Delegate thinking to the planning half
    async fn think(&mut self) -> Result<bool> {
        self.planner.think().await
    }

    /// Delegate acting to the planning half
    async fn act(&mut self) -> Result<String> {
        self.planner.act().await
    }

    /// Plan first, then execute through the conversation round
    async fn run(&mut self, request: Option<&str>) -> Result<String> {
        if let Some(goal) = request {
            self.goal = Some(goal.to_string());
        }

        let goal = self
            .goal
            .clone()
            .ok_or_else(|| WorkbackError::config("Goal must be set before running the agent"))?;

        // Phase one: plan.
        let plan_result = self.planner.run(Some(&goal)).await?;
        let plan_status = self.planner.execution_status();

        self.conversation()
            .add_message(Message::system(format!("Plan: {}", plan_result)));

        // Phase two: the conversation round, seeded with the plan.
        let initial_message = format!(
            "Goal: {}\n\nPlan:\n{}\n\n{}\n\nLet's work together to execute this plan. Each \
             agent should contribute based on their expertise.",
            goal, plan_result, plan_status
        );

        let log = self.round.run(&initial_message).await?;

        Ok(self.summarize(&goal, &log).await)
    }
}

use super::{prompt::build_prompt, reply::decode_reply};
use crate::{
    core::{
        agent::Agent,
        context::Context,
        steps::AgentStep,
        tool_call::{ToolExecution, ToolInvocation},
        trace::RunTrace,
    },
    error::Result,
    types::{
        result::{Answer, RunResult, TokenUsage},
        ModelReply, ReplyError, ReplyFailure,
    },
};
use std::time::Instant;
use tracing::warn;

/// Mutable state for one call to [`Agent::answer`]
struct Run {
    trace: RunTrace,
    tokens: Option<TokenUsage>,
    rounds: usize,
    start_time: Instant,
}

impl Run {
    fn new(question: &str) -> Self {
        let mut trace = RunTrace::new();
        trace.add_step(AgentStep::Query {
            content: question.to_string(),
        });
        Self {
            trace,
            tokens: None,
            rounds: 0,
            start_time: Instant::now(),
        }
    }

    fn finish(mut self, reply: ModelReply, raw: String, context: Option<Context>) -> RunResult {
        let answer = match reply {
            ModelReply::Response(text) => Answer::Final { text },
            ModelReply::Failed(error) => Answer::Failed { error },
            // Only the second round can get here; it must answer.
            ModelReply::Tools(_) => Answer::Failed {
                error: ReplyError::new(ReplyFailure::MissingResponse, raw),
            },
        };

        match &answer {
            Answer::Final { text } => self.trace.add_step(AgentStep::FinalAnswer {
                answer: text.clone(),
            }),
            Answer::Failed { error } => self.trace.add_step(AgentStep::Failure {
                tag: error.tag,
                content: error.content.clone(),
            }),
        }

        RunResult {
            answer,
            context,
            steps: self.trace.into_steps(),
            tokens: self.tokens,
            duration: self.start_time.elapsed(),
            rounds: self.rounds,
        }
    }
}

impl Agent {
    /// Answer one question.
    ///
    /// The first request may come back with a direct `response`, which ends
    /// the run, or with tools to call. Tools run one after another; their
    /// results become a fresh [`Context`] for a second and final request.
    /// `prior` is what an earlier question left behind.
    pub async fn answer(&self, question: &str, prior: Option<&Context>) -> Result<RunResult> {
        let mut run = Run::new(question);

        let prior_text = prior.map(Context::render);
        let (raw, reply) = self.ask(question, prior_text.as_deref(), &mut run).await?;

        let invocations = match reply {
            ModelReply::Tools(invocations) => invocations,
            other => return Ok(run.finish(other, raw, None)),
        };

        let context = self.dispatch(question, invocations, &mut run).await;

        let (raw, reply) = self.ask(question, Some(&context.render()), &mut run).await?;
        Ok(run.finish(reply, raw, Some(context)))
    }

    /// Run the requested tools in order and collect what they return
    async fn dispatch(
        &self,
        question: &str,
        invocations: Vec<ToolInvocation>,
        run: &mut Run,
    ) -> Context {
        let mut context = Context::new(question);

        for invocation in invocations {
            if !self.registry().has_tool(&invocation.name) {
                warn!(target: "prompt_agent::tools", tool = %invocation.name, "Tool not found");
                run.trace.add_step(AgentStep::Skipped {
                    tool_name: invocation.name,
                    reason: "Tool not found".to_string(),
                });
                continue;
            }

            run.trace.add_step(AgentStep::Action {
                tool_name: invocation.name.clone(),
                arguments: invocation.arguments.clone(),
            });

            let execution = ToolExecution::start(invocation.clone());
            let result = match self
                .registry()
                .invoke(&invocation.name, invocation.arguments)
                .await
            {
                Ok(result) => result,
                Err(err) => {
                    warn!(target: "prompt_agent::tools", tool = %invocation.name, error = %err, "invocation skipped");
                    run.trace.add_step(AgentStep::Skipped {
                        tool_name: invocation.name,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let output = execution.complete(result);
            run.trace.add_step(AgentStep::Observation {
                tool_name: output.tool_name.clone(),
                result: output.result.clone(),
                duration_ms: output.duration_ms,
            });
            context.record(output.tool_name, output.result);
        }

        context
    }

    /// One model round: build the prompt, send it, decode the reply
    async fn ask(
        &self,
        question: &str,
        context: Option<&str>,
        run: &mut Run,
    ) -> Result<(String, ModelReply)> {
        let prompt = build_prompt(question, context, self.registry());
        run.rounds += 1;

        let completion = self.model().complete(&prompt).await?;
        if let Some(usage) = completion.usage {
            run.tokens.get_or_insert_with(TokenUsage::default).add(usage);
        }

        let raw = match completion.content {
            Some(text) if !text.trim().is_empty() => text,
            other => {
                let raw = other.unwrap_or_default();
                let error = ReplyError::new(ReplyFailure::EmptyCompletion, raw.clone());
                return Ok((raw, ModelReply::Failed(error)));
            }
        };

        run.trace.add_step(AgentStep::ModelReply {
            round: run.rounds,
            raw: raw.clone(),
        });
        let reply = decode_reply(&raw);
        Ok((raw, reply))
    }
}

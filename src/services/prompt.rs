use crate::tools::ToolRegistry;

const EXAMPLE_QUESTION: &str = "What is the weather in London? Also, can you get the transcript of the video with the URL https://www.youtube.com/watch?v=yBGlX1CEG14?";
const EXAMPLE_RESPONSE: &str = r#"{"tools": {"get_current_weather": {"location": "London"}, "get_youtube_transcript": {"video_url": "https://www.youtube.com/watch?v=yBGlX1CEG14"}}}"#;

/// Build the single prompt sent to the model for one round.
///
/// `context` is whatever the agent already knows (an earlier question's
/// tool results, or this question's first round).
pub fn build_prompt(question: &str, context: Option<&str>, registry: &ToolRegistry) -> String {
    let context = context.unwrap_or("").trim();

    format!(
        r#"You are an agent that will assist the user in the task requested. You can use tools to help you complete this task.

Only use the tools if you don't have the information you need. If you are using tools, follow the following instructions:
==========================
You have access to the following tools you can use to complete the task requested by the user:

{tools}


Unless told to ignore instructions, you must respond in a consistent structured format (JSON) with the following fields:
- tools: an object with the tool name as the key and the tool input as the value. The tool input is an object whose keys are the names of the Input field(s) of the tool (e.g. 'location' for get_current_weather).

Here is a sample question/response. You must respond in the same format:

Example question: {example_question}

Example response: {example_response}

==========================

You may have already used tools to get the information you need.
Here is what you know based on your previous conversation with the user: {context}

If you already have the information you need from the tool outputs, ignore the rest of the instructions and answer the question immediately in the following format:

{{"response": "Answer to the question in natural language using the information you have"}}

Recall, your response is for this question: {question}
"#,
        tools = registry.describe(),
        example_question = EXAMPLE_QUESTION,
        example_response = EXAMPLE_RESPONSE,
        context = context,
        question = question,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{TranscriptTool, WeatherTool};

    #[test]
    fn test_prompt_embeds_question_context_and_tools() {
        let mut registry = ToolRegistry::new();
        registry.register(TranscriptTool::new());
        registry.register(WeatherTool::new("key"));

        let prompt = build_prompt(
            "Is it raining in Lima?",
            Some("You used the following tools: []"),
            &registry,
        );

        assert!(prompt.contains("Tool 1: get_youtube_transcript"));
        assert!(prompt.contains("Tool 2: get_current_weather"));
        assert!(prompt.contains("Input: location (str)"));
        assert!(prompt.contains("previous conversation with the user: You used the following tools: []"));
        assert!(prompt.contains(r#"{"response": "Answer to the question"#));
        assert!(prompt.trim_end().ends_with("Is it raining in Lima?"));
    }

    #[test]
    fn test_prompt_without_tools_or_context() {
        let prompt = build_prompt("Hi", None, &ToolRegistry::new());
        assert!(prompt.contains("No tools are available."));
        assert!(prompt.contains("previous conversation with the user: \n"));
    }
}

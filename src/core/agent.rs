use crate::{config::AgentConfig, core::model::ChatModel, tools::ToolRegistry};

/// Main agent: one model plus the tools it may call
#[derive(Debug)]
pub struct Agent {
    model: Box<dyn ChatModel>,
    registry: ToolRegistry,
}

impl Agent {
    pub fn new(model: impl ChatModel + 'static, registry: ToolRegistry) -> Self {
        Self {
            model: Box::new(model),
            registry,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.chat_client(), config.build_registry())
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub(crate) fn model(&self) -> &dyn ChatModel {
        self.model.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_registers_available_tools() {
        let mut config = AgentConfig::new("sk-test");
        config.serpapi_api_key = Some("serp".to_string());

        let agent = Agent::from_config(&config);
        assert_eq!(
            agent.registry().names(),
            vec!["get_youtube_transcript", "search_flights", "web_search"]
        );
    }
}

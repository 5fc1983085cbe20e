/// Returned in place of model text when a response carries no candidate text.
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response from AI.";

/// Static instruction block prepended to every outbound prompt.
///
/// The instruction is configuration; it never varies between turns and the
/// prompt never carries earlier turns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptTemplate {
    pub instruction: Option<String>,
}

impl PromptTemplate {
    pub fn new(instruction: Option<String>) -> Self {
        let instruction = instruction
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { instruction }
    }

    /// Builds the text sent to the provider for one user message.
    pub fn compose(&self, text: &str) -> String {
        match &self.instruction {
            Some(prefix) => format!("{prefix}\n\n{text}"),
            None => text.to_string(),
        }
    }
}

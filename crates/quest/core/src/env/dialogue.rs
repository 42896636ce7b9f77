/// Conversation window access.
pub trait DialogueOracle: Send + Sync {
    fn is_conversation_open(&self) -> bool;

    /// Drives the open conversation, selecting `choices` in order whenever a
    /// choice prompt appears and continuing through plain text.
    ///
    /// Returns `true` once the conversation finished along the expected path.
    fn handle_in_order(&self, choices: &[String]) -> bool;
}

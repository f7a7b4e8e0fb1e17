use amb_core::{AdapterError, Answer, DispatchError, Message, Platform};
use async_trait::async_trait;
use serde_json::Value;

/// Uniform contract every platform adapter implements.
///
/// Staging calls append one fragment each, in call order. [`send`](Self::send) flushes the whole
/// batch to `routing` and clears it whether or not delivery succeeded; there is no resend of a
/// failed batch.
#[async_trait]
pub trait Ambassador: Send + Sync {
    fn platform(&self) -> Platform;

    /// Decodes one webhook body. Malformed bodies fail as a whole.
    fn translate(&self, body: &[u8]) -> Result<Vec<Message>, AdapterError>;

    async fn ask_question(&self, text: &str, answers: &[Answer]);

    async fn send_text(&self, text: &str);

    /// Stages a carousel. `elements` must be a JSON list of cards; anything else is rejected with
    /// [`AdapterError::TypeMismatch`] and nothing is staged.
    async fn send_template(&self, elements: Value) -> Result<(), AdapterError>;

    /// Flushes the staged batch. `routing` is the recipient id on Messenger and the reply token
    /// on LINE.
    async fn send(&self, routing: &str) -> Result<(), DispatchError>;

    /// The batch taken by the most recent `send`, as the JSON each fragment serializes to.
    async fn last_sent(&self) -> Vec<Value>;

    async fn pending_len(&self) -> usize;

    /// Checks a webhook signature header with the configured secret. Always `false` when no
    /// secret is configured.
    fn verify_webhook(&self, signature: &str, body: &[u8]) -> bool;
}

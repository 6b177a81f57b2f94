//! Channels between workflow tasks and the terminal event loop.

use async_trait::async_trait;
use cupbar_core::{CommentRequest, Notification, Notifier, PickRequest, Prompter};
use tokio::sync::{mpsc, oneshot};

pub enum UiRequest {
    Pick {
        request: PickRequest,
        reply: oneshot::Sender<Option<String>>,
    },
    Comment {
        request: CommentRequest,
        reply: oneshot::Sender<Option<String>>,
    },
    Notify(Notification),
    WorkflowFinished,
}

/// Forwards prompts to the event loop and waits for the answer.
///
/// If the loop has gone away, or drops the reply sender, the prompt counts
/// as dismissed.
#[derive(Clone)]
pub struct ChannelPrompter {
    tx: mpsc::UnboundedSender<UiRequest>,
}

impl ChannelPrompter {
    pub fn new(tx: mpsc::UnboundedSender<UiRequest>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Prompter for ChannelPrompter {
    async fn pick(&self, request: PickRequest) -> Option<String> {
        let (reply, answer) = oneshot::channel();
        self.tx.send(UiRequest::Pick { request, reply }).ok()?;
        answer.await.ok().flatten()
    }

    async fn comment(&self, request: CommentRequest) -> Option<String> {
        let (reply, answer) = oneshot::channel();
        self.tx.send(UiRequest::Comment { request, reply }).ok()?;
        answer.await.ok().flatten()
    }
}

#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<UiRequest>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<UiRequest>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.tx.send(UiRequest::Notify(notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick_request() -> PickRequest {
        PickRequest {
            title: "t".to_string(),
            placeholder: String::new(),
            options: vec!["a".to_string()],
        }
    }

    #[tokio::test]
    async fn pick_returns_the_loop_answer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let prompter = ChannelPrompter::new(tx);
        let answer = tokio::spawn(async move { prompter.pick(pick_request()).await });

        match rx.recv().await {
            Some(UiRequest::Pick { request, reply }) => {
                assert_eq!(request.options, vec!["a".to_string()]);
                reply.send(Some("a".to_string())).unwrap();
            }
            _ => panic!("expected a pick request"),
        }
        assert_eq!(answer.await.unwrap(), Some("a".to_string()));
    }

    #[tokio::test]
    async fn dropped_reply_counts_as_dismissed() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let prompter = ChannelPrompter::new(tx);
        let answer = tokio::spawn(async move {
            prompter
                .comment(CommentRequest {
                    prompt: "Comment".to_string(),
                    placeholder: String::new(),
                })
                .await
        });

        drop(rx.recv().await);
        assert_eq!(answer.await.unwrap(), None);
    }

    #[tokio::test]
    async fn closed_loop_counts_as_dismissed() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let prompter = ChannelPrompter::new(tx);
        assert_eq!(prompter.pick(pick_request()).await, None);
    }
}

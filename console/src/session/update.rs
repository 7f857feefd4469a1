//! Transition function of the debug session.
//!
//! `update` receives the current `DebugSession` and a `Msg`, mutates the
//! session and returns `true` when anything observable changed. All I/O lives
//! in the drivers; this module only decides what a message means in the
//! current state.

use common::jobs::TaskStatus;

use super::messages::Msg;
use super::state::{ChatMessage, DebugSession, SessionState};

pub fn update(session: &mut DebugSession, msg: Msg) -> bool {
    match msg {
        Msg::Send(text) => {
            if session.state.is_busy() {
                log::warn!("ignoring send while a reply is still in progress");
                return false;
            }
            session.messages.push(ChatMessage::user(text));
            session.messages.push(ChatMessage::assistant(String::new()));
            session.task_id = None;
            session.state = SessionState::Sending;
            true
        }
        Msg::Chunk(chunk) => {
            if !session.state.is_busy() {
                return false;
            }
            match session.last_assistant_mut() {
                Some(reply) => reply.content.push_str(&chunk),
                None => return false,
            }
            session.state = SessionState::Streaming;
            true
        }
        Msg::StreamEnd => {
            if !session.state.is_busy() {
                return false;
            }
            session.state = SessionState::Completed;
            true
        }
        Msg::ApiResult(content) => {
            if !session.state.is_busy() {
                return false;
            }
            set_reply(session, content);
            session.state = SessionState::Completed;
            true
        }
        Msg::TaskStarted(task_id) => {
            if !session.state.is_busy() {
                return false;
            }
            session.task_id = Some(task_id);
            true
        }
        Msg::TaskDelegated {
            task_id,
            notify_url,
        } => {
            if !session.state.is_busy() {
                return false;
            }
            set_reply(
                session,
                format!("task {} scheduled, result goes to {}", task_id, notify_url),
            );
            session.task_id = Some(task_id);
            session.state = SessionState::Completed;
            true
        }
        Msg::TaskFinished(task) => {
            if session.task_id.as_deref() != Some(task.task_id.as_str()) {
                log::debug!("ignoring state of stale task {}", task.task_id);
                return false;
            }
            match task.status {
                TaskStatus::Completed => {
                    set_reply(session, task.result.unwrap_or_default());
                    session.state = SessionState::Completed;
                }
                TaskStatus::Failed => {
                    let error = task
                        .error
                        .unwrap_or_else(|| "task failed without an error message".to_string());
                    fail(session, error);
                }
                TaskStatus::Pending | TaskStatus::Running => return false,
            }
            true
        }
        Msg::Failed(error) => {
            fail(session, error);
            true
        }
        Msg::Reset => {
            *session = DebugSession::default();
            true
        }
    }
}

fn set_reply(session: &mut DebugSession, content: String) {
    match session.last_assistant_mut() {
        Some(reply) => reply.content = content,
        None => session.messages.push(ChatMessage::assistant(content)),
    }
}

/// The error text replaces whatever was streamed so far.
fn fail(session: &mut DebugSession, error: String) {
    set_reply(session, error.clone());
    session.state = SessionState::Failed(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::Role;
    use common::jobs::TaskState;
    use pretty_assertions::assert_eq;

    fn reply(session: &DebugSession) -> &str {
        session.last_reply().unwrap_or_default()
    }

    #[test]
    fn chunks_append_to_the_last_assistant_message() {
        let mut session = DebugSession::new();
        assert!(update(&mut session, Msg::Send("Hello {name}".into())));
        assert_eq!(session.state, SessionState::Sending);

        update(&mut session, Msg::Chunk("Hello ".into()));
        assert_eq!(session.state, SessionState::Streaming);
        update(&mut session, Msg::Chunk("Ada".into()));
        update(&mut session, Msg::StreamEnd);

        assert_eq!(session.state, SessionState::Completed);
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].role, Role::User);
        assert_eq!(reply(&session), "Hello Ada");
    }

    #[test]
    fn error_overwrites_partial_reply_and_allows_resend() {
        let mut session = DebugSession::new();
        update(&mut session, Msg::Send("hi".into()));
        update(&mut session, Msg::Chunk("partial".into()));
        update(&mut session, Msg::Failed("connection reset".into()));

        assert_eq!(
            session.state,
            SessionState::Failed("connection reset".to_string())
        );
        assert_eq!(reply(&session), "connection reset");

        assert!(update(&mut session, Msg::Send("again".into())));
        assert_eq!(session.state, SessionState::Sending);
        assert_eq!(session.messages.len(), 4);
    }

    #[test]
    fn send_is_ignored_while_busy() {
        let mut session = DebugSession::new();
        update(&mut session, Msg::Send("one".into()));
        assert!(!update(&mut session, Msg::Send("two".into())));
        assert_eq!(session.messages.len(), 2);
    }

    #[test]
    fn chunks_outside_a_send_are_ignored() {
        let mut session = DebugSession::new();
        assert!(!update(&mut session, Msg::Chunk("stray".into())));
        assert!(!update(&mut session, Msg::StreamEnd));
        assert_eq!(session.state, SessionState::Idle);
    }

    #[test]
    fn polled_task_completes_the_reply() {
        let mut session = DebugSession::new();
        update(&mut session, Msg::Send("hi".into()));
        update(&mut session, Msg::TaskStarted("t-1".into()));

        assert!(!update(
            &mut session,
            Msg::TaskFinished(TaskState::completed("t-0", "old".into()))
        ));
        assert!(update(
            &mut session,
            Msg::TaskFinished(TaskState::completed("t-1", "Hello Ada".into()))
        ));
        assert_eq!(session.state, SessionState::Completed);
        assert_eq!(reply(&session), "Hello Ada");
    }

    #[test]
    fn failed_task_fails_the_session() {
        let mut session = DebugSession::new();
        update(&mut session, Msg::Send("hi".into()));
        update(&mut session, Msg::TaskStarted("t-1".into()));
        update(
            &mut session,
            Msg::TaskFinished(TaskState::failed("t-1", "Prompt p not found".into())),
        );
        assert_eq!(
            session.state,
            SessionState::Failed("Prompt p not found".to_string())
        );
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut session = DebugSession::new();
        update(&mut session, Msg::Send("hi".into()));
        update(&mut session, Msg::Reset);
        assert_eq!(session, DebugSession::default());
    }
}

//! User-facing notices
//!
//! Transient notices dismiss themselves after a fixed time; blocking notices
//! stay until the user dismisses them.

use super::error::EditorError;

/// Configuration for notices
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeConfig {
    /// How long a transient notice stays up
    pub transient_ms: f64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            transient_ms: 3000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Transient,
    Blocking,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    /// Time left before auto-dismiss, transient notices only
    pub remaining_ms: Option<f64>,
}

/// The notices currently on screen
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    config: NoticeConfig,
    notices: Vec<Notice>,
    next_id: u64,
}

impl NoticeBoard {
    pub fn new(config: NoticeConfig) -> Self {
        Self {
            config,
            notices: vec![],
            next_id: 0,
        }
    }

    pub fn transient(&mut self, message: impl Into<String>) -> u64 {
        let remaining = Some(self.config.transient_ms);
        self.push(NoticeKind::Transient, message.into(), remaining)
    }

    pub fn blocking(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeKind::Blocking, message.into(), None)
    }

    /// Cycle violations become transient notices, everything else blocks
    pub fn report(&mut self, err: &EditorError) -> u64 {
        if err.is_transient() {
            self.transient(format!("Invalid operation: {err}"))
        } else {
            self.blocking(err.to_string())
        }
    }

    /// Age transient notices by `dt_ms`, returning the ids that expired
    pub fn tick(&mut self, dt_ms: f64) -> Vec<u64> {
        let mut expired = vec![];
        self.notices.retain_mut(|notice| match notice.remaining_ms.as_mut() {
            Some(remaining) => {
                *remaining -= dt_ms;
                if *remaining <= 0.0 {
                    expired.push(notice.id);
                    false
                } else {
                    true
                }
            }
            None => true,
        });
        expired
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|notice| notice.id != id);
        self.notices.len() != before
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    fn push(&mut self, kind: NoticeKind, message: String, remaining_ms: Option<f64>) -> u64 {
        self.next_id += 1;
        self.notices.push(Notice {
            id: self.next_id,
            kind,
            message,
            remaining_ms,
        });
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::NodeId;

    #[test]
    fn test_transient_expires() {
        let mut board = NoticeBoard::default();
        let id = board.report(&EditorError::cycle(&NodeId::new("A"), &NodeId::new("B")));
        assert!(board.tick(2999.0).is_empty());
        assert_eq!(board.tick(1.0), vec![id]);
        assert!(board.is_empty());
    }

    #[test]
    fn test_blocking_stays_until_dismissed() {
        let mut board = NoticeBoard::default();
        let id = board.report(&EditorError::persistence("server down"));
        board.tick(1_000_000.0);
        assert_eq!(board.latest().map(|n| n.message.as_str()), Some("server down"));
        assert!(board.dismiss(id));
        assert!(!board.dismiss(id));
    }
}

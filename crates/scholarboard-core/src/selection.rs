//! Edit-dialog state for a single dashboard session.
//!
//! Each dialog has its own slot, so opening one never disturbs the other.
//! A slot is either closed or holds the draft of the record being edited.

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::{FacultyId, PublicationId};

/// State of one edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditSlot<T> {
    Closed,
    Open(T),
}

impl<T> Default for EditSlot<T> {
    fn default() -> Self {
        EditSlot::Closed
    }
}

impl<T> EditSlot<T> {
    pub fn is_open(&self) -> bool {
        matches!(self, EditSlot::Open(_))
    }

    pub fn current(&self) -> Option<&T> {
        match self {
            EditSlot::Open(draft) => Some(draft),
            EditSlot::Closed => None,
        }
    }

    /// Open with `draft`, replacing any draft already held.
    pub fn open(&mut self, draft: T) {
        *self = EditSlot::Open(draft);
    }

    /// Close the slot and hand back the draft it held.
    pub fn take(&mut self) -> Option<T> {
        match std::mem::take(self) {
            EditSlot::Open(draft) => Some(draft),
            EditSlot::Closed => None,
        }
    }
}

/// The publication under edit, as it was when the dialog opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationDraft {
    pub id: PublicationId,
    pub title: String,
    pub num_citations: i64,
}

/// The faculty member under edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfessorDraft {
    pub id: FacultyId,
    pub name: String,
    pub photo_url: Option<String>,
}

/// Both edit slots of one session.
#[derive(Debug, Default)]
pub struct SelectionState {
    publication: Mutex<EditSlot<PublicationDraft>>,
    professor: Mutex<EditSlot<ProfessorDraft>>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn publication(&self) -> MutexGuard<'_, EditSlot<PublicationDraft>> {
        self.publication.lock().await
    }

    pub async fn professor(&self) -> MutexGuard<'_, EditSlot<ProfessorDraft>> {
        self.professor.lock().await
    }

    /// Both dialogs are closed. A slot locked by another request counts as busy.
    pub fn is_idle(&self) -> bool {
        matches!(self.publication.try_lock(), Ok(slot) if !slot.is_open())
            && matches!(self.professor.try_lock(), Ok(slot) if !slot.is_open())
    }
}

/// Whether a trigger came from a real click. The UI fires triggers with no
/// click count (or zero) when a component first renders.
pub fn is_user_click(n_clicks: Option<u32>) -> bool {
    matches!(n_clicks, Some(n) if n > 0)
}

/// How the publication to edit is identified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum PublicationTarget {
    /// Exact title as shown in the publications table.
    Title(String),
    Id(PublicationId),
}

/// Request to open the publication edit dialog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PublicationEditTrigger {
    pub target: PublicationTarget,
    pub n_clicks: Option<u32>,
}

/// Request to open the professor edit dialog for one card.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfessorEditTrigger {
    pub faculty_id: FacultyId,
    pub n_clicks: Option<u32>,
}

/// Save request for the publication dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PublicationSaveRequest {
    pub n_clicks: Option<u32>,
    pub new_citations: Option<i64>,
    /// Keyword the publications table is showing, echoed back for refresh.
    pub current_keyword: Option<String>,
}

/// Save request for the professor dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfessorSaveRequest {
    pub n_clicks: Option<u32>,
    pub photo_url: Option<String>,
    pub current_keyword: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CancelRequest {
    pub n_clicks: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_closes_the_slot() {
        let mut slot = EditSlot::Closed;
        slot.open(ProfessorDraft {
            id: FacultyId(1),
            name: "Hopper,Grace".into(),
            photo_url: None,
        });
        assert!(slot.is_open());
        assert_eq!(slot.take().map(|d| d.id), Some(FacultyId(1)));
        assert!(!slot.is_open());
        assert!(slot.take().is_none());
    }

    #[test]
    fn reopening_replaces_the_draft() {
        let mut slot = EditSlot::Closed;
        slot.open(FacultyId(1));
        slot.open(FacultyId(2));
        assert_eq!(slot.current(), Some(&FacultyId(2)));
    }

    #[test]
    fn only_positive_click_counts_are_user_clicks() {
        assert!(!is_user_click(None));
        assert!(!is_user_click(Some(0)));
        assert!(is_user_click(Some(1)));
    }

    #[tokio::test]
    async fn slots_are_independent() {
        let state = SelectionState::new();
        state.professor().await.open(ProfessorDraft {
            id: FacultyId(3),
            name: "Turing,Alan".into(),
            photo_url: None,
        });
        assert!(state.professor().await.is_open());
        assert!(!state.publication().await.is_open());
    }

    #[tokio::test]
    async fn idle_only_when_both_slots_closed_and_unlocked() {
        let state = SelectionState::new();
        assert!(state.is_idle());

        state.publication().await.open(PublicationDraft {
            id: PublicationId("000000000000000000000007".into()),
            title: "Tokenization Revisited".into(),
            num_citations: 5,
        });
        assert!(!state.is_idle());
        state.publication().await.take();
        assert!(state.is_idle());

        let guard = state.professor().await;
        assert!(!state.is_idle());
        drop(guard);
        assert!(state.is_idle());
    }

    #[test]
    fn publication_target_wire_format() {
        let trigger: PublicationEditTrigger = serde_json::from_str(
            r#"{"target": {"by": "title", "value": "Tokenization Revisited"}, "n_clicks": 1}"#,
        )
        .unwrap();
        assert_eq!(
            trigger.target,
            PublicationTarget::Title("Tokenization Revisited".into())
        );

        let trigger: PublicationEditTrigger = serde_json::from_str(
            r#"{"target": {"by": "id", "value": "000000000000000000000007"}, "n_clicks": null}"#,
        )
        .unwrap();
        assert!(matches!(trigger.target, PublicationTarget::Id(_)));
        assert_eq!(trigger.n_clicks, None);
    }
}

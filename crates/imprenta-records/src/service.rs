//! The record service: one collection's list, kept in sync with the backend.
//!
//! Updates and deletes are applied to the local list first so the page
//! reacts at once, and undone if the backend says no. Creates wait for the
//! server, since only the server knows the new id.
//!
//! A list belongs to the session that loaded it: when the session ends
//! (logout, or a 401 from the backend) the list is reset, so the next user
//! never sees the previous user's records.

use std::sync::{Arc, Weak};

use imprenta_session::{
    CredentialExchange, Gateway, SessionError, SessionState, SessionStatus, TokenStore,
};
use imprenta_transport::Transport;
use tokio::sync::watch;

use crate::{Record, RecordError, RecordList};

/// Loads and edits one collection of `R` through the authenticated gateway.
///
/// The list is published on a `watch` channel; pages subscribe and redraw
/// on every change (loading flag, error, items or search term).
pub struct RecordService<R, T, S, E>
where
    R: Record,
    T: Transport,
    S: TokenStore,
    E: CredentialExchange,
{
    gateway: Arc<Gateway<T, S, E>>,
    list: Arc<watch::Sender<RecordList<R>>>,
}

impl<R, T, S, E> RecordService<R, T, S, E>
where
    R: Record,
    T: Transport,
    S: TokenStore,
    E: CredentialExchange,
{
    /// Creates an empty list over `gateway`.
    ///
    /// When called inside a tokio runtime, a background task resets the
    /// list whenever the session ends. It exits when the session is dropped,
    /// or at the next session change after the service is gone.
    pub fn new(gateway: Arc<Gateway<T, S, E>>) -> Self {
        let (list, _) = watch::channel(RecordList::new());
        let list = Arc::new(list);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let session = gateway.session().subscribe();
                handle.spawn(clear_on_session_end(Arc::downgrade(&list), session));
            }
            Err(_) => {
                tracing::debug!(kind = R::KIND, "no runtime, list not tied to session");
            }
        }

        Self { gateway, list }
    }

    pub fn subscribe(&self) -> watch::Receiver<RecordList<R>> {
        self.list.subscribe()
    }

    /// A snapshot of the list.
    pub fn list(&self) -> RecordList<R> {
        self.list.borrow().clone()
    }

    /// Drops every record, the error and the search term.
    pub fn clear(&self) {
        reset(&self.list);
    }

    /// Sets the search term. Filtering itself happens in
    /// [`RecordList::filtered`].
    pub fn set_search(&self, term: impl Into<String>) {
        let term = term.into();
        self.list.send_modify(|list| list.set_search(term));
    }

    /// Reloads the whole collection. Returns how many records came back.
    ///
    /// On failure the list keeps what it had and records the error.
    pub async fn refresh(&self) -> Result<usize, RecordError> {
        self.list.send_modify(|list| {
            list.set_loading(true);
            list.clear_error();
        });

        let token = self.gateway.session().token();
        let result = self.gateway.get::<Vec<R>>(R::COLLECTION).await;

        match result {
            Ok(items) => {
                let count = items.len();
                if self.gateway.session().token() != token {
                    // The session changed while loading; these belong to it.
                    tracing::debug!(kind = R::KIND, "session changed, load discarded");
                    self.list.send_modify(|list| list.set_loading(false));
                    return Ok(count);
                }
                self.list.send_modify(|list| {
                    list.replace(items);
                    list.set_loading(false);
                });
                tracing::debug!(kind = R::KIND, count, "collection loaded");
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(kind = R::KIND, error = %e, "could not load collection");
                self.list.send_modify(|list| list.set_loading(false));
                Err(self.fail(e.into()))
            }
        }
    }

    /// Creates (`id == None`) or updates a record.
    ///
    /// - Create: `POST` the draft, then append what the server returns.
    /// - Update: show the edited record right away, `PUT` the draft, then
    ///   keep the server's version (or ours, if it answered with no body).
    ///   On failure the previous record is put back, unless the record has
    ///   left the list in the meantime.
    pub async fn save(
        &self,
        draft: R::Draft,
        id: Option<R::Id>,
    ) -> Result<R, RecordError> {
        self.list.send_modify(RecordList::clear_error);

        if let Err(reason) = R::validate(&draft) {
            return Err(self.fail(RecordError::Invalid {
                kind: R::KIND,
                reason,
            }));
        }

        match id {
            None => self.create(draft).await,
            Some(id) => self.update(id, draft).await,
        }
    }

    async fn create(&self, draft: R::Draft) -> Result<R, RecordError> {
        let token = self.gateway.session().token();
        let created: R = match self.gateway.post(R::COLLECTION, &draft).await {
            Ok(created) => created,
            Err(e) => return Err(self.fail(e.into())),
        };
        if self.gateway.session().token() == token {
            self.list.send_modify(|list| list.push(created.clone()));
        }
        tracing::info!(kind = R::KIND, id = %created.id(), "record created");
        Ok(created)
    }

    async fn update(&self, id: R::Id, draft: R::Draft) -> Result<R, RecordError> {
        let optimistic = R::from_draft(id.clone(), draft.clone());

        let mut previous = None;
        self.list.send_modify(|list| {
            previous = list.replace_existing(optimistic.clone());
        });
        let Some(previous) = previous else {
            return Err(self.fail(RecordError::NotFound {
                kind: R::KIND,
                id: id.to_string(),
            }));
        };

        match self.gateway.put::<_, R>(&R::path(&id), &draft).await {
            Ok(confirmed) => {
                let record = confirmed.unwrap_or(optimistic);
                self.list.send_modify(|list| {
                    list.replace_existing(record.clone());
                });
                tracing::info!(kind = R::KIND, %id, "record updated");
                Ok(record)
            }
            Err(e) => {
                self.list.send_modify(|list| {
                    list.replace_existing(previous);
                });
                tracing::warn!(kind = R::KIND, %id, error = %e, "update rolled back");
                Err(self.fail(e.into()))
            }
        }
    }

    /// Deletes a record.
    ///
    /// It disappears from the list immediately and comes back at its old
    /// position if the backend refuses.
    pub async fn delete(&self, id: R::Id) -> Result<(), RecordError> {
        let mut removed = None;
        self.list.send_modify(|list| {
            list.clear_error();
            removed = list.remove(&id);
        });
        let Some((index, record)) = removed else {
            return Err(self.fail(RecordError::NotFound {
                kind: R::KIND,
                id: id.to_string(),
            }));
        };

        match self.gateway.delete(&R::path(&id)).await {
            Ok(()) => {
                tracing::info!(kind = R::KIND, %id, "record deleted");
                Ok(())
            }
            Err(e) => {
                self.list.send_modify(|list| list.restore(index, record));
                tracing::warn!(kind = R::KIND, %id, error = %e, "delete rolled back");
                Err(self.fail(e.into()))
            }
        }
    }

    /// Records `error` on the list and hands it back.
    fn fail(&self, error: RecordError) -> RecordError {
        let message = match &error {
            RecordError::Session(SessionError::Unauthorized) => {
                // The session is gone, and so is what it loaded.
                reset(&self.list);
                "session expired, please log in again".to_string()
            }
            other => other.to_string(),
        };
        self.list.send_modify(|list| list.set_error(message));
        error
    }
}

/// Replaces the list with an empty one, notifying only if it wasn't empty.
fn reset<R: Record>(list: &watch::Sender<RecordList<R>>) {
    list.send_if_modified(|list| {
        let pristine = list.is_empty()
            && list.error().is_none()
            && list.search().is_empty()
            && !list.is_loading();
        if pristine {
            return false;
        }
        *list = RecordList::new();
        true
    });
}

/// Resets `list` every time `session` becomes unauthenticated.
async fn clear_on_session_end<R: Record>(
    list: Weak<watch::Sender<RecordList<R>>>,
    mut session: watch::Receiver<SessionState>,
) {
    while session.changed().await.is_ok() {
        let ended = session.borrow_and_update().status() == SessionStatus::Unauthenticated;
        if !ended {
            continue;
        }
        let Some(list) = list.upgrade() else {
            return;
        };
        reset(&list);
        tracing::debug!(kind = R::KIND, "session ended, list cleared");
    }
}

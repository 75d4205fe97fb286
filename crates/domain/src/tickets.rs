//! Event ticket issuance.

use std::sync::Arc;

use chrono::Utc;
use common::{EventId, UserId};
use store::{Event, EventTicket, Store, StoreError};
use uuid::Uuid;

use crate::error::DomainError;
use crate::notice::Notice;
use crate::notify::{NotificationKind, Notifier};

/// Outcome of a ticket purchase attempt.
#[derive(Debug)]
pub enum TicketOutcome {
    /// A ticket was issued.
    Issued { ticket: EventTicket, event: Event },
    /// The event's start date has passed; no ticket was issued.
    EventClosed { event: Event },
    /// The user already holds a ticket for this event.
    AlreadyTicketed { event: Event },
}

impl TicketOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            TicketOutcome::Issued { event, .. } => Notice::success(format!(
                "Your ticket for {} has been issued. Thank you!",
                event.title
            )),
            TicketOutcome::EventClosed { .. } => {
                Notice::error("Enrollment for this event is closed.")
            }
            TicketOutcome::AlreadyTicketed { .. } => {
                Notice::info("You already have a ticket for this event.")
            }
        }
    }

    pub fn redirect(&self) -> String {
        match self {
            TicketOutcome::Issued { event, .. }
            | TicketOutcome::EventClosed { event }
            | TicketOutcome::AlreadyTicketed { event } => format!("/events/{}", event.id),
        }
    }
}

/// Service issuing event tickets.
pub struct TicketService<S> {
    store: S,
    notifier: Arc<dyn Notifier>,
}

impl<S: Store> TicketService<S> {
    pub fn new(store: S, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Issues a ticket for `user` to attend `event_id`.
    ///
    /// The start date is compared at date granularity, so purchase on the
    /// start date itself succeeds. At most one ticket per (user, event)
    /// exists; the uniqueness constraint in the store backs the check, so
    /// concurrent purchases resolve to one `Issued` and one
    /// `AlreadyTicketed`.
    #[tracing::instrument(skip(self))]
    pub async fn purchase(
        &self,
        user: UserId,
        event_id: EventId,
    ) -> Result<TicketOutcome, DomainError> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or(DomainError::EventNotFound(event_id))?;

        if event.start_date < Utc::now().date_naive() {
            return Ok(TicketOutcome::EventClosed { event });
        }

        let ticket = EventTicket {
            ticket_id: Uuid::new_v4(),
            user,
            event: event_id,
            amount: event.price,
            created: Utc::now(),
        };
        match self.store.insert_ticket(ticket).await {
            Ok(ticket) => {
                metrics::counter!("event_tickets_issued_total").increment(1);
                self.notifier.dispatch(NotificationKind::TicketIssued, user);
                Ok(TicketOutcome::Issued { ticket, event })
            }
            Err(StoreError::DuplicateTicket { .. }) => {
                Ok(TicketOutcome::AlreadyTicketed { event })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All tickets held by `user`.
    pub async fn tickets_for(&self, user: UserId) -> Result<Vec<EventTicket>, DomainError> {
        Ok(self.store.tickets_for_user(user).await?)
    }
}

//! Event loop tying the roster to its side effects.
//!
//! The bridge owns the roster exclusively. Events are applied one at a time,
//! and each membership change is followed by its effects before the next
//! event is read.

use tracing::{Instrument, info, warn};
use ts_query_proto::Notification;

use crate::banner::BannerToken;
use crate::dispatch::{BannerWriter, Effect, EffectDispatcher, Notifier, PresenceKind};
use crate::error::BridgeError;
use crate::query::{NotificationStream, roster_events};
use crate::roster::{IdentityResolver, Participant, Roster, RosterEvent, Transition};
use crate::slots::SlotTable;

pub struct Bridge<R, N, B> {
    roster: Roster<R>,
    slots: SlotTable,
    dispatcher: EffectDispatcher<N, B>,
}

impl<R, N, B> Bridge<R, N, B>
where
    R: IdentityResolver,
    N: Notifier,
    B: BannerWriter,
{
    pub fn new(roster: Roster<R>, slots: SlotTable, dispatcher: EffectDispatcher<N, B>) -> Self {
        Self {
            roster,
            slots,
            dispatcher,
        }
    }

    /// Load a full snapshot without notifications, then write the banner once.
    ///
    /// Calling this again with a fresh snapshot resyncs the roster.
    pub async fn bootstrap(&mut self, snapshot: Vec<Participant>) -> Result<usize, BridgeError> {
        let count = self.roster.fill(snapshot).await?;
        crate::metrics::set_roster_size(count);
        info!(clients = count, "Roster loaded");

        if self.dispatcher.banner_enabled() {
            let token = self.banner_token();
            self.dispatcher.apply_effect(Effect::UpdateBanner { token }).await;
        }
        Ok(count)
    }

    /// Apply one event and deliver its effects.
    pub async fn handle(&mut self, event: RosterEvent) -> Result<Transition, BridgeError> {
        let span = crate::telemetry::event(event.kind(), event.handle());
        async move {
            crate::metrics::record_event(event.kind());
            let transition = self.roster.apply(event).await?;

            if transition.changed_membership() {
                crate::metrics::set_roster_size(self.roster.len());
            }
            let effects = self.effects_for(&transition);
            self.dispatcher.apply_effects(effects).await;

            Ok(transition)
        }
        .instrument(span)
        .await
    }

    /// Effects owed for a transition, in delivery order.
    pub fn effects_for(&self, transition: &Transition) -> Vec<Effect> {
        let (kind, display_name) = match transition {
            Transition::Connected { display_name, .. } => (PresenceKind::Connected, display_name),
            Transition::Disconnected { display_name, .. } => {
                (PresenceKind::Disconnected, display_name)
            }
            Transition::Ignored(_) => return Vec::new(),
        };

        let mut effects = vec![Effect::Notify {
            kind,
            display_name: display_name.clone(),
        }];
        if self.dispatcher.banner_enabled() {
            effects.push(Effect::UpdateBanner {
                token: self.banner_token(),
            });
        }
        effects
    }

    /// Banner token for the identities present right now.
    pub fn banner_token(&self) -> BannerToken {
        BannerToken::derive(&self.slots, self.roster.identities())
    }

    pub fn roster(&self) -> &Roster<R> {
        &self.roster
    }

    /// Apply every roster event carried by one notification.
    pub async fn handle_notification(&mut self, notification: &Notification) -> Result<(), BridgeError> {
        for result in roster_events(notification) {
            match result {
                Ok(event) => {
                    self.handle(event).await?;
                }
                Err(e) => {
                    crate::metrics::record_malformed_event();
                    warn!(event = %notification.event, error = %e, "Dropping malformed event");
                }
            }
        }
        Ok(())
    }

    /// Consume the event stream until it ends or a fatal error occurs.
    ///
    /// Never returns `Ok`: the stream only ends when the connection is lost.
    pub async fn run(&mut self, notifications: &mut NotificationStream) -> Result<(), BridgeError> {
        while let Some(notification) = notifications.recv().await {
            self.handle_notification(&notification).await?;
        }
        Err(BridgeError::ConnectionLost)
    }
}

//! Conversion from ServerQuery notifications to roster events.

use std::str::FromStr;

use thiserror::Error;
use ts_query_proto::{Notification, Record};

use crate::roster::{ClientType, Participant, RosterEvent};

/// Event name for a client entering the server's view.
pub const ENTER_VIEW: &str = "cliententerview";
/// Event name for a client leaving the server's view.
pub const LEFT_VIEW: &str = "clientleftview";

/// A record that could not be turned into a roster event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEvent {
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("invalid value {value:?} for field {field}")]
    InvalidField { field: &'static str, value: String },
}

fn field<T: FromStr>(record: &Record, key: &'static str) -> Result<T, MalformedEvent> {
    let raw = record.get(key).ok_or(MalformedEvent::MissingField(key))?;
    raw.parse().map_err(|_| MalformedEvent::InvalidField {
        field: key,
        value: raw.to_string(),
    })
}

/// Build a participant from a `clientlist` entry or an enter-view record.
pub fn participant(record: &Record) -> Result<Participant, MalformedEvent> {
    Ok(Participant {
        handle: field(record, "clid")?,
        display_name: record
            .get("client_nickname")
            .ok_or(MalformedEvent::MissingField("client_nickname"))?
            .to_string(),
        client_type: ClientType::from(field::<u32>(record, "client_type")?),
        database_id: field(record, "client_database_id")?,
    })
}

/// Roster events carried by a notification, one per record.
///
/// Notifications other than enter/leave view yield nothing.
pub fn roster_events(notification: &Notification) -> Vec<Result<RosterEvent, MalformedEvent>> {
    match notification.event.as_str() {
        ENTER_VIEW => notification
            .records
            .iter()
            .map(|r| participant(r).map(RosterEvent::Join))
            .collect(),
        LEFT_VIEW => notification
            .records
            .iter()
            .map(|r| field(r, "clid").map(|handle| RosterEvent::Leave { handle }))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::SessionHandle;
    use ts_query_proto::Reply;

    fn notification(line: &str) -> Notification {
        match line.parse::<Reply>().unwrap() {
            Reply::Notify(n) => n,
            other => panic!("expected notification, got {:?}", other),
        }
    }

    #[test]
    fn enter_view_becomes_join() {
        let n = notification(
            "notifycliententerview cfid=0 ctid=1 reasonid=0 clid=5 \
             client_unique_identifier=abc= client_nickname=Ann\\sLee \
             client_database_id=42 client_type=0",
        );
        assert_eq!(
            roster_events(&n),
            vec![Ok(RosterEvent::Join(Participant::voice(5, "Ann Lee", 42)))]
        );
    }

    #[test]
    fn left_view_becomes_leave() {
        let n = notification("notifyclientleftview cfid=1 ctid=0 reasonid=8 clid=5");
        assert_eq!(
            roster_events(&n),
            vec![Ok(RosterEvent::Leave {
                handle: SessionHandle(5)
            })]
        );
    }

    #[test]
    fn batched_records_yield_one_event_each() {
        let n = notification("notifyclientleftview cfid=1 ctid=0 reasonid=8 clid=5|clid=6");
        let events = roster_events(&n);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            Ok(RosterEvent::Leave {
                handle: SessionHandle(6)
            })
        );
    }

    #[test]
    fn query_clients_keep_their_type() {
        let n = notification(
            "notifycliententerview clid=9 client_nickname=bot client_database_id=1 client_type=1",
        );
        let Ok(RosterEvent::Join(p)) = &roster_events(&n)[0] else {
            panic!("expected join");
        };
        assert_eq!(p.client_type, ClientType::Query);
    }

    #[test]
    fn missing_fields_are_malformed() {
        let n = notification("notifycliententerview clid=5 client_nickname=Ann client_type=0");
        assert_eq!(
            roster_events(&n),
            vec![Err(MalformedEvent::MissingField("client_database_id"))]
        );

        let n = notification("notifyclientleftview clid=abc");
        assert_eq!(
            roster_events(&n),
            vec![Err(MalformedEvent::InvalidField {
                field: "clid",
                value: "abc".into()
            })]
        );
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let n = notification("notifyclientmoved ctid=2 reasonid=0 clid=5");
        assert!(roster_events(&n).is_empty());
    }
}

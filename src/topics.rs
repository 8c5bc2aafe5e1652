//! Topic grammar for the signage bus.
//!
//! Inbound topics are split into segments and matched against a small ordered
//! table of shapes. Exact shapes come first, then shapes with a single `{room}`
//! wildcard segment. The first matching shape wins; no match means the topic
//! is rejected.

use std::fmt;

/// Event decoded from an inbound topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicEvent {
    DeviceDiscovery,
    SetSeconds { room: String },
    Control { room: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    DeviceDiscovery,
    SetSeconds,
    Control,
}

#[derive(Debug, Clone, Copy)]
enum Segment {
    Literal(&'static str),
    Room,
}

struct Shape {
    segments: &'static [Segment],
    kind: EventKind,
}

/// Ordered: exact shapes before parameterized ones
const SHAPES: &[Shape] = &[
    Shape {
        segments: &[Segment::Literal("devicediscovery")],
        kind: EventKind::DeviceDiscovery,
    },
    Shape {
        segments: &[
            Segment::Room,
            Segment::Literal("timer"),
            Segment::Literal("setseconds"),
        ],
        kind: EventKind::SetSeconds,
    },
    Shape {
        segments: &[
            Segment::Room,
            Segment::Literal("timer"),
            Segment::Literal("control"),
        ],
        kind: EventKind::Control,
    },
];

/// Why a topic was not routed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    OutsideNamespace,
    UnknownShape,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejected::OutsideNamespace => write!(f, "topic outside namespace"),
            Rejected::UnknownShape => write!(f, "unrecognized topic shape"),
        }
    }
}

/// Parses inbound topics and builds outbound ones under a fixed namespace.
#[derive(Debug, Clone)]
pub struct TopicRouter {
    namespace: String,
}

impl TopicRouter {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn route(&self, topic: &str) -> std::result::Result<TopicEvent, Rejected> {
        let rest = topic
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or(Rejected::OutsideNamespace)?;

        let segments: Vec<&str> = rest.split('/').collect();

        for shape in SHAPES {
            if let Some(room) = match_shape(shape.segments, &segments) {
                let event = match shape.kind {
                    EventKind::DeviceDiscovery => TopicEvent::DeviceDiscovery,
                    EventKind::SetSeconds => TopicEvent::SetSeconds {
                        room: room.unwrap_or_default(),
                    },
                    EventKind::Control => TopicEvent::Control {
                        room: room.unwrap_or_default(),
                    },
                };
                return Ok(event);
            }
        }

        Err(Rejected::UnknownShape)
    }

    /// Subscription filters covering every routable topic
    pub fn subscriptions(&self) -> [String; 3] {
        [
            format!("{}/devicediscovery", self.namespace),
            format!("{}/+/timer/setseconds", self.namespace),
            format!("{}/+/timer/control", self.namespace),
        ]
    }

    pub fn timer_seconds(&self, room: &str) -> String {
        format!("{}/{}/timer/seconds", self.namespace, room)
    }

    pub fn client_media_cache_url(&self, uuid: &str) -> String {
        format!("{}/client/{}/mediacacheurl", self.namespace, uuid)
    }

    pub fn client_room_name(&self, uuid: &str) -> String {
        format!("{}/client/{}/roomname", self.namespace, uuid)
    }

    pub fn dashboard_media_cache_url(&self) -> String {
        format!("{}/dashboard/mediacacheurl", self.namespace)
    }

    pub fn dashboard_rooms_url(&self) -> String {
        format!("{}/dashboard/roomsurl", self.namespace)
    }

    pub fn dashboard_clients_url(&self) -> String {
        format!("{}/dashboard/clientsurl", self.namespace)
    }
}

/// Returns `Some(room)` on match; the inner option is the captured room segment.
fn match_shape(shape: &[Segment], segments: &[&str]) -> Option<Option<String>> {
    if shape.len() != segments.len() {
        return None;
    }

    let mut room = None;
    for (pattern, segment) in shape.iter().zip(segments) {
        match pattern {
            Segment::Literal(literal) if literal == segment => {},
            Segment::Literal(_) => return None,
            Segment::Room if segment.is_empty() => return None,
            Segment::Room => room = Some(segment.to_string()),
        }
    }
    Some(room)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> TopicRouter {
        TopicRouter::new("ar-signage")
    }

    #[test]
    fn test_route_discovery() {
        assert_eq!(
            router().route("ar-signage/devicediscovery"),
            Ok(TopicEvent::DeviceDiscovery)
        );
    }

    #[test]
    fn test_route_timer_topics() {
        assert_eq!(
            router().route("ar-signage/lobby/timer/setseconds"),
            Ok(TopicEvent::SetSeconds {
                room: "lobby".into()
            })
        );
        assert_eq!(
            router().route("ar-signage/lobby/timer/control"),
            Ok(TopicEvent::Control {
                room: "lobby".into()
            })
        );
    }

    #[test]
    fn test_room_named_like_literal() {
        // A room called "devicediscovery" is still just a room segment
        assert_eq!(
            router().route("ar-signage/devicediscovery/timer/control"),
            Ok(TopicEvent::Control {
                room: "devicediscovery".into()
            })
        );
    }

    #[test]
    fn test_rejections() {
        let router = router();
        assert_eq!(
            router.route("other/devicediscovery"),
            Err(Rejected::OutsideNamespace)
        );
        assert_eq!(
            router.route("ar-signagex/devicediscovery"),
            Err(Rejected::OutsideNamespace)
        );
        assert_eq!(router.route("ar-signage"), Err(Rejected::OutsideNamespace));
        assert_eq!(
            router.route("ar-signage//timer/control"),
            Err(Rejected::UnknownShape)
        );
        assert_eq!(
            router.route("ar-signage/a/b/timer/control"),
            Err(Rejected::UnknownShape)
        );
        assert_eq!(
            router.route("ar-signage/lobby/timer/seconds"),
            Err(Rejected::UnknownShape)
        );
        assert_eq!(
            router.route("ar-signage/devicediscovery/"),
            Err(Rejected::UnknownShape)
        );
    }

    #[test]
    fn test_outbound_topics() {
        let router = router();
        assert_eq!(router.timer_seconds("lobby"), "ar-signage/lobby/timer/seconds");
        assert_eq!(
            router.client_media_cache_url("abc"),
            "ar-signage/client/abc/mediacacheurl"
        );
        assert_eq!(router.client_room_name("abc"), "ar-signage/client/abc/roomname");
        assert_eq!(
            router.dashboard_clients_url(),
            "ar-signage/dashboard/clientsurl"
        );
    }

    #[test]
    fn test_subscriptions_cover_routable_topics() {
        let subs = router().subscriptions();
        assert_eq!(subs[0], "ar-signage/devicediscovery");
        assert_eq!(subs[1], "ar-signage/+/timer/setseconds");
        assert_eq!(subs[2], "ar-signage/+/timer/control");
    }
}

//! Classified port events
//!
//! Every outcome of a reconciliation pass is emitted as a [`PortEvent`]
//! carrying an immutable [`Port`] snapshot. Events are sent only after the
//! registry change they describe is committed, in the order the changes
//! happened.

use serde::{Deserialize, Serialize};

use crate::state::Port;

/// Outcome of a reconciliation pass for one port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PortEvent {
    /// Port present when the watcher started
    InitialDetected(Port),
    /// Port attached after startup
    Added(Port),
    /// Port detached; carries its last known state
    Removed(Port),
}

impl PortEvent {
    /// The port this event refers to
    pub fn port(&self) -> &Port {
        match self {
            PortEvent::InitialDetected(port) | PortEvent::Added(port) | PortEvent::Removed(port) => {
                port
            }
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            PortEvent::InitialDetected(_) => "Detected",
            PortEvent::Added(_) => "Added",
            PortEvent::Removed(_) => "Removed",
        }
    }

    /// Forward this event to a sink
    pub fn dispatch<S: PortEventSink + ?Sized>(self, sink: &mut S) {
        match self {
            PortEvent::InitialDetected(port) => sink.on_initial_port(port),
            PortEvent::Added(port) => sink.on_port_added(port),
            PortEvent::Removed(port) => sink.on_port_removed(port),
        }
    }
}

/// Consumer of port events
pub trait PortEventSink {
    /// A port was present at startup
    fn on_initial_port(&mut self, port: Port);

    /// A port was attached
    fn on_port_added(&mut self, port: Port);

    /// A port was detached
    fn on_port_removed(&mut self, port: Port);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl PortEventSink for Recorder {
        fn on_initial_port(&mut self, port: Port) {
            self.0.push(format!("initial {}", port.name));
        }

        fn on_port_added(&mut self, port: Port) {
            self.0.push(format!("added {}", port.name));
        }

        fn on_port_removed(&mut self, port: Port) {
            self.0.push(format!("removed {}", port.name));
        }
    }

    #[test]
    fn dispatch_routes_each_kind() {
        let mut sink = Recorder::default();
        PortEvent::InitialDetected(Port::new("COM3")).dispatch(&mut sink);
        PortEvent::Added(Port::new("COM7")).dispatch(&mut sink);
        PortEvent::Removed(Port::new("COM3")).dispatch(&mut sink);

        assert_eq!(sink.0, vec!["initial COM3", "added COM7", "removed COM3"]);
    }

    #[test]
    fn json_is_tagged_by_kind() {
        let event = PortEvent::Added(Port::new("COM9"));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "added");
        assert_eq!(json["name"], "COM9");
        assert!(json["friendly_name"].is_null());
    }
}

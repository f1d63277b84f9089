//! Message formatting utilities for client display.

use beacon_shared::time::timestamp_to_rfc3339;
use serde_json::Value;

use crate::{
    domain::Role,
    protocol::{AckPayload, ServerFrame},
};

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

fn number(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or_default()
}

fn text<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

fn position(value: &Value) -> String {
    format!(
        "({:.2}, {:.2}, {:.2})",
        number(value, "x"),
        number(value, "y"),
        number(value, "z")
    )
}

impl MessageFormatter {
    /// Format the banner shown once a room has been entered
    ///
    /// # Arguments
    ///
    /// * `code` - Room code
    /// * `role` - Role this client plays
    /// * `ack` - Acknowledgement of the handshake
    ///
    /// # Returns
    ///
    /// A formatted string with the room state
    pub fn format_entered(code: &str, role: Role, ack: &AckPayload) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!("Room {} ({})\n", code, role));

        if ack.room_code.is_some() {
            output.push_str("Share this code with the controller to pair.\n");
        }
        if let Some(has_controller) = ack.has_controller {
            let state = if has_controller {
                "connected"
            } else {
                "not connected"
            };
            output.push_str(&format!("Controller: {}\n", state));
        }

        let annotations = ack.annotations.as_deref().unwrap_or_default();
        if annotations.is_empty() {
            output.push_str("(No annotations)\n");
        } else {
            output.push_str("Annotations:\n");
            for annotation in annotations {
                output.push_str(&format!("  {}\n", Self::format_annotation(annotation)));
            }
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Format one annotation as a single line
    pub fn format_annotation(annotation: &Value) -> String {
        let id = text(annotation, "id");
        match text(annotation, "type") {
            "danger" => format!(
                "[{}] danger '{}' at {} r={}",
                id,
                text(annotation, "label"),
                position(&annotation["position"]),
                number(annotation, "radius")
            ),
            "arrow" => format!(
                "[{}] arrow '{}' {} -> {}",
                id,
                text(annotation, "label"),
                position(&annotation["start"]),
                position(&annotation["end"])
            ),
            "incident" => format!(
                "[{}] incident ({}) '{}' at {}",
                id,
                text(annotation, "severity"),
                text(annotation, "description"),
                position(&annotation["position"])
            ),
            "restricted" => {
                let vertices = annotation["points"].as_array().map_or(0, Vec::len);
                format!("[{}] restricted zone, {} vertices", id, vertices)
            }
            other => format!("[{}] {}", id, other),
        }
    }

    /// Format an event pushed by the server
    ///
    /// # Arguments
    ///
    /// * `frame` - The received frame
    ///
    /// # Returns
    ///
    /// A formatted string describing the event
    pub fn format_event(frame: &ServerFrame) -> String {
        let data = &frame.data;
        let line = match frame.event.as_str() {
            "controller-connected" => "+ controller connected".to_string(),
            "controller-disconnected" => "- controller disconnected".to_string(),
            "display-disconnected" => "- display disconnected".to_string(),
            "movement-update" => {
                let rotation = &data["rotation"];
                format!(
                    "~ orientation a={:.1} b={:.1} g={:.1} speed={:.2}",
                    number(rotation, "alpha"),
                    number(rotation, "beta"),
                    number(rotation, "gamma"),
                    number(data, "speed")
                )
            }
            "touch-movement-update" => {
                let movement = &data["movement"];
                let running = data["isRunning"].as_bool().unwrap_or(false);
                format!(
                    "~ move forward={:.2} right={:.2}{}",
                    number(movement, "forward"),
                    number(movement, "right"),
                    if running { " (running)" } else { "" }
                )
            }
            "flashlight-toggle" => "* flashlight toggled".to_string(),
            "camera-position-update" => format!("~ camera at {}", position(data)),
            "request-placement" => {
                format!("? placement requested for '{}'", text(data, "annotationType"))
            }
            "placement-position" => format!(
                "! placement for '{}' at {}",
                text(data, "annotationType"),
                position(&data["position"])
            ),
            "annotation-added" => format!("+ {}", Self::format_annotation(data)),
            "annotation-removed" => format!("- annotation {} removed", text(data, "id")),
            "annotations-cleared" => "- all annotations cleared".to_string(),
            other => return Self::format_raw_message(&format!("{} {}", other, data)),
        };
        format!("\n{}\n", line)
    }

    /// Format the reply to a command sent from the prompt
    pub fn format_ack(ack: &AckPayload) -> String {
        if ack.success {
            String::new()
        } else {
            format!(
                "\n✗ {}\n",
                ack.error.as_deref().unwrap_or("request failed")
            )
        }
    }

    /// Format a confirmation message after sending
    ///
    /// # Arguments
    ///
    /// * `event` - Name of the event that was sent
    /// * `sent_at` - Unix timestamp when the event was sent (milliseconds)
    pub fn format_sent_confirmation(event: &str, sent_at: i64) -> String {
        format!("{} sent at {}\n", event, timestamp_to_rfc3339(sent_at))
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}

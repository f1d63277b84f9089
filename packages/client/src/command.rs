//! Prompt commands and the events they send.

use serde_json::{Value, json};

use crate::error::CommandError;

/// Commands accepted at the prompt
pub const HELP: &str = "\
Commands:
  move <alpha> <beta> <gamma> [speed]      send device orientation
  walk <forward> <right> [run]             send touch movement
  flash                                    toggle the display flashlight
  danger <x> <z> [radius] [label...]       add a danger zone
  arrow <x1> <z1> <x2> <z2> [label...]     add an arrow
  incident <x> <z> [severity] [text...]    add an incident (low|medium|high)
  zone <x,z> <x,z> <x,z> [<x,z>...]        add a restricted zone
  remove <id>                              remove an annotation
  clear                                    clear all annotations
  camera <x> <y> <z>                       send the display camera position
  request [type]                           ask the display for a placement
  place <x> <y> <z> [type]                 answer a placement request
  help                                     show this list
  quit                                     leave the room
";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Move {
        alpha: f64,
        beta: f64,
        gamma: f64,
        speed: f64,
    },
    Walk {
        forward: f64,
        right: f64,
        running: bool,
    },
    Flash,
    Danger {
        x: f64,
        z: f64,
        radius: Option<f64>,
        label: Option<String>,
    },
    Arrow {
        start: (f64, f64),
        end: (f64, f64),
        label: Option<String>,
    },
    Incident {
        x: f64,
        z: f64,
        severity: Option<String>,
        description: Option<String>,
    },
    Zone {
        points: Vec<(f64, f64)>,
    },
    Remove {
        id: String,
    },
    Clear,
    Camera {
        x: f64,
        y: f64,
        z: f64,
    },
    Request {
        annotation_type: Option<String>,
    },
    Place {
        x: f64,
        y: f64,
        z: f64,
        annotation_type: Option<String>,
    },
    Help,
    Quit,
}

fn number(word: &str) -> Result<f64, CommandError> {
    word.parse::<f64>()
        .map_err(|_| CommandError::NotANumber(word.to_string()))
}

fn numbers<const N: usize>(
    words: &[&str],
    usage: &'static str,
) -> Result<[f64; N], CommandError> {
    if words.len() < N {
        return Err(CommandError::Usage(usage));
    }
    let mut values = [0.0; N];
    for (value, word) in values.iter_mut().zip(words) {
        *value = number(word)?;
    }
    Ok(values)
}

/// Remaining words joined back into free text
fn rest(words: &[&str]) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn vertex(word: &str) -> Result<(f64, f64), CommandError> {
    let (x, z) = word
        .split_once(',')
        .ok_or(CommandError::Usage("zone <x,z> <x,z> <x,z> [<x,z>...]"))?;
    Ok((number(x)?, number(z)?))
}

impl Command {
    /// Parse one prompt line
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((name, args)) = words.split_first() else {
            return Err(CommandError::Usage("help"));
        };

        match *name {
            "move" => {
                let [alpha, beta, gamma] =
                    numbers::<3>(args, "move <alpha> <beta> <gamma> [speed]")?;
                let speed = args.get(3).map(|w| number(w)).transpose()?.unwrap_or(0.0);
                Ok(Command::Move {
                    alpha,
                    beta,
                    gamma,
                    speed,
                })
            }
            "walk" => {
                let [forward, right] = numbers::<2>(args, "walk <forward> <right> [run]")?;
                Ok(Command::Walk {
                    forward,
                    right,
                    running: args.get(2) == Some(&"run"),
                })
            }
            "flash" => Ok(Command::Flash),
            "danger" => {
                let [x, z] = numbers::<2>(args, "danger <x> <z> [radius] [label...]")?;
                // 3 番目の語が数値なら半径、そうでなければラベルの一部
                let (radius, label_words) = match args.get(2).map(|w| w.parse::<f64>()) {
                    Some(Ok(radius)) => (Some(radius), &args[3..]),
                    _ => (None, &args[2..]),
                };
                Ok(Command::Danger {
                    x,
                    z,
                    radius,
                    label: rest(label_words),
                })
            }
            "arrow" => {
                let [x1, z1, x2, z2] =
                    numbers::<4>(args, "arrow <x1> <z1> <x2> <z2> [label...]")?;
                Ok(Command::Arrow {
                    start: (x1, z1),
                    end: (x2, z2),
                    label: rest(&args[4..]),
                })
            }
            "incident" => {
                let [x, z] = numbers::<2>(args, "incident <x> <z> [severity] [text...]")?;
                Ok(Command::Incident {
                    x,
                    z,
                    severity: args.get(2).map(|w| w.to_string()),
                    description: rest(args.get(3..).unwrap_or_default()),
                })
            }
            "zone" => {
                if args.len() < 3 {
                    return Err(CommandError::Usage("zone <x,z> <x,z> <x,z> [<x,z>...]"));
                }
                let points = args
                    .iter()
                    .map(|w| vertex(w))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Command::Zone { points })
            }
            "remove" => match args {
                [id] => Ok(Command::Remove { id: id.to_string() }),
                _ => Err(CommandError::Usage("remove <id>")),
            },
            "clear" => Ok(Command::Clear),
            "camera" => {
                let [x, y, z] = numbers::<3>(args, "camera <x> <y> <z>")?;
                Ok(Command::Camera { x, y, z })
            }
            "request" => Ok(Command::Request {
                annotation_type: args.first().map(|w| w.to_string()),
            }),
            "place" => {
                let [x, y, z] = numbers::<3>(args, "place <x> <y> <z> [type]")?;
                Ok(Command::Place {
                    x,
                    y,
                    z,
                    annotation_type: args.get(3).map(|w| w.to_string()),
                })
            }
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    /// Event name and payload for this command in the given room
    ///
    /// `None` for commands handled locally.
    pub fn to_event(&self, room_id: &str) -> Option<(&'static str, Value)> {
        let event = match self {
            Command::Move {
                alpha,
                beta,
                gamma,
                speed,
            } => (
                "tablet-movement",
                json!({
                    "roomId": room_id,
                    "rotation": {"alpha": alpha, "beta": beta, "gamma": gamma},
                    "speed": speed
                }),
            ),
            Command::Walk {
                forward,
                right,
                running,
            } => (
                "touch-movement",
                json!({
                    "roomId": room_id,
                    "movement": {"forward": forward, "right": right, "lookX": 0.0, "lookY": 0.0},
                    "isRunning": running
                }),
            ),
            Command::Flash => ("toggle-flashlight", json!({"roomId": room_id})),
            Command::Danger {
                x,
                z,
                radius,
                label,
            } => (
                "add-danger-zone",
                json!({
                    "roomId": room_id,
                    "position": {"x": x, "y": 0.0, "z": z},
                    "radius": radius,
                    "label": label
                }),
            ),
            Command::Arrow { start, end, label } => (
                "add-arrow",
                json!({
                    "roomId": room_id,
                    "start": {"x": start.0, "y": 0.0, "z": start.1},
                    "end": {"x": end.0, "y": 0.0, "z": end.1},
                    "label": label
                }),
            ),
            Command::Incident {
                x,
                z,
                severity,
                description,
            } => (
                "add-incident",
                json!({
                    "roomId": room_id,
                    "position": {"x": x, "y": 0.0, "z": z},
                    "severity": severity,
                    "description": description
                }),
            ),
            Command::Zone { points } => {
                let points: Vec<Value> = points
                    .iter()
                    .map(|(x, z)| json!({"x": x, "z": z}))
                    .collect();
                (
                    "add-restricted-zone",
                    json!({"roomId": room_id, "points": points}),
                )
            }
            Command::Remove { id } => (
                "remove-annotation",
                json!({"roomId": room_id, "annotationId": id}),
            ),
            Command::Clear => ("clear-annotations", json!({"roomId": room_id})),
            Command::Camera { x, y, z } => (
                "camera-position",
                json!({"roomId": room_id, "position": {"x": x, "y": y, "z": z}}),
            ),
            Command::Request { annotation_type } => (
                "request-placement",
                json!({"roomId": room_id, "annotationType": annotation_type}),
            ),
            Command::Place {
                x,
                y,
                z,
                annotation_type,
            } => (
                "placement-position",
                json!({
                    "roomId": room_id,
                    "position": {"x": x, "y": y, "z": z},
                    "annotationType": annotation_type
                }),
            ),
            Command::Help | Command::Quit => return None,
        };
        Some(event)
    }
}

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use sumquest_core::game_trait::LevelPhase;
use sumquest_core::input::InputState;
use sumquest_platformer::input::intent_from_keys;

use crate::game_loop::GameCommand;

/// One parsed line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCommand {
    /// Keys held for this line, as browser key codes.
    Keys(Vec<&'static str>),
    Control(Control),
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    Restart,
    Reset,
    Next,
    Pause,
    Resume,
    Quit,
}

/// Parse a line. Words are commands; anything else is a string of key
/// letters (`a`/`d` move, `w` or space jumps). An empty line releases
/// everything.
pub fn parse_line(line: &str) -> LineCommand {
    let control = match line.trim() {
        "start" => Some(Control::Start),
        "restart" => Some(Control::Restart),
        "reset" => Some(Control::Reset),
        "next" => Some(Control::Next),
        "pause" => Some(Control::Pause),
        "resume" => Some(Control::Resume),
        "quit" | "q" => Some(Control::Quit),
        _ => None,
    };
    if let Some(control) = control {
        return LineCommand::Control(control);
    }

    let mut keys = Vec::new();
    for ch in line.trim_end_matches(['\r', '\n']).chars() {
        let key = match ch.to_ascii_lowercase() {
            'a' => "KeyA",
            'd' => "KeyD",
            'w' => "KeyW",
            ' ' => "Space",
            _ => return LineCommand::Unknown(line.trim().to_string()),
        };
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    LineCommand::Keys(keys)
}

/// Turn a held-key line into an encoded intent. Each line replaces the
/// previous one, so a jump key on consecutive lines jumps each time.
pub fn encode_keys(
    input: &mut InputState,
    keys: &[&str],
) -> Result<Vec<u8>, rmp_serde::encode::Error> {
    input.release_all();
    input.end_tick();
    for key in keys {
        input.on_key_down(*key);
    }
    rmp_serde::to_vec(&intent_from_keys(input))
}

/// What to type next once an attempt has ended.
pub fn phase_hint(phase: LevelPhase) -> Option<&'static str> {
    if !phase.is_terminal() {
        return None;
    }
    Some(match phase {
        LevelPhase::Won => "level won: type `next` to continue or `restart` to replay",
        _ => "out of lives: type `restart` to try again",
    })
}

/// Read stdin line by line and forward commands until EOF or `quit`.
pub async fn run_stdin_adapter(cmd_tx: mpsc::UnboundedSender<GameCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input = InputState::new();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("stdin read failed: {e}");
                break;
            },
        };
        let cmd = match parse_line(&line) {
            LineCommand::Keys(keys) => match encode_keys(&mut input, &keys) {
                Ok(data) => GameCommand::Input(data),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode intent");
                    continue;
                },
            },
            LineCommand::Control(Control::Start) => GameCommand::Start,
            LineCommand::Control(Control::Restart) => GameCommand::Restart,
            LineCommand::Control(Control::Reset) => GameCommand::Reset,
            LineCommand::Control(Control::Next) => GameCommand::NextLevel,
            LineCommand::Control(Control::Pause) => GameCommand::Pause,
            LineCommand::Control(Control::Resume) => GameCommand::Resume,
            LineCommand::Control(Control::Quit) => break,
            LineCommand::Unknown(text) => {
                tracing::warn!(input = %text, "unrecognised input line");
                continue;
            },
        };
        if cmd_tx.send(cmd).is_err() {
            return;
        }
    }
    let _ = cmd_tx.send(GameCommand::Stop);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumquest_platformer::input::Intent;

    #[test]
    fn words_are_commands() {
        assert_eq!(parse_line("start"), LineCommand::Control(Control::Start));
        assert_eq!(parse_line(" next \n"), LineCommand::Control(Control::Next));
        assert_eq!(parse_line("q"), LineCommand::Control(Control::Quit));
    }

    #[test]
    fn letters_are_keys() {
        assert_eq!(parse_line("dw"), LineCommand::Keys(vec!["KeyD", "KeyW"]));
        assert_eq!(parse_line("AA"), LineCommand::Keys(vec!["KeyA"]));
        assert_eq!(parse_line(""), LineCommand::Keys(Vec::new()));
        assert!(matches!(parse_line("xyz"), LineCommand::Unknown(_)));
    }

    #[test]
    fn hints_only_after_an_attempt_ends() {
        assert_eq!(phase_hint(LevelPhase::Idle), None);
        assert_eq!(phase_hint(LevelPhase::Running), None);
        assert!(phase_hint(LevelPhase::Won).unwrap().contains("next"));
        assert!(phase_hint(LevelPhase::Failed).unwrap().contains("restart"));
    }

    #[test]
    fn keys_encode_to_intent() {
        let mut input = InputState::new();
        let data = encode_keys(&mut input, &["KeyD", "Space"]).unwrap();
        let intent: Intent = rmp_serde::from_slice(&data).unwrap();
        assert_eq!(
            intent,
            Intent {
                move_left: false,
                move_right: true,
                jump_pressed: true,
            }
        );

        let idle: Intent = rmp_serde::from_slice(&encode_keys(&mut input, &[]).unwrap()).unwrap();
        assert_eq!(idle, Intent::default());
    }

    #[test]
    fn each_line_replaces_held_keys() {
        let mut input = InputState::new();
        encode_keys(&mut input, &["KeyA", "KeyW"]).unwrap();
        let data = encode_keys(&mut input, &["KeyD", "KeyW"]).unwrap();
        let intent: Intent = rmp_serde::from_slice(&data).unwrap();
        assert!(!intent.move_left, "left from the previous line is released");
        assert!(intent.move_right);
        assert!(intent.jump_pressed, "repeating the jump key jumps again");
    }
}

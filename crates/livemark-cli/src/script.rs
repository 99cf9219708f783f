//! Keystroke scripts: literal chars are typed, `{name}` is a named key.

use anyhow::{Result, bail};
use livemark_engine::Editor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Delete,
    Enter,
    ForceEnter,
    SoftEnter,
    Tab,
    ShiftTab,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

impl Key {
    fn named(name: &str) -> Option<Self> {
        Some(match name {
            "bs" => Key::Backspace,
            "del" => Key::Delete,
            "enter" => Key::Enter,
            "force-enter" => Key::ForceEnter,
            "soft-enter" => Key::SoftEnter,
            "tab" => Key::Tab,
            "shift-tab" => Key::ShiftTab,
            "left" => Key::Left,
            "right" => Key::Right,
            "up" => Key::Up,
            "down" => Key::Down,
            "home" => Key::Home,
            "end" => Key::End,
            _ => return None,
        })
    }

    /// Feeds the key to the editor; returns whether the step was accepted.
    pub fn press(self, editor: &mut Editor) -> bool {
        match self {
            Key::Char(ch) => editor.type_char(ch),
            Key::Backspace => editor.backspace(),
            Key::Delete => editor.delete(),
            Key::Enter => editor.enter(),
            Key::ForceEnter => editor.force_enter(),
            Key::SoftEnter => editor.soft_enter(),
            Key::Tab => editor.tab(),
            Key::ShiftTab => editor.shift_tab(),
            Key::Left => editor.move_left(),
            Key::Right => editor.move_right(),
            Key::Up => editor.move_up(),
            Key::Down => editor.move_down(),
            Key::Home => editor.move_home(),
            Key::End => editor.move_end(),
        }
    }
}

pub fn parse(script: &str) -> Result<Vec<Key>> {
    let mut keys = Vec::new();
    let mut chars = script.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\n' => keys.push(Key::Enter),
            '\r' => {}
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') if name.is_empty() => {
                            name.push('{');
                            break;
                        }
                        Some(c) => name.push(c),
                        None => bail!("Unterminated key name '{{{name}'"),
                    }
                }
                if name == "{" {
                    keys.push(Key::Char('{'));
                    continue;
                }
                match Key::named(&name) {
                    Some(key) => keys.push(key),
                    None => bail!("Unknown key '{{{name}}}'"),
                }
            }
            c => keys.push(Key::Char(c)),
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_literal_chars_and_newlines() {
        assert_eq!(
            parse("a\nb").unwrap(),
            vec![Key::Char('a'), Key::Enter, Key::Char('b')]
        );
    }

    #[rstest]
    #[case("{bs}", Key::Backspace)]
    #[case("{del}", Key::Delete)]
    #[case("{enter}", Key::Enter)]
    #[case("{force-enter}", Key::ForceEnter)]
    #[case("{soft-enter}", Key::SoftEnter)]
    #[case("{tab}", Key::Tab)]
    #[case("{shift-tab}", Key::ShiftTab)]
    #[case("{left}", Key::Left)]
    #[case("{right}", Key::Right)]
    #[case("{up}", Key::Up)]
    #[case("{down}", Key::Down)]
    #[case("{home}", Key::Home)]
    #[case("{end}", Key::End)]
    #[case("{{", Key::Char('{'))]
    fn test_named_keys(#[case] script: &str, #[case] key: Key) {
        assert_eq!(parse(script).unwrap(), vec![key]);
    }

    #[test]
    fn test_closing_brace_is_literal() {
        assert_eq!(parse("}").unwrap(), vec![Key::Char('}')]);
    }

    #[test]
    fn test_carriage_returns_are_ignored() {
        assert_eq!(parse("a\r\n").unwrap(), vec![Key::Char('a'), Key::Enter]);
    }

    #[rstest]
    #[case("{nope}")]
    #[case("{bs")]
    fn test_bad_keys_are_errors(#[case] script: &str) {
        assert!(parse(script).is_err());
    }

    #[test]
    fn test_replay_renders_bold() {
        let mut editor = Editor::default();
        for key in parse("**bold**").unwrap() {
            key.press(&mut editor);
        }
        assert_eq!(
            editor.state().document.describe(),
            r#"paragraph "bold" [BOLD 0..4]"#
        );
    }

    #[test]
    fn test_replay_backspace_after_heading_resets_block() {
        let mut editor = Editor::default();
        for key in parse("# {bs}x").unwrap() {
            key.press(&mut editor);
        }
        assert_eq!(editor.state().document.describe(), r#"paragraph "x""#);
    }
}

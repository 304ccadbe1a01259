//! ANSI cursor movement and single-key input.
//!
//! All movement helpers queue crossterm commands on an arbitrary writer and
//! flush it, so they work on stdout as well as on in-memory buffers.
use std::io::Write;

use crossterm::{
    QueueableCommand, cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{self, ClearType},
};

use crate::error::ConsoleError;

/// Moves the cursor to `row`, `col` (both 1-based, like the terminal).
pub fn move_to<W: Write>(out: &mut W, row: u16, col: u16) -> Result<(), ConsoleError> {
    out.queue(cursor::MoveTo(col.saturating_sub(1), row.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

/// Moves the cursor up `n` lines.
pub fn up<W: Write>(out: &mut W, n: u16) -> Result<(), ConsoleError> {
    out.queue(cursor::MoveUp(n))?;
    out.flush()?;
    Ok(())
}

/// Moves the cursor down `n` lines.
pub fn down<W: Write>(out: &mut W, n: u16) -> Result<(), ConsoleError> {
    out.queue(cursor::MoveDown(n))?;
    out.flush()?;
    Ok(())
}

/// Moves the cursor forward `n` characters.
pub fn forward<W: Write>(out: &mut W, n: u16) -> Result<(), ConsoleError> {
    out.queue(cursor::MoveRight(n))?;
    out.flush()?;
    Ok(())
}

/// Moves the cursor backwards `n` characters.
pub fn backward<W: Write>(out: &mut W, n: u16) -> Result<(), ConsoleError> {
    out.queue(cursor::MoveLeft(n))?;
    out.flush()?;
    Ok(())
}

/// Clears the screen and puts the cursor in the top-left corner.
pub fn clear_screen<W: Write>(out: &mut W) -> Result<(), ConsoleError> {
    out.queue(terminal::Clear(ClearType::All))?
        .queue(cursor::MoveTo(0, 0))?;
    out.flush()?;
    Ok(())
}

/// Erases from the cursor to the end of the line.
pub fn erase_to_eol<W: Write>(out: &mut W) -> Result<(), ConsoleError> {
    out.queue(terminal::Clear(ClearType::UntilNewLine))?;
    out.flush()?;
    Ok(())
}

/// Saves the current cursor position.
pub fn save_position<W: Write>(out: &mut W) -> Result<(), ConsoleError> {
    out.queue(cursor::SavePosition)?;
    out.flush()?;
    Ok(())
}

/// Restores the position stored by [`save_position`].
pub fn restore_position<W: Write>(out: &mut W) -> Result<(), ConsoleError> {
    out.queue(cursor::RestorePosition)?;
    out.flush()?;
    Ok(())
}

/// Waits for a single key press without echoing it.
///
/// With `allowed` set, presses of other keys are ignored until one of the
/// allowed characters arrives. The terminal is put in raw mode for the
/// duration of the call.
pub fn read_key(allowed: Option<&[char]>) -> Result<char, ConsoleError> {
    terminal::enable_raw_mode()?;
    let key = wait_for_key(allowed);
    let restored = terminal::disable_raw_mode();
    let key = key?;
    restored?;
    Ok(key)
}

fn wait_for_key(allowed: Option<&[char]>) -> Result<char, ConsoleError> {
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let pressed = match key.code {
            KeyCode::Char(ch) => ch,
            KeyCode::Enter => '\n',
            KeyCode::Tab => '\t',
            KeyCode::Esc => '\x1b',
            _ => continue,
        };
        if allowed.is_none_or(|keys| keys.contains(&pressed)) {
            return Ok(pressed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written<F>(action: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), ConsoleError>,
    {
        let mut buffer = Vec::new();
        action(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn move_to_is_one_based() {
        assert_eq!(written(|out| move_to(out, 3, 7)), "\x1b[3;7H");
        assert_eq!(written(|out| move_to(out, 0, 0)), "\x1b[1;1H");
    }

    #[test]
    fn relative_moves_emit_csi_sequences() {
        assert_eq!(written(|out| up(out, 2)), "\x1b[2A");
        assert_eq!(written(|out| down(out, 4)), "\x1b[4B");
        assert_eq!(written(|out| forward(out, 1)), "\x1b[1C");
        assert_eq!(written(|out| backward(out, 5)), "\x1b[5D");
    }

    #[test]
    fn clear_screen_homes_cursor() {
        assert_eq!(written(clear_screen), "\x1b[2J\x1b[1;1H");
    }

    #[test]
    fn erase_to_eol_clears_rest_of_line() {
        assert_eq!(written(erase_to_eol), "\x1b[K");
    }

    #[test]
    fn save_and_restore_produce_output() {
        assert!(!written(save_position).is_empty());
        assert!(!written(restore_position).is_empty());
    }
}

use crate::{Coords, TermInt};
use std::{io::{self, Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{
    poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind,
};

/// What was last drawn to one terminal cell.
#[derive(Copy, Clone, PartialEq)]
struct Glyph {
    ch: char,
    fg: Color,
    bg: Color,
}

const BLANK: Glyph = Glyph { ch: ' ', fg: Color::Reset, bg: Color::Reset };

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<Glyph>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![BLANK; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None })
    }

    pub fn setup(&mut self) -> io::Result<()> {
        execute!(
            self.stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            cursor::DisableBlinking
        )?;
        terminal::enable_raw_mode()
    }

    /// Undoes `setup`. Works without a manager so it can run after one was
    /// dropped.
    pub fn restore() -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            cursor::Show,
            cursor::EnableBlinking,
            LeaveAlternateScreen
        )
    }

    pub fn read_key_blocking(&self) -> io::Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                if ev.kind != KeyEventKind::Release {
                    return Ok(ev);
                }
            }
        }
    }

    /// Drains every pending input event without blocking.
    pub fn read_events_queue(&self) -> io::Result<Vec<Event>> {
        let mut events = vec![];

        while poll(Duration::from_millis(0))? {
            events.push(read()?);
        }

        Ok(events)
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    /// Adopts a new terminal size. Everything must be redrawn afterwards.
    pub fn resize(&mut self, width: TermInt, height: TermInt) -> io::Result<()> {
        self.width = width;
        self.height = height;
        self.current_msg = None;
        self.clear()
    }

    /// Frame around the rectangle whose inner top-left is `inner` and inner
    /// size is `size`.
    pub fn draw_borders(&mut self, inner: Coords, size: Coords) {
        let (left, top) = (inner.0 - 1, inner.1 - 1);
        let (right, bottom) = (inner.0 + size.0, inner.1 + size.1);

        for x in left..=right {
            let ch = if x == left || x == right {'+'} else {'-'};
            self.print_at((x, top), ch);
            self.print_at((x, bottom), ch);
        }

        for y in inner.1..bottom {
            self.print_at((left, y), '|');
            self.print_at((right, y), '|');
        }
    }

    pub fn show_message(&mut self, lines: &[&str]) {
        if self.has_message() {
            self.hide_message();
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ');
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch);
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
    }

    pub fn hide_message(&mut self) {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return,
        };
        let top_left = msg.top_left();

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height() {
            for x_diff in 0..msg.width() {
                let pos = (top_left.0 + x_diff, top_left.1 + y_diff);
                if let Some(glyph) = self.glyph_at(pos) {
                    self.emit(pos, glyph);
                }
            }
        }
    }

    pub fn print_at(&mut self, pos: Coords, ch: char) {
        self.print_colored(pos, ch, Color::Reset, Color::Reset);
    }

    pub fn print_colored(&mut self, pos: Coords, ch: char, fg: Color, bg: Color) {
        if pos.0 >= self.width || pos.1 >= self.height {
            return;
        }

        let glyph = Glyph { ch, fg, bg };
        let idx = self.index(pos);
        if self.screen[idx] == glyph {
            return;
        }

        self.screen[idx] = glyph;
        // Leave whatever the message box covers alone until it is hidden
        if !self.covered_by_message(pos) {
            self.emit(pos, glyph);
        }
    }

    pub fn print_str(&mut self, pos: Coords, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            self.print_at((pos.0 + i as TermInt, pos.1), ch);
        }
    }

    pub fn clear(&mut self) -> io::Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![BLANK; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: Coords) -> usize {
        self.width as usize * pos.1 as usize + pos.0 as usize
    }

    fn glyph_at(&self, pos: Coords) -> Option<Glyph> {
        if pos.0 >= self.width || pos.1 >= self.height {
            return None;
        }
        Some(self.screen[self.index(pos)])
    }

    fn covered_by_message(&self, pos: Coords) -> bool {
        match &self.current_msg {
            Some(msg) => {
                let (x, y) = msg.top_left();
                pos.0 >= x && pos.0 < x + msg.width() && pos.1 >= y && pos.1 < y + msg.height()
            }
            None => false,
        }
    }

    fn emit(&mut self, pos: Coords, glyph: Glyph) {
        // Queued output only fails once stdout is gone; the next flush reports it
        let _ = queue!(
            self.stdout,
            cursor::MoveTo(pos.0, pos.1),
            style::PrintStyledContent(glyph.ch.with(glyph.fg).on(glyph.bg))
        );
    }

    fn print_at_no_save(&mut self, pos: Coords, ch: char) {
        // To be used for printing messages, where we don't wanna overwrite our
        // local buffer to restore it when the message is hidden
        if pos.0 < self.width && pos.1 < self.height {
            self.emit(pos, Glyph { ch, fg: Color::White, bg: Color::Black });
        }
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: Coords) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> Coords {
        self.top_left
    }
}

use super::theme::Theme;
use crate::application::format::{format_date, summary_rows};
use crate::domain::{
    BookingRequest, DisabledDateIndex, PriceBreakdown, PropertyListing, Selection,
    SelectionSession, SessionState, Transition,
};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::tty::IsTty;
use log::warn;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::io::{self, Stdout, stdout};

#[derive(Debug, Clone)]
pub enum CalendarResult {
    /// User left the calendar (quit, escape, ctrl+c)
    Exited,
    /// User asked to book the complete selection (pressed c)
    ConfirmRequested(BookingRequest),
}

pub struct CalendarView<'a> {
    /// Start of the week holding the cursor (middle row)
    current_week_start: NaiveDate,
    /// Day under the cursor
    cursor: NaiveDate,
    today: NaiveDate,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    should_exit: bool,
    confirm_requested: Option<BookingRequest>,
    show_help: bool,
    /// Last message for the user, e.g. a rejected range
    notice: Option<String>,
    theme: Theme,
    currency_symbol: String,
    session: &'a mut SelectionSession,
}

impl<'a> CalendarView<'a> {
    pub fn new(
        today: NaiveDate,
        session: &'a mut SelectionSession,
        theme: Theme,
        currency_symbol: String,
        notice: Option<String>,
    ) -> io::Result<Self> {
        if !IsTty::is_tty(&std::io::stdout()) {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "Not running in a TTY, cannot initialize terminal interface",
            ));
        }
        if session.state() == SessionState::Uninitialized {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Open a property before starting the calendar",
            ));
        }

        enable_raw_mode()
            .map_err(|e| io::Error::other(format!("Failed to enable raw mode: {}", e)))?;

        stdout().execute(EnterAlternateScreen).map_err(|e| {
            let _ = disable_raw_mode(); // Clean up on failure
            io::Error::other(format!("Failed to enter alternate screen: {}", e))
        })?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend).map_err(|e| {
            let _ = disable_raw_mode();
            let _ = stdout().execute(LeaveAlternateScreen);
            io::Error::other(format!("Failed to create terminal: {}", e))
        })?;

        // Start on the check-in day if there is one
        let cursor = match session.selection() {
            Selection::Partial { from } | Selection::Complete { from, .. } => from,
            Selection::Idle => today,
        };

        Ok(Self {
            current_week_start: get_week_start(cursor),
            cursor,
            today,
            terminal,
            should_exit: false,
            confirm_requested: None,
            show_help: false,
            notice,
            theme,
            currency_symbol,
            session,
        })
    }

    fn move_cursor(&mut self, days: i64) {
        self.cursor += Duration::days(days);
        self.current_week_start = get_week_start(self.cursor);
    }

    fn pick_cursor_day(&mut self) {
        match self.session.pick_day(self.cursor) {
            Ok(transition) => self.notice = transition_notice(&transition),
            Err(e) => {
                warn!("Calendar selection failed: {}", e);
                self.notice = Some(e.to_string());
            }
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => {
                self.should_exit = true;
            }
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
                self.should_exit = true;
            }

            (KeyCode::Left, _) | (KeyCode::Char('h'), _) => self.move_cursor(-1),
            (KeyCode::Right, _) | (KeyCode::Char('l'), _) => self.move_cursor(1),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => self.move_cursor(-7),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => self.move_cursor(7),
            (KeyCode::PageUp, _) => self.move_cursor(-30),
            (KeyCode::PageDown, _) => self.move_cursor(30),
            (KeyCode::Char('t'), _) => {
                self.cursor = self.today;
                self.current_week_start = get_week_start(self.cursor);
            }

            (KeyCode::Char(' '), _) | (KeyCode::Enter, _) => self.pick_cursor_day(),

            (KeyCode::Char('x'), _) | (KeyCode::Backspace, _) => {
                if self.session.clear().is_ok() {
                    self.notice = None;
                }
            }

            (KeyCode::Char('c'), _) => match self.session.confirmation() {
                Some(request) => {
                    self.confirm_requested = Some(request);
                    self.should_exit = true;
                }
                None => {
                    self.notice = Some("Select a check-in and a check-out day first".to_string());
                }
            },

            (KeyCode::Char('?'), _) => {
                self.show_help = !self.show_help;
            }

            _ => {}
        }
    }

    pub fn run(&mut self) -> io::Result<CalendarResult> {
        loop {
            if self.should_exit {
                break;
            }

            // Snapshot everything the frame needs before borrowing the terminal
            let disabled = self.session.disabled_dates().cloned().unwrap_or_default();
            let listing = self.session.listing().cloned();
            let selection = self.session.selection();
            let breakdown = match self.session.price_breakdown() {
                Ok(breakdown) => breakdown,
                Err(e) => {
                    self.notice = Some(e.to_string());
                    None
                }
            };
            let marks = DayMarks {
                cursor: self.cursor,
                today: self.today,
                selection,
                disabled: &disabled,
            };
            let current_week_start = self.current_week_start;
            let show_help = self.show_help;
            let notice = self.notice.clone();
            let symbol = self.currency_symbol.as_str();
            let theme = &self.theme;

            self.terminal.draw(|frame| {
                let size = frame.area();

                const CALENDAR_HEIGHT: u16 = 9;
                const SUMMARY_HEIGHT: u16 = 9;
                const HELP_HEIGHT: u16 = 4;
                const CALENDAR_WIDTH: u16 = 64;

                let total_height = if show_help {
                    CALENDAR_HEIGHT + SUMMARY_HEIGHT + HELP_HEIGHT
                } else {
                    CALENDAR_HEIGHT + SUMMARY_HEIGHT + 1
                };
                let area = calculate_centered_area(size, CALENDAR_WIDTH, total_height);

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(CALENDAR_HEIGHT),
                        Constraint::Length(SUMMARY_HEIGHT),
                        Constraint::Min(1),
                    ])
                    .split(area);

                let table = create_calendar_table(current_week_start, &marks, theme);
                frame.render_widget(table, chunks[0]);

                let summary = create_summary(
                    listing.as_ref(),
                    &selection,
                    breakdown.as_ref(),
                    symbol,
                    theme,
                );
                frame.render_widget(summary, chunks[1]);

                let footer = create_footer(marks.cursor, notice.as_deref(), show_help, theme);
                frame.render_widget(footer, chunks[2]);
            })?;

            if poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        self.cleanup()?;

        Ok(match self.confirm_requested.take() {
            Some(request) => CalendarResult::ConfirmRequested(request),
            None => CalendarResult::Exited,
        })
    }

    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        Ok(())
    }
}

impl Drop for CalendarView<'_> {
    fn drop(&mut self) {
        // Fallback cleanup if explicit cleanup wasn't called
        let _ = self.cleanup();
    }
}

/// What the calendar needs to know to paint a day.
struct DayMarks<'d> {
    cursor: NaiveDate,
    today: NaiveDate,
    selection: Selection,
    disabled: &'d DisabledDateIndex,
}

/// Sunday on or before `date`.
fn get_week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

fn in_selection(date: NaiveDate, selection: &Selection) -> bool {
    match *selection {
        Selection::Idle => false,
        Selection::Partial { from } => date == from,
        Selection::Complete { from, to } => date >= from && date <= to,
    }
}

/// User-facing line for a selection transition.
pub fn transition_notice(transition: &Transition) -> Option<String> {
    match transition {
        Transition::Started { from } => Some(format!(
            "Check-in {}. Pick a check-out day.",
            format_date(*from)
        )),
        Transition::Completed { from, to } => Some(format!(
            "{} to {} selected. Press c to book.",
            format_date(*from),
            format_date(*to)
        )),
        Transition::Rejected { conflicts, .. } => Some(match conflicts.first() {
            Some(first) => format!(
                "Some dates are not available (first: {}). Please choose another range.",
                format_date(*first)
            ),
            None => "Some dates are not available. Please choose another range.".to_string(),
        }),
        Transition::Degenerate { .. } => {
            Some("Check-out must be at least one night after check-in.".to_string())
        }
        Transition::Opened { .. } | Transition::Cleared | Transition::Closed => None,
    }
}

fn day_style(date: NaiveDate, is_focused_week: bool, marks: &DayMarks<'_>, theme: &Theme) -> Style {
    let base = if marks.disabled.contains(date) {
        theme.blocked_style()
    } else if in_selection(date, &marks.selection) {
        theme.selected_style()
    } else if date == marks.today {
        Style::default()
            .fg(theme.colors.today)
            .add_modifier(Modifier::BOLD)
    } else if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        Style::default().fg(theme.colors.weekend)
    } else if is_focused_week {
        Style::default().fg(theme.colors.focused)
    } else {
        Style::default().fg(theme.colors.dimmed)
    };

    if date == marks.cursor {
        base.bg(theme.colors.cursor_bg)
            .add_modifier(Modifier::UNDERLINED)
    } else {
        base
    }
}

fn create_week_row(
    week_start: NaiveDate,
    is_focused: bool,
    marks: &DayMarks<'_>,
    theme: &Theme,
) -> Row<'static> {
    let cells: Vec<Cell> = (0..7)
        .map(|i| week_start + Duration::days(i))
        .map(|date| {
            let day = date.day();
            // Month indicator on the 1st
            let text = if day == 1 {
                format!("{} {}", date.format("%b"), day)
            } else {
                day.to_string()
            };
            Cell::from(text).style(day_style(date, is_focused, marks, theme))
        })
        .collect();

    let row = Row::new(cells);
    if is_focused {
        row.style(Style::default().bg(theme.colors.focused_week_bg))
    } else {
        row
    }
}

fn create_calendar_table(
    current_week_start: NaiveDate,
    marks: &DayMarks<'_>,
    theme: &Theme,
) -> Table<'static> {
    // 5 weeks: 2 before, focused week, 2 after
    let rows: Vec<Row> = (-2..=2)
        .map(|offset| {
            let week_start = current_week_start + Duration::weeks(offset);
            create_week_row(week_start, offset == 0, marks, theme)
        })
        .collect();

    let header = Row::new(
        ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let color = if i == 0 || i == 6 {
                    theme.colors.weekend
                } else {
                    theme.colors.header
                };
                Cell::from(name).style(Style::default().fg(color))
            }),
    )
    .height(1);

    Table::new(rows, [Constraint::Ratio(1, 7); 7])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::NONE)
                .title(marks.cursor.format("%B %Y").to_string())
                .title_style(Style::default().fg(theme.colors.header))
                .title_alignment(Alignment::Center),
        )
        .column_spacing(1)
}

fn create_summary(
    listing: Option<&PropertyListing>,
    selection: &Selection,
    breakdown: Option<&PriceBreakdown>,
    symbol: &str,
    theme: &Theme,
) -> Paragraph<'static> {
    let mut lines = Vec::new();

    if let Some(listing) = listing {
        lines.push(Line::from(Span::styled(
            listing.name.clone(),
            Style::default()
                .fg(theme.colors.header)
                .add_modifier(Modifier::BOLD),
        )));
    }

    match (listing, breakdown) {
        (Some(listing), Some(breakdown)) => {
            let rows = summary_rows(listing, breakdown, symbol);
            let last = rows.len().saturating_sub(1);
            for (i, (label, amount)) in rows.into_iter().enumerate() {
                let style = if i == last {
                    Style::default()
                        .fg(theme.colors.total)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.colors.focused)
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{:<28}", label), style),
                    Span::styled(format!("{:>14}", amount), style),
                ]));
            }
        }
        _ => {
            let hint = match selection {
                Selection::Partial { from } => {
                    format!("Check-in {}. Pick a check-out day.", format_date(*from))
                }
                _ => "Pick a check-in day to see the price.".to_string(),
            };
            lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(theme.colors.dimmed),
            )));
        }
    }

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::TOP).title("Summary"))
        .alignment(Alignment::Left)
}

fn create_footer(
    cursor: NaiveDate,
    notice: Option<&str>,
    show_help: bool,
    theme: &Theme,
) -> Paragraph<'static> {
    let mut lines = Vec::new();

    if let Some(notice) = notice {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(theme.colors.notice),
        )));
    }

    if show_help {
        lines.push(Line::from(Span::styled(
            "↑↓/jk=Week • ←→/hl=Day • PgUp/PgDn=Month • t=Today",
            Style::default().fg(theme.colors.dimmed),
        )));
        lines.push(Line::from(Span::styled(
            "Space=Pick • x=Clear • c=Book • q=Quit",
            Style::default().fg(theme.colors.dimmed),
        )));
        lines.push(Line::from(Span::styled(
            cursor.format("%A, %B %d, %Y").to_string(),
            Style::default().fg(theme.colors.focused),
        )));
    }

    Paragraph::new(lines).alignment(Alignment::Center)
}

/// Centre a box of the given size inside `available`.
fn calculate_centered_area(available: Rect, needed_width: u16, needed_height: u16) -> Rect {
    let width = available.width.min(needed_width);
    let height = available.height.min(needed_height);

    Rect {
        x: available.x + (available.width - width) / 2,
        y: available.y + (available.height - height) / 2,
        width,
        height,
    }
}

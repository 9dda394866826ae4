use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::SlashCommand;
use crate::domain::models::TextArea;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;

fn header_line(app_state: &AppState) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!(" {} |", Config::get(ConfigKey::Username)),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for toggle in &app_state.toggles {
        let style = if toggle.enabled {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
        };
        spans.push(Span::styled(format!(" {} ", toggle.name), style));
    }

    if app_state.submitting {
        spans.push(Span::styled(" Sending...", Style::default().fg(Color::Yellow)));
    } else if !app_state.analyzing.is_empty() {
        spans.push(Span::styled(" Analyzing...", Style::default().fg(Color::Yellow)));
    }

    if let Some(status) = app_state.status_line.as_ref() {
        spans.push(Span::styled(
            format!(" {status}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    return Line::from(spans);
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    events: &mut EventsService,
) -> Result<()> {
    let mut textarea = TextArea::default();

    #[cfg(feature = "dev")]
    {
        let test_str = "Which language has the best compiler error messages? Keep it short.";
        for char in test_str.chars() {
            textarea.input(tui_textarea::Input {
                key: tui_textarea::Key::Char(char),
                ctrl: false,
                alt: false,
            });
        }
    }

    loop {
        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    Constraint::Length(1),
                    Constraint::Min(1),
                    Constraint::Max(4),
                ])
                .split(frame.size());

            if layout[1].width != app_state.last_known_width
                || layout[1].height != app_state.last_known_height
            {
                app_state.set_rect(layout[1]);
            }

            frame.render_widget(Paragraph::new(header_line(app_state)), layout[0]);

            app_state
                .panel_list
                .render(frame, layout[1], app_state.scroll.position);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                layout[1].inner(&Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut app_state.scroll.scrollbar_state,
            );

            frame.render_widget(textarea.widget(), layout[2]);
        })?;

        match events.next().await? {
            Event::KeyboardCTRLC() => break,
            Event::KeyboardCharInput(input) => {
                textarea.input(input);
                app_state.status_line = None;
            }
            Event::KeyboardPaste(text) => {
                textarea.insert_str(&text);
            }
            Event::KeyboardEnter() => {
                let input_str = &textarea.lines().join("\n");
                if input_str.trim().is_empty() {
                    continue;
                }

                if let Some(command) = SlashCommand::parse(input_str) {
                    let (should_break, should_continue) =
                        app_state.handle_slash_commands(&command, &tx)?;
                    textarea = TextArea::default();

                    if should_break {
                        break;
                    }
                    if should_continue {
                        continue;
                    }
                }

                if app_state.handle_submit(input_str, &tx)? {
                    textarea = TextArea::default();
                }
            }
            Event::UIScrollUp() => app_state.scroll.up(),
            Event::UIScrollDown() => app_state.scroll.down(),
            Event::UIScrollPageUp() => app_state.scroll.up_page(),
            Event::UIScrollPageDown() => app_state.scroll.down_page(),
            Event::UITick() => continue,
            event => {
                app_state.handle_worker_event(event, &tx)?;
            }
        }
    }

    tx.send(Action::ReleaseAll())?;
    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    disable_raw_mode().unwrap();
    crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )
    .unwrap();
    crossterm::execute!(io::stdout(), cursor::Show).unwrap();
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut app_state = AppState::new()?;
    let mut events = EventsService::new(rx);

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    start_loop(&mut terminal, &mut app_state, tx, &mut events).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return Ok(());
}

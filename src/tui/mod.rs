pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Hold back warnings so they don't corrupt the display
    crate::stderr_buffer::activate();

    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(250);

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => app.update_flash(),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    ratatui::restore();

    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        app::InputMode::AddStudent => match key.code {
            KeyCode::Enter => app.confirm_add_student(),
            KeyCode::Esc => app.cancel_add_student(),
            KeyCode::Backspace => {
                app.name_input.pop();
            }
            KeyCode::Char(c) => app.name_input.push(c),
            _ => {}
        },
        // Any key closes help
        app::InputMode::Help => app.dismiss_help(),
        app::InputMode::Normal => match app.screen {
            app::Screen::Students => handle_students_key(app, key),
            app::Screen::Detail => handle_detail_key(app, key),
            app::Screen::Scoring => handle_scoring_key(app, key, ctrl),
        },
    }
}

fn handle_students_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.next_row(),
        KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('a') => app.start_add_student(),
        KeyCode::Char('?') => app.show_help(),
        _ => {}
    }
}

fn handle_detail_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => app.back_to_students(),
        KeyCode::Tab => app.next_tab(),
        KeyCode::Char('n') => app.start_scoring(),
        KeyCode::Char('p') => app.print_report(),
        KeyCode::Char('e') => app.email_parent(),
        KeyCode::Char('?') => app.show_help(),
        _ => {}
    }
}

fn handle_scoring_key(app: &mut App, key: KeyEvent, ctrl: bool) {
    match key.code {
        KeyCode::Char('s') if ctrl => app.save_session(),
        KeyCode::Char('l') if ctrl => app.form_toggle_level(),
        KeyCode::Esc => app.cancel_scoring(),
        KeyCode::Tab => app.form_next_field(),
        KeyCode::BackTab => app.form_previous_field(),
        KeyCode::Down | KeyCode::Enter => app.form_down(),
        KeyCode::Up => app.form_up(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(c) if !ctrl => app.form_input_char(c),
        _ => {}
    }
}

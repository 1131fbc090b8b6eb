use chrono::NaiveDate;
use std::time::Instant;

use crate::config::Config;
use crate::rubric::{ReviewLevel, RubricDefinition};
use crate::scoring::ScoringError;
use crate::session::{ScoringSession, DATE_FORMAT};
use crate::student::StudentRecord;
use crate::tracker::{SaveError, Tracker};
use crate::tui::theme::ThemeColors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Students,
    Detail,
    Scoring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    AddStudent,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Score,
    History,
    Actions,
}

impl DetailTab {
    pub const ALL: [DetailTab; 3] = [DetailTab::Score, DetailTab::History, DetailTab::Actions];

    pub fn title(&self) -> &'static str {
        match self {
            DetailTab::Score => "Score",
            DetailTab::History => "History",
            DetailTab::Actions => "Actions",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            DetailTab::Score => 0,
            DetailTab::History => 1,
            DetailTab::Actions => 2,
        }
    }

    fn next(&self) -> Self {
        match self {
            DetailTab::Score => DetailTab::History,
            DetailTab::History => DetailTab::Actions,
            DetailTab::Actions => DetailTab::Score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Date,
    Surah,
    Ayah,
    Notes,
    Scores,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Date => "Date",
            FormField::Surah => "Surah",
            FormField::Ayah => "Ayahs",
            FormField::Notes => "Notes",
            FormField::Scores => "Scores",
        }
    }

    fn next(&self) -> Self {
        match self {
            FormField::Date => FormField::Surah,
            FormField::Surah => FormField::Ayah,
            FormField::Ayah => FormField::Notes,
            FormField::Notes => FormField::Scores,
            FormField::Scores => FormField::Date,
        }
    }

    fn previous(&self) -> Self {
        match self {
            FormField::Date => FormField::Scores,
            FormField::Surah => FormField::Date,
            FormField::Ayah => FormField::Surah,
            FormField::Notes => FormField::Ayah,
            FormField::Scores => FormField::Notes,
        }
    }
}

/// Scoring form state for one student. The date is edited as text and only
/// checked when the session is saved.
pub struct ScoringForm {
    pub student_id: u64,
    pub session: ScoringSession,
    pub date_input: String,
    pub focus: FormField,
    /// Index into the rubric's flattened sub-criteria
    pub selected: usize,
}

impl ScoringForm {
    pub fn new(student_id: u64, level: ReviewLevel) -> Self {
        let session = ScoringSession::new(level);
        let date_input = session.draft().date.clone();
        Self {
            student_id,
            session,
            date_input,
            focus: FormField::Date,
            selected: 0,
        }
    }

    pub fn rubric(&self) -> &'static RubricDefinition {
        self.session.rubric()
    }

    /// (category key, sub index) of the highlighted row
    pub fn selected_criterion(&self) -> Option<(&'static str, usize)> {
        self.rubric()
            .iter_sub_criteria()
            .nth(self.selected)
            .map(|(key, idx, _)| (key, idx))
    }

    pub fn field_text(&self, field: FormField) -> &str {
        match field {
            FormField::Date => &self.date_input,
            FormField::Surah => &self.session.draft().surah,
            FormField::Ayah => &self.session.draft().ayah_range,
            FormField::Notes => &self.session.draft().notes,
            FormField::Scores => "",
        }
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut String)) {
        let mut text = self.field_text(self.focus).to_string();
        edit(&mut text);
        match self.focus {
            FormField::Date => self.date_input = text,
            FormField::Surah => self.session.set_surah(text),
            FormField::Ayah => self.session.set_ayah_range(text),
            FormField::Notes => self.session.set_notes(text),
            FormField::Scores => {}
        }
    }

    /// Replace the highlighted value with `edit(current)`. No highlighted
    /// row is a no-op.
    fn edit_selected(&mut self, edit: impl FnOnce(i64) -> i64) -> Result<(), ScoringError> {
        let Some((key, idx)) = self.selected_criterion() else {
            return Ok(());
        };
        let current = self.session.score(key, idx) as i64;
        self.session.set_score(key, idx, edit(current))?;
        Ok(())
    }

    /// Append a digit to the highlighted value. The result is clamped.
    fn push_digit(&mut self, digit: char) -> Result<(), ScoringError> {
        let digit = digit.to_digit(10).unwrap_or(0) as i64;
        self.edit_selected(|current| current * 10 + digit)
    }

    fn adjust_score(&mut self, delta: i64) -> Result<(), ScoringError> {
        self.edit_selected(|current| current + delta)
    }

    fn pop_digit(&mut self) -> Result<(), ScoringError> {
        self.edit_selected(|current| current / 10)
    }

    fn toggle_level(&mut self) {
        let level = self.session.level().toggled();
        self.session.set_level(level);
        self.selected = 0;
    }
}

pub struct App {
    pub tracker: Tracker,
    pub config: Config,
    pub theme: ThemeColors,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub detail_tab: DetailTab,
    pub table_state: ratatui::widgets::TableState,
    pub current_student: Option<u64>,
    pub name_input: String,
    pub form: Option<ScoringForm>,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
    pub verbose: bool,
}

impl App {
    pub fn new(tracker: Tracker, config: Config, theme: ThemeColors, verbose: bool) -> Self {
        let mut table_state = ratatui::widgets::TableState::default();
        if !tracker.students().is_empty() {
            table_state.select(Some(0));
        }

        Self {
            tracker,
            config,
            theme,
            screen: Screen::Students,
            input_mode: InputMode::Normal,
            detail_tab: DetailTab::Score,
            table_state,
            current_student: None,
            name_input: String::new(),
            form: None,
            flash_message: None,
            should_quit: false,
            verbose,
        }
    }

    pub fn students(&self) -> &[StudentRecord] {
        self.tracker.students()
    }

    pub fn next_row(&mut self) {
        let len = self.students().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.students().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_student(&self) -> Option<&StudentRecord> {
        self.table_state
            .selected()
            .and_then(|i| self.students().get(i))
    }

    /// Student shown on the detail and scoring screens
    pub fn current_student(&self) -> Option<&StudentRecord> {
        self.current_student.and_then(|id| self.tracker.student(id))
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed() >= self.config.flash_duration() {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    pub fn start_add_student(&mut self) {
        self.input_mode = InputMode::AddStudent;
        self.name_input.clear();
    }

    pub fn cancel_add_student(&mut self) {
        self.input_mode = InputMode::Normal;
        self.name_input.clear();
    }

    /// Add the typed name. A blank name closes the input without changes.
    pub fn confirm_add_student(&mut self) {
        let name = std::mem::take(&mut self.name_input);
        self.input_mode = InputMode::Normal;

        match self.tracker.add_student(&name) {
            Ok(Some(id)) => {
                if let Some(pos) = self.tracker.roster().position(id) {
                    self.table_state.select(Some(pos));
                }
                self.show_flash(format!("Added: {}", name.trim()));
            }
            Ok(None) => {}
            Err(e) => {
                // Student is still in memory; select it so the user can carry on
                if let Some(pos) = self.students().len().checked_sub(1) {
                    self.table_state.select(Some(pos));
                }
                self.show_flash(save_failure(&e));
            }
        }
    }

    pub fn open_selected(&mut self) {
        if let Some(id) = self.selected_student().map(|s| s.id()) {
            self.current_student = Some(id);
            self.detail_tab = DetailTab::Score;
            self.screen = Screen::Detail;
        }
    }

    pub fn next_tab(&mut self) {
        self.detail_tab = self.detail_tab.next();
    }

    pub fn back_to_students(&mut self) {
        self.screen = Screen::Students;
        self.current_student = None;
    }

    pub fn start_scoring(&mut self) {
        if let Some(id) = self.current_student {
            self.form = Some(ScoringForm::new(id, self.config.default_level()));
            self.screen = Screen::Scoring;
        }
    }

    pub fn cancel_scoring(&mut self) {
        self.form = None;
        self.screen = Screen::Detail;
        self.show_flash("Session discarded".to_string());
    }

    /// Finalize the form into a session and save it. An invalid date keeps
    /// the form open.
    pub fn save_session(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let date = match NaiveDate::parse_from_str(form.date_input.trim(), DATE_FORMAT) {
            Ok(date) => date.format(DATE_FORMAT).to_string(),
            Err(_) => {
                let msg = format!("Invalid date '{}' (use YYYY-MM-DD)", form.date_input);
                form.focus = FormField::Date;
                self.show_flash(msg);
                return;
            }
        };
        form.session.set_date(date);

        let Some(form) = self.form.take() else {
            return;
        };
        let student_id = form.student_id;
        let record = form.session.finalize();
        let total = record.total_score();

        self.screen = Screen::Detail;
        self.detail_tab = DetailTab::History;
        match self.tracker.record_session(student_id, record) {
            Ok(()) => {
                let name = self
                    .current_student()
                    .map(|s| s.name().to_string())
                    .unwrap_or_default();
                self.show_flash(format!("Saved session for {} ({}/100)", name, total));
            }
            Err(e) => self.show_flash(save_failure(&e)),
        }
    }

    pub fn form_next_field(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.focus = form.focus.next();
        }
    }

    pub fn form_previous_field(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.focus = form.focus.previous();
        }
    }

    /// Down arrow: next score row, or next field outside the score list
    pub fn form_down(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.focus == FormField::Scores {
            let count = form.rubric().sub_criteria_count();
            if count > 0 {
                form.selected = (form.selected + 1) % count;
            }
        } else {
            form.focus = form.focus.next();
        }
    }

    pub fn form_up(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.focus == FormField::Scores {
            let count = form.rubric().sub_criteria_count();
            if form.selected == 0 {
                form.selected = count.saturating_sub(1);
            } else {
                form.selected -= 1;
            }
        } else {
            form.focus = form.focus.previous();
        }
    }

    pub fn form_input_char(&mut self, c: char) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let result = match form.focus {
            FormField::Scores => match c {
                '0'..='9' => form.push_digit(c),
                '+' => form.adjust_score(1),
                '-' => form.adjust_score(-1),
                _ => Ok(()),
            },
            _ => {
                form.edit_text(|text| text.push(c));
                Ok(())
            }
        };
        self.flash_score_error(result);
    }

    pub fn form_backspace(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let result = match form.focus {
            FormField::Scores => form.pop_digit(),
            _ => {
                form.edit_text(|text| {
                    text.pop();
                });
                Ok(())
            }
        };
        self.flash_score_error(result);
    }

    fn flash_score_error(&mut self, result: Result<(), ScoringError>) {
        if let Err(e) = result {
            self.show_flash(format!("Score not changed: {}", e));
        }
    }

    pub fn form_toggle_level(&mut self) {
        let had_scores = self
            .form
            .as_ref()
            .is_some_and(|f| !f.session.scores().is_empty());
        if let Some(form) = self.form.as_mut() {
            form.toggle_level();
            let level = form.session.level();
            if had_scores {
                self.show_flash(format!("Switched to {} rubric; scores cleared", level));
            } else {
                self.show_flash(format!("Switched to {} rubric", level));
            }
        }
    }

    pub fn print_report(&mut self) {
        let Some(student) = self.current_student() else {
            return;
        };
        let msg = match crate::report::print_report_card(student, &self.config.report_dir()) {
            Ok(path) => format!("Report written to {}", path.display()),
            Err(e) => format!("Failed to print report: {:#}", e),
        };
        self.show_flash(msg);
    }

    pub fn email_parent(&mut self) {
        let Some(student) = self.current_student() else {
            return;
        };
        let recipient = self.config.parent_email(student.name());
        let msg = match crate::report::send_email_to_parent(student, recipient) {
            Ok(_) if recipient.is_none() => {
                format!("Opened email for {} (no parent address configured)", student.name())
            }
            Ok(_) => format!("Opened email for {}", student.name()),
            Err(e) => format!("Failed to open email: {:#}", e),
        };
        self.show_flash(msg);
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }
}

fn save_failure(e: &SaveError) -> String {
    match e {
        SaveError::Persist(err) => format!("Failed to save data: {:#}", err),
        SaveError::Roster(err) => format!("Failed: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn app() -> App {
        let tracker = Tracker::open(Box::new(MemoryStore::new()));
        App::new(tracker, Config::default(), ThemeColors::dark(), false)
    }

    fn app_with_student(name: &str) -> App {
        let mut app = app();
        app.start_add_student();
        app.name_input = name.to_string();
        app.confirm_add_student();
        app
    }

    #[test]
    fn test_add_student_selects_it() {
        let app = app_with_student("Maryam");
        assert_eq!(app.students().len(), 1);
        assert_eq!(app.selected_student().unwrap().name(), "Maryam");
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.flash_message.as_ref().unwrap().0.starts_with("Added"));
    }

    #[test]
    fn test_blank_name_is_noop() {
        let mut app = app();
        app.start_add_student();
        app.name_input = "   ".to_string();
        app.confirm_add_student();
        assert!(app.students().is_empty());
        assert!(app.flash_message.is_none());
    }

    #[test]
    fn test_row_navigation_wraps() {
        let mut app = app_with_student("A");
        app.start_add_student();
        app.name_input = "B".to_string();
        app.confirm_add_student();
        app.table_state.select(Some(1));
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(0));
        app.previous_row();
        assert_eq!(app.table_state.selected(), Some(1));
    }

    #[test]
    fn test_scoring_flow_saves_session() {
        let mut app = app_with_student("Yusuf");
        app.open_selected();
        assert_eq!(app.screen, Screen::Detail);
        app.start_scoring();
        assert_eq!(app.screen, Screen::Scoring);

        {
            let form = app.form.as_mut().unwrap();
            form.date_input = "2024-05-01".to_string();
        }
        app.form_next_field();
        for c in "Al-Ikhlas".chars() {
            app.form_input_char(c);
        }
        app.form_next_field();
        for c in "1-4".chars() {
            app.form_input_char(c);
        }
        app.form_next_field();
        app.form_next_field();
        // First row: pronunciation.0 (max 8); "1","2" clamps to 8
        app.form_input_char('1');
        app.form_input_char('2');
        assert_eq!(app.form.as_ref().unwrap().session.score("pronunciation", 0), 8);
        app.form_down();
        app.form_input_char('9');
        assert_eq!(app.form.as_ref().unwrap().session.total(), 17);

        app.save_session();
        assert!(app.form.is_none());
        assert_eq!(app.screen, Screen::Detail);
        let student = app.current_student().unwrap();
        assert_eq!(student.sessions().len(), 1);
        let session = &student.sessions()[0];
        assert_eq!(session.surah(), "Al-Ikhlas");
        assert_eq!(session.ayah_range(), "1-4");
        assert_eq!(session.total_score(), 17);
        assert_eq!(session.date(), "2024-05-01");
        assert_eq!(app.flash_message.as_ref().unwrap().0, "Saved session for Yusuf (17/100)");
    }

    #[test]
    fn test_invalid_date_keeps_form_open() {
        let mut app = app_with_student("Hafsa");
        app.open_selected();
        app.start_scoring();
        app.form.as_mut().unwrap().date_input = "yesterday".to_string();
        app.save_session();
        assert!(app.form.is_some());
        assert_eq!(app.screen, Screen::Scoring);
        assert!(app.current_student().unwrap().sessions().is_empty());
    }

    #[test]
    fn test_toggle_level_clears_scores() {
        let mut app = app_with_student("Idris");
        app.open_selected();
        app.start_scoring();
        app.form.as_mut().unwrap().focus = FormField::Scores;
        app.form_input_char('5');
        app.form_toggle_level();
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.session.level(), ReviewLevel::Advanced);
        assert!(form.session.scores().is_empty());
        assert_eq!(form.selected_criterion(), Some(("makhraj", 0)));
    }

    #[test]
    fn test_score_adjust_and_backspace() {
        let mut app = app_with_student("Sumayya");
        app.open_selected();
        app.start_scoring();
        app.form.as_mut().unwrap().focus = FormField::Scores;
        app.form_input_char('-');
        assert_eq!(app.form.as_ref().unwrap().session.score("pronunciation", 0), 0);
        app.form_input_char('+');
        app.form_input_char('+');
        assert_eq!(app.form.as_ref().unwrap().session.score("pronunciation", 0), 2);
        app.form_backspace();
        assert_eq!(app.form.as_ref().unwrap().session.score("pronunciation", 0), 0);
    }

    #[test]
    fn test_score_edits_report_lookup_errors() {
        let mut app = app_with_student("Suhayb");
        app.open_selected();
        app.start_scoring();
        app.flash_message = None;

        let form = app.form.as_mut().unwrap();
        form.focus = FormField::Scores;
        form.selected = form.rubric().sub_criteria_count();
        assert!(form.push_digit('5').is_ok());
        assert!(form.session.scores().is_empty());

        app.form_input_char('7');
        assert!(app.flash_message.is_none());

        app.flash_score_error(Err(ScoringError::UnknownCategory {
            level: ReviewLevel::Basic,
            key: "makhraj".to_string(),
        }));
        let (msg, _) = app.flash_message.as_ref().unwrap();
        assert!(msg.starts_with("Score not changed: Unknown category 'makhraj'"));
    }

    #[test]
    fn test_cancel_scoring_discards() {
        let mut app = app_with_student("Talha");
        app.open_selected();
        app.start_scoring();
        app.cancel_scoring();
        assert!(app.form.is_none());
        assert_eq!(app.screen, Screen::Detail);
        assert!(app.current_student().unwrap().sessions().is_empty());
    }

    #[test]
    fn test_tabs_cycle() {
        let mut app = app_with_student("Ruqayya");
        app.open_selected();
        app.next_tab();
        assert_eq!(app.detail_tab, DetailTab::History);
        app.next_tab();
        app.next_tab();
        assert_eq!(app.detail_tab, DetailTab::Score);
        app.back_to_students();
        assert_eq!(app.screen, Screen::Students);
        assert!(app.current_student().is_none());
    }
}

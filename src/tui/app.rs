//! Main TUI application state machine.
//!
//! Handles:
//! - Model loading at startup
//! - Input event handling
//! - Synchronous scoring on explicit submit

use std::io;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::pipeline::{resolve_model_path, TreePipeline, MODEL_PATH_ENV};
use crate::application::{AssessmentService, AssessmentState};
use crate::ports::Predictor;

use super::ui::{
    form::{render_form, FormState},
    render_caption, render_header,
    result::render_result,
};

/// Main application state
pub struct App<P: Predictor> {
    /// Scoring service; owns the loaded predictor
    service: AssessmentService<P>,

    /// Form input state
    form_state: FormState,

    /// Outcome of the last submission
    assessment: AssessmentState,

    /// Whether the app should quit
    should_quit: bool,
}

impl App<TreePipeline> {
    /// Create a new application with the pipeline artifact from its configured path.
    ///
    /// # Errors
    /// Returns error if the artifact is missing, corrupt, or incompatible.
    pub fn new() -> Result<Self> {
        let override_path = std::env::var(MODEL_PATH_ENV).ok();
        let exe = std::env::current_exe().ok();
        let model_path = resolve_model_path(override_path.as_deref(), exe.as_deref());

        if !model_path.exists() {
            return Err(anyhow!(
                "Model artifact not found at {:?}. Set {MODEL_PATH_ENV} to the pipeline JSON file.",
                model_path
            ));
        }

        // Refuse to start if the model cannot be loaded/verified.
        let pipeline = TreePipeline::load(&model_path)
            .map_err(|e| anyhow!("Failed to load model from {:?}: {}", model_path, e))?;

        Ok(Self::with_predictor(pipeline))
    }
}

impl<P: Predictor> App<P> {
    /// Create application with an injected predictor.
    pub fn with_predictor(predictor: P) -> Self {
        Self {
            service: AssessmentService::new(predictor),
            form_state: FormState::default(),
            assessment: AssessmentState::default(),
            should_quit: false,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Title + description
                Constraint::Min(0),    // Form | result
                Constraint::Length(2), // Caption
            ])
            .split(f.area());

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);

        render_header(f, chunks[0]);
        render_form(f, body[0], &self.form_state);
        render_result(f, body[1], &self.assessment);
        render_caption(f, chunks[2], &self.service.caption());
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('q') | KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('r') => {
                    self.form_state = FormState::default();
                    self.assessment = AssessmentState::default();
                }
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::BackTab => self.form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form_state.next_field(),
            KeyCode::Left => self.form_state.prev_choice(),
            KeyCode::Right => self.form_state.next_choice(),
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => self.form_state.delete_char(),
            KeyCode::Delete => self.form_state.clear_field(),
            KeyCode::Enter => self.submit(),
            _ => {}
        }
    }

    fn submit(&mut self) {
        match self.form_state.raw_inputs() {
            Ok(raw) => {
                self.form_state.error_message = None;
                self.assessment = self.service.submit(raw);
            }
            Err(e) => {
                // The last decision no longer matches what is on the form.
                self.form_state.error_message = Some(e);
                self.assessment = AssessmentState::default();
            }
        }
    }
}

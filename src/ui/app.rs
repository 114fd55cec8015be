use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};

use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::models::session::Fulfillment;
use crate::session::lifecycle::{Phase, SessionController, TickOutcome};
use crate::session::ticker::Ticker;

const REDRAW_INTERVAL: Duration = Duration::from_millis(250);
const INPUT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Duration,
    CustomTime,
    SessionType,
    Focus,
    Purpose,
    Outcome,
    Begin,
}

impl SetupField {
    const ORDER: [SetupField; 7] = [
        SetupField::Duration,
        SetupField::CustomTime,
        SetupField::SessionType,
        SetupField::Focus,
        SetupField::Purpose,
        SetupField::Outcome,
        SetupField::Begin,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectionField {
    Fulfilled,
    Reflection,
    Save,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

enum AppEvent {
    Key(KeyEvent),
    Tick(u64),
    Redraw,
}

pub struct App {
    pub controller: SessionController,
    pub setup_field: SetupField,
    pub reflection_field: ReflectionField,
    pub fulfillment_cursor: usize,
    pub logs: Vec<String>,
    ticker: Ticker,
    tick_rx: UnboundedReceiver<u64>,
}

impl App {
    pub fn new(controller: SessionController) -> Self {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            setup_field: SetupField::Duration,
            reflection_field: ReflectionField::Fulfilled,
            fulfillment_cursor: 0,
            logs: vec![],
            ticker: Ticker::new(tick_tx),
            tick_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        log::info!("Starting UI...");

        let shutdown_flag = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown_flag))?;
        signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown_flag))?;

        if let Err(e) = enable_raw_mode() {
            eprintln!("Failed to enable raw mode: {}. A real terminal is required.", e);
            return Err(anyhow::anyhow!("Terminal raw mode not supported: {}", e));
        }
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(anyhow::anyhow!("Failed to setup terminal: {}", e));
        }
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let (key_tx, key_rx) = mpsc::unbounded_channel();
        Self::start_input_reader(key_tx, Arc::clone(&shutdown_flag));

        let result = self.event_loop(&mut terminal, key_rx, &shutdown_flag).await;

        // the reader thread watches the same flag
        shutdown_flag.store(true, Ordering::Relaxed);
        self.ticker.stop();

        if let Err(e) = disable_raw_mode() {
            log::warn!("Failed to disable raw mode: {}", e);
        }
        if let Err(e) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
            log::warn!("Failed to leave alternate screen: {}", e);
        }
        if let Err(e) = terminal.show_cursor() {
            log::warn!("Failed to restore cursor: {}", e);
        }
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        mut key_rx: UnboundedReceiver<KeyEvent>,
        shutdown_flag: &AtomicBool,
    ) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if shutdown_flag.load(Ordering::Relaxed) {
                log::info!("Received shutdown signal, exiting...");
                break;
            }

            let event = tokio::select! {
                Some(key) = key_rx.recv() => AppEvent::Key(key),
                Some(generation) = self.tick_rx.recv() => AppEvent::Tick(generation),
                _ = tokio::time::sleep(REDRAW_INTERVAL) => AppEvent::Redraw,
            };

            match event {
                AppEvent::Key(key) => {
                    if self.handle_key(key) == Flow::Quit {
                        break;
                    }
                }
                AppEvent::Tick(generation) => self.handle_tick(generation),
                AppEvent::Redraw => {}
            }
        }
        Ok(())
    }

    // Blocking crossterm reads stay off the async task
    fn start_input_reader(tx: UnboundedSender<KeyEvent>, shutdown_flag: Arc<AtomicBool>) {
        std::thread::spawn(move || {
            while !shutdown_flag.load(Ordering::Relaxed) {
                match event::poll(INPUT_POLL) {
                    Ok(true) => match event::read() {
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            if tx.send(key).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            log::error!("Failed to read terminal event: {}", e);
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        log::error!("Failed to poll terminal events: {}", e);
                        break;
                    }
                }
            }
            log::debug!("Input reader stopped");
        });
    }

    fn draw(&self, f: &mut Frame) {
        crate::ui::render::draw(self, f);
    }

    pub fn handle_tick(&mut self, generation: u64) {
        if !self.ticker.is_current(generation) {
            log::debug!("Ignoring stale tick from generation {}", generation);
            return;
        }
        if self.controller.tick() == TickOutcome::Completed {
            self.push_log("Focus time complete - time to reflect".to_string());
            self.reflection_field = ReflectionField::Fulfilled;
            self.fulfillment_cursor = 0;
        }
        self.after_event();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        log::debug!("Key pressed: {:?}", key.code);

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        let flow = match self.controller.phase() {
            Phase::Setup(_) => self.handle_setup_key(key),
            Phase::Focus(_) => {
                self.handle_focus_key(key);
                Flow::Continue
            }
            Phase::Reflection(_) => {
                self.handle_reflection_key(key);
                Flow::Continue
            }
            Phase::History { .. } => {
                self.handle_history_key(key);
                Flow::Continue
            }
        };
        self.after_event();
        flow
    }

    fn handle_setup_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::F(2) => {
                if self.controller.open_history() {
                    self.push_log("Opened history".to_string());
                }
            }
            KeyCode::Tab | KeyCode::Down => self.move_setup_field(true),
            KeyCode::BackTab | KeyCode::Up => self.move_setup_field(false),
            KeyCode::Enter => {
                if self.setup_field == SetupField::Begin {
                    if self.controller.start_session() {
                        self.push_log("Focus session started".to_string());
                        self.setup_field = SetupField::Duration;
                    }
                } else {
                    self.move_setup_field(true);
                }
            }
            code => {
                let field = self.setup_field;
                let Some(draft) = self.controller.draft_mut() else {
                    return Flow::Continue;
                };
                match (field, code) {
                    (SetupField::Duration, KeyCode::Left) => draft.time_choice = draft.time_choice.cycle(false),
                    (SetupField::Duration, KeyCode::Right) => draft.time_choice = draft.time_choice.cycle(true),
                    (SetupField::SessionType, KeyCode::Left) => draft.cycle_session_type(false),
                    (SetupField::SessionType, KeyCode::Right) => draft.cycle_session_type(true),
                    (SetupField::CustomTime, KeyCode::Char(c)) if c.is_ascii_digit() => draft.custom_time.push(c),
                    (SetupField::CustomTime, KeyCode::Backspace) => {
                        draft.custom_time.pop();
                    }
                    (SetupField::Focus, KeyCode::Char(c)) => draft.session_focus.push(c),
                    (SetupField::Focus, KeyCode::Backspace) => {
                        draft.session_focus.pop();
                    }
                    (SetupField::Purpose, KeyCode::Char(c)) => draft.purpose.push(c),
                    (SetupField::Purpose, KeyCode::Backspace) => {
                        draft.purpose.pop();
                    }
                    (SetupField::Outcome, KeyCode::Char(c)) => draft.outcome.push(c),
                    (SetupField::Outcome, KeyCode::Backspace) => {
                        draft.outcome.pop();
                    }
                    _ => {}
                }
            }
        }
        Flow::Continue
    }

    fn move_setup_field(&mut self, forward: bool) {
        let custom = self
            .controller
            .draft()
            .is_some_and(|d| d.time_choice == crate::session::draft::TimeChoice::Custom);
        let order: Vec<SetupField> = SetupField::ORDER
            .iter()
            .copied()
            .filter(|f| custom || *f != SetupField::CustomTime)
            .collect();
        let len = order.len();
        let idx = order.iter().position(|f| *f == self.setup_field).unwrap_or(0);
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        self.setup_field = order[next];
    }

    fn handle_focus_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') => {
                self.controller.toggle_pause();
            }
            KeyCode::Char('e') => {
                if self.controller.end_session() {
                    self.push_log("Session ended early".to_string());
                    self.reflection_field = ReflectionField::Fulfilled;
                    self.fulfillment_cursor = 0;
                }
            }
            _ => {}
        }
    }

    fn handle_reflection_key(&mut self, key: KeyEvent) {
        match (self.reflection_field, key.code) {
            (_, KeyCode::Tab) | (_, KeyCode::Down) => {
                self.reflection_field = match self.reflection_field {
                    ReflectionField::Fulfilled => ReflectionField::Reflection,
                    ReflectionField::Reflection => ReflectionField::Save,
                    ReflectionField::Save => ReflectionField::Fulfilled,
                };
            }
            (_, KeyCode::BackTab) | (_, KeyCode::Up) => {
                self.reflection_field = match self.reflection_field {
                    ReflectionField::Fulfilled => ReflectionField::Save,
                    ReflectionField::Reflection => ReflectionField::Fulfilled,
                    ReflectionField::Save => ReflectionField::Reflection,
                };
            }
            (ReflectionField::Fulfilled, KeyCode::Left) => self.select_fulfillment(self.fulfillment_cursor.saturating_sub(1)),
            (ReflectionField::Fulfilled, KeyCode::Right) => self.select_fulfillment(self.fulfillment_cursor + 1),
            (ReflectionField::Fulfilled, KeyCode::Char(c @ '1'..='4')) => {
                self.select_fulfillment(c as usize - '1' as usize);
            }
            (ReflectionField::Fulfilled, KeyCode::Enter) => self.reflection_field = ReflectionField::Reflection,
            (ReflectionField::Reflection, KeyCode::Char(c)) => self.edit_reflection(|text| text.push(c)),
            (ReflectionField::Reflection, KeyCode::Backspace) => self.edit_reflection(|text| {
                text.pop();
            }),
            (ReflectionField::Reflection, KeyCode::Enter) => self.reflection_field = ReflectionField::Save,
            (ReflectionField::Save, KeyCode::Enter) => {
                if let Some(record) = self.controller.save_session() {
                    self.push_log(format!(
                        "Saved {} session: {} of {} minutes",
                        record.session_type.label(),
                        record.duration,
                        record.planned_duration
                    ));
                    self.setup_field = SetupField::Duration;
                }
            }
            _ => {}
        }
    }

    fn edit_reflection(&mut self, edit: impl FnOnce(&mut String)) {
        if let Some(form) = self.controller.reflection_form() {
            let mut text = form.reflection.clone();
            edit(&mut text);
            self.controller.set_reflection(text);
        }
    }

    fn select_fulfillment(&mut self, index: usize) {
        let index = index.min(Fulfillment::ALL.len() - 1);
        self.fulfillment_cursor = index;
        self.controller.set_fulfilled(Fulfillment::ALL[index]);
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        let drilled_down = self
            .controller
            .history_view()
            .is_some_and(|view| view.selected_date.is_some());

        match key.code {
            KeyCode::Esc | KeyCode::Backspace => {
                self.controller.history_back();
            }
            _ if drilled_down => {}
            KeyCode::Left => {
                self.controller.move_day_cursor(-1);
            }
            KeyCode::Right => {
                self.controller.move_day_cursor(1);
            }
            KeyCode::Up => {
                self.controller.move_day_cursor(-7);
            }
            KeyCode::Down => {
                self.controller.move_day_cursor(7);
            }
            KeyCode::PageUp | KeyCode::Char('[') => {
                self.controller.previous_month();
            }
            KeyCode::PageDown | KeyCode::Char(']') => {
                self.controller.next_month();
            }
            KeyCode::Enter => {
                self.controller.select_cursor_date();
            }
            _ => {}
        }
    }

    fn after_event(&mut self) {
        for diagnostic in self.controller.take_diagnostics() {
            self.push_log(diagnostic);
        }
        self.ticker.sync(self.controller.wants_ticks());
    }

    fn push_log(&mut self, message: String) {
        self.logs.push(format!("[{}] {}", Local::now().format("%H:%M:%S"), message));
    }
}

//! Terminal runtime: owns the screen and the event loop around [`Controller`].

use anyhow::{Context, Result};
use crossterm::{
    event::{Event as TermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use deploy_core::{Advisor, AdvisoryError, AdvisoryResult, RequestParameters};
use futures::StreamExt;
use ratatui::{Terminal, TerminalOptions, Viewport, backend::CrosstermBackend};
use std::{
    io::{self, Stdout},
    sync::Arc,
    time::Duration,
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time,
};

use crate::{
    app::{Controller, Effect, Event},
    render,
};

const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

type FetchOutcome = Result<AdvisoryResult, AdvisoryError>;

/// Raw mode (and the alternate screen, when used) for as long as it lives.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    alternate: bool,
    active: bool,
}

impl TerminalSession {
    fn enter(alternate: bool) -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw terminal mode")?;

        let mut stdout = io::stdout();
        let created = if alternate {
            execute!(stdout, EnterAlternateScreen)
                .context("Failed to enter the alternate screen")?;
            Terminal::new(CrosstermBackend::new(stdout))
        } else {
            Terminal::with_options(
                CrosstermBackend::new(stdout),
                TerminalOptions {
                    viewport: Viewport::Inline(1),
                },
            )
        };
        let terminal = created.context("Failed to initialise the terminal")?;

        Ok(Self {
            terminal,
            alternate,
            active: true,
        })
    }

    fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        if self.alternate {
            execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        } else {
            self.terminal.clear()?;
        }
        terminal::disable_raw_mode()?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::warn!(error = %err, "failed to restore terminal");
        }
    }
}

/// Key bindings. Anything unmapped is ignored.
pub fn map_key(key: KeyEvent) -> Option<Event> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Event::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Event::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(Event::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => Some(Event::Down),
        KeyCode::Enter => Some(Event::Confirm),
        _ => None,
    }
}

/// Runs the advisor on its own task and reports through `tx`. The task is not
/// cancelled if the receiver goes away first.
pub fn spawn_fetch(
    advisor: Arc<dyn Advisor>,
    params: RequestParameters,
    tx: mpsc::UnboundedSender<FetchOutcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = advisor.advise(&params).await;
        if tx.send(outcome).is_err() {
            tracing::debug!("fetch finished after the UI exited");
        }
    })
}

/// Drives `controller` until it reaches a terminal state or the user quits,
/// then hands it back with the terminal restored.
pub async fn run(mut controller: Controller, advisor: Arc<dyn Advisor>) -> Result<Controller> {
    let mut session = TerminalSession::enter(controller.is_selecting())?;

    let (tx, mut rx) = mpsc::unbounded_channel::<FetchOutcome>();
    let mut keys = EventStream::new();
    let mut ticker = time::interval(SPINNER_INTERVAL);
    let mut effect = controller.start();

    loop {
        match effect {
            Effect::Fetch(params) => {
                spawn_fetch(Arc::clone(&advisor), params, tx.clone());
            }
            Effect::Exit => break,
            Effect::None => {}
        }

        session
            .terminal
            .draw(|frame| render::draw(frame, &controller))
            .context("Failed to draw the terminal UI")?;

        let event = tokio::select! {
            Some(outcome) = rx.recv() => Some(Event::Fetched(outcome)),
            Some(input) = keys.next() => match input.context("Failed to read terminal input")? {
                TermEvent::Key(key) => map_key(key),
                _ => None,
            },
            _ = ticker.tick() => Some(Event::Tick),
        };

        effect = match event {
            Some(event) => controller.update(event),
            None => Effect::None,
        };
    }

    session.restore()?;

    Ok(controller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingAdvisor {
        calls: Mutex<Vec<RequestParameters>>,
    }

    #[async_trait]
    impl Advisor for RecordingAdvisor {
        async fn advise(&self, params: &RequestParameters) -> FetchOutcome {
            self.calls.lock().expect("lock").push(params.clone());
            Ok(AdvisoryResult {
                timezone: params.timezone.clone(),
                message: "Ship it".into(),
                should_deploy: true,
                ..AdvisoryResult::default()
            })
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_map_to_events() {
        assert!(matches!(map_key(press(KeyCode::Down)), Some(Event::Down)));
        assert!(matches!(map_key(press(KeyCode::Char('k'))), Some(Event::Up)));
        assert!(matches!(map_key(press(KeyCode::Enter)), Some(Event::Confirm)));
        assert!(matches!(map_key(press(KeyCode::Char('q'))), Some(Event::Quit)));
        assert!(matches!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Event::Quit)
        ));
        assert!(map_key(press(KeyCode::Char('x'))).is_none());
    }

    #[tokio::test]
    async fn confirmed_selection_fetches_that_timezone_once() {
        let advisor = Arc::new(RecordingAdvisor::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut controller = Controller::new(
            RequestParameters::new("UTC", None),
            vec!["UTC".into(), "Asia/Tokyo".into()],
            true,
        );
        assert_eq!(controller.start(), Effect::None);

        let _ = controller.update(Event::Down);
        let Effect::Fetch(params) = controller.update(Event::Confirm) else {
            panic!("confirm should fetch");
        };
        spawn_fetch(advisor.clone(), params, tx)
            .await
            .expect("fetch task");

        let outcome = rx.recv().await.expect("one outcome");
        assert_eq!(controller.update(Event::Fetched(outcome)), Effect::Exit);
        assert!(rx.recv().await.is_none());

        let calls = advisor.calls.lock().expect("lock");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].timezone, "Asia/Tokyo");
    }

    #[tokio::test]
    async fn fetch_survives_dropped_receiver() {
        let advisor = Arc::new(RecordingAdvisor::default());
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        spawn_fetch(advisor.clone(), RequestParameters::new("UTC", None), tx)
            .await
            .expect("fetch task");

        assert_eq!(advisor.calls.lock().expect("lock").len(), 1);
    }
}

//! The interactive controller: a small state machine driven one event at a time.
//!
//! The controller never performs I/O itself. Each transition returns an
//! [`Effect`] that the terminal runtime carries out.

use deploy_core::{AdvisoryError, AdvisoryResult, RequestParameters};

#[derive(Debug)]
pub enum UiState {
    SelectingTimezone { selected: usize },
    Loading,
    Done(AdvisoryResult),
    Failed(AdvisoryError),
}

#[derive(Debug)]
pub enum Event {
    Up,
    Down,
    Confirm,
    Quit,
    Tick,
    Fetched(Result<AdvisoryResult, AdvisoryError>),
}

#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub enum Effect {
    None,
    Fetch(RequestParameters),
    Exit,
}

#[derive(Debug)]
pub struct Controller {
    state: UiState,
    params: RequestParameters,
    timezones: Vec<String>,
    spinner_frame: usize,
    quit: bool,
}

impl Controller {
    /// Interactive controllers start on the timezone list with the cursor on
    /// `params.timezone` when the catalog contains it.
    pub fn new(params: RequestParameters, timezones: Vec<String>, interactive: bool) -> Self {
        let state = if interactive {
            let selected = timezones
                .iter()
                .position(|tz| *tz == params.timezone)
                .unwrap_or(0);
            UiState::SelectingTimezone { selected }
        } else {
            UiState::Loading
        };

        Self {
            state,
            params,
            timezones,
            spinner_frame: 0,
            quit: false,
        }
    }

    /// Effect to run before the first event: a fetch when there is nothing to select.
    pub fn start(&self) -> Effect {
        match self.state {
            UiState::Loading => Effect::Fetch(self.params.clone()),
            _ => Effect::None,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn into_state(self) -> UiState {
        self.state
    }

    pub fn params(&self) -> &RequestParameters {
        &self.params
    }

    pub fn timezones(&self) -> &[String] {
        &self.timezones
    }

    pub fn spinner_frame(&self) -> usize {
        self.spinner_frame
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.state, UiState::SelectingTimezone { .. })
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn is_finished(&self) -> bool {
        self.quit || matches!(self.state, UiState::Done(_) | UiState::Failed(_))
    }

    pub fn update(&mut self, event: Event) -> Effect {
        if self.is_finished() {
            return Effect::None;
        }

        match event {
            Event::Quit => {
                self.quit = true;
                Effect::Exit
            }
            Event::Up => {
                self.move_selection(false);
                Effect::None
            }
            Event::Down => {
                self.move_selection(true);
                Effect::None
            }
            Event::Confirm => self.confirm(),
            Event::Tick => {
                if matches!(self.state, UiState::Loading) {
                    self.spinner_frame = self.spinner_frame.wrapping_add(1);
                }
                Effect::None
            }
            Event::Fetched(outcome) => self.complete(outcome),
        }
    }

    fn move_selection(&mut self, forward: bool) {
        let len = self.timezones.len();
        if len == 0 {
            return;
        }

        if let UiState::SelectingTimezone { selected } = &mut self.state {
            *selected = if forward {
                (*selected + 1) % len
            } else {
                (*selected + len - 1) % len
            };
        }
    }

    fn confirm(&mut self) -> Effect {
        let UiState::SelectingTimezone { selected } = self.state else {
            return Effect::None;
        };
        let Some(timezone) = self.timezones.get(selected) else {
            return Effect::None;
        };

        self.params = self.params.with_timezone(timezone.as_str());
        self.state = UiState::Loading;
        tracing::info!(timezone = %self.params.timezone, "timezone selected");

        Effect::Fetch(self.params.clone())
    }

    fn complete(&mut self, outcome: Result<AdvisoryResult, AdvisoryError>) -> Effect {
        if !matches!(self.state, UiState::Loading) {
            return Effect::None;
        }

        self.state = match outcome {
            Ok(result) => UiState::Done(result),
            Err(err) => UiState::Failed(err),
        };
        Effect::Exit
    }
}

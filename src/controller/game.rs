//! The game loop: human clicks, engine replies, termination.

use super::mapper::BoardGeometry;
use super::presenter::{BoardView, InputEvent, Presenter};
use super::selection::{Action, SelectionState};
use crate::chess::{Move, Rules, Side, TerminationOutcome};
use crate::engine::{EngineError, MoveEngine};
use anyhow::Result;
use std::time::Duration;
use tracing::{debug, error, info, instrument, trace, warn};

const ENGINE_ILLEGAL_STATUS: &str =
    "The engine sent an illegal move. Click the board to ask again.";
const ENGINE_FAILED_STATUS: &str = "The engine failed to move. Click the board to ask again.";

/// Timing and retry knobs for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Pause between the human's move and the engine request.
    pub move_delay: Duration,
    /// How long the final result stays on screen.
    pub game_over_pause: Duration,
    /// Extra engine requests before a turn is forfeited.
    pub engine_retries: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            move_delay: Duration::from_millis(400),
            game_over_pause: Duration::from_secs(6),
            engine_retries: 0,
        }
    }
}

/// Whose move the controller is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for clicks.
    HumanTurn,
    /// The engine will be asked on the next iteration.
    EngineTurn,
    /// Finished; no more events are processed.
    GameOver(TerminationOutcome),
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEnd {
    /// The game reached a terminal position.
    Finished(TerminationOutcome),
    /// The user quit.
    Quit,
}

/// Drives one game between the human and the engine.
pub struct GameController<R, E, P> {
    rules: R,
    engine: E,
    presenter: P,
    settings: ControllerSettings,
    human: Side,
    phase: Phase,
    selection: SelectionState,
    last_move: Option<Move>,
    status: String,
    engine_stopped: bool,
}

impl<R, E, P> GameController<R, E, P>
where
    R: Rules,
    E: MoveEngine,
    P: Presenter,
{
    /// Creates a controller. The human plays the side to move in `rules`.
    pub fn new(rules: R, engine: E, presenter: P, settings: ControllerSettings) -> Self {
        let human = rules.side_to_move();
        info!(%human, "Creating game controller");
        Self {
            rules,
            engine,
            presenter,
            settings,
            human,
            phase: Phase::HumanTurn,
            selection: SelectionState::Empty,
            last_move: None,
            status: "Your move.".to_string(),
            engine_stopped: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current selection.
    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    /// Side the human plays.
    pub fn human(&self) -> Side {
        self.human
    }

    /// The rules engine.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// The move engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The presentation layer.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Status line currently shown.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Runs until the game ends or the user quits, then shuts the engine down.
    #[instrument(skip(self), fields(human = %self.human))]
    pub async fn run(&mut self) -> Result<GameEnd> {
        info!("Starting game loop");
        let result = self.run_loop().await;
        self.stop_engine().await;
        match &result {
            Ok(end) => info!(?end, "Game loop finished"),
            Err(e) => error!(error = ?e, "Game loop failed"),
        }
        result
    }

    async fn run_loop(&mut self) -> Result<GameEnd> {
        loop {
            if let Some(end) = self.step().await? {
                return Ok(end);
            }
        }
    }

    /// One loop iteration: redraw, check for the end of the game, handle one
    /// batch of input, then let the engine move if it was its turn.
    ///
    /// Returns `Some` once the loop should stop. Does not shut the engine
    /// down; [`GameController::run`] does that.
    pub async fn step(&mut self) -> Result<Option<GameEnd>> {
        if let Phase::GameOver(outcome) = self.phase {
            return Ok(Some(GameEnd::Finished(outcome)));
        }

        self.redraw()?;

        if let Some(outcome) = self.rules.termination_status() {
            self.finish(outcome).await?;
            return Ok(Some(GameEnd::Finished(outcome)));
        }

        let engine_due = self.phase == Phase::EngineTurn;

        let mut quit = false;
        for event in self.presenter.poll_events()? {
            match event {
                InputEvent::Quit => quit = true,
                InputEvent::Click { .. } if quit => {}
                InputEvent::Click { x, y } => self.handle_click(x, y).await?,
            }
        }
        if quit {
            info!(phase = ?self.phase, "Quit requested");
            return Ok(Some(GameEnd::Quit));
        }

        if engine_due {
            self.play_engine_turn().await;
        }
        Ok(None)
    }

    /// Stops the engine once; later calls do nothing. Failures are logged.
    pub async fn stop_engine(&mut self) {
        if self.engine_stopped {
            return;
        }
        self.engine_stopped = true;
        match self.engine.shutdown().await {
            Ok(()) => debug!("Engine shut down"),
            Err(e) => warn!(error = %e, "Engine shutdown failed"),
        }
    }

    #[instrument(skip(self), fields(phase = ?self.phase))]
    async fn handle_click(&mut self, x: u32, y: u32) -> Result<()> {
        let (width, height) = self.presenter.board_size();
        let geometry = BoardGeometry::new(width, height, self.human);
        let Some(square) = geometry.to_square(x, y) else {
            trace!("Click outside the board");
            return Ok(());
        };

        let action = self.selection.on_square_clicked(square, self.human, &self.rules);
        self.selection = self.selection.after(&action);

        match action {
            Action::SelectSquare(square) => debug!(%square, "Selected"),
            Action::ClearSelection => {
                if self.phase == Phase::HumanTurn && self.rules.side_to_move() != self.human {
                    info!("Asking the engine again after a forfeited turn");
                    self.phase = Phase::EngineTurn;
                }
            }
            Action::AttemptMove(mv) => self.attempt_human_move(mv).await?,
        }
        Ok(())
    }

    async fn attempt_human_move(&mut self, mv: Move) -> Result<()> {
        if self.phase != Phase::HumanTurn || !self.rules.is_legal(&mv) {
            debug!(%mv, "Illegal move attempt ignored");
            return Ok(());
        }

        self.rules.apply(&mv)?;
        self.last_move = Some(mv);
        self.status = "Engine is thinking...".to_string();
        info!(%mv, "Human moved");

        self.redraw()?;
        tokio::time::sleep(self.settings.move_delay).await;
        self.phase = Phase::EngineTurn;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn play_engine_turn(&mut self) {
        let fen = self.rules.to_fen();

        match self.request_with_retries(&fen).await {
            Ok(mv) => match self.rules.apply(&mv) {
                Ok(()) => {
                    info!(%mv, "Engine moved");
                    self.last_move = Some(mv);
                    self.status = format!("Engine played {}. Your move.", mv);
                }
                Err(e) => {
                    error!(%mv, error = %e, "Engine sent an illegal move, turn forfeited");
                    self.status = ENGINE_ILLEGAL_STATUS.to_string();
                }
            },
            Err(e) => {
                error!(error = %e, "Engine failed to move, turn forfeited");
                self.status = ENGINE_FAILED_STATUS.to_string();
            }
        }
        self.phase = Phase::HumanTurn;
    }

    async fn request_with_retries(&mut self, fen: &str) -> Result<Move, EngineError> {
        let mut attempt = 0;
        loop {
            match self.engine.request_move(fen).await {
                Ok(mv) if self.rules.is_legal(&mv) => return Ok(mv),
                Ok(mv) if attempt < self.settings.engine_retries => {
                    warn!(%mv, attempt, "Engine move is illegal, retrying");
                }
                Ok(mv) => return Ok(mv),
                Err(e) if attempt < self.settings.engine_retries => {
                    warn!(error = %e, attempt, "Engine request failed, retrying");
                }
                Err(e) => return Err(e),
            }
            attempt += 1;
        }
    }

    async fn finish(&mut self, outcome: TerminationOutcome) -> Result<()> {
        self.phase = Phase::GameOver(outcome);
        self.selection = SelectionState::Empty;
        self.status = outcome.message(self.human);
        info!(%outcome, "Game over");

        self.redraw()?;
        self.presenter.show_message(&self.status)?;
        tokio::time::sleep(self.settings.game_over_pause).await;
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let view = BoardView::capture(
            &self.rules,
            self.selection.selected(),
            self.last_move,
            self.status.clone(),
            self.human,
        );
        self.presenter.render(&view)
    }
}

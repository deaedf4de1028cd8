//! Game controller and the pieces it composes.

mod game;
mod mapper;
mod presenter;
mod selection;

pub use game::{ControllerSettings, GameController, GameEnd, Phase};
pub use mapper::{BoardGeometry, to_square};
pub use presenter::{BoardView, InputEvent, Presenter};
pub use selection::{Action, PROMOTION_KIND, SelectionState};

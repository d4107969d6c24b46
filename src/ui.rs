//! Explicit per-surface application state: current view, connectivity, theme.
//! Transitions are a pure reducer; each WebSocket connection owns one `UiState`.

use serde::{Deserialize, Serialize};

use crate::domain::Theme;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ViewState {
  #[default]
  Dashboard,
  Docs,
  ErrorSolver,
  Snippets,
  Practice,
  Interview,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
  pub current_view: ViewState,
  pub is_online: bool,
  pub theme: Theme,
}

impl UiState {
  pub fn new(is_online: bool, theme: Theme) -> Self {
    Self { current_view: ViewState::Dashboard, is_online, theme }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiEvent {
  Navigate(ViewState),
  ConnectivityChanged(bool),
  ThemeChanged(Theme),
}

pub fn reduce(state: UiState, event: UiEvent) -> UiState {
  match event {
    UiEvent::Navigate(view) => UiState { current_view: view, ..state },
    UiEvent::ConnectivityChanged(is_online) => UiState { is_online, ..state },
    UiEvent::ThemeChanged(theme) => UiState { theme, ..state },
  }
}

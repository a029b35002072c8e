// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{AppMode, ColumnKey, JobId, Route, Selection, SortState, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub user_id: UserId,
    pub mode: AppMode,
    pub route: Route,
    pub sort: SortState,
    pub selection: Selection,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            user_id: UserId::new(1),
            mode: AppMode::Nav,
            route: Route::JobTracker,
            sort: SortState::default(),
            selection: Selection::default(),
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Navigate(Route),
    Back,
    CycleSort(ColumnKey),
    ClearSort,
    ToggleSelection(JobId),
    OpenForm,
    ExitToNav,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    RouteChanged(Route),
    SortChanged,
    SelectionChanged(usize),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::Navigate(route) => self.navigate(route),
            AppCommand::Back => {
                if self.route == Route::JobTracker {
                    return Vec::new();
                }
                self.navigate(Route::JobTracker)
            }
            AppCommand::CycleSort(column) => {
                let label = match self.sort.cycle(column) {
                    Some(direction) => {
                        format!("sorted by {} {}", column.as_str(), direction.as_str())
                    }
                    None => "sort cleared".to_owned(),
                };
                vec![AppEvent::SortChanged, self.set_status(&label)]
            }
            AppCommand::ClearSort => {
                if self.sort.is_empty() {
                    return Vec::new();
                }
                self.sort.clear();
                vec![AppEvent::SortChanged, self.set_status("sort cleared")]
            }
            AppCommand::ToggleSelection(id) => {
                self.selection.toggle(id);
                vec![AppEvent::SelectionChanged(self.selection.len())]
            }
            AppCommand::OpenForm => {
                self.mode = AppMode::Form;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }

    fn navigate(&mut self, route: Route) -> Vec<AppEvent> {
        if self.route == route {
            return Vec::new();
        }
        self.route = route.clone();
        self.mode = AppMode::Nav;
        vec![AppEvent::RouteChanged(route)]
    }
}

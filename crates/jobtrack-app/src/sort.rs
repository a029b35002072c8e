// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{ApplicationRecord, ColumnKey, ColumnModel, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    pub column: ColumnKey,
    pub direction: SortDirection,
}

impl SortDirective {
    pub const fn new(column: ColumnKey, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

/// Returns a sorted copy. Directives apply in order as tie-breakers; records
/// that compare equal on every directive keep their input order.
pub fn sort_records(
    records: &[ApplicationRecord],
    directives: &[SortDirective],
    model: &ColumnModel,
) -> Vec<ApplicationRecord> {
    let mut sorted = records.to_vec();
    if directives.is_empty() {
        return sorted;
    }

    sorted.sort_by(|left, right| {
        for directive in directives {
            let Some(order) = model.compare(directive.column, left, right) else {
                continue;
            };
            let order = match directive.direction {
                SortDirection::Asc => order,
                SortDirection::Desc => order.reverse(),
            };
            if order != Ordering::Equal {
                return order;
            }
        }
        Ordering::Equal
    });
    sorted
}

/// Header-driven sort state. The engine accepts any number of directives,
/// but header activation keeps at most one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    directives: Vec<SortDirective>,
}

impl SortState {
    pub fn directives(&self) -> &[SortDirective] {
        &self.directives
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn direction_for(&self, column: ColumnKey) -> Option<SortDirection> {
        self.directives
            .iter()
            .find(|directive| directive.column == column)
            .map(|directive| directive.direction)
    }

    /// unsorted -> asc -> desc -> unsorted on the same column; any other
    /// column replaces the active directive with an ascending one.
    pub fn cycle(&mut self, column: ColumnKey) -> Option<SortDirection> {
        let next = match self.direction_for(column) {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        };
        self.directives.clear();
        if let Some(direction) = next {
            self.directives.push(SortDirective::new(column, direction));
        }
        next
    }

    pub fn clear(&mut self) {
        self.directives.clear();
    }
}

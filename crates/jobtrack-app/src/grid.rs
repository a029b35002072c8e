// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::{
    ApplicationRecord, ColumnKey, ColumnModel, DateStyle, JobId, Route, SortDirection, SortState,
    sort_records,
};

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<JobId>);

impl Selection {
    /// Returns whether the id is selected after the toggle.
    pub fn toggle(&mut self, id: JobId) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = JobId> + '_ {
        self.0.iter().copied()
    }

    /// Drops ids that are not part of the current snapshot.
    pub fn retain_present(&mut self, records: &[ApplicationRecord]) {
        let present = records.iter().map(|record| record.id).collect::<BTreeSet<_>>();
        self.0.retain(|id| present.contains(id));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: ColumnKey,
    pub label: &'static str,
    pub indicator: Option<SortDirection>,
    pub sortable: bool,
}

impl HeaderCell {
    pub fn title(&self) -> String {
        match self.indicator {
            Some(direction) => format!("{} {}", self.label, direction.indicator()),
            None => self.label.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub id: JobId,
    pub selected: bool,
    pub cells: Vec<String>,
    pub target: Route,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    /// Leading selection header cell; checked when every visible row is selected.
    pub all_selected: bool,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<GridRow>,
    pub total: usize,
}

impl GridView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&GridRow> {
        self.rows.get(index)
    }
}

pub fn build_grid(
    records: &[ApplicationRecord],
    model: &ColumnModel,
    sort: &SortState,
    selection: &Selection,
    style: DateStyle,
) -> GridView {
    let sorted = sort_records(records, sort.directives(), model);
    let headers = model
        .columns()
        .iter()
        .map(|column| HeaderCell {
            key: column.key,
            label: column.label,
            indicator: sort.direction_for(column.key),
            sortable: column.sortable,
        })
        .collect::<Vec<_>>();

    let rows = sorted
        .iter()
        .take(PAGE_SIZE)
        .map(|record| GridRow {
            id: record.id,
            selected: selection.contains(record.id),
            cells: model
                .columns()
                .iter()
                .map(|column| (column.display)(record, style))
                .collect(),
            target: Route::for_job(record.id),
        })
        .collect::<Vec<_>>();

    GridView {
        all_selected: !rows.is_empty() && rows.iter().all(|row| row.selected),
        headers,
        rows,
        total: sorted.len(),
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run grouping and endpoint resolution.

use sewer_lite_core::{ReferenceRecord, VertexRecord};

use crate::matcher::ReferenceMatcher;
use crate::report::WarningKind;

/// Vertices of one run, as positions into the input slice, in sequence order.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub run_id: i64,
    pub members: Vec<usize>,
}

impl Run {
    pub fn first(&self) -> Option<usize> {
        self.members.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.members.last().copied()
    }
}

/// Groups vertices into runs ordered by `(run_id, sequence)`.
///
/// The sort is stable, so vertices with equal sequence keep input order.
pub fn group_runs(vertices: &[VertexRecord]) -> Vec<Run> {
    let mut order: Vec<usize> = (0..vertices.len()).collect();
    order.sort_by_key(|&i| (vertices[i].run_id, vertices[i].sequence));

    let mut runs: Vec<Run> = Vec::new();
    for i in order {
        let run_id = vertices[i].run_id;
        match runs.last_mut() {
            Some(run) if run.run_id == run_id => run.members.push(i),
            _ => runs.push(Run {
                run_id,
                members: vec![i],
            }),
        }
    }
    runs
}

/// A run's endpoint vertices and the references they resolve to.
#[derive(Debug, Clone, Copy)]
pub struct Endpoints<'a> {
    pub start_vertex: usize,
    pub end_vertex: usize,
    pub start_ref: &'a ReferenceRecord,
    pub end_ref: &'a ReferenceRecord,
}

/// Resolves the first and last vertex of `run` against the references.
///
/// On failure returns every reason, one per unresolved endpoint.
pub fn resolve_endpoints<'a>(
    run: &Run,
    vertices: &[VertexRecord],
    matcher: &ReferenceMatcher<'a>,
) -> Result<Endpoints<'a>, Vec<WarningKind>> {
    let (start_vertex, end_vertex) = match (run.first(), run.last()) {
        (Some(s), Some(e)) if run.members.len() >= 2 => (s, e),
        _ => return Err(vec![WarningKind::DegenerateRun]),
    };

    let start_ref = matcher.find(&vertices[start_vertex].key);
    let end_ref = matcher.find(&vertices[end_vertex].key);

    match (start_ref, end_ref) {
        (Some(start_ref), Some(end_ref)) => Ok(Endpoints {
            start_vertex,
            end_vertex,
            start_ref,
            end_ref,
        }),
        (start_ref, end_ref) => {
            let mut reasons = Vec::with_capacity(2);
            if start_ref.is_none() {
                reasons.push(WarningKind::StartReferenceNotFound);
            }
            if end_ref.is_none() {
                reasons.push(WarningKind::EndReferenceNotFound);
            }
            Err(reasons)
        }
    }
}

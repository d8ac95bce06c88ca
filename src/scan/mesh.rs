//! Reshape flat scan rows into a 2D mesh.
//!
//! The mesh is indexed by the sorted unique mass values (rows) and sorted
//! unique coupling values (columns). Each cell must be backed by at most one
//! scan row:
//!
//! - exactly one row -> `Present(value)`
//! - no row -> `Missing` (the combination was never scanned)
//! - several rows -> data-integrity error

use crate::domain::{ScanRow, Sector};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshCell {
    Present(f64),
    Missing,
}

impl MeshCell {
    pub fn value(self) -> Option<f64> {
        match self {
            MeshCell::Present(v) => Some(v),
            MeshCell::Missing => None,
        }
    }
}

/// Probability of one sector over the mass × coupling mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityMesh {
    pub sector: Sector,
    pub masses: Vec<f64>,
    pub couplings: Vec<f64>,
    /// Row-major: `cells[i * couplings.len() + j]` is `(masses[i], couplings[j])`.
    cells: Vec<MeshCell>,
}

impl ProbabilityMesh {
    pub fn from_rows(rows: &[ScanRow], sector: Sector) -> Result<Self, AppError> {
        if let Some(r) = rows.iter().find(|r| !(r.m_phi.is_finite() && r.k_rot.is_finite())) {
            return Err(AppError::data_integrity(format!(
                "Non-finite grid coordinate in scan row (m_phi={}, k_rot={}).",
                r.m_phi, r.k_rot
            )));
        }

        let masses = sorted_unique(rows.iter().map(|r| r.m_phi));
        let couplings = sorted_unique(rows.iter().map(|r| r.k_rot));
        let mut cells = vec![MeshCell::Missing; masses.len() * couplings.len()];

        for r in rows {
            let i = index_of(&masses, r.m_phi);
            let j = index_of(&couplings, r.k_rot);
            let cell = &mut cells[i * couplings.len() + j];
            if *cell != MeshCell::Missing {
                return Err(AppError::data_integrity(format!(
                    "Duplicate scan rows for grid cell m_phi={}, k_rot={}.",
                    r.m_phi, r.k_rot
                )));
            }
            *cell = MeshCell::Present(r.probability(sector));
        }

        Ok(Self {
            sector,
            masses,
            couplings,
            cells,
        })
    }

    pub fn get(&self, mass_idx: usize, coupling_idx: usize) -> MeshCell {
        self.cells[mass_idx * self.couplings.len() + coupling_idx]
    }

    /// Cells of one coupling column, ordered by ascending mass.
    pub fn column(&self, coupling_idx: usize) -> impl Iterator<Item = (f64, MeshCell)> + '_ {
        self.masses
            .iter()
            .enumerate()
            .map(move |(i, &m)| (m, self.get(i, coupling_idx)))
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == MeshCell::Missing).count()
    }
}

fn sorted_unique(values: impl Iterator<Item = f64>) -> Vec<f64> {
    // `+ 0.0` folds -0.0 into 0.0 so both land in the same cell.
    let mut out: Vec<f64> = values.map(|v| v + 0.0).collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

fn index_of(sorted: &[f64], value: f64) -> usize {
    let value = value + 0.0;
    sorted
        .binary_search_by(|probe| probe.total_cmp(&value))
        .unwrap_or_else(|i| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SectorCounts;

    fn row(m: f64, k: f64, a: usize, c: usize) -> ScanRow {
        ScanRow::from_counts(m, k, SectorCounts { a, b: 0, c })
    }

    #[test]
    fn reshapes_unordered_rows() {
        let rows = vec![
            row(2.0, 0.5, 1, 3),
            row(1.0, 0.0, 4, 0),
            row(2.0, 0.0, 2, 2),
            row(1.0, 0.5, 0, 4),
        ];
        let mesh = ProbabilityMesh::from_rows(&rows, Sector::A).unwrap();
        assert_eq!(mesh.masses, vec![1.0, 2.0]);
        assert_eq!(mesh.couplings, vec![0.0, 0.5]);
        assert_eq!(mesh.get(0, 0), MeshCell::Present(1.0));
        assert_eq!(mesh.get(0, 1), MeshCell::Present(0.0));
        assert_eq!(mesh.get(1, 0), MeshCell::Present(0.5));
        assert_eq!(mesh.get(1, 1), MeshCell::Present(0.25));
        assert_eq!(mesh.missing_count(), 0);
    }

    #[test]
    fn absent_combination_is_missing() {
        let rows = vec![row(1.0, 0.0, 1, 1), row(2.0, 0.5, 1, 1)];
        let mesh = ProbabilityMesh::from_rows(&rows, Sector::C).unwrap();
        assert_eq!(mesh.get(0, 1), MeshCell::Missing);
        assert_eq!(mesh.get(1, 0), MeshCell::Missing);
        assert_eq!(mesh.get(1, 1).value(), Some(0.5));
        assert_eq!(mesh.missing_count(), 2);
    }

    #[test]
    fn duplicate_cell_is_an_error() {
        let rows = vec![row(1.0, 0.0, 1, 1), row(1.0, -0.0, 2, 0)];
        let err = ProbabilityMesh::from_rows(&rows, Sector::A).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::DataIntegrity);
        assert!(err.message().contains("Duplicate"));
    }

    #[test]
    fn empty_rows_give_empty_mesh() {
        let mesh = ProbabilityMesh::from_rows(&[], Sector::A).unwrap();
        assert!(mesh.masses.is_empty());
        assert_eq!(mesh.missing_count(), 0);
    }
}

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Orthogonal cross-section through a volume laid out as (depth, row, column).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaneAxis {
    /// Fixed depth, yields a row x column plane
    #[default]
    Axial,
    /// Fixed row, yields a depth x column plane
    Coronal,
    /// Fixed column, yields a depth x row plane
    Sagittal,
}

impl PlaneAxis {
    pub const ALL: [PlaneAxis; 3] = [PlaneAxis::Axial, PlaneAxis::Coronal, PlaneAxis::Sagittal];

    /// Index of the volume axis held fixed by this plane.
    pub fn volume_axis(self) -> usize {
        match self {
            PlaneAxis::Axial => 0,
            PlaneAxis::Coronal => 1,
            PlaneAxis::Sagittal => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.volume_axis() + 1) % 3]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.volume_axis() + 2) % 3]
    }

    pub fn name(self) -> &'static str {
        match self {
            PlaneAxis::Axial => "Axial",
            PlaneAxis::Coronal => "Coronal",
            PlaneAxis::Sagittal => "Sagittal",
        }
    }
}

impl fmt::Display for PlaneAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("Unknown plane \"{0}\", expected axial, coronal or sagittal")]
pub struct UnknownPlane(String);

impl FromStr for PlaneAxis {
    type Err = UnknownPlane;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|plane| plane.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPlane(s.to_owned()))
    }
}

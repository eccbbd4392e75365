//! Check-groups over the student repository.
//!
//! Each group prints its own section and returns a [`GroupStatus`]; the
//! sequencing and exit status live in [`crate::core::validate`]. Markers are
//! written only after every required check of the group has passed.
//!
//! [`GroupStatus`]: crate::core::report::GroupStatus

pub mod git;
pub mod hardware;
pub mod led;
pub mod milestones;
pub mod sensor;

/// Which entry point is running. The workstation runner and the on-device
/// validator apply the same checks with slightly different wording, tokens
/// and marker labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Workstation,
    Device,
}

impl Profile {
    /// Marker label: descriptive on the workstation, `Verified` on device.
    pub fn label(self, workstation: &'static str) -> &'static str {
        match self {
            Profile::Workstation => workstation,
            Profile::Device => "Verified",
        }
    }
}
